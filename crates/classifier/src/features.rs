use speechact_core::LinguisticFeatures;
use speechact_nlp::Analysis;

pub fn features_from_analysis(analysis: &Analysis) -> LinguisticFeatures {
    LinguisticFeatures {
        pos_tags: analysis
            .pos_tags()
            .into_iter()
            .map(str::to_string)
            .collect(),
        entities: analysis
            .entities
            .iter()
            .map(|entity| (entity.text.clone(), entity.label.clone()))
            .collect(),
        lemmas: analysis
            .tokens
            .iter()
            .map(|token| token.lemma.clone())
            .collect(),
        dep_parse: analysis
            .tokens
            .iter()
            .map(|token| (token.text.clone(), token.dep.clone(), token.head.clone()))
            .collect(),
    }
}
