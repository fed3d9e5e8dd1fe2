use std::path::Path;

use unicode_segmentation::UnicodeSegmentation;

use crate::entities::recognize;
use crate::lemmatize::lemmatize;
use crate::lexicon::Lexicon;
use crate::parser::parse;
use crate::tagger::{tag, Pos};
use crate::tokenize::tokenize;
use crate::{Analysis, AnalysisError, AnalyzedToken, Entity, TextAnalyzer};

/// Deterministic French pipeline driven by a [`Lexicon`].
#[derive(Debug, Clone)]
pub struct LexiconAnalyzer {
    model_name: String,
    lexicon: Lexicon,
}

impl LexiconAnalyzer {
    pub fn new(model_name: impl Into<String>, lexicon: Lexicon) -> Self {
        Self {
            model_name: model_name.into(),
            lexicon,
        }
    }

    pub fn load(
        model_name: impl Into<String>,
        model_dir: Option<&Path>,
    ) -> Result<Self, AnalysisError> {
        let lexicon = Lexicon::load(model_dir)?;
        let analyzer = Self::new(model_name, lexicon);
        tracing::info!(
            model = %analyzer.model_name,
            model_dir = ?model_dir,
            lexicon_entries = analyzer.lexicon.len(),
            gazetteer_entries = analyzer.lexicon.gazetteer().len(),
            "language model loaded"
        );
        Ok(analyzer)
    }

    fn analyze_sentence(&self, sentence: &str, analysis: &mut Analysis) {
        let tokens = tokenize(sentence);
        if tokens.is_empty() {
            return;
        }

        let mut tags = tag(&tokens, &self.lexicon);
        let spans = recognize(&tokens, &self.lexicon);
        for span in &spans {
            for pos in &mut tags[span.start..span.end] {
                if matches!(pos, Pos::Noun | Pos::Adj | Pos::Verb | Pos::X) {
                    *pos = Pos::Propn;
                }
            }
        }

        let lemmas = tokens
            .iter()
            .zip(&tags)
            .map(|(token, pos)| lemmatize(token, *pos, &self.lexicon))
            .collect::<Vec<_>>();
        let dependencies = parse(&tokens, &tags, &lemmas);

        let offset = analysis.tokens.len();
        analysis.entities.extend(spans.into_iter().map(|span| Entity {
            text: span.text,
            label: span.label,
            start: span.start + offset,
            end: span.end + offset,
        }));
        for (index, (token, lemma)) in tokens.iter().zip(lemmas).enumerate() {
            let dependency = dependencies[index];
            analysis.tokens.push(AnalyzedToken {
                text: token.clone(),
                pos: tags[index],
                lemma,
                dep: dependency.relation.to_string(),
                head: tokens[dependency.head].clone(),
            });
        }
    }
}

impl TextAnalyzer for LexiconAnalyzer {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn analyze(&self, text: &str) -> Result<Analysis, AnalysisError> {
        let mut analysis = Analysis::default();
        for sentence in text.split_sentence_bounds() {
            self.analyze_sentence(sentence, &mut analysis);
        }
        Ok(analysis)
    }
}
