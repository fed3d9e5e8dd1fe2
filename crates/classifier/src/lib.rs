mod features;

use std::path::PathBuf;
use std::sync::Arc;

use speechact_core::{
    apply_category_constraint, match_lowered, normalize_for_matching, BatchClassificationResult,
    ClassificationResult, DEFAULT_MODEL_NAME,
};
use speechact_nlp::{Analysis, AnalysisError, LexiconAnalyzer, TextAnalyzer};
use speechact_observability::AppMetrics;
use thiserror::Error;
use tracing::instrument;

pub use features::features_from_analysis;

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_name: String,
    pub model_dir: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            model_dir: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("language analysis model is not available")]
    ModelUnavailable,
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Analysis provider plus the rule chain, loaded once at startup.
///
/// When the provider fails to load the stack still builds, reports
/// `model_loaded() == false` and refuses every classification.
#[derive(Clone)]
pub struct ClassifierStack {
    analyzer: Option<Arc<dyn TextAnalyzer>>,
    model_name: String,
    load_error: Option<String>,
    metrics: Arc<AppMetrics>,
}

impl ClassifierStack {
    pub fn load(config: &ModelConfig, metrics: Arc<AppMetrics>) -> Self {
        match LexiconAnalyzer::load(config.model_name.clone(), config.model_dir.as_deref()) {
            Ok(analyzer) => Self::with_analyzer(Arc::new(analyzer), metrics),
            Err(error) => {
                tracing::error!(
                    model = %config.model_name,
                    error = %error,
                    "language model failed to load; classification disabled"
                );
                Self::unavailable(config.model_name.clone(), error.to_string(), metrics)
            }
        }
    }

    pub fn with_analyzer(analyzer: Arc<dyn TextAnalyzer>, metrics: Arc<AppMetrics>) -> Self {
        Self {
            model_name: analyzer.model_name().to_string(),
            analyzer: Some(analyzer),
            load_error: None,
            metrics,
        }
    }

    pub fn unavailable(
        model_name: impl Into<String>,
        reason: impl Into<String>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            analyzer: None,
            model_name: model_name.into(),
            load_error: Some(reason.into()),
            metrics,
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.analyzer.is_some()
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    /// Runs the analysis provider alone over lower-cased text.
    pub fn analyze(&self, text: &str) -> Result<Analysis, ClassifyError> {
        let analyzer = self.analyzer.as_ref().ok_or(ClassifyError::ModelUnavailable)?;
        Ok(analyzer.analyze(&normalize_for_matching(text))?)
    }

    #[instrument(skip_all, fields(chars = text.chars().count()))]
    pub fn classify(
        &self,
        text: &str,
        allowed: Option<&[String]>,
        return_features: bool,
    ) -> Result<ClassificationResult, ClassifyError> {
        let analyzer = self.analyzer.as_ref().ok_or(ClassifyError::ModelUnavailable)?;

        let lowered = normalize_for_matching(text);
        let analysis = analyzer.analyze(&lowered)?;
        let matched = match_lowered(&lowered);
        let constrained = apply_category_constraint(matched.label(), matched.confidence, allowed);
        if constrained.overridden {
            self.metrics.inc_constraint_override();
            tracing::debug!(
                rule_label = matched.label(),
                label = %constrained.label,
                "prediction replaced by allowed category"
            );
        }
        self.metrics.inc_text_classified();

        Ok(ClassificationResult {
            prediction: constrained.label,
            confidence: constrained.confidence,
            features: return_features.then(|| features_from_analysis(&analysis)),
            tokens_count: analysis.tokens.len(),
        })
    }

    /// Classifies texts in order, silently skipping empty and whitespace-only
    /// entries. The first failure aborts the batch.
    pub fn classify_batch(
        &self,
        texts: &[String],
        allowed: Option<&[String]>,
        return_features: bool,
    ) -> Result<BatchClassificationResult, ClassifyError> {
        let mut predictions = Vec::with_capacity(texts.len());
        for text in texts {
            if is_blank(text) {
                self.metrics.inc_blank_skipped();
                continue;
            }
            predictions.push(self.classify(text, allowed, return_features)?);
        }
        Ok(BatchClassificationResult::from_predictions(predictions))
    }
}

/// Blank in the broader sense used by Python's `str.strip`, which also
/// drops the ASCII information separators U+001C to U+001F.
fn is_blank(text: &str) -> bool {
    text.chars()
        .all(|ch| ch.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&ch))
}

#[cfg(test)]
mod tests {
    use speechact_core::{SpeechAct, CONSTRAINED_CONFIDENCE, DEFAULT_CONFIDENCE, INDETERMINE};

    use super::*;

    fn stack() -> ClassifierStack {
        ClassifierStack::load(&ModelConfig::default(), AppMetrics::shared())
    }

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    struct FailingAnalyzer;

    impl TextAnalyzer for FailingAnalyzer {
        fn model_name(&self) -> &str {
            "failing"
        }

        fn analyze(&self, _text: &str) -> Result<Analysis, AnalysisError> {
            Err(AnalysisError::Failed("tagger exploded".to_string()))
        }
    }

    #[test]
    fn greeting_is_classified_as_opening() {
        let result = stack().classify("Bonjour madame", None, true).unwrap();
        assert_eq!(result.prediction, SpeechAct::Ouverture.as_str());
        assert_eq!(result.confidence, 0.8);
        assert_eq!(result.tokens_count, 2);
        let features = result.features.unwrap();
        assert_eq!(features.pos_tags.len(), 2);
        assert_eq!(features.lemmas.len(), 2);
        assert_eq!(features.dep_parse.len(), 2);
    }

    #[test]
    fn priority_order_holds() {
        let result = stack()
            .classify("bonjour, je vous appelle car la livraison est en retard", None, false)
            .unwrap();
        assert_eq!(result.prediction, "OUVERTURE");
    }

    #[test]
    fn disallowed_label_is_overridden() {
        let stack = stack();
        let allowed = labels(&["EXPLICATION"]);
        let result = stack.classify("bonjour", Some(&allowed), true).unwrap();
        assert_eq!(result.prediction, "EXPLICATION");
        assert_eq!(result.confidence, CONSTRAINED_CONFIDENCE);
        assert_eq!(stack.metrics().snapshot().constraint_overrides_total, 1);
    }

    #[test]
    fn empty_allowed_list_keeps_default() {
        let allowed: Vec<String> = Vec::new();
        let result = stack()
            .classify("le colis est arrivé", Some(&allowed), true)
            .unwrap();
        assert_eq!(result.prediction, INDETERMINE);
        assert_eq!(result.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn token_count_matches_lower_cased_analysis() {
        let stack = stack();
        let text = "Puis-je avoir votre NUMÉRO de contrat ?";
        let result = stack.classify(text, None, false).unwrap();
        let analysis = stack.analyze(text).unwrap();
        assert_eq!(result.tokens_count, analysis.tokens.len());
        assert!(result.features.is_none());
        assert!(analysis.tokens.iter().any(|token| token.text == "numéro"));
    }

    #[test]
    fn repeated_classification_is_identical() {
        let stack = stack();
        let allowed = labels(&["REFLET", "REFLET_JE"]);
        let first = stack
            .classify("je comprends, effectivement", Some(&allowed), true)
            .unwrap();
        let second = stack
            .classify("je comprends, effectivement", Some(&allowed), true)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first.prediction, "REFLET_JE");
    }

    #[test]
    fn labels_stay_in_the_closed_set() {
        let stack = stack();
        let allowed = labels(&["CUSTOM_LABEL"]);
        let texts = [
            "bonjour",
            "nous allons rappeler",
            "rien à signaler",
            "absolument",
            "",
        ];
        for text in texts {
            let free = stack.classify(text, None, false).unwrap();
            assert!(
                free.prediction == INDETERMINE
                    || SpeechAct::parse(&free.prediction).is_some()
            );
            assert!(free.confidence > 0.0 && free.confidence <= 1.0);

            let constrained = stack.classify(text, Some(&allowed), false).unwrap();
            assert_eq!(constrained.prediction, "CUSTOM_LABEL");
        }
    }

    #[test]
    fn batch_skips_blank_texts() {
        let stack = stack();
        let texts = labels(&["bonjour", "   ", "", "\t\n", "je vais regarder"]);
        let batch = stack.classify_batch(&texts, None, false).unwrap();
        assert_eq!(batch.total_processed, 2);
        assert_eq!(batch.predictions.len(), 2);
        assert_eq!(batch.predictions[0].prediction, "OUVERTURE");
        assert_eq!(batch.predictions[1].prediction, "ENGAGEMENT");
        assert_eq!(stack.metrics().snapshot().blank_texts_skipped_total, 3);
    }

    #[test]
    fn batch_treats_separator_controls_as_blank() {
        let stack = stack();
        let texts = labels(&["\u{1f}", "\u{1c}\u{1d} ", "\u{a0}\u{2003}", "oui\u{1e}"]);
        let batch = stack.classify_batch(&texts, None, false).unwrap();
        assert_eq!(batch.total_processed, 1);
        assert_eq!(batch.predictions[0].prediction, "REFLET_ACQ");
        assert_eq!(stack.metrics().snapshot().blank_texts_skipped_total, 3);
    }

    #[test]
    fn unavailable_model_refuses_classification() {
        let stack = ClassifierStack::unavailable("fr_missing", "not installed", AppMetrics::shared());
        assert!(!stack.model_loaded());
        assert!(matches!(
            stack.classify("bonjour", None, true),
            Err(ClassifyError::ModelUnavailable)
        ));
        assert!(matches!(
            stack.classify_batch(&labels(&["bonjour"]), None, true),
            Err(ClassifyError::ModelUnavailable)
        ));
    }

    #[test]
    fn missing_model_dir_degrades_instead_of_panicking() {
        let config = ModelConfig {
            model_name: "fr_custom".to_string(),
            model_dir: Some(std::env::temp_dir().join("speechact-missing-model")),
        };
        let stack = ClassifierStack::load(&config, AppMetrics::shared());
        assert!(!stack.model_loaded());
        assert_eq!(stack.model_name(), "fr_custom");
        assert!(stack.load_error().is_some());
    }

    #[test]
    fn analysis_failures_surface_as_errors() {
        let stack = ClassifierStack::with_analyzer(Arc::new(FailingAnalyzer), AppMetrics::shared());
        let error = stack.classify("bonjour", None, true).unwrap_err();
        assert!(matches!(error, ClassifyError::Analysis(_)));
        assert!(error.to_string().contains("tagger exploded"));
    }
}
