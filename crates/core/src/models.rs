use serde::{Deserialize, Serialize};

pub const INDETERMINE: &str = "INDETERMINE";
pub const DEFAULT_MODEL_NAME: &str = "fr_core_news_md";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpeechAct {
    Ouverture,
    Engagement,
    Explication,
    Reflet,
    RefletJe,
    RefletVous,
    RefletAcq,
}

impl SpeechAct {
    /// Supported labels, in the order `/categories` reports them.
    pub const ALL: [SpeechAct; 7] = [
        Self::Ouverture,
        Self::Engagement,
        Self::Explication,
        Self::Reflet,
        Self::RefletJe,
        Self::RefletVous,
        Self::RefletAcq,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ouverture => "OUVERTURE",
            Self::Engagement => "ENGAGEMENT",
            Self::Explication => "EXPLICATION",
            Self::Reflet => "REFLET",
            Self::RefletJe => "REFLET_JE",
            Self::RefletVous => "REFLET_VOUS",
            Self::RefletAcq => "REFLET_ACQ",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "OUVERTURE" => Some(Self::Ouverture),
            "ENGAGEMENT" => Some(Self::Engagement),
            "EXPLICATION" => Some(Self::Explication),
            "REFLET" => Some(Self::Reflet),
            "REFLET_JE" => Some(Self::RefletJe),
            "REFLET_VOUS" => Some(Self::RefletVous),
            "REFLET_ACQ" => Some(Self::RefletAcq),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub text: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub return_features: Option<bool>,
    #[serde(default)]
    pub confidence_threshold: Option<f32>,
    #[serde(default)]
    pub available_categories: Option<Vec<String>>,
}

impl ClassificationRequest {
    pub fn wants_features(&self) -> bool {
        self.return_features.unwrap_or(true)
    }

    /// Informational only; the rules never look at it.
    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL_NAME)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchClassificationRequest {
    pub texts: Vec<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub return_features: Option<bool>,
    #[serde(default)]
    pub confidence_threshold: Option<f32>,
    #[serde(default)]
    pub available_categories: Option<Vec<String>>,
}

impl BatchClassificationRequest {
    pub fn wants_features(&self) -> bool {
        self.return_features.unwrap_or(true)
    }

    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL_NAME)
    }
}

/// Per-token linguistic features reported alongside a prediction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinguisticFeatures {
    pub pos_tags: Vec<String>,
    /// `(entity text, entity label)`
    pub entities: Vec<(String, String)>,
    pub lemmas: Vec<String>,
    /// `(token, dependency relation, head token)`
    pub dep_parse: Vec<(String, String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub prediction: String,
    pub confidence: f32,
    pub features: Option<LinguisticFeatures>,
    pub tokens_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchClassificationResult {
    pub predictions: Vec<ClassificationResult>,
    pub total_processed: usize,
}

impl BatchClassificationResult {
    pub fn from_predictions(predictions: Vec<ClassificationResult>) -> Self {
        let total_processed = predictions.len();
        Self {
            predictions,
            total_processed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryListing {
    pub categories: Vec<String>,
    pub total: usize,
}

impl CategoryListing {
    pub fn supported() -> Self {
        let categories = SpeechAct::ALL
            .iter()
            .map(|act| act.as_str().to_string())
            .collect::<Vec<_>>();
        Self {
            total: categories.len(),
            categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_serialize_as_screaming_snake_case() {
        let encoded = serde_json::to_string(&SpeechAct::RefletVous).unwrap();
        assert_eq!(encoded, "\"REFLET_VOUS\"");
        for act in SpeechAct::ALL {
            assert_eq!(SpeechAct::parse(act.as_str()), Some(act));
        }
    }

    #[test]
    fn category_listing_has_seven_labels() {
        let listing = CategoryListing::supported();
        assert_eq!(listing.total, 7);
        assert_eq!(listing.categories[0], "OUVERTURE");
        assert!(!listing.categories.iter().any(|label| label == INDETERMINE));
    }

    #[test]
    fn request_defaults_apply_when_fields_missing() {
        let request: ClassificationRequest =
            serde_json::from_str(r#"{"text": "bonjour"}"#).unwrap();
        assert!(request.wants_features());
        assert_eq!(request.model_name(), DEFAULT_MODEL_NAME);
        assert!(request.available_categories.is_none());
    }

    #[test]
    fn features_tuples_encode_as_arrays() {
        let features = LinguisticFeatures {
            pos_tags: vec!["PROPN".to_string()],
            entities: vec![("paris".to_string(), "LOC".to_string())],
            lemmas: vec!["paris".to_string()],
            dep_parse: vec![(
                "paris".to_string(),
                "ROOT".to_string(),
                "paris".to_string(),
            )],
        };
        let value = serde_json::to_value(&features).unwrap();
        assert_eq!(value["entities"][0][1], "LOC");
        assert_eq!(value["dep_parse"][0][1], "ROOT");
    }
}
