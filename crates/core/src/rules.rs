use crate::models::{SpeechAct, INDETERMINE};

/// Confidence reported when no marker group matches.
pub const DEFAULT_CONFIDENCE: f32 = 0.6;

#[derive(Debug, Clone, Copy)]
pub struct MarkerRule {
    pub act: SpeechAct,
    pub confidence: f32,
    pub markers: &'static [&'static str],
}

/// Marker groups in evaluation order. The first group with a marker contained
/// in the lower-cased text wins.
pub const RULES: [MarkerRule; 7] = [
    MarkerRule {
        act: SpeechAct::Ouverture,
        confidence: 0.8,
        markers: &[
            "bonjour",
            "bonsoir",
            "salut",
            "bienvenue",
            "merci de",
            "puis-je",
        ],
    },
    MarkerRule {
        act: SpeechAct::Engagement,
        confidence: 0.85,
        markers: &["je vais", "on va", "je fais", "nous allons", "action"],
    },
    MarkerRule {
        act: SpeechAct::Explication,
        confidence: 0.75,
        markers: &[
            "parce que",
            "car",
            "notre politique",
            "technique",
            "procédure",
        ],
    },
    MarkerRule {
        act: SpeechAct::RefletJe,
        confidence: 0.7,
        markers: &["je comprends", "je vois", "effectivement"],
    },
    MarkerRule {
        act: SpeechAct::RefletVous,
        confidence: 0.7,
        markers: &["vous dites", "vous mentionnez", "selon vous"],
    },
    MarkerRule {
        act: SpeechAct::RefletAcq,
        confidence: 0.8,
        markers: &["oui", "exact", "tout à fait", "absolument"],
    },
    MarkerRule {
        act: SpeechAct::Reflet,
        confidence: 0.65,
        markers: &["reformul", "paraphras", "comprendre"],
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleMatch {
    pub act: Option<SpeechAct>,
    pub confidence: f32,
}

impl RuleMatch {
    pub fn indeterminate() -> Self {
        Self {
            act: None,
            confidence: DEFAULT_CONFIDENCE,
        }
    }

    pub fn label(&self) -> &'static str {
        self.act.map(SpeechAct::as_str).unwrap_or(INDETERMINE)
    }
}

pub fn normalize_for_matching(text: &str) -> String {
    text.to_lowercase()
}

pub fn classify_markers(text: &str) -> RuleMatch {
    match_lowered(&normalize_for_matching(text))
}

/// Same as [`classify_markers`] for text that is already lower-cased.
pub fn match_lowered(lower: &str) -> RuleMatch {
    RULES
        .iter()
        .find(|rule| contains_any(lower, rule.markers))
        .map(|rule| RuleMatch {
            act: Some(rule.act),
            confidence: rule.confidence,
        })
        .unwrap_or_else(RuleMatch::indeterminate)
}

// Plain substring test: a marker inside a longer word still counts.
fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}
