pub mod constraints;
pub mod models;
pub mod rules;

pub use constraints::{apply_category_constraint, Constrained, CONSTRAINED_CONFIDENCE};
pub use models::*;
pub use rules::{
    classify_markers, match_lowered, normalize_for_matching, MarkerRule, RuleMatch,
    DEFAULT_CONFIDENCE, RULES,
};
