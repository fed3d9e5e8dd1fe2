/// Confidence forced onto a prediction that had to be replaced by an
/// allowed category.
pub const CONSTRAINED_CONFIDENCE: f32 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct Constrained {
    pub label: String,
    pub confidence: f32,
    pub overridden: bool,
}

/// Restricts a prediction to the caller's allowed categories.
///
/// A label outside a non-empty `allowed` list is replaced by the first allowed
/// entry at [`CONSTRAINED_CONFIDENCE`]. A missing or empty list leaves the
/// prediction untouched.
pub fn apply_category_constraint(
    label: &str,
    confidence: f32,
    allowed: Option<&[String]>,
) -> Constrained {
    match allowed {
        Some(entries @ [first, ..]) if !entries.iter().any(|entry| entry == label) => Constrained {
            label: first.clone(),
            confidence: CONSTRAINED_CONFIDENCE,
            overridden: true,
        },
        _ => Constrained {
            label: label.to_string(),
            confidence,
            overridden: false,
        },
    }
}
