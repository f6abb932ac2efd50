//! Waste category inference from keywords.

use super::FieldExtractor;
use crate::models::ticket::WasteCategory;

/// Keyword rules in priority order; the first rule with a hit wins.
const CATEGORY_RULES: &[(WasteCategory, &[&str])] = &[
    (WasteCategory::StreetLitter, &["STREET", "CLEAN", "LITTER"]),
    (WasteCategory::Compost, &["BIODEGRADABLE", "COMPOST", "KITCHEN"]),
];

/// Category extractor. Always produces a value.
pub struct CategoryExtractor;

impl CategoryExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CategoryExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CategoryExtractor {
    type Output = WasteCategory;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        Some(classify(text))
    }
}

/// Classify page text into a waste category, defaulting to `Flytip`.
pub fn classify(text: &str) -> WasteCategory {
    let upper = text.to_uppercase();

    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| upper.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or_default()
}
