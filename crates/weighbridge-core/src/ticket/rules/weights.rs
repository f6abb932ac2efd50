//! Gross/tare/net weight extraction.

use regex::Regex;

use super::patterns::{GROSS_WEIGHT, NET_WEIGHT, TARE_WEIGHT};
use super::FieldExtractor;
use crate::error::ExtractionError;

/// Extractor for one labeled weight value in kilograms.
pub struct WeightExtractor {
    pattern: &'static Regex,
}

impl WeightExtractor {
    /// Extractor for the `GROSS` label.
    pub fn gross() -> Self {
        Self { pattern: &GROSS_WEIGHT }
    }

    /// Extractor for the `TARE` label.
    pub fn tare() -> Self {
        Self { pattern: &TARE_WEIGHT }
    }

    /// Extractor for the `NET` label.
    pub fn net() -> Self {
        Self { pattern: &NET_WEIGHT }
    }
}

impl FieldExtractor for WeightExtractor {
    type Output = u32;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let caps = self.pattern.captures(text)?;
        caps[1].parse().ok()
    }
}

/// The three weights printed on a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weights {
    pub gross: u32,
    pub tare: u32,
    pub net: u32,
}

/// Extract all three weights; each label is searched independently.
pub fn extract_weights(text: &str) -> Result<Weights, ExtractionError> {
    let gross = WeightExtractor::gross()
        .extract(text)
        .ok_or(ExtractionError::MissingField("gross weight"))?;
    let tare = WeightExtractor::tare()
        .extract(text)
        .ok_or(ExtractionError::MissingField("tare weight"))?;
    let net = WeightExtractor::net()
        .extract(text)
        .ok_or(ExtractionError::MissingField("net weight"))?;

    Ok(Weights { gross, tare, net })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_weights() {
        let weights = extract_weights("GROSS 1000 TARE 200 NET 800").unwrap();
        assert_eq!(weights, Weights { gross: 1000, tare: 200, net: 800 });
    }

    #[test]
    fn test_noise_between_label_and_value() {
        let text = "Gross Wt (kg) :: 14520\nTare wt.... 9880\nNett weight: 4640";
        let weights = extract_weights(text).unwrap();
        assert_eq!(weights, Weights { gross: 14520, tare: 9880, net: 4640 });
    }

    #[test]
    fn test_noise_longer_than_window() {
        // 21 non-digit characters between label and digits.
        let text = "GROSS.....................1000 TARE 200 NET 800";
        assert_eq!(
            extract_weights(text),
            Err(ExtractionError::MissingField("gross weight"))
        );
    }

    #[test]
    fn test_digit_run_widths() {
        // Gross needs at least three digits, net only two.
        assert_eq!(WeightExtractor::gross().extract("GROSS 99"), None);
        assert_eq!(WeightExtractor::net().extract("NET 99"), Some(99));
        // Runs longer than five digits are truncated to the first five.
        assert_eq!(WeightExtractor::gross().extract("GROSS 123456"), Some(12345));
    }

    #[test]
    fn test_missing_label() {
        assert_eq!(
            extract_weights("GROSS 1000 NET 800"),
            Err(ExtractionError::MissingField("tare weight"))
        );
    }
}
