//! Recognizer output.

use crate::error::{Error, Result};

/// Minimum confidence the surrounding system requires before running the
/// pipeline at all (30%).
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.3;

/// Confidence above which recognized text is considered reliable.
pub const HIGH_CONFIDENCE: f32 = 0.7;

/// Unprocessed text produced by the recognizer, with its confidence score.
///
/// The pipeline never inspects `confidence`; gating on it is the caller's job
/// (see [`RawText::is_acceptable`]).
#[derive(Debug, Clone, PartialEq)]
pub struct RawText {
    text: String,
    confidence: f32,
}

impl RawText {
    /// Creates a new raw text, validating that `confidence` lies in `[0, 1]`.
    pub fn new(text: impl Into<String>, confidence: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(Error::InvalidConfidence(confidence));
        }
        Ok(Self {
            text: text.into(),
            confidence,
        })
    }

    /// Creates a raw text with full confidence.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: 1.0,
        }
    }

    /// Returns the recognized text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the recognizer confidence.
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Returns true if the confidence strictly exceeds `threshold`.
    pub fn is_acceptable(&self, threshold: f32) -> bool {
        self.confidence > threshold
    }

    /// Returns true if the confidence is at least [`HIGH_CONFIDENCE`].
    pub fn is_high_confidence(&self) -> bool {
        self.confidence >= HIGH_CONFIDENCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_validation() {
        assert!(RawText::new("피해량", 0.0).is_ok());
        assert!(RawText::new("피해량", 1.0).is_ok());
        assert!(matches!(
            RawText::new("피해량", 1.5),
            Err(Error::InvalidConfidence(_))
        ));
        assert!(RawText::new("피해량", -0.1).is_err());
        assert!(RawText::new("피해량", f32::NAN).is_err());
    }

    #[test]
    fn test_acceptance_threshold() {
        let low = RawText::new("x", 0.3).unwrap();
        let ok = RawText::new("x", 0.31).unwrap();
        assert!(!low.is_acceptable(DEFAULT_MIN_CONFIDENCE));
        assert!(ok.is_acceptable(DEFAULT_MIN_CONFIDENCE));
        assert!(!ok.is_high_confidence());
        assert!(RawText::from_text("x").is_high_confidence());
    }
}
