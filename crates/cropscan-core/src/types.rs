//! Core data types for produce quality analysis.
//!
//! These are the values that cross the library boundary: the label a caller
//! picks, the assessment they get back, and where that assessment came from.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-empty product label such as "wheat" or "banana".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductLabel(String);

impl ProductLabel {
    /// Create a label, trimming surrounding whitespace.
    pub fn new(label: impl AsRef<str>) -> Result<Self, AnalysisError> {
        let trimmed = label.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AnalysisError::InvalidLabel);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProductLabel {
    type Error = AnalysisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductLabel> for String {
    fn from(label: ProductLabel) -> Self {
        label.0
    }
}

/// Structured quality assessment for one product image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// The product the assessment is about
    pub product_name: String,

    /// Freshness verdict ("Fresh", "Ripe", "Stale", "N/A", ...)
    pub freshness_status: String,

    /// Quality grade ("A", "B", "D", "ERROR", ...)
    pub overall_quality: String,

    /// Confidence as an integer percentage (0-100)
    pub confidence: u8,

    /// Free-text reasoning behind the verdict
    pub justification: String,

    /// Whether the product is fit to eat, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumable: Option<bool>,
}

impl AnalysisResult {
    /// Quality grade used for results that stand in for a failed analysis.
    pub const ERROR_GRADE: &'static str = "ERROR";

    /// Build the placeholder result that reports a failure instead of an
    /// assessment.
    pub fn failure(label: &ProductLabel, justification: impl Into<String>) -> Self {
        Self {
            product_name: label.to_string(),
            freshness_status: "N/A".to_string(),
            overall_quality: Self::ERROR_GRADE.to_string(),
            confidence: 0,
            justification: justification.into(),
            consumable: None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.overall_quality == Self::ERROR_GRADE
    }
}

/// Where an assessment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Produced by the remote analysis service
    Remote,
    /// Fabricated locally after the remote path failed
    Simulated,
    /// Placeholder describing a failure (fallback disabled)
    Failed,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Remote => write!(f, "remote"),
            Provenance::Simulated => write!(f, "simulated"),
            Provenance::Failed => write!(f, "failed"),
        }
    }
}

/// An assessment tagged with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub result: AnalysisResult,
    pub provenance: Provenance,
}

/// A selectable entry in the storefront crop picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropOption {
    /// Label sent to the analyzer
    pub value: &'static str,
    /// Human-readable name
    pub display_name: &'static str,
}

/// Crops offered by the storefront picker. Any non-empty label is accepted by
/// the analyzer; this list only drives menus and `cropscan crops`.
pub const CROP_CATALOG: &[CropOption] = &[
    CropOption { value: "wheat", display_name: "Wheat" },
    CropOption { value: "rice", display_name: "Rice" },
    CropOption { value: "corn", display_name: "Corn" },
    CropOption { value: "strawberry", display_name: "Strawberry" },
    CropOption { value: "banana", display_name: "Banana" },
    CropOption { value: "pineapple", display_name: "Pineapple" },
    CropOption { value: "tomato", display_name: "Tomato" },
    CropOption { value: "cucumber", display_name: "Cucumber" },
    CropOption { value: "carrot", display_name: "Carrot" },
    CropOption { value: "apple", display_name: "Apple" },
    CropOption { value: "mango", display_name: "Mango" },
    CropOption { value: "grape", display_name: "Grape" },
];
