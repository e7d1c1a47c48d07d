//! Tolerant extraction of the model's JSON verdict.
//!
//! Vision models do not reliably emit bare JSON: they wrap it in prose or
//! Markdown code fences. Extraction is therefore two explicit steps: find the
//! object-looking span, then parse that span into the fixed schema.

use crate::error::{AnalysisError, PipelineResult};
use crate::types::{AnalysisResult, ProductLabel};
use serde::Deserialize;

/// The schema the model is asked to fill in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteVerdict {
    #[serde(default)]
    product_name: Option<String>,
    freshness_status: String,
    overall_quality: String,
    confidence: f64,
    justification: String,
    #[serde(default)]
    consumable: Option<bool>,
}

/// Return the span from the first `{` to the last `}`, if any.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Convert a 0.0-1.0 fraction into an integer percentage.
pub fn confidence_percent(fraction: f64) -> Option<u8> {
    if !fraction.is_finite() {
        return None;
    }
    Some((fraction * 100.0).round().clamp(0.0, 100.0) as u8)
}

/// Parse model output text into an `AnalysisResult`.
///
/// A missing or blank `productName` falls back to `label`.
pub fn parse_assessment(text: &str, label: &ProductLabel) -> PipelineResult<AnalysisResult> {
    let candidate = extract_json_object(text).ok_or_else(|| {
        AnalysisError::MalformedResponse("no JSON object found in model output".to_string())
    })?;

    let verdict: RemoteVerdict = serde_json::from_str(candidate)
        .map_err(|e| AnalysisError::MalformedResponse(format!("invalid assessment JSON: {e}")))?;

    let confidence = confidence_percent(verdict.confidence).ok_or_else(|| {
        AnalysisError::MalformedResponse(format!(
            "confidence is not a finite number: {}",
            verdict.confidence
        ))
    })?;

    let product_name = verdict
        .product_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| label.to_string());

    Ok(AnalysisResult {
        product_name,
        freshness_status: verdict.freshness_status,
        overall_quality: verdict.overall_quality,
        confidence,
        justification: verdict.justification,
        consumable: verdict.consumable,
    })
}
