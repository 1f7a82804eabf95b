//! Tolerant extraction of the analysis object from generated text.
//!
//! Models wrap JSON in prose and code fences, stringify numbers, and vary the
//! recommendation spelling. The text is parsed directly first; failing that,
//! the first balanced `{...}` span is parsed instead.

use dropscan_core::{normalized_name, AnalysisResult, Recommendation};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ProviderError;

/// Loose wire shape. Every field is optional until [`validate`] runs.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireAnalysis {
    actual_full_name: Option<String>,
    viability_score: Option<Value>,
    recommendation: Option<String>,
    top_risks: Option<Value>,
    suggestions: Option<Value>,
    reasoning: Option<String>,
}

/// Returns the first balanced `{...}` span in `text`, ignoring braces that
/// appear inside JSON strings.
#[must_use]
pub fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses and validates an analysis from raw provider text.
///
/// `product_name` fills in a missing `actualFullName`.
///
/// # Errors
///
/// [`ProviderError::Unparsable`] when no JSON object can be found,
/// [`ProviderError::Invalid`] when the object lacks a usable recommendation
/// or viability score.
pub fn parse_analysis(text: &str, product_name: &str) -> Result<AnalysisResult, ProviderError> {
    let trimmed = text.trim();
    let wire = match serde_json::from_str::<WireAnalysis>(trimmed) {
        Ok(w) => w,
        Err(_) => {
            let span = first_balanced_object(trimmed)
                .ok_or_else(|| ProviderError::Unparsable(preview(trimmed)))?;
            serde_json::from_str::<WireAnalysis>(span)
                .map_err(|e| ProviderError::Unparsable(e.to_string()))?
        }
    };
    validate(wire, product_name)
}

fn validate(wire: WireAnalysis, product_name: &str) -> Result<AnalysisResult, ProviderError> {
    let recommendation = wire
        .recommendation
        .as_deref()
        .and_then(Recommendation::parse_lenient)
        .ok_or_else(|| {
            ProviderError::Invalid(format!(
                "unrecognised recommendation {:?}",
                wire.recommendation
            ))
        })?;

    let viability_score = wire
        .viability_score
        .as_ref()
        .and_then(score_from_value)
        .ok_or_else(|| ProviderError::Invalid("viabilityScore is missing or not numeric".into()))?;

    let actual_full_name = wire
        .actual_full_name
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| normalized_name(product_name).to_owned());

    Ok(AnalysisResult {
        actual_full_name,
        viability_score,
        recommendation,
        top_risks: string_list(wire.top_risks.as_ref()),
        suggestions: string_list(wire.suggestions.as_ref()),
        reasoning: wire.reasoning.unwrap_or_default().trim().to_owned(),
    })
}

/// Accepts numbers and numeric strings, clamped to `[0, 100]`.
fn score_from_value(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(raw.round().clamp(0.0, 100.0) as u8)
}

/// A list of strings, a single string, or nothing.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_owned()],
        _ => Vec::new(),
    }
}

fn preview(text: &str) -> String {
    text.chars().take(120).collect()
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
