//! Prompt text for the two provider styles.

use crate::provider::AnalysisRequest;

pub(crate) const SYSTEM_PROMPT: &str = "You are an e-commerce product analyst who evaluates \
dropshipping viability. Respond with a single JSON object and nothing else.";

/// Schema-first prompt for providers that follow instructions closely.
pub(crate) fn strict_prompt(request: &AnalysisRequest) -> String {
    format!(
        r#"Analyse this product for dropshipping viability.

Product: {name}
Price: {price}
Target region: {region}

Return exactly this JSON shape:
{{
  "actualFullName": string,
  "viabilityScore": integer 0-100,
  "recommendation": "dropship" | "white-label" | "skip",
  "topRisks": [string, string, string],
  "suggestions": [string, string, string],
  "reasoning": string
}}"#,
        name = request.product_name.trim(),
        price = request.price.trim(),
        region = request.region.trim(),
    )
}

/// Conversational prompt for providers that wrap JSON in prose.
pub(crate) fn loose_prompt(request: &AnalysisRequest) -> String {
    format!(
        "Would \"{name}\" at {price} be a good product to dropship in {region}? \
Give a viability score from 0 to 100, recommend dropship, white-label or skip, \
list the top risks and some suggestions, and explain your reasoning. \
Answer as JSON with keys actualFullName, viabilityScore, recommendation, topRisks, \
suggestions, reasoning.",
        name = request.product_name.trim(),
        price = request.price.trim(),
        region = request.region.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_carry_request_fields() {
        let req = AnalysisRequest::new(" Neck Fan ", "$19.99", "US");
        for prompt in [strict_prompt(&req), loose_prompt(&req)] {
            assert!(prompt.contains("Neck Fan"));
            assert!(prompt.contains("$19.99"));
            assert!(prompt.contains("US"));
            assert!(prompt.contains("viabilityScore"));
        }
    }
}
