use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "dropship")]
    Dropship,
    #[serde(rename = "white-label")]
    WhiteLabel,
    #[serde(rename = "skip")]
    Skip,
}

impl Recommendation {
    /// Lenient parse accepting the spellings models tend to produce
    /// (`"White Label"`, `"whitelabel"`, `"DROPSHIP"`, ...).
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let folded: String = raw
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(char::is_ascii_alphabetic)
            .collect();
        match folded.as_str() {
            "dropship" | "dropshipping" => Some(Recommendation::Dropship),
            "whitelabel" | "whitelabeling" | "privatelabel" => Some(Recommendation::WhiteLabel),
            "skip" | "avoid" | "pass" => Some(Recommendation::Skip),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::Dropship => "dropship",
            Recommendation::WhiteLabel => "white-label",
            Recommendation::Skip => "skip",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured viability analysis for one product.
///
/// Serialized in the camelCase shape the AI providers are asked to emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub actual_full_name: String,
    /// In `[0, 100]`.
    pub viability_score: u8,
    pub recommendation: Recommendation,
    pub top_risks: Vec<String>,
    pub suggestions: Vec<String>,
    pub reasoning: String,
}
