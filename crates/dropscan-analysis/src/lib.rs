//! AI viability analysis with a provider fallback chain.
//!
//! [`AnalysisOrchestrator::analyze`] tries each [`AnalysisProvider`] in turn,
//! extracts the first well-formed analysis object from its reply, and falls
//! back to a fixed conservative result when every provider fails.

pub mod chat;
pub mod error;
pub mod extract;
pub mod gemini;
pub mod orchestrator;
mod prompt;
pub mod provider;

pub use chat::ChatCompletionProvider;
pub use error::ProviderError;
pub use extract::{first_balanced_object, parse_analysis};
pub use gemini::GeminiProvider;
pub use orchestrator::{
    static_fallback, Analysis, AnalysisOrchestrator, FALLBACK_VIABILITY_SCORE,
    STATIC_FALLBACK_SOURCE,
};
pub use provider::{AnalysisProvider, AnalysisRequest};
