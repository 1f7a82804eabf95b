use std::time::Duration;

use thiserror::Error;

/// Why one provider in the analysis chain produced no usable result.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No API key (or endpoint) configured for this provider.
    #[error("{0} is not configured")]
    NotConfigured(String),

    /// The call exceeded the provider's time budget.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The provider answered with a non-2xx status.
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response envelope did not carry any generated text.
    #[error("response contained no generated text")]
    EmptyResponse,

    /// The generated text held no parsable JSON object.
    #[error("no JSON object found in response: {0}")]
    Unparsable(String),

    /// A JSON object was found but required fields were missing or invalid.
    #[error("analysis object rejected: {0}")]
    Invalid(String),
}
