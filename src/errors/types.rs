use thiserror::Error;

#[derive(Debug, Error)]
pub enum CooError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("State validation error: {0}")]
    StateValidation(String),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure to obtain a usable decision from the oracle endpoint.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication rejected: {0}")]
    Authentication(String),

    #[error("Oracle API error: {0}")]
    Api(String),

    /// The reply was received but is not a single JSON object.
    #[error("Malformed oracle response: {reason}")]
    MalformedResponse { reason: String, raw: String },
}

impl OracleError {
    /// Raw reply text, kept for diagnostics when the content could not be parsed.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            OracleError::MalformedResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}
