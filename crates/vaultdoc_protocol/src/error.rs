use thiserror::Error;

/// Errors raised by the contract model.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("network lookup unavailable: {0}")]
    LookupUnavailable(String),

    #[error("network lookup returned no networks")]
    EmptyLookup,
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
