//! Error Types for Crypto Guidance

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GuidanceError>;

#[derive(Error, Debug)]
pub enum GuidanceError {
    #[error("Market data provider error: {0}")]
    Provider(String),

    #[error("HTTP {status} from market data provider: {message}")]
    Http { status: u16, message: String },

    #[error("Asset not recognized by provider: {0}")]
    UnknownAsset(String),

    #[error("Fetch for {id} timed out after {secs}s")]
    Timeout { id: String, secs: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GuidanceError {
    /// Convert to a message suitable for display next to the last good records
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { status: 429, .. } => {
                "Market data rate limit reached. Please wait a moment and refresh.".into()
            }
            Self::Http { status, .. } => format!("Failed to fetch crypto data: HTTP error {status}"),
            Self::Network(_) | Self::Timeout { .. } => {
                "Failed to fetch crypto data: market data service unreachable.".into()
            }
            Self::UnknownAsset(id) => format!("Could not find data for: {id}"),
            other => format!("Failed to fetch crypto data: {other}"),
        }
    }
}
