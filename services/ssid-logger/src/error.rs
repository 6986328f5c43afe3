//! Error types for the SSID logger

/// Errors that can occur in the SSID logger
#[derive(Debug, thiserror::Error)]
pub enum SsidLoggerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Monitoring already running with endpoint {0}")]
    AlreadyRunning(String),

    #[error("Observer registration failed: {0}")]
    ObserverRegistration(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Problems with the configuration, detected before any session starts
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("No endpoint URL provided")]
    EmptyEndpoint,

    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("Unsupported endpoint scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("{0}")]
    Read(String),
}

/// Why a single delivery attempt failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("endpoint responded with status {0}")]
    NonSuccessStatus(u16),

    #[error("could not encode payload: {0}")]
    Encoding(String),
}

/// Result type alias for SSID logger operations
pub type Result<T> = std::result::Result<T, SsidLoggerError>;
