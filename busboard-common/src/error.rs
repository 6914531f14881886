use thiserror::Error;

/// Main error type for BusBoard
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Container element not found for chart: {0}")]
    MissingElement(String),

    #[error("Chart handle is disposed: {0}")]
    Disposed(String),

    #[error("Malformed dataset: {0}")]
    MalformedData(String),

    #[error("Render engine error: {0}")]
    Render(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
