use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("keyword must not be empty")]
    EmptyKeyword,

    #[error("keyword not in dictionary: {0}")]
    UnknownKeyword(String),

    #[error("invalid thresholds: low {low}, high {high}")]
    InvalidThresholds { low: f64, high: f64 },

    #[error("invalid detected-keyword record: {0}")]
    InvalidRecord(String),

    #[error("unknown understanding level: {0}")]
    UnknownLevel(String),

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
