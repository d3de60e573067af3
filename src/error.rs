use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Failed to parse source document: {0}")]
    Parse(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Run tracker rejected summary (status {status:?}): {message}")]
    Reporting {
        status: Option<u16>,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, EtlError>;
