/// Errors surfaced by the Machine Spirit core.
///
/// Chat handling itself is total; these only come out of boundary
/// validation and configuration I/O.
#[derive(Debug, thiserror::Error)]
pub enum SpiritError {
    #[error("invalid mode: {0}")]
    InvalidMode(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("config serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SpiritError>;
