use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Duplicate fight (fingerprint: {0})")]
    DuplicateFight(String),

    #[error("Invalid composition: {0}")]
    InvalidComposition(String),

    #[error("Fight too short ({0:.0}s) - minimum 60s required")]
    ShortFight(f64),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Store I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Store JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
