use crate::error::EngineError;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the fight store (fights.json).
    pub data_dir: PathBuf,
    /// How strongly user feedback bends win rates (0 disables).
    pub feedback_weight: f64,
    /// Days a fight fingerprint stays in the dedup index.
    pub fingerprint_retention_days: i64,
    /// Squad slots to fill per recommendation.
    pub squad_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, EngineError> {
        dotenvy::dotenv().ok();

        let data_dir = match env::var("COUNTERPICK_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".wvw_counterpick"),
        };

        let feedback_weight = parse_var("COUNTERPICK_FEEDBACK_WEIGHT", 0.35)?;
        let fingerprint_retention_days =
            parse_var("COUNTERPICK_FINGERPRINT_RETENTION_DAYS", 7i64)?;
        let squad_size = parse_var("COUNTERPICK_SQUAD_SIZE", 10usize)?;

        Ok(Config {
            data_dir,
            feedback_weight,
            fingerprint_retention_days,
            squad_size,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("."),
            feedback_weight: 0.35,
            fingerprint_retention_days: 7,
            squad_size: 10,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, EngineError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| EngineError::ConfigError(format!("{} has invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}
