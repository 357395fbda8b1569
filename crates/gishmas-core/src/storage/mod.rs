mod config;
mod local;

pub use config::{
    AppConfig, Config, IdentityConfig, QuizConfig, StoreConfig, UnlockConfig, UnlockPolicyKind,
};
pub use local::{LocalStorage, LOCAL_DB_FILE};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/gishmas[-dev]/` based on GISHMAS_ENV.
///
/// Set GISHMAS_ENV=dev to use the development data directory, or
/// GISHMAS_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("GISHMAS_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("GISHMAS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("gishmas-dev")
            } else {
                base_dir.join("gishmas")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
