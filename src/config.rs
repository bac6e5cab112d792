//! Runtime configuration resolved from the environment

use std::path::PathBuf;

use crate::constants::{DATA_DIR_NAME, DEFAULT_EXECUTOR, LOG_FILE_NAME};

/// Overrides the data directory
pub const HOME_ENV: &str = "GHOSTWIRE_HOME";

/// Overrides the executor program
pub const EXECUTOR_ENV: &str = "GHOSTWIRE_EXECUTOR";

#[derive(Clone, Debug)]
pub struct Config {
    /// Directory holding the history/collections records and the log file
    pub data_dir: PathBuf,
    /// Program the synthesized arguments are passed to
    pub executor: String,
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>, executor: impl Into<String>) -> Self {
        Config {
            data_dir: data_dir.into(),
            executor: executor.into(),
        }
    }

    pub fn from_env() -> Self {
        let data_dir = std::env::var_os(HOME_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let executor = std::env::var(EXECUTOR_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EXECUTOR.to_string());

        Config { data_dir, executor }
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(default_data_dir(), DEFAULT_EXECUTOR)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}
