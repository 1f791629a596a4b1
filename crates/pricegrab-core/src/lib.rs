use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod rows;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use rows::{load_rows, RowsFile, UrlRow};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read rows file {path}: {source}")]
    RowsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rows file: {0}")]
    RowsFileParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
