//! Configuration error types.

use thiserror::Error;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while reading or decoding a scaling config. All of them
/// are fatal: no region is scaled when the config is rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config document: {0}")]
    Malformed(#[from] serde_yaml::Error),

    #[error("config error: {0}")]
    Invalid(String),

    #[error("config error: region {region}, directive {index}: service field is missing or empty")]
    MissingService { region: String, index: usize },

    #[error("config error: region {region}, directive {index}: service {service} is not supported")]
    UnsupportedService {
        region: String,
        index: usize,
        service: String,
    },

    #[error("config error: region {region}, directive {index}: invalid {service} scaling config: {source}")]
    Directive {
        region: String,
        index: usize,
        service: String,
        #[source]
        source: serde_yaml::Error,
    },
}
