//! fleetscale-core: configuration tree, directive types, and the
//! failure model shared by the engine, the AWS backend, and the CLI.

pub mod config;
pub mod error;
pub mod failure;
pub mod types;

pub use config::{ConfigTree, RegionSpec};
pub use error::{ConfigError, ConfigResult};
pub use failure::{
    AuthError, FailureCause, ProviderCall, ProviderError, ScalingFailure, ScalingReport,
    ServiceFailure,
};
pub use types::*;
