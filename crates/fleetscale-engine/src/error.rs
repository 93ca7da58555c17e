//! Orchestrator error types.

use std::time::Duration;

use fleetscale_core::ConfigError;
use thiserror::Error;

/// Fatal errors. Anything that goes wrong once fan-out has begun is
/// reported through the `ScalingReport` instead.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no assumed role ARN provided")]
    MissingRoleArn,

    #[error("scaling run cancelled")]
    Cancelled,

    #[error("scaling run exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
