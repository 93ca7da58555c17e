//! Failure model: what went wrong, where, and the region-keyed report.
//!
//! Strategies produce region-agnostic [`ServiceFailure`]s. The dispatcher
//! stamps them with the region they ran in, turning them into
//! [`ScalingFailure`]s, which the orchestrator aggregates into a
//! [`ScalingReport`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::types::{ServiceKind, TableDimension};

/// Credentials could not be acquired for a region.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("failed to assume role {role_arn}: {message}")]
pub struct AuthError {
    pub role_arn: String,
    pub message: String,
}

impl AuthError {
    pub fn new(role_arn: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            role_arn: role_arn.into(),
            message: message.into(),
        }
    }
}

/// A remote provider call was rejected or could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub struct ProviderError {
    /// Provider error code, when the provider returned one.
    pub code: Option<String>,
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{code}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// The remote operation a provider failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCall {
    UpdateAutoScalingGroup,
    UpdateShardCount,
    ModifyReplicationGroupShardConfiguration,
    ModifyCacheCluster,
    RegisterScalableTarget(TableDimension),
}

impl fmt::Display for ProviderCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderCall::UpdateAutoScalingGroup => f.write_str("UpdateAutoScalingGroup"),
            ProviderCall::UpdateShardCount => f.write_str("UpdateShardCount"),
            ProviderCall::ModifyReplicationGroupShardConfiguration => {
                f.write_str("ModifyReplicationGroupShardConfiguration")
            }
            ProviderCall::ModifyCacheCluster => f.write_str("ModifyCacheCluster"),
            ProviderCall::RegisterScalableTarget(dimension) => {
                write!(f, "RegisterScalableTarget({dimension} capacity)")
            }
        }
    }
}

/// Why a scaling attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureCause {
    /// The directive failed its strategy's preconditions; no call was made.
    #[error("invalid scaling config: {reason}")]
    Validation { reason: String },

    /// Region credentials could not be acquired; nothing in the region ran.
    #[error("{0}")]
    Auth(AuthError),

    /// The provider rejected the call.
    #[error("{call} failed: {error}")]
    Provider { call: ProviderCall, error: ProviderError },

    /// The scaling task ended without reporting (panicked or was torn down).
    #[error("scaling task aborted: {reason}")]
    Aborted { reason: String },
}

impl FailureCause {
    pub fn validation(reason: impl Into<String>) -> Self {
        FailureCause::Validation {
            reason: reason.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FailureCause::Validation { .. })
    }
}

/// A failure as seen by a strategy, before it is attributed to a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFailure {
    pub service_kind: ServiceKind,
    pub resource_id: String,
    pub cause: FailureCause,
}

impl ServiceFailure {
    pub fn new(service_kind: ServiceKind, resource_id: impl Into<String>, cause: FailureCause) -> Self {
        Self {
            service_kind,
            resource_id: resource_id.into(),
            cause,
        }
    }

    /// Attribute this failure to the region it occurred in.
    pub fn in_region(self, region: impl Into<String>) -> ScalingFailure {
        ScalingFailure {
            region: region.into(),
            service_kind: self.service_kind,
            resource_id: self.resource_id,
            cause: self.cause,
        }
    }
}

/// One failed scaling attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("scaling failed for service {service_kind} with identifier {resource_id} in {region}: {cause}")]
pub struct ScalingFailure {
    pub region: String,
    pub service_kind: ServiceKind,
    pub resource_id: String,
    pub cause: FailureCause,
}

/// Region-keyed aggregation of every failure observed in one run.
/// An empty report is the success case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScalingReport {
    pub failures_by_region: BTreeMap<String, Vec<ScalingFailure>>,
}

impl ScalingReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a failure to its region, preserving arrival order.
    pub fn record(&mut self, failure: ScalingFailure) {
        self.failures_by_region
            .entry(failure.region.clone())
            .or_default()
            .push(failure);
    }

    pub fn has_failures(&self) -> bool {
        !self.failures_by_region.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.failures_by_region.values().map(Vec::len).sum()
    }

    pub fn failures_in(&self, region: &str) -> &[ScalingFailure] {
        self.failures_by_region
            .get(region)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
