//! fleetscale-engine: concurrent scaling orchestration.
//!
//! Takes a parsed [`ConfigTree`](fleetscale_core::ConfigTree), fans out one
//! region worker per region and one dispatch per directive within each
//! region, and aggregates every failure into a region-keyed
//! [`ScalingReport`](fleetscale_core::ScalingReport).
//!
//! # Architecture
//!
//! ```text
//! Orchestrator
//!   ├── collector (owns the report, reads the result channel until closed)
//!   └── RegionWorker (one task per region)
//!       ├── acquire_credentials (fail-fast: one failure, no dispatches)
//!       └── dispatch (one task per directive)
//!           └── strategy (compute | stream | cache | table)
//!               └── provider capability call(s)
//! ```
//!
//! Strategies are region-agnostic; the dispatcher stamps the region onto
//! every failure before it is sent to the collector.

pub mod dispatch;
pub mod error;
pub mod orchestrator;
pub mod provider;
pub mod region;
pub mod shutdown;
pub mod strategy;

pub use dispatch::dispatch;
pub use error::{OrchestratorError, OrchestratorResult};
pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use provider::{
    BoxFuture, CacheApi, CacheResize, CloudProvider, ComputeGroupApi, ComputeGroupUpdate,
    CredentialSource, ScalableTargetRegistration, ShardCountUpdate, StreamApi, TableApi,
};
pub use shutdown::Shutdown;
