//! Provider boundary: credential acquisition and one capability per
//! resource kind.
//!
//! The engine never looks inside `Credentials`: whatever a
//! [`CredentialSource`] hands back for a region is passed through unchanged
//! to every capability call made in that region. Implementations are
//! injected, so tests run the full orchestrator against in-memory stubs.

use std::future::Future;
use std::pin::Pin;

use fleetscale_core::{AuthError, ProviderError, TableDimension};

/// Boxed future alias used by the provider traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Acquires region-scoped credentials by assuming a role.
pub trait CredentialSource: Send + Sync + 'static {
    /// Opaque per-region credentials (and whatever clients are bound to them).
    type Credentials: Send + Sync + 'static;

    fn acquire_credentials<'a>(
        &'a self,
        region: &'a str,
        role_arn: &'a str,
    ) -> BoxFuture<'a, Result<Self::Credentials, AuthError>>;
}

/// Validated auto-scaling group update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeGroupUpdate {
    pub group_name: String,
    pub min_size: i32,
    pub desired_capacity: i32,
    pub max_size: i32,
}

/// Validated stream reshard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardCountUpdate {
    pub stream_arn: String,
    pub target_shard_count: i32,
}

/// Validated cache resize. `nodes_to_remove` is empty when scaling up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheResize {
    pub cluster_id: String,
    pub node_count: i32,
    pub nodes_to_remove: Vec<String>,
}

/// Validated scalable-target registration for one table dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalableTargetRegistration {
    pub table_name: String,
    pub is_index: bool,
    pub dimension: TableDimension,
    pub min_capacity: i32,
    pub max_capacity: i32,
}

pub trait ComputeGroupApi: CredentialSource {
    fn update_group<'a>(
        &'a self,
        credentials: &'a Self::Credentials,
        update: &'a ComputeGroupUpdate,
    ) -> BoxFuture<'a, Result<(), ProviderError>>;
}

pub trait StreamApi: CredentialSource {
    fn update_shard_count<'a>(
        &'a self,
        credentials: &'a Self::Credentials,
        update: &'a ShardCountUpdate,
    ) -> BoxFuture<'a, Result<(), ProviderError>>;
}

pub trait CacheApi: CredentialSource {
    /// Redis: change the shard (node group) count of a replication group.
    fn modify_replication_group_shards<'a>(
        &'a self,
        credentials: &'a Self::Credentials,
        resize: &'a CacheResize,
    ) -> BoxFuture<'a, Result<(), ProviderError>>;

    /// Memcached: change the node count of a cache cluster.
    fn modify_cache_cluster<'a>(
        &'a self,
        credentials: &'a Self::Credentials,
        resize: &'a CacheResize,
    ) -> BoxFuture<'a, Result<(), ProviderError>>;
}

pub trait TableApi: CredentialSource {
    fn register_scalable_target<'a>(
        &'a self,
        credentials: &'a Self::Credentials,
        registration: &'a ScalableTargetRegistration,
    ) -> BoxFuture<'a, Result<(), ProviderError>>;
}

/// Everything the orchestrator needs from a cloud backend.
pub trait CloudProvider: ComputeGroupApi + StreamApi + CacheApi + TableApi {}

impl<T> CloudProvider for T where T: ComputeGroupApi + StreamApi + CacheApi + TableApi {}
