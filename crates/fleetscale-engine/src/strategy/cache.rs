//! Cache strategy. The engine picks the call: redis replication groups
//! are resharded, memcached clusters have their node count changed.

use tracing::debug;

use fleetscale_core::{
    CacheDirective, CacheEngine, FailureCause, ProviderCall, ScaleDirection, ServiceFailure,
    ServiceKind,
};

use crate::provider::{CacheApi, CacheResize};

pub fn validate(directive: &CacheDirective, direction: ScaleDirection) -> Result<CacheResize, String> {
    if let CacheEngine::Other(engine) = &directive.engine {
        return Err(format!("unsupported cache engine {engine:?}"));
    }
    if directive.cluster_id.trim().is_empty() {
        return Err("clusterId is empty".to_string());
    }
    if directive.node_count <= 0 {
        return Err(format!("nodeCount ({}) must be positive", directive.node_count));
    }
    if direction.is_down() && directive.nodes_to_delete.is_empty() {
        return Err("nodesToDelete must not be empty when scaling down".to_string());
    }

    let nodes_to_remove = if direction.is_down() {
        directive.nodes_to_delete.iter().cloned().collect()
    } else {
        Vec::new()
    };

    Ok(CacheResize {
        cluster_id: directive.cluster_id.clone(),
        node_count: directive.node_count,
        nodes_to_remove,
    })
}

pub async fn scale<P: CacheApi>(
    provider: &P,
    credentials: &P::Credentials,
    directive: &CacheDirective,
    direction: ScaleDirection,
) -> Vec<ServiceFailure> {
    let resize = match validate(directive, direction) {
        Ok(resize) => resize,
        Err(reason) => {
            return vec![ServiceFailure::new(
                ServiceKind::Cache,
                &directive.cluster_id,
                FailureCause::validation(reason),
            )];
        }
    };

    debug!(
        cluster = %resize.cluster_id,
        engine = %directive.engine,
        nodes = resize.node_count,
        removing = resize.nodes_to_remove.len(),
        %direction,
        "resizing cache"
    );

    let (call, result) = match directive.engine {
        CacheEngine::Redis => (
            ProviderCall::ModifyReplicationGroupShardConfiguration,
            provider.modify_replication_group_shards(credentials, &resize).await,
        ),
        CacheEngine::Memcached => (
            ProviderCall::ModifyCacheCluster,
            provider.modify_cache_cluster(credentials, &resize).await,
        ),
        // Rejected by validate().
        CacheEngine::Other(_) => return Vec::new(),
    };

    match result {
        Ok(()) => Vec::new(),
        Err(error) => vec![ServiceFailure::new(
            ServiceKind::Cache,
            &directive.cluster_id,
            FailureCause::Provider { call, error },
        )],
    }
}
