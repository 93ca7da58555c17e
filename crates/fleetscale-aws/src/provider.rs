//! [`AwsProvider`]: maps the engine's capability calls onto the AWS SDK.

use aws_sdk_applicationautoscaling::types::{ScalableDimension, ServiceNamespace};
use aws_sdk_autoscaling::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_kinesis::types::ScalingType;
use tracing::debug;

use fleetscale_core::{AuthError, ProviderError, TableDimension};
use fleetscale_engine::provider::{
    BoxFuture, CacheApi, CacheResize, ComputeGroupApi, ComputeGroupUpdate, CredentialSource,
    ScalableTargetRegistration, ShardCountUpdate, StreamApi, TableApi,
};

use crate::session::{self, AwsSession};

/// Talks to the real AWS APIs. Base credentials come from the default
/// provider chain; every region assumes the configured role on its own.
#[derive(Debug, Clone, Default)]
pub struct AwsProvider {
    endpoint_url: Option<String>,
}

impl AwsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send every request to `endpoint` instead of the regional AWS endpoints
    /// (LocalStack and similar).
    pub fn with_endpoint_url(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint.into());
        self
    }

    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }
}

impl CredentialSource for AwsProvider {
    type Credentials = AwsSession;

    fn acquire_credentials<'a>(
        &'a self,
        region: &'a str,
        role_arn: &'a str,
    ) -> BoxFuture<'a, Result<AwsSession, AuthError>> {
        Box::pin(session::assume_role(region, role_arn, self.endpoint_url()))
    }
}

impl ComputeGroupApi for AwsProvider {
    fn update_group<'a>(
        &'a self,
        session: &'a AwsSession,
        update: &'a ComputeGroupUpdate,
    ) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(async move {
            debug!(region = %session.region, group = %update.group_name, "UpdateAutoScalingGroup");
            session
                .autoscaling
                .update_auto_scaling_group()
                .auto_scaling_group_name(&update.group_name)
                .min_size(update.min_size)
                .desired_capacity(update.desired_capacity)
                .max_size(update.max_size)
                .send()
                .await
                .map_err(|err| provider_error(&err))?;
            Ok(())
        })
    }
}

impl StreamApi for AwsProvider {
    fn update_shard_count<'a>(
        &'a self,
        session: &'a AwsSession,
        update: &'a ShardCountUpdate,
    ) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(async move {
            debug!(region = %session.region, stream = %update.stream_arn, "UpdateShardCount");
            session
                .kinesis
                .update_shard_count()
                .stream_arn(&update.stream_arn)
                .target_shard_count(update.target_shard_count)
                .scaling_type(ScalingType::UniformScaling)
                .send()
                .await
                .map_err(|err| provider_error(&err))?;
            Ok(())
        })
    }
}

impl CacheApi for AwsProvider {
    fn modify_replication_group_shards<'a>(
        &'a self,
        session: &'a AwsSession,
        resize: &'a CacheResize,
    ) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(async move {
            debug!(
                region = %session.region,
                cluster = %resize.cluster_id,
                removing = resize.nodes_to_remove.len(),
                "ModifyReplicationGroupShardConfiguration"
            );
            session
                .elasticache
                .modify_replication_group_shard_configuration()
                .replication_group_id(&resize.cluster_id)
                .node_group_count(resize.node_count)
                .set_node_groups_to_remove(removal_list(&resize.nodes_to_remove))
                .apply_immediately(true)
                .send()
                .await
                .map_err(|err| provider_error(&err))?;
            Ok(())
        })
    }

    fn modify_cache_cluster<'a>(
        &'a self,
        session: &'a AwsSession,
        resize: &'a CacheResize,
    ) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(async move {
            debug!(
                region = %session.region,
                cluster = %resize.cluster_id,
                removing = resize.nodes_to_remove.len(),
                "ModifyCacheCluster"
            );
            session
                .elasticache
                .modify_cache_cluster()
                .cache_cluster_id(&resize.cluster_id)
                .num_cache_nodes(resize.node_count)
                .set_cache_node_ids_to_remove(removal_list(&resize.nodes_to_remove))
                .apply_immediately(true)
                .send()
                .await
                .map_err(|err| provider_error(&err))?;
            Ok(())
        })
    }
}

impl TableApi for AwsProvider {
    fn register_scalable_target<'a>(
        &'a self,
        session: &'a AwsSession,
        registration: &'a ScalableTargetRegistration,
    ) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(async move {
            let resource_id = scalable_resource_id(&registration.table_name);
            let dimension = dimension_name(registration.is_index, registration.dimension);
            debug!(region = %session.region, resource = %resource_id, dimension, "RegisterScalableTarget");
            session
                .application_autoscaling
                .register_scalable_target()
                .service_namespace(ServiceNamespace::Dynamodb)
                .resource_id(resource_id)
                .scalable_dimension(ScalableDimension::from(dimension))
                .min_capacity(registration.min_capacity)
                .max_capacity(registration.max_capacity)
                .send()
                .await
                .map_err(|err| provider_error(&err))?;
            Ok(())
        })
    }
}

/// Application Auto Scaling addresses tables as `table/<name>`; names that
/// already carry the prefix (index paths included) pass through.
fn scalable_resource_id(table_name: &str) -> String {
    if table_name.starts_with("table/") {
        table_name.to_string()
    } else {
        format!("table/{table_name}")
    }
}

fn dimension_name(is_index: bool, dimension: TableDimension) -> &'static str {
    match (is_index, dimension) {
        (false, TableDimension::Read) => "dynamodb:table:ReadCapacityUnits",
        (false, TableDimension::Write) => "dynamodb:table:WriteCapacityUnits",
        (true, TableDimension::Read) => "dynamodb:index:ReadCapacityUnits",
        (true, TableDimension::Write) => "dynamodb:index:WriteCapacityUnits",
    }
}

/// The ElastiCache APIs reject an explicit empty removal list.
fn removal_list(nodes: &[String]) -> Option<Vec<String>> {
    (!nodes.is_empty()).then(|| nodes.to_vec())
}

fn provider_error<E>(err: &E) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(err).to_string());
    let error = ProviderError::new(message);
    match err.code() {
        Some(code) => error.with_code(code),
        None => error,
    }
}
