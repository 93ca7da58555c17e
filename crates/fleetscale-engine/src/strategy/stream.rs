//! Stream strategy: one `UpdateShardCount` call.

use tracing::debug;

use fleetscale_core::{FailureCause, ProviderCall, ServiceFailure, ServiceKind, StreamDirective};

use crate::provider::{ShardCountUpdate, StreamApi};

pub fn validate(directive: &StreamDirective) -> Result<ShardCountUpdate, String> {
    if directive.stream_arn.trim().is_empty() {
        return Err("streamArn is empty".to_string());
    }
    if directive.desired_shard_count <= 0 {
        return Err(format!(
            "desiredShardCount ({}) must be positive",
            directive.desired_shard_count
        ));
    }

    Ok(ShardCountUpdate {
        stream_arn: directive.stream_arn.clone(),
        target_shard_count: directive.desired_shard_count,
    })
}

pub async fn scale<P: StreamApi>(
    provider: &P,
    credentials: &P::Credentials,
    directive: &StreamDirective,
) -> Vec<ServiceFailure> {
    let update = match validate(directive) {
        Ok(update) => update,
        Err(reason) => {
            return vec![ServiceFailure::new(
                ServiceKind::Stream,
                &directive.stream_arn,
                FailureCause::validation(reason),
            )];
        }
    };

    debug!(stream = %update.stream_arn, shards = update.target_shard_count, "updating shard count");

    match provider.update_shard_count(credentials, &update).await {
        Ok(()) => Vec::new(),
        Err(error) => vec![ServiceFailure::new(
            ServiceKind::Stream,
            &directive.stream_arn,
            FailureCause::Provider {
                call: ProviderCall::UpdateShardCount,
                error,
            },
        )],
    }
}
