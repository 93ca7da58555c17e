//! Compute group strategy: one `UpdateAutoScalingGroup` call.

use tracing::debug;

use fleetscale_core::{ComputeGroupDirective, FailureCause, ProviderCall, ServiceFailure, ServiceKind};

use crate::provider::{ComputeGroupApi, ComputeGroupUpdate};

pub fn validate(directive: &ComputeGroupDirective) -> Result<ComputeGroupUpdate, String> {
    if directive.group_name.trim().is_empty() {
        return Err("asgName is empty".to_string());
    }
    if directive.min_count <= 0 || directive.desired_count <= 0 || directive.max_count <= 0 {
        return Err(format!(
            "minCount ({}), desiredCount ({}) and maxCount ({}) must be positive",
            directive.min_count, directive.desired_count, directive.max_count
        ));
    }

    Ok(ComputeGroupUpdate {
        group_name: directive.group_name.clone(),
        min_size: directive.min_count,
        desired_capacity: directive.desired_count,
        max_size: directive.max_count,
    })
}

pub async fn scale<P: ComputeGroupApi>(
    provider: &P,
    credentials: &P::Credentials,
    directive: &ComputeGroupDirective,
) -> Vec<ServiceFailure> {
    let update = match validate(directive) {
        Ok(update) => update,
        Err(reason) => {
            return vec![ServiceFailure::new(
                ServiceKind::ComputeGroup,
                &directive.group_name,
                FailureCause::validation(reason),
            )];
        }
    };

    debug!(
        group = %update.group_name,
        min = update.min_size,
        desired = update.desired_capacity,
        max = update.max_size,
        "updating auto-scaling group"
    );

    match provider.update_group(credentials, &update).await {
        Ok(()) => Vec::new(),
        Err(error) => vec![ServiceFailure::new(
            ServiceKind::ComputeGroup,
            &directive.group_name,
            FailureCause::Provider {
                call: ProviderCall::UpdateAutoScalingGroup,
                error,
            },
        )],
    }
}
