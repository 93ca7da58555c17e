//! Service dispatcher: picks the strategy for a directive and attributes
//! its failures to the region.

use tracing::debug;

use fleetscale_core::{ScaleDirection, ScalingFailure, ServiceDirective};

use crate::provider::CloudProvider;
use crate::strategy::{cache, compute, stream, table};

/// Run the strategy matching `directive` and stamp `region` onto every
/// failure it returns.
pub async fn dispatch<P: CloudProvider>(
    provider: &P,
    credentials: &P::Credentials,
    directive: &ServiceDirective,
    region: &str,
    direction: ScaleDirection,
) -> Vec<ScalingFailure> {
    debug!(
        %region,
        service = %directive.kind(),
        resource = %directive.resource_id(),
        "dispatching directive"
    );

    let failures = match directive {
        ServiceDirective::ComputeGroup(d) => compute::scale(provider, credentials, d).await,
        ServiceDirective::Stream(d) => stream::scale(provider, credentials, d).await,
        ServiceDirective::Cache(d) => cache::scale(provider, credentials, d, direction).await,
        ServiceDirective::Table(d) => table::scale(provider, credentials, d).await,
    };

    failures
        .into_iter()
        .map(|failure| failure.in_region(region))
        .collect()
}
