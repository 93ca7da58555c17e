//! Table strategy: read and write capacity are registered as two
//! independent scalable targets, concurrently. Either may fail alone.

use tracing::debug;

use fleetscale_core::{
    CapacityRange, FailureCause, ProviderCall, ServiceFailure, ServiceKind, TableDimension,
    TableDirective,
};

use crate::provider::{ScalableTargetRegistration, TableApi};

pub fn validate(
    directive: &TableDirective,
) -> Result<(ScalableTargetRegistration, ScalableTargetRegistration), String> {
    if directive.table_name.trim().is_empty() {
        return Err("tableName is empty".to_string());
    }
    if !directive.read_capacity.is_non_negative() {
        return Err("rcu capacity must not be negative".to_string());
    }
    if !directive.write_capacity.is_non_negative() {
        return Err("wcu capacity must not be negative".to_string());
    }

    Ok((
        registration(directive, TableDimension::Read, directive.read_capacity),
        registration(directive, TableDimension::Write, directive.write_capacity),
    ))
}

fn registration(
    directive: &TableDirective,
    dimension: TableDimension,
    range: CapacityRange,
) -> ScalableTargetRegistration {
    ScalableTargetRegistration {
        table_name: directive.table_name.clone(),
        is_index: directive.is_index,
        dimension,
        min_capacity: range.min,
        max_capacity: range.max,
    }
}

pub async fn scale<P: TableApi>(
    provider: &P,
    credentials: &P::Credentials,
    directive: &TableDirective,
) -> Vec<ServiceFailure> {
    let (read, write) = match validate(directive) {
        Ok(registrations) => registrations,
        Err(reason) => {
            return vec![ServiceFailure::new(
                ServiceKind::Table,
                &directive.table_name,
                FailureCause::validation(reason),
            )];
        }
    };

    debug!(table = %directive.table_name, index = directive.is_index, "registering scalable targets");

    let (read_result, write_result) = tokio::join!(
        provider.register_scalable_target(credentials, &read),
        provider.register_scalable_target(credentials, &write),
    );

    [(read.dimension, read_result), (write.dimension, write_result)]
        .into_iter()
        .filter_map(|(dimension, result)| result.err().map(|error| (dimension, error)))
        .map(|(dimension, error)| {
            ServiceFailure::new(
                ServiceKind::Table,
                &directive.table_name,
                FailureCause::Provider {
                    call: ProviderCall::RegisterScalableTarget(dimension),
                    error,
                },
            )
        })
        .collect()
}
