//! Region worker: one per configured region.
//!
//! Acquires the region's credentials once, then dispatches every directive
//! of the region concurrently. Failures are forwarded to the shared result
//! channel as they are produced. The worker returns only after every
//! dispatch it launched has finished.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use fleetscale_core::{
    FailureCause, RegionSpec, ScaleDirection, ScalingFailure, ServiceFailure, ServiceKind,
};

use crate::dispatch::dispatch;
use crate::orchestrator::fan_out_limit;
use crate::provider::CloudProvider;
use crate::shutdown::Shutdown;

pub struct RegionWorker<P: CloudProvider> {
    provider: Arc<P>,
    role_arn: Arc<str>,
    direction: ScaleDirection,
    /// Cap on concurrent dispatches within the region. `None` is unbounded.
    max_concurrent_directives: Option<usize>,
    results: mpsc::Sender<ScalingFailure>,
    shutdown: Shutdown,
}

impl<P: CloudProvider> RegionWorker<P> {
    pub fn new(
        provider: Arc<P>,
        role_arn: Arc<str>,
        direction: ScaleDirection,
        results: mpsc::Sender<ScalingFailure>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            provider,
            role_arn,
            direction,
            max_concurrent_directives: None,
            results,
            shutdown,
        }
    }

    pub fn with_directive_limit(mut self, limit: Option<usize>) -> Self {
        self.max_concurrent_directives = limit;
        self
    }

    pub async fn run(mut self, spec: RegionSpec) {
        let RegionSpec { region, directives } = spec;
        info!(%region, directives = directives.len(), "region worker started");

        let acquired = tokio::select! {
            result = self.provider.acquire_credentials(&region, &self.role_arn) => result,
            _ = self.shutdown.cancelled() => {
                debug!(%region, "cancelled while acquiring credentials");
                return;
            }
        };

        // Fail fast: a region without credentials contributes exactly one failure.
        let credentials = match acquired {
            Ok(credentials) => Arc::new(credentials),
            Err(error) => {
                warn!(%region, role = %self.role_arn, %error, "credential acquisition failed, skipping region");
                let failure = ServiceFailure::new(
                    ServiceKind::Unknown,
                    self.role_arn.as_ref(),
                    FailureCause::Auth(error),
                )
                .in_region(&region);
                let _ = self.results.send(failure).await;
                return;
            }
        };

        let limit = fan_out_limit(self.max_concurrent_directives);
        let mut tasks = JoinSet::new();
        let mut launched = HashMap::new();

        for directive in directives {
            if self.shutdown.is_cancelled() {
                debug!(%region, "cancelled, not launching remaining directives");
                break;
            }

            let identity = (directive.kind(), directive.resource_id().to_string());
            let provider = Arc::clone(&self.provider);
            let credentials = Arc::clone(&credentials);
            let results = self.results.clone();
            let mut shutdown = self.shutdown.clone();
            let limit = limit.clone();
            let region = region.clone();
            let direction = self.direction;

            let handle = tasks.spawn(async move {
                let _permit = match limit {
                    Some(semaphore) => tokio::select! {
                        permit = semaphore.acquire_owned() => permit.ok(),
                        _ = shutdown.cancelled() => return,
                    },
                    None => None,
                };

                let failures = tokio::select! {
                    failures = dispatch(
                        provider.as_ref(),
                        credentials.as_ref(),
                        &directive,
                        &region,
                        direction,
                    ) => failures,
                    _ = shutdown.cancelled() => return,
                };

                for failure in failures {
                    if results.send(failure).await.is_err() {
                        return;
                    }
                }
            });
            launched.insert(handle.id(), identity);
        }

        // Barrier: every dispatch of this region has finished past this loop.
        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined
                && err.is_panic()
            {
                let (kind, resource_id) = launched
                    .remove(&err.id())
                    .unwrap_or((ServiceKind::Unknown, String::new()));
                error!(%region, service = %kind, resource = %resource_id, "dispatch task panicked");

                let failure = ServiceFailure::new(
                    kind,
                    resource_id,
                    FailureCause::Aborted {
                        reason: "dispatch task panicked".to_string(),
                    },
                )
                .in_region(&region);
                if self.results.send(failure).await.is_err() {
                    break;
                }
            }
        }

        debug!(%region, "region worker finished");
    }
}
