//! Orchestrator: fans out region workers and collects their failures.
//!
//! ```text
//! Idle ──► FanningOut ──► Collecting ──► Done
//!               └──── overlap ────┘
//! ```
//!
//! Region workers are spawned up front and start producing immediately;
//! the collector owns the report and reads the result channel until it is
//! closed. The channel closes only when every sender is gone, i.e. when
//! every region worker and every dispatch it launched has finished, so
//! reaching `Done` means no spawned work is left running.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use fleetscale_core::{
    ConfigTree, FailureCause, ScaleDirection, ScalingFailure, ScalingReport, ServiceFailure,
    ServiceKind,
};

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::provider::CloudProvider;
use crate::region::RegionWorker;
use crate::shutdown::Shutdown;

/// Fan-out width, channel sizing and deadline for one run.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Regions processed at once. `None` runs every region concurrently.
    pub max_concurrent_regions: Option<usize>,
    /// Dispatches in flight per region. `None` runs every directive concurrently.
    pub max_concurrent_directives: Option<usize>,
    /// Capacity of the shared result channel.
    pub channel_capacity: usize,
    /// Overall deadline for the run.
    pub deadline: Option<Duration>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_regions: None,
            max_concurrent_directives: None,
            channel_capacity: 64,
            deadline: None,
        }
    }
}

/// Why the collector stopped before the channel closed.
enum Interrupted {
    Cancelled,
    Deadline(Duration),
}

pub struct Orchestrator<P: CloudProvider> {
    provider: Arc<P>,
    config: OrchestratorConfig,
}

impl<P: CloudProvider> Orchestrator<P> {
    pub fn new(provider: P) -> Self {
        Self::from_shared(Arc::new(provider))
    }

    /// Build from a provider the caller keeps a handle to.
    pub fn from_shared(provider: Arc<P>) -> Self {
        Self {
            provider,
            config: OrchestratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Parse the config at `path` and scale everything it describes.
    pub async fn scale_config_file(
        &self,
        path: &Path,
        direction: ScaleDirection,
    ) -> OrchestratorResult<ScalingReport> {
        info!(path = %path.display(), "reading scaling config");
        let tree = ConfigTree::from_file(path)?;
        self.scale_all(&tree, direction).await
    }

    /// Scale every directive in `tree`. Blocks until all work has finished.
    pub async fn scale_all(
        &self,
        tree: &ConfigTree,
        direction: ScaleDirection,
    ) -> OrchestratorResult<ScalingReport> {
        self.scale_all_until(tree, direction, Shutdown::never()).await
    }

    /// Like [`scale_all`](Self::scale_all), but gives up when `shutdown`
    /// fires. Failures collected before cancellation are discarded, and
    /// provider calls already issued are not rolled back.
    pub async fn scale_all_until(
        &self,
        tree: &ConfigTree,
        direction: ScaleDirection,
        mut shutdown: Shutdown,
    ) -> OrchestratorResult<ScalingReport> {
        if tree.assumed_role_arn.trim().is_empty() {
            error!(application = %tree.application_name, "no assumed role ARN provided");
            return Err(OrchestratorError::MissingRoleArn);
        }

        info!(
            application = %tree.application_name,
            regions = tree.regions.len(),
            directives = tree.directive_count(),
            %direction,
            "scaling started"
        );

        let role_arn: Arc<str> = Arc::from(tree.assumed_role_arn.as_str());
        let (results_tx, mut results_rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let (stop_tx, stop) = Shutdown::channel();
        let region_limit = fan_out_limit(self.config.max_concurrent_regions);

        let mut regions = JoinSet::new();
        let mut region_names = HashMap::new();

        for spec in &tree.regions {
            let worker = RegionWorker::new(
                Arc::clone(&self.provider),
                Arc::clone(&role_arn),
                direction,
                results_tx.clone(),
                stop.clone(),
            )
            .with_directive_limit(self.config.max_concurrent_directives);
            let spec = spec.clone();
            let region = spec.region.clone();
            let limit = region_limit.clone();
            let mut stop = stop.clone();

            let handle = regions.spawn(async move {
                let _permit = match limit {
                    Some(semaphore) => tokio::select! {
                        permit = semaphore.acquire_owned() => permit.ok(),
                        _ = stop.cancelled() => return,
                    },
                    None => None,
                };
                worker.run(spec).await;
            });
            region_names.insert(handle.id(), region);
        }
        // Only the workers hold senders now; the channel closes when they finish.
        drop(results_tx);

        debug!("collecting failures");

        let deadline = self.config.deadline;
        let expiry = async move {
            match deadline {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(expiry);

        let mut report = ScalingReport::new();
        let interrupted = loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break Some(Interrupted::Cancelled),
                _ = &mut expiry => break Some(Interrupted::Deadline(deadline.unwrap_or_default())),
                received = results_rx.recv() => match received {
                    Some(failure) => record(&mut report, failure),
                    None => break None,
                },
            }
        };

        if let Some(reason) = interrupted {
            // Stop workers at their next blocking point, unblock any pending
            // sends, and wait for every task to wind down before returning.
            let _ = stop_tx.send(true);
            drop(results_rx);
            while regions.join_next().await.is_some() {}

            return Err(match reason {
                Interrupted::Cancelled => {
                    warn!(discarded = report.failure_count(), "scaling cancelled");
                    OrchestratorError::Cancelled
                }
                Interrupted::Deadline(limit) => {
                    warn!(discarded = report.failure_count(), ?limit, "scaling deadline exceeded");
                    OrchestratorError::DeadlineExceeded(limit)
                }
            });
        }

        // The channel is closed; reap the region tasks and record any that
        // died without reporting.
        while let Some(joined) = regions.join_next().await {
            if let Err(err) = joined
                && err.is_panic()
            {
                let region = region_names.remove(&err.id()).unwrap_or_default();
                error!(%region, "region worker panicked");
                record(
                    &mut report,
                    ServiceFailure::new(
                        ServiceKind::Unknown,
                        region.clone(),
                        FailureCause::Aborted {
                            reason: "region worker panicked".to_string(),
                        },
                    )
                    .in_region(region),
                );
            }
        }

        if report.has_failures() {
            warn!(
                failures = report.failure_count(),
                regions = report.failures_by_region.len(),
                "scaling completed with errors"
            );
        } else {
            info!("scaling completed successfully");
        }

        Ok(report)
    }
}

/// Semaphore for an optional concurrency cap. Caps are clamped to
/// `1..=Semaphore::MAX_PERMITS`.
pub(crate) fn fan_out_limit(limit: Option<usize>) -> Option<Arc<Semaphore>> {
    limit.map(|n| Arc::new(Semaphore::new(n.clamp(1, Semaphore::MAX_PERMITS))))
}

fn record(report: &mut ScalingReport, failure: ScalingFailure) {
    warn!(
        region = %failure.region,
        service = %failure.service_kind,
        resource = %failure.resource_id,
        error = %failure.cause,
        "scaling failure"
    );
    report.record(failure);
}
