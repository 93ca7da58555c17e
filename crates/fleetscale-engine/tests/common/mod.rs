//! Scripted in-memory provider shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fleetscale_core::{AuthError, ProviderError};
use fleetscale_engine::provider::*;

/// Credentials handed out by [`ScriptedProvider`]: they remember the region
/// they were issued for so tests can check they are passed through.
#[derive(Debug)]
pub struct RegionCredentials {
    pub region: String,
}

/// One provider call as observed by the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub region: String,
    pub operation: &'static str,
    pub key: String,
}

#[derive(Default)]
pub struct ScriptedProvider {
    denied_regions: HashSet<String>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    hang: bool,
    jitter: bool,
    calls: Mutex<Vec<Call>>,
    credential_requests: Mutex<Vec<String>>,
    in_flight: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse credentials in `region`.
    pub fn deny_region(mut self, region: &str) -> Self {
        self.denied_regions.insert(region.to_string());
        self
    }

    /// Reject calls for `key` (resource id, or `table:read` / `table:write`).
    pub fn fail(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    /// Panic inside the call for `key`.
    pub fn panic_on(mut self, key: &str) -> Self {
        self.panicking.insert(key.to_string());
        self
    }

    /// Never complete any provider call.
    pub fn hang(mut self) -> Self {
        self.hang = true;
        self
    }

    /// Delay each call by a key-dependent amount to shuffle completion order.
    pub fn jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_in(&self, region: &str) -> usize {
        self.calls().iter().filter(|c| c.region == region).count()
    }

    pub fn credential_requests(&self) -> Vec<String> {
        self.credential_requests.lock().unwrap().clone()
    }

    /// Calls that have started and not yet completed or been dropped.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    async fn call(
        &self,
        credentials: &RegionCredentials,
        operation: &'static str,
        key: String,
    ) -> Result<(), ProviderError> {
        let _guard = InFlight::enter(&self.in_flight);
        self.calls.lock().unwrap().push(Call {
            region: credentials.region.clone(),
            operation,
            key: key.clone(),
        });

        if self.jitter {
            let millis = key.bytes().map(u64::from).sum::<u64>() % 7;
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.panicking.contains(&key) {
            panic!("scripted panic for {key}");
        }
        if self.failing.contains(&key) {
            return Err(ProviderError::new(format!("{key} rejected")).with_code("ScriptedError"));
        }
        Ok(())
    }
}

struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl CredentialSource for ScriptedProvider {
    type Credentials = RegionCredentials;

    fn acquire_credentials<'a>(
        &'a self,
        region: &'a str,
        role_arn: &'a str,
    ) -> BoxFuture<'a, Result<RegionCredentials, AuthError>> {
        Box::pin(async move {
            self.credential_requests.lock().unwrap().push(region.to_string());
            if self.denied_regions.contains(region) {
                return Err(AuthError::new(role_arn, "AccessDenied: not authorized to perform sts:AssumeRole"));
            }
            Ok(RegionCredentials {
                region: region.to_string(),
            })
        })
    }
}

impl ComputeGroupApi for ScriptedProvider {
    fn update_group<'a>(
        &'a self,
        credentials: &'a RegionCredentials,
        update: &'a ComputeGroupUpdate,
    ) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(self.call(credentials, "update_group", update.group_name.clone()))
    }
}

impl StreamApi for ScriptedProvider {
    fn update_shard_count<'a>(
        &'a self,
        credentials: &'a RegionCredentials,
        update: &'a ShardCountUpdate,
    ) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(self.call(credentials, "update_shard_count", update.stream_arn.clone()))
    }
}

impl CacheApi for ScriptedProvider {
    fn modify_replication_group_shards<'a>(
        &'a self,
        credentials: &'a RegionCredentials,
        resize: &'a CacheResize,
    ) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(self.call(credentials, "modify_replication_group_shards", resize.cluster_id.clone()))
    }

    fn modify_cache_cluster<'a>(
        &'a self,
        credentials: &'a RegionCredentials,
        resize: &'a CacheResize,
    ) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(self.call(credentials, "modify_cache_cluster", resize.cluster_id.clone()))
    }
}

impl TableApi for ScriptedProvider {
    fn register_scalable_target<'a>(
        &'a self,
        credentials: &'a RegionCredentials,
        registration: &'a ScalableTargetRegistration,
    ) -> BoxFuture<'a, Result<(), ProviderError>> {
        let key = format!("{}:{}", registration.table_name, registration.dimension);
        Box::pin(self.call(credentials, "register_scalable_target", key))
    }
}
