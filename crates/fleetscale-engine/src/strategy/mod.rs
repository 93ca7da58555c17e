//! Service strategies: one per resource kind.
//!
//! Each strategy validates its directive first. A directive that fails
//! validation produces exactly one validation failure and the provider is
//! never called. Strategies do not know which region they run in.

pub mod cache;
pub mod compute;
pub mod stream;
pub mod table;

#[cfg(test)]
pub(crate) mod stub {
    //! In-memory provider for unit tests.

    use std::collections::HashSet;
    use std::sync::Mutex;

    use fleetscale_core::{AuthError, ProviderError};

    use crate::provider::*;

    /// Records every call as `operation:key` and fails the keys it was told to.
    /// Credentials are the region name.
    #[derive(Default)]
    pub(crate) struct StubProvider {
        calls: Mutex<Vec<String>>,
        failing: HashSet<String>,
        denied_regions: HashSet<String>,
    }

    impl StubProvider {
        pub(crate) fn failing(mut self, key: &str) -> Self {
            self.failing.insert(key.to_string());
            self
        }

        pub(crate) fn denying(mut self, region: &str) -> Self {
            self.denied_regions.insert(region.to_string());
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, operation: &str, key: &str) -> Result<(), ProviderError> {
            self.calls.lock().unwrap().push(format!("{operation}:{key}"));
            if self.failing.contains(key) {
                Err(ProviderError::new(format!("{key} rejected")).with_code("StubError"))
            } else {
                Ok(())
            }
        }
    }

    impl CredentialSource for StubProvider {
        type Credentials = String;

        fn acquire_credentials<'a>(
            &'a self,
            region: &'a str,
            role_arn: &'a str,
        ) -> BoxFuture<'a, Result<String, AuthError>> {
            Box::pin(async move {
                if self.denied_regions.contains(region) {
                    Err(AuthError::new(role_arn, "access denied"))
                } else {
                    Ok(region.to_string())
                }
            })
        }
    }

    impl ComputeGroupApi for StubProvider {
        fn update_group<'a>(
            &'a self,
            _credentials: &'a String,
            update: &'a ComputeGroupUpdate,
        ) -> BoxFuture<'a, Result<(), ProviderError>> {
            Box::pin(async move { self.record("update_group", &update.group_name) })
        }
    }

    impl StreamApi for StubProvider {
        fn update_shard_count<'a>(
            &'a self,
            _credentials: &'a String,
            update: &'a ShardCountUpdate,
        ) -> BoxFuture<'a, Result<(), ProviderError>> {
            Box::pin(async move { self.record("update_shard_count", &update.stream_arn) })
        }
    }

    impl CacheApi for StubProvider {
        fn modify_replication_group_shards<'a>(
            &'a self,
            _credentials: &'a String,
            resize: &'a CacheResize,
        ) -> BoxFuture<'a, Result<(), ProviderError>> {
            Box::pin(async move { self.record("modify_replication_group_shards", &resize.cluster_id) })
        }

        fn modify_cache_cluster<'a>(
            &'a self,
            _credentials: &'a String,
            resize: &'a CacheResize,
        ) -> BoxFuture<'a, Result<(), ProviderError>> {
            Box::pin(async move { self.record("modify_cache_cluster", &resize.cluster_id) })
        }
    }

    impl TableApi for StubProvider {
        fn register_scalable_target<'a>(
            &'a self,
            _credentials: &'a String,
            registration: &'a ScalableTargetRegistration,
        ) -> BoxFuture<'a, Result<(), ProviderError>> {
            Box::pin(async move {
                let key = format!("{}:{}", registration.table_name, registration.dimension);
                self.record("register_scalable_target", &key)
            })
        }
    }
}
