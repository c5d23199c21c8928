//! In-memory caching using moka
//!
//! Holds the active pricing rules of each transport service so quotes do not
//! hit the database on every request. Every rule mutation invalidates the
//! owning service's entry.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::pricing::rules::PricingRule;

/// Application cache
#[derive(Clone)]
pub struct AppCache {
    /// Active rules per transport service, in creation order
    pub service_rules: Cache<Uuid, Arc<Vec<PricingRule>>>,
}

impl AppCache {
    /// Create a cache whose entries expire after `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            service_rules: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn rules_for(&self, service_id: Uuid) -> Option<Arc<Vec<PricingRule>>> {
        let cached = self.service_rules.get(&service_id).await;
        if cached.is_some() {
            debug!("Cache HIT for service rules: {}", service_id);
        } else {
            debug!("Cache MISS for service rules: {}", service_id);
        }
        cached
    }

    pub async fn store_rules(&self, service_id: Uuid, rules: Vec<PricingRule>) -> Arc<Vec<PricingRule>> {
        let rules = Arc::new(rules);
        self.service_rules.insert(service_id, Arc::clone(&rules)).await;
        rules
    }

    /// Drop the cached rule set of one service
    pub async fn invalidate_service(&self, service_id: Uuid) {
        self.service_rules.invalidate(&service_id).await;
        debug!("Cache invalidated for service: {}", service_id);
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            service_rules_size: self.service_rules.entry_count(),
        }
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(5 * 60))
    }
}

/// Cache statistics for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub service_rules_size: u64,
}
