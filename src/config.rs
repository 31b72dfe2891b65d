use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_TTL;
use crate::catalog::{default_partitions, PartitionSpec};
use crate::reveal::DEFAULT_PAGE_SIZE;

pub const API_BASE: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_ENRICH_BATCH_SIZE: usize = 20;

/// Remote client settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub cache_ttl: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE.to_string(),
            cache_ttl: DEFAULT_TTL,
        }
    }
}

/// Browsing settings carried in the app state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrowseConfig {
    pub partitions: Vec<PartitionSpec>,
    pub page_size: usize,
    /// Entries enriched per `EnrichBatch` effect.
    pub enrich_batch_size: usize,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            partitions: default_partitions(),
            page_size: DEFAULT_PAGE_SIZE,
            enrich_batch_size: DEFAULT_ENRICH_BATCH_SIZE,
        }
    }
}
