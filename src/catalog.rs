//! Catalog aggregation and on-demand enrichment.

use std::collections::HashMap;

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::api::{resource_id, ApiClient};
use crate::error::ApiError;
use crate::state::PokemonDetail;

/// A named slice of the remote `pokemon` listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSpec {
    pub name: String,
    pub limit: u32,
    pub offset: u32,
}

impl PartitionSpec {
    pub fn new(name: &str, limit: u32, offset: u32) -> Self {
        Self {
            name: name.to_string(),
            limit,
            offset,
        }
    }
}

const REGIONS: [(&str, u32, u32); 9] = [
    ("kanto", 151, 0),
    ("johto", 100, 151),
    ("hoenn", 135, 251),
    ("sinnoh", 107, 386),
    ("unova", 156, 493),
    ("kalos", 72, 649),
    ("alola", 88, 721),
    ("galar", 96, 809),
    ("paldea", 120, 905),
];

/// Every region, in national dex order.
pub fn default_partitions() -> Vec<PartitionSpec> {
    REGIONS
        .iter()
        .map(|(name, limit, offset)| PartitionSpec::new(name, *limit, *offset))
        .collect()
}

/// Partition for a region name, case-insensitive. Unknown names map to kanto.
pub fn region_partition(name: &str) -> PartitionSpec {
    let name = name.trim().to_lowercase();
    let (region, limit, offset) = REGIONS
        .iter()
        .find(|(region, _, _)| *region == name)
        .unwrap_or(&REGIONS[0]);
    PartitionSpec::new(region, *limit, *offset)
}

/// Detail fields fetched per entry when a filter needs them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    pub id: u32,
    pub types: Vec<String>,
    /// `None` once enriched means the species has no habitat.
    pub habitat: Option<String>,
    pub sprite: Option<String>,
}

impl From<&PokemonDetail> for Enrichment {
    fn from(detail: &PokemonDetail) -> Self {
        Self {
            id: detail.id,
            types: detail.types.clone(),
            habitat: detail.habitat.clone(),
            sprite: detail.sprite.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub url: String,
    pub partition: String,
    /// Numeric id parsed from `url`, when it has one.
    pub locator_id: Option<u32>,
    pub enrichment: Option<Enrichment>,
}

impl CatalogEntry {
    pub fn new(name: &str, url: &str, partition: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            partition: partition.to_string(),
            locator_id: resource_id(url),
            enrichment: None,
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.enrichment.is_some()
    }

    pub fn types(&self) -> Option<&[String]> {
        self.enrichment.as_ref().map(|fields| fields.types.as_slice())
    }

    pub fn habitat(&self) -> Option<&str> {
        self.enrichment
            .as_ref()
            .and_then(|fields| fields.habitat.as_deref())
    }

    pub fn id(&self) -> Option<u32> {
        self.enrichment
            .as_ref()
            .map(|fields| fields.id)
            .or(self.locator_id)
    }
}

/// One listing call per partition, in order. A failing partition is logged
/// and skipped so the rest of the catalog still loads.
pub async fn build_catalog(client: &ApiClient, partitions: &[PartitionSpec]) -> Vec<CatalogEntry> {
    let mut catalog = Vec::new();
    for spec in partitions {
        match client
            .get_list_page("pokemon", spec.limit, spec.offset)
            .await
        {
            Ok(page) => {
                tracing::debug!(
                    partition = %spec.name,
                    entries = page.results.len(),
                    "partition loaded"
                );
                catalog.extend(
                    page.results
                        .into_iter()
                        .map(|item| CatalogEntry::new(&item.name, &item.url, &spec.name)),
                );
            }
            Err(err) => {
                tracing::warn!(partition = %spec.name, error = %err, "partition failed to load");
            }
        }
    }
    catalog
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichFailure {
    pub name: String,
    pub error: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichOutcome {
    pub entries: Vec<CatalogEntry>,
    pub failures: Vec<EnrichFailure>,
}

/// Fills in detail fields for every entry that lacks them. Output has the
/// same length and order as `entries`; an entry whose fetch fails comes back
/// unchanged and is listed in `failures`.
pub async fn enrich(client: &ApiClient, entries: Vec<CatalogEntry>) -> EnrichOutcome {
    let fetches = entries.iter().map(|entry| async move {
        if entry.is_enriched() {
            return None;
        }
        Some(fetch_enrichment(client, &entry.name).await)
    });
    let results = join_all(fetches).await;

    let mut outcome = EnrichOutcome::default();
    for (mut entry, result) in entries.into_iter().zip(results) {
        match result {
            None => {}
            Some(Ok(fields)) => entry.enrichment = Some(fields),
            Some(Err(err)) => {
                tracing::warn!(name = %entry.name, error = %err, "enrichment failed");
                outcome.failures.push(EnrichFailure {
                    name: entry.name.clone(),
                    error: err.to_string(),
                });
            }
        }
        outcome.entries.push(entry);
    }
    outcome
}

async fn fetch_enrichment(client: &ApiClient, name: &str) -> Result<Enrichment, ApiError> {
    let mut detail = client.get_pokemon(name).await?;
    if let Some(species) = detail.species.clone() {
        detail.habitat = client.get_species(&species).await?.habitat;
    }
    Ok(Enrichment::from(&detail))
}

/// Copies enrichment from `enriched` onto catalog entries of the same name
/// that have none yet. Returns how many entries gained fields.
pub fn merge_enriched(catalog: &mut [CatalogEntry], enriched: &[CatalogEntry]) -> usize {
    let fields: HashMap<&str, &Enrichment> = enriched
        .iter()
        .filter_map(|entry| Some((entry.name.as_str(), entry.enrichment.as_ref()?)))
        .collect();
    let mut merged = 0;
    for entry in catalog.iter_mut().filter(|entry| !entry.is_enriched()) {
        if let Some(found) = fields.get(entry.name.as_str()) {
            entry.enrichment = Some((*found).clone());
            merged += 1;
        }
    }
    merged
}

/// Resolves a full detail record: pokemon, then species for habitat, flavor
/// text and the evolution chain reference. `Ok(None)` when the API has no
/// such entity. A failing species call leaves those fields empty and
/// `species_loaded` false.
pub async fn lookup_detail(
    client: &ApiClient,
    id_or_name: &str,
) -> Result<Option<PokemonDetail>, ApiError> {
    let mut detail = match client.get_pokemon(id_or_name).await {
        Ok(detail) => detail,
        Err(err) if err.is_not_found() => return Ok(None),
        Err(err) => return Err(err),
    };
    let species_name = detail.species.clone().unwrap_or_else(|| detail.name.clone());
    match client.get_species(&species_name).await {
        Ok(species) => {
            detail.habitat = species.habitat;
            detail.genus = species.genus;
            detail.flavor_text = species.flavor_text;
            detail.gender_rate = species.gender_rate;
            detail.evolution_chain_id = species.evolution_chain_id;
            detail.species_loaded = true;
        }
        Err(err) => {
            tracing::warn!(name = %detail.name, error = %err, "species lookup failed");
        }
    }
    Ok(Some(detail))
}
