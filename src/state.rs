use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;

use crate::catalog::{CatalogEntry, PartitionSpec};
use crate::config::BrowseConfig;
use crate::filter::{apply_all, prefilter, FilterSpec};
use crate::reveal::Reveal;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonDetail {
    pub id: u32,
    pub name: String,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub stats: BTreeMap<String, u32>,
    pub sprite: Option<String>,
    pub official_artwork: Option<String>,
    pub height_m: f64,
    pub weight_kg: f64,
    pub base_experience: Option<u32>,
    pub order: Option<i32>,
    pub species: Option<String>,
    pub habitat: Option<String>,
    pub genus: Option<String>,
    pub flavor_text: Option<String>,
    pub gender_rate: Option<i8>,
    pub evolution_chain_id: Option<u32>,
    /// False when the species record could not be fetched, so habitat and
    /// the fields after it are unknown rather than absent.
    #[serde(default)]
    pub species_loaded: bool,
}

impl PokemonDetail {
    /// Official artwork when the API has it, the front sprite otherwise.
    pub fn preferred_image(&self) -> Option<&str> {
        self.official_artwork
            .as_deref()
            .or(self.sprite.as_deref())
    }

    pub fn stat(&self, name: &str) -> Option<u32> {
        self.stats.get(name).copied()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonSpecies {
    pub id: u32,
    pub name: String,
    pub habitat: Option<String>,
    pub gender_rate: Option<i8>,
    pub flavor_text: Option<String>,
    pub genus: Option<String>,
    pub evolution_chain_id: Option<u32>,
    pub evolves_from: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionChain {
    pub id: u32,
    pub stages: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedName {
    pub language: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDetail {
    pub id: u32,
    pub name: String,
    pub power: Option<u32>,
    pub accuracy: Option<u32>,
    pub pp: Option<u32>,
    pub damage_class: Option<String>,
    pub move_type: Option<String>,
    pub names: Vec<LocalizedName>,
}

impl MoveDetail {
    /// Name in `language`, else the first localized name, else the API slug.
    pub fn localized_name(&self, language: &str) -> &str {
        self.names
            .iter()
            .find(|entry| entry.language == language)
            .or_else(|| self.names.first())
            .map(|entry| entry.name.as_str())
            .unwrap_or(&self.name)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub config: BrowseConfig,

    /// Canonical catalog; filters and the reveal work on copies of it.
    pub catalog: DataResource<Vec<CatalogEntry>>,

    pub filter: FilterSpec,
    pub reveal: Reveal<CatalogEntry>,

    /// Bumped on every catalog or filter change; enrichment results tagged
    /// with an older generation are dropped.
    pub generation: u64,
    pub enriching: bool,
    pub enrich_failed: HashSet<String>,

    pub type_list: Vec<String>,
    pub habitat_list: Vec<String>,

    pub details: HashMap<String, PokemonDetail>,
    pub detail_name: Option<String>,
    pub detail_loading: bool,
    pub evolution: HashMap<u32, EvolutionChain>,
    pub evolution_loading: bool,

    pub message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(BrowseConfig::default())
    }
}

impl AppState {
    pub fn new(config: BrowseConfig) -> Self {
        let page_size = config.page_size;
        Self {
            config,
            catalog: DataResource::Empty,
            filter: FilterSpec::default(),
            reveal: Reveal::new(page_size),
            generation: 0,
            enriching: false,
            enrich_failed: HashSet::new(),
            type_list: Vec::new(),
            habitat_list: Vec::new(),
            details: HashMap::new(),
            detail_name: None,
            detail_loading: false,
            evolution: HashMap::new(),
            evolution_loading: false,
            message: None,
        }
    }

    pub fn partitions(&self) -> &[PartitionSpec] {
        &self.config.partitions
    }

    /// Loaded catalog entries; empty until the catalog has loaded.
    pub fn catalog_entries(&self) -> &[CatalogEntry] {
        self.catalog.data().map(Vec::as_slice).unwrap_or_default()
    }

    /// The current filter result.
    pub fn filtered(&self) -> &[CatalogEntry] {
        self.reveal.source()
    }

    /// The revealed prefix of the filter result.
    pub fn visible(&self) -> &[CatalogEntry] {
        self.reveal.visible()
    }

    /// Re-applies the filter to the catalog and restarts the reveal.
    pub fn rebuild_filtered(&mut self) {
        let filtered = apply_all(self.catalog_entries(), &self.filter.search_term, &self.filter);
        self.reveal.replace(filtered);
    }

    /// Next entries to enrich for the active filter: the text and partition
    /// matches that lack detail fields and have not failed this generation.
    pub fn next_enrichment_batch(&self) -> Vec<CatalogEntry> {
        prefilter(self.catalog_entries(), &self.filter.search_term, &self.filter)
            .into_iter()
            .filter(|entry| !entry.is_enriched() && !self.enrich_failed.contains(&entry.name))
            .take(self.config.enrich_batch_size.max(1))
            .collect()
    }

    pub fn current_detail(&self) -> Option<&PokemonDetail> {
        let name = self.detail_name.as_ref()?;
        self.details.get(name)
    }

    pub fn current_evolution(&self) -> Option<&EvolutionChain> {
        let id = self.current_detail()?.evolution_chain_id?;
        self.evolution.get(&id)
    }
}
