use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogEntry, EnrichFailure};
use crate::filter::FilterSpec;
use crate::state::{EvolutionChain, PokemonDetail};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,

    /// Retry after a failed catalog load.
    CatalogLoad,
    CatalogDidLoad(Vec<CatalogEntry>),
    CatalogDidError(String),

    SearchSet(String),

    FilterSet(FilterSpec),
    FilterTogglePartition(String),
    FilterToggleType(String),
    FilterToggleHabitat(String),
    FilterClear,

    EnrichDidLoad {
        generation: u64,
        entries: Vec<CatalogEntry>,
        failures: Vec<EnrichFailure>,
    },

    /// The consumer is close to the end of the revealed prefix.
    RevealMore,

    DetailOpen(String),
    DetailClose,
    DetailDidLoad(PokemonDetail),
    DetailDidMiss(String),
    DetailDidError { name: String, error: String },
    EvolutionDidLoad(EvolutionChain),
    EvolutionDidError { id: u32, error: String },

    TypesDidLoad(Vec<String>),
    HabitatsDidLoad(Vec<String>),
    OptionsDidError(String),
}
