use std::collections::BTreeSet;

use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::catalog::{merge_enriched, Enrichment};
use crate::effect::Effect;
use crate::filter::{needs_enrichment, FilterSpec};
use crate::state::{AppState, PokemonDetail};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.catalog = DataResource::Loading;
            state.message = None;
            DispatchResult::changed_with_many(vec![
                Effect::LoadCatalog {
                    partitions: state.partitions().to_vec(),
                },
                Effect::LoadTypes,
                Effect::LoadHabitats,
            ])
        }

        Action::CatalogLoad => {
            if state.catalog.is_loading() {
                return DispatchResult::unchanged();
            }
            state.catalog = DataResource::Loading;
            DispatchResult::changed_with(Effect::LoadCatalog {
                partitions: state.partitions().to_vec(),
            })
        }

        Action::CatalogDidLoad(entries) => {
            state.catalog = DataResource::Loaded(entries);
            refilter(state)
        }

        Action::CatalogDidError(error) => {
            state.message = Some(format!("Catalog error: {error}"));
            state.catalog = DataResource::Failed(error);
            DispatchResult::changed()
        }

        Action::SearchSet(term) => {
            if state.filter.search_term == term {
                return DispatchResult::unchanged();
            }
            state.filter.search_term = term;
            refilter(state)
        }

        Action::FilterSet(spec) => {
            if state.filter == spec {
                return DispatchResult::unchanged();
            }
            state.filter = spec;
            refilter(state)
        }

        Action::FilterTogglePartition(name) => {
            toggle(&mut state.filter.partitions, name);
            refilter(state)
        }

        Action::FilterToggleType(name) => {
            toggle(&mut state.filter.types, name);
            refilter(state)
        }

        Action::FilterToggleHabitat(name) => {
            toggle(&mut state.filter.habitats, name);
            refilter(state)
        }

        Action::FilterClear => {
            if !state.filter.has_constraints() {
                return DispatchResult::unchanged();
            }
            state.filter = FilterSpec {
                search_term: std::mem::take(&mut state.filter.search_term),
                ..FilterSpec::default()
            };
            refilter(state)
        }

        Action::EnrichDidLoad {
            generation,
            entries,
            failures,
        } => {
            if generation != state.generation {
                tracing::debug!(
                    generation,
                    current = state.generation,
                    "dropping stale enrichment"
                );
                return DispatchResult::unchanged();
            }
            if let Some(catalog) = state.catalog.data_mut() {
                merge_enriched(catalog, &entries);
            }
            if !failures.is_empty() {
                state.message = Some(format!(
                    "Could not load details for {} entries",
                    failures.len()
                ));
            }
            state
                .enrich_failed
                .extend(failures.into_iter().map(|failure| failure.name));
            state.rebuild_filtered();
            let effects = enrichment_follow_up(state);
            DispatchResult::changed_with_many(effects)
        }

        Action::RevealMore => {
            if !state.reveal.reveal_more() {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::DetailOpen(name) => {
            let name = name.trim().to_lowercase();
            if name.is_empty() {
                state.detail_name = None;
                state.message = Some("A name or id is required".to_string());
                return DispatchResult::changed();
            }
            if state.details.contains_key(&name) {
                state.detail_name = Some(name.clone());
                let effects = evolution_follow_up(state, &name);
                return DispatchResult::changed_with_many(effects);
            }
            state.detail_name = None;
            state.detail_loading = true;
            DispatchResult::changed_with(Effect::LoadDetail { name })
        }

        Action::DetailClose => {
            if state.detail_name.is_none() {
                return DispatchResult::unchanged();
            }
            state.detail_name = None;
            DispatchResult::changed()
        }

        Action::DetailDidLoad(detail) => {
            let name = detail.name.clone();
            let enriched = apply_detail(state, &detail);
            state.details.insert(name.clone(), detail);
            state.detail_name = Some(name.clone());
            state.detail_loading = false;
            state.message = None;
            if enriched && needs_enrichment(&state.filter) {
                state.rebuild_filtered();
            }
            let effects = evolution_follow_up(state, &name);
            DispatchResult::changed_with_many(effects)
        }

        Action::DetailDidMiss(name) => {
            state.detail_loading = false;
            state.detail_name = None;
            state.message = Some(format!("{name} not found"));
            DispatchResult::changed()
        }

        Action::DetailDidError { name, error } => {
            state.detail_loading = false;
            state.message = Some(format!("{name} load error: {error}"));
            DispatchResult::changed()
        }

        Action::EvolutionDidLoad(chain) => {
            state.evolution.insert(chain.id, chain);
            state.evolution_loading = false;
            DispatchResult::changed()
        }

        Action::EvolutionDidError { id, error } => {
            state.evolution_loading = false;
            state.message = Some(format!("Evolution chain {id} error: {error}"));
            DispatchResult::changed()
        }

        Action::TypesDidLoad(types) => {
            state.type_list = types;
            DispatchResult::changed()
        }

        Action::HabitatsDidLoad(habitats) => {
            state.habitat_list = habitats;
            DispatchResult::changed()
        }

        Action::OptionsDidError(error) => {
            state.message = Some(format!("Filter options error: {error}"));
            DispatchResult::changed()
        }
    }
}

fn toggle(set: &mut BTreeSet<String>, name: String) {
    if !set.remove(&name) {
        set.insert(name);
    }
}

/// Starts a new generation: recompute the filter result and, if the filter
/// needs detail fields, request the first enrichment batch.
fn refilter(state: &mut AppState) -> DispatchResult<Effect> {
    state.generation += 1;
    state.enrich_failed.clear();
    state.rebuild_filtered();
    let effects = enrichment_follow_up(state);
    DispatchResult::changed_with_many(effects)
}

fn enrichment_follow_up(state: &mut AppState) -> Vec<Effect> {
    if !state.catalog.is_loaded() || !needs_enrichment(&state.filter) {
        state.enriching = false;
        return Vec::new();
    }
    let entries = state.next_enrichment_batch();
    if entries.is_empty() {
        state.enriching = false;
        return Vec::new();
    }
    state.enriching = true;
    vec![Effect::EnrichBatch {
        generation: state.generation,
        entries,
    }]
}

/// Copies the detail's fields onto its catalog entry if it has none yet.
/// A detail whose species lookup failed has an unknown habitat and is not
/// copied, so the enricher still fetches that entry.
fn apply_detail(state: &mut AppState, detail: &PokemonDetail) -> bool {
    if !detail.species_loaded {
        return false;
    }
    let Some(catalog) = state.catalog.data_mut() else {
        return false;
    };
    let mut changed = false;
    for entry in catalog
        .iter_mut()
        .filter(|entry| entry.name == detail.name && !entry.is_enriched())
    {
        entry.enrichment = Some(Enrichment::from(detail));
        changed = true;
    }
    changed
}

fn evolution_follow_up(state: &mut AppState, name: &str) -> Vec<Effect> {
    let Some(id) = state
        .details
        .get(name)
        .and_then(|detail| detail.evolution_chain_id)
    else {
        return Vec::new();
    };
    if state.evolution.contains_key(&id) {
        return Vec::new();
    }
    state.evolution_loading = true;
    vec![Effect::LoadEvolutionChain { id }]
}
