//! Headless effect runner.
//!
//! Feeds actions through the reducer and executes the effects it declares
//! against an `ApiClient`, dispatching each effect's result action until no
//! work is left. This is the surface a presentation layer calls into.

use std::collections::VecDeque;

use tui_dispatch::{DataResource, EffectStore};

use crate::action::Action;
use crate::api::ApiClient;
use crate::catalog::{build_catalog, enrich, lookup_detail, CatalogEntry};
use crate::config::BrowseConfig;
use crate::effect::Effect;
use crate::filter::FilterSpec;
use crate::reducer::reducer;
use crate::reveal::RevealState;
use crate::state::{AppState, PokemonDetail};

/// Catalog as seen by the presentation layer.
#[derive(Clone, Copy, Debug)]
pub struct CatalogView<'a> {
    pub entries: &'a [CatalogEntry],
    pub loading: bool,
    /// Set when no partition could be loaded; retry with `Action::CatalogLoad`.
    pub error: Option<&'a str>,
}

impl<'a> From<&'a DataResource<Vec<CatalogEntry>>> for CatalogView<'a> {
    fn from(catalog: &'a DataResource<Vec<CatalogEntry>>) -> Self {
        Self {
            entries: catalog.data().map(Vec::as_slice).unwrap_or_default(),
            loading: catalog.is_loading(),
            error: catalog.error(),
        }
    }
}

/// The revealed prefix of the current filter result.
#[derive(Clone, Copy, Debug)]
pub struct RevealView<'a> {
    pub visible: &'a [CatalogEntry],
    pub has_more: bool,
    pub state: RevealState,
}

pub struct Session {
    client: ApiClient,
    store: EffectStore<AppState, Action, Effect>,
}

impl Session {
    pub fn new(client: ApiClient, config: BrowseConfig) -> Self {
        Self {
            client,
            store: EffectStore::new(AppState::new(config), reducer),
        }
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Dispatches `action` and runs every resulting effect to completion.
    pub async fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            let result = self.store.dispatch(action);
            for effect in result.effects {
                queue.push_back(run_effect(&self.client, effect).await);
            }
        }
    }

    /// Loads the catalog on first use (or after a failed load).
    pub async fn load_catalog(&mut self) -> CatalogView<'_> {
        let action = match &self.state().catalog {
            DataResource::Empty => Some(Action::Init),
            DataResource::Failed(_) => Some(Action::CatalogLoad),
            DataResource::Loading | DataResource::Loaded(_) => None,
        };
        if let Some(action) = action {
            self.dispatch(action).await;
        }
        self.catalog()
    }

    pub fn catalog(&self) -> CatalogView<'_> {
        CatalogView::from(&self.state().catalog)
    }

    /// Applies `filter`, enriching entries first when the filter needs it.
    pub async fn search(&mut self, filter: FilterSpec) -> &[CatalogEntry] {
        self.dispatch(Action::FilterSet(filter)).await;
        self.state().filtered()
    }

    /// Full record for a name or numeric id; `None` if the API has none.
    pub async fn detail(&mut self, id_or_name: &str) -> Option<PokemonDetail> {
        self.dispatch(Action::DetailOpen(id_or_name.to_string()))
            .await;
        self.state().current_detail().cloned()
    }

    pub fn reveal(&self) -> RevealView<'_> {
        RevealView {
            visible: self.state().visible(),
            has_more: self.state().reveal.has_more(),
            state: self.state().reveal.state(),
        }
    }

    /// Grows the revealed prefix by one page. Returns whether it grew.
    pub async fn reveal_more(&mut self) -> bool {
        let before = self.state().visible().len();
        self.dispatch(Action::RevealMore).await;
        self.state().visible().len() > before
    }
}

/// Executes one effect and returns the action that reports its outcome.
pub async fn run_effect(client: &ApiClient, effect: Effect) -> Action {
    match effect {
        Effect::LoadCatalog { partitions } => {
            let entries = build_catalog(client, &partitions).await;
            if entries.is_empty() && !partitions.is_empty() {
                Action::CatalogDidError("no catalog partition could be loaded".to_string())
            } else {
                Action::CatalogDidLoad(entries)
            }
        }
        Effect::EnrichBatch {
            generation,
            entries,
        } => {
            let outcome = enrich(client, entries).await;
            Action::EnrichDidLoad {
                generation,
                entries: outcome.entries,
                failures: outcome.failures,
            }
        }
        Effect::LoadDetail { name } => match lookup_detail(client, &name).await {
            Ok(Some(detail)) => Action::DetailDidLoad(detail),
            Ok(None) => Action::DetailDidMiss(name),
            Err(err) => Action::DetailDidError {
                name,
                error: err.to_string(),
            },
        },
        Effect::LoadEvolutionChain { id } => match client.get_evolution_chain(id).await {
            Ok(chain) => Action::EvolutionDidLoad(chain),
            Err(err) => Action::EvolutionDidError {
                id,
                error: err.to_string(),
            },
        },
        Effect::LoadTypes => match client.get_type_names().await {
            Ok(types) => Action::TypesDidLoad(types),
            Err(err) => Action::OptionsDidError(err.to_string()),
        },
        Effect::LoadHabitats => match client.get_habitat_names().await {
            Ok(habitats) => Action::HabitatsDidLoad(habitats),
            Err(err) => Action::OptionsDidError(err.to_string()),
        },
    }
}
