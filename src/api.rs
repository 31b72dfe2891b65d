use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::cache::{cache_key, ResponseCache};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::state::{EvolutionChain, LocalizedName, MoveDetail, PokemonDetail, PokemonSpecies};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// One page of a `{resource}?limit=&offset=` listing.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ListPage {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub results: Vec<NamedResource>,
}

/// Query parameters of a request. Sorted so the cache key is stable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RequestOptions {
    pub query: BTreeMap<String, String>,
}

impl RequestOptions {
    pub fn page(limit: u32, offset: u32) -> Self {
        let mut query = BTreeMap::new();
        query.insert("limit".to_string(), limit.to_string());
        query.insert("offset".to_string(), offset.to_string());
        Self { query }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Issues a GET and hands back the raw status and body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<TransportResponse, ApiError>;
}

#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, ApiError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?
            .to_vec();
        Ok(TransportResponse { status, body })
    }
}

#[derive(Clone, Debug, Deserialize)]
struct ApiResource {
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u32,
    name: String,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    weight: u32,
    base_experience: Option<u32>,
    order: Option<i32>,
    #[serde(default)]
    types: Vec<PokemonTypeSlot>,
    #[serde(default)]
    abilities: Vec<PokemonAbilitySlot>,
    #[serde(default)]
    stats: Vec<PokemonStatSlot>,
    #[serde(default)]
    sprites: serde_json::Value,
    species: Option<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    type_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonAbilitySlot {
    ability: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u32,
    stat: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonSpeciesResponse {
    id: u32,
    name: String,
    habitat: Option<NamedResource>,
    gender_rate: Option<i8>,
    #[serde(default)]
    flavor_text_entries: Vec<FlavorTextEntry>,
    #[serde(default)]
    genera: Vec<GenusEntry>,
    evolution_chain: Option<ApiResource>,
    evolves_from_species: Option<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct FlavorTextEntry {
    flavor_text: String,
    language: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct GenusEntry {
    genus: String,
    language: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct EvolutionChainResponse {
    id: u32,
    chain: ChainLink,
}

#[derive(Clone, Debug, Deserialize)]
struct ChainLink {
    species: NamedResource,
    #[serde(default)]
    evolves_to: Vec<ChainLink>,
}

#[derive(Clone, Debug, Deserialize)]
struct MoveDetailResponse {
    id: u32,
    name: String,
    power: Option<u32>,
    accuracy: Option<u32>,
    pp: Option<u32>,
    damage_class: Option<NamedResource>,
    #[serde(rename = "type")]
    move_type: Option<NamedResource>,
    #[serde(default)]
    names: Vec<MoveNameEntry>,
}

#[derive(Clone, Debug, Deserialize)]
struct MoveNameEntry {
    name: String,
    language: NamedResource,
}

type PendingFetch = Shared<BoxFuture<'static, Result<serde_json::Value, ApiError>>>;

/// PokeAPI client: builds request paths, consults the shared response
/// cache and normalizes bodies into the record types in `state`.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    cache: Arc<ResponseCache>,
    in_flight: Arc<Mutex<HashMap<String, PendingFetch>>>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_transport(
            &config.base_url,
            Arc::new(HttpTransport::default()),
            Arc::new(ResponseCache::new(config.cache_ttl)),
        )
    }

    pub fn with_transport(
        base_url: &str,
        transport: Arc<dyn Transport>,
        cache: Arc<ResponseCache>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            cache,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn url_for(&self, path: &str, options: &RequestOptions) -> String {
        let mut url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        if !options.query.is_empty() {
            let query: Vec<String> = options
                .query
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }

    /// GET `path` relative to the base URL. A fresh cached payload is
    /// returned without touching the transport, and callers asking for a key
    /// that is already being fetched await that same request.
    pub async fn fetch_json(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<serde_json::Value, ApiError> {
        let key = cache_key(path, options);
        if let Some(payload) = self.cache.get(&key) {
            tracing::debug!(path, "response cache hit");
            return Ok(payload);
        }

        let pending = {
            let mut in_flight = self.in_flight.lock();
            in_flight
                .entry(key.clone())
                .or_insert_with(|| {
                    request_json(
                        self.transport.clone(),
                        self.cache.clone(),
                        key.clone(),
                        self.url_for(path, options),
                    )
                    .boxed()
                    .shared()
                })
                .clone()
        };
        let result = pending.await;
        self.in_flight.lock().remove(&key);
        result
    }

    async fn fetch_typed<T: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<T, ApiError> {
        let payload = self.fetch_json(path, options).await?;
        serde_json::from_value(payload).map_err(|err| ApiError::Decode(err.to_string()))
    }

    pub async fn get_pokemon(&self, id_or_name: &str) -> Result<PokemonDetail, ApiError> {
        let param = normalize_identifier(id_or_name)?;
        let response: PokemonResponse = self
            .fetch_typed(&format!("pokemon/{param}"), &RequestOptions::default())
            .await?;
        Ok(pokemon_detail(response))
    }

    pub async fn get_species(&self, id_or_name: &str) -> Result<PokemonSpecies, ApiError> {
        let param = normalize_identifier(id_or_name)?;
        let response: PokemonSpeciesResponse = self
            .fetch_typed(
                &format!("pokemon-species/{param}"),
                &RequestOptions::default(),
            )
            .await?;
        Ok(PokemonSpecies {
            id: response.id,
            name: response.name,
            habitat: response.habitat.map(|habitat| habitat.name),
            gender_rate: response.gender_rate,
            flavor_text: response
                .flavor_text_entries
                .iter()
                .find(|entry| entry.language.name == "en")
                .map(|entry| sanitize_text(&entry.flavor_text)),
            genus: response
                .genera
                .iter()
                .find(|entry| entry.language.name == "en")
                .map(|entry| entry.genus.clone()),
            evolution_chain_id: response
                .evolution_chain
                .and_then(|chain| resource_id(&chain.url)),
            evolves_from: response.evolves_from_species.map(|species| species.name),
        })
    }

    pub async fn get_list_page(
        &self,
        resource: &str,
        limit: u32,
        offset: u32,
    ) -> Result<ListPage, ApiError> {
        self.fetch_typed(resource, &RequestOptions::page(limit, offset))
            .await
    }

    /// Total size of a listing, read from a one-item page.
    pub async fn get_resource_count(&self, resource: &str) -> Result<u32, ApiError> {
        let mut query = BTreeMap::new();
        query.insert("limit".to_string(), "1".to_string());
        let page: ListPage = self.fetch_typed(resource, &RequestOptions { query }).await?;
        Ok(page.count)
    }

    pub async fn get_evolution_chain(&self, id: u32) -> Result<EvolutionChain, ApiError> {
        let response: EvolutionChainResponse = self
            .fetch_typed(&format!("evolution-chain/{id}"), &RequestOptions::default())
            .await?;
        let mut stages = Vec::new();
        build_chain_stages(&response.chain, &mut stages);
        Ok(EvolutionChain {
            id: response.id,
            stages,
        })
    }

    pub async fn get_move(&self, id_or_name: &str) -> Result<MoveDetail, ApiError> {
        let param = normalize_identifier(id_or_name)?;
        let response: MoveDetailResponse = self
            .fetch_typed(&format!("move/{param}"), &RequestOptions::default())
            .await?;
        Ok(MoveDetail {
            id: response.id,
            name: response.name,
            power: response.power,
            accuracy: response.accuracy,
            pp: response.pp,
            damage_class: response.damage_class.map(|class| class.name),
            move_type: response.move_type.map(|move_type| move_type.name),
            names: response
                .names
                .into_iter()
                .map(|entry| LocalizedName {
                    language: entry.language.name,
                    name: entry.name,
                })
                .collect(),
        })
    }

    pub async fn get_type_names(&self) -> Result<Vec<String>, ApiError> {
        let page: ListPage = self.fetch_typed("type", &RequestOptions::default()).await?;
        let mut types: Vec<String> = page
            .results
            .into_iter()
            .map(|entry| entry.name)
            .filter(|name| name != "unknown" && name != "shadow")
            .collect();
        types.sort();
        Ok(types)
    }

    pub async fn get_habitat_names(&self) -> Result<Vec<String>, ApiError> {
        let page: ListPage = self
            .fetch_typed("pokemon-habitat", &RequestOptions::default())
            .await?;
        Ok(page.results.into_iter().map(|entry| entry.name).collect())
    }
}

async fn request_json(
    transport: Arc<dyn Transport>,
    cache: Arc<ResponseCache>,
    key: String,
    url: String,
) -> Result<serde_json::Value, ApiError> {
    let response = transport.get(&url).await?;
    match response.status {
        200..=299 => {}
        404 => return Err(ApiError::NotFound(url)),
        status => return Err(ApiError::Http { status, url }),
    }
    let payload: serde_json::Value = serde_json::from_slice(&response.body)
        .map_err(|err| ApiError::Decode(err.to_string()))?;
    cache.insert(key, payload.clone());
    Ok(payload)
}

fn pokemon_detail(response: PokemonResponse) -> PokemonDetail {
    PokemonDetail {
        id: response.id,
        name: response.name,
        types: response
            .types
            .into_iter()
            .map(|slot| slot.type_info.name)
            .collect(),
        abilities: response
            .abilities
            .into_iter()
            .map(|slot| slot.ability.name)
            .collect(),
        stats: response
            .stats
            .into_iter()
            .map(|slot| (slot.stat.name, slot.base_stat))
            .collect(),
        sprite: pointer_string(&response.sprites, "/front_default"),
        official_artwork: pointer_string(
            &response.sprites,
            "/other/official-artwork/front_default",
        ),
        height_m: tenths(response.height),
        weight_kg: tenths(response.weight),
        base_experience: response.base_experience,
        order: response.order,
        species: response.species.map(|species| species.name),
        habitat: None,
        genus: None,
        flavor_text: None,
        gender_rate: None,
        evolution_chain_id: None,
        species_loaded: false,
    }
}

fn normalize_identifier(id_or_name: &str) -> Result<String, ApiError> {
    let param = id_or_name.trim().to_lowercase();
    if param.is_empty() {
        return Err(ApiError::MissingIdentifier);
    }
    Ok(param)
}

/// Decimetres to metres / hectograms to kilograms, one decimal.
fn tenths(raw: u32) -> f64 {
    (raw as f64 / 10.0 * 10.0).round() / 10.0
}

/// Numeric id at the end of a resource URL such as `.../pokemon/25/`.
pub fn resource_id(url: &str) -> Option<u32> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

fn sanitize_text(text: &str) -> String {
    text.replace(['\n', '\u{000C}'], " ")
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

fn build_chain_stages(chain: &ChainLink, stages: &mut Vec<String>) {
    if !stages.contains(&chain.species.name) {
        stages.push(chain.species.name.clone());
    }
    for next in &chain.evolves_to {
        build_chain_stages(next, stages);
    }
}
