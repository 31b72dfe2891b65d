//! Scripted transport and PokeAPI-shaped fixtures shared by the tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use pokedex_browse::api::{ApiClient, Transport, TransportResponse};
use pokedex_browse::cache::ResponseCache;
use pokedex_browse::error::ApiError;

pub const BASE: &str = "https://pokeapi.test/api/v2";

enum Route {
    Respond { status: u16, body: String },
    Fail,
}

/// Answers GETs from a fixed table and counts every call.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<String>>,
    latency: Mutex<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// `path` is relative to `BASE`, query included.
    pub fn json(&self, path: &str, body: Value) -> &Self {
        self.status(path, 200, body)
    }

    pub fn status(&self, path: &str, status: u16, body: Value) -> &Self {
        self.routes.lock().insert(
            url(path),
            Route::Respond {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    /// Every response waits this long before it resolves.
    pub fn latency(&self, latency: Duration) -> &Self {
        *self.latency.lock() = latency;
        self
    }

    /// Simulates a transport failure for `path`.
    pub fn fail(&self, path: &str) -> &Self {
        self.routes.lock().insert(url(path), Route::Fail);
        self
    }

    pub fn calls_to(&self, path: &str) -> usize {
        let target = url(path);
        self.calls.lock().iter().filter(|call| **call == target).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, ApiError> {
        self.calls.lock().push(url.to_string());
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        match self.routes.lock().get(url) {
            Some(Route::Respond { status, body }) => Ok(TransportResponse {
                status: *status,
                body: body.clone().into_bytes(),
            }),
            Some(Route::Fail) => Err(ApiError::Network(format!("connection refused: {url}"))),
            None => Err(ApiError::Network(format!("no route for {url}"))),
        }
    }
}

pub fn url(path: &str) -> String {
    format!("{BASE}/{path}")
}

pub fn client(transport: &Arc<MockTransport>) -> ApiClient {
    ApiClient::with_transport(
        BASE,
        transport.clone(),
        Arc::new(ResponseCache::default()),
    )
}

pub fn listing(names: &[(&str, u32)]) -> Value {
    let results: Vec<Value> = names
        .iter()
        .map(|(name, id)| json!({"name": name, "url": url(&format!("pokemon/{id}/"))}))
        .collect();
    json!({"count": 1302, "next": null, "previous": null, "results": results})
}

pub fn pokemon(id: u32, name: &str, types: &[&str]) -> Value {
    let types: Vec<Value> = types
        .iter()
        .enumerate()
        .map(|(slot, type_name)| {
            json!({"slot": slot + 1, "type": {"name": type_name, "url": url(&format!("type/{type_name}/"))}})
        })
        .collect();
    json!({
        "id": id,
        "name": name,
        "height": 7,
        "weight": 69,
        "base_experience": 64,
        "order": id,
        "types": types,
        "abilities": [
            {"ability": {"name": "overgrow", "url": url("ability/65/")}, "is_hidden": false, "slot": 1}
        ],
        "stats": [
            {"base_stat": 45, "effort": 0, "stat": {"name": "hp", "url": url("stat/1/")}},
            {"base_stat": 49, "effort": 0, "stat": {"name": "attack", "url": url("stat/2/")}}
        ],
        "sprites": {
            "front_default": format!("https://img.test/{id}.png"),
            "other": {"official-artwork": {"front_default": format!("https://img.test/art/{id}.png")}}
        },
        "species": {"name": name, "url": url(&format!("pokemon-species/{id}/"))}
    })
}

pub fn species(id: u32, name: &str, habitat: Option<&str>, chain: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "gender_rate": 1,
        "habitat": habitat.map(|habitat| json!({"name": habitat, "url": url("pokemon-habitat/1/")})),
        "flavor_text_entries": [
            {"flavor_text": "Una semilla.", "language": {"name": "es", "url": ""}},
            {"flavor_text": "A strange seed was\nplanted on its\u{000C}back.", "language": {"name": "en", "url": ""}}
        ],
        "genera": [{"genus": "Seed Pokémon", "language": {"name": "en", "url": ""}}],
        "evolution_chain": {"url": url(&format!("evolution-chain/{chain}/"))},
        "evolves_from_species": null
    })
}

/// Registers pokemon + species routes for an entry.
pub fn register(
    transport: &MockTransport,
    id: u32,
    name: &str,
    types: &[&str],
    habitat: Option<&str>,
) {
    transport.json(&format!("pokemon/{name}"), pokemon(id, name, types));
    transport.json(
        &format!("pokemon-species/{name}"),
        species(id, name, habitat, 1),
    );
}
