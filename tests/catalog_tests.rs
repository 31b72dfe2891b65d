//! Catalog aggregation and enrichment against a scripted transport.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use pokedex_browse::catalog::{build_catalog, enrich, lookup_detail, CatalogEntry, PartitionSpec};

use common::{client, listing, register, MockTransport};

fn kanto_three() -> Arc<MockTransport> {
    let transport = Arc::new(MockTransport::new());
    transport.json(
        "pokemon?limit=3&offset=0",
        listing(&[("bulbasaur", 1), ("ivysaur", 2), ("venusaur", 3)]),
    );
    transport
}

#[tokio::test]
async fn test_catalog_keeps_partition_order() {
    let transport = kanto_three();
    transport.json(
        "pokemon?limit=2&offset=151",
        listing(&[("chikorita", 152), ("bayleef", 153)]),
    );
    let client = client(&transport);

    let catalog = build_catalog(
        &client,
        &[
            PartitionSpec::new("kanto", 3, 0),
            PartitionSpec::new("johto", 2, 151),
        ],
    )
    .await;

    let names: Vec<&str> = catalog.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["bulbasaur", "ivysaur", "venusaur", "chikorita", "bayleef"]
    );
    assert_eq!(catalog[0].partition, "kanto");
    assert_eq!(catalog[3].partition, "johto");
    assert_eq!(catalog[3].locator_id, Some(152));
    assert!(catalog.iter().all(|e| !e.is_enriched()));
}

#[tokio::test]
async fn test_failed_partition_is_skipped() {
    let transport = kanto_three();
    transport.fail("pokemon?limit=2&offset=151");
    let client = client(&transport);

    let catalog = build_catalog(
        &client,
        &[
            PartitionSpec::new("johto", 2, 151),
            PartitionSpec::new("kanto", 3, 0),
        ],
    )
    .await;

    assert_eq!(catalog.len(), 3);
    assert!(catalog.iter().all(|e| e.partition == "kanto"));
}

#[tokio::test]
async fn test_enrich_isolates_failures() {
    let transport = kanto_three();
    register(&transport, 1, "bulbasaur", &["grass", "poison"], Some("grassland"));
    transport.fail("pokemon/ivysaur");
    register(&transport, 3, "venusaur", &["grass", "poison"], Some("grassland"));
    let client = client(&transport);

    let catalog = build_catalog(&client, &[PartitionSpec::new("kanto", 3, 0)]).await;
    let outcome = enrich(&client, catalog).await;

    assert_eq!(outcome.entries.len(), 3);
    let names: Vec<&str> = outcome.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["bulbasaur", "ivysaur", "venusaur"]);
    assert!(outcome.entries[0].is_enriched());
    assert!(!outcome.entries[1].is_enriched());
    assert!(outcome.entries[2].is_enriched());
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].name, "ivysaur");

    let enriched = &outcome.entries[0];
    assert_eq!(enriched.types(), Some(&["grass".to_string(), "poison".to_string()][..]));
    assert_eq!(enriched.habitat(), Some("grassland"));
    assert_eq!(enriched.id(), Some(1));
}

#[tokio::test]
async fn test_species_failure_fails_the_entry() {
    let transport = kanto_three();
    transport.json(
        "pokemon/bulbasaur",
        common::pokemon(1, "bulbasaur", &["grass"]),
    );
    transport.fail("pokemon-species/bulbasaur");
    let client = client(&transport);

    let outcome = enrich(
        &client,
        vec![CatalogEntry::new("bulbasaur", "", "kanto")],
    )
    .await;

    assert!(!outcome.entries[0].is_enriched());
    assert_eq!(outcome.failures.len(), 1);
}

#[tokio::test]
async fn test_enrich_skips_enriched_entries() {
    let transport = kanto_three();
    register(&transport, 1, "bulbasaur", &["grass", "poison"], Some("grassland"));
    let client = client(&transport);

    let first = enrich(&client, vec![CatalogEntry::new("bulbasaur", "", "kanto")]).await;
    let calls = transport.total_calls();
    let second = enrich(&client, first.entries.clone()).await;

    assert_eq!(second.entries, first.entries);
    assert!(second.failures.is_empty());
    assert_eq!(transport.total_calls(), calls);
}

#[tokio::test]
async fn test_enrich_empty_list() {
    let transport = Arc::new(MockTransport::new());
    let client = client(&transport);

    let outcome = enrich(&client, Vec::new()).await;
    assert!(outcome.entries.is_empty());
    assert!(outcome.failures.is_empty());
    assert_eq!(transport.total_calls(), 0);
}

#[tokio::test]
async fn test_lookup_detail_combines_species() {
    let transport = Arc::new(MockTransport::new());
    register(&transport, 1, "bulbasaur", &["grass", "poison"], Some("grassland"));
    let client = client(&transport);

    let detail = lookup_detail(&client, "Bulbasaur").await.unwrap().unwrap();
    assert_eq!(detail.name, "bulbasaur");
    assert_eq!(detail.habitat.as_deref(), Some("grassland"));
    assert_eq!(detail.genus.as_deref(), Some("Seed Pokémon"));
    assert_eq!(detail.evolution_chain_id, Some(1));
}

#[tokio::test]
async fn test_lookup_detail_not_found_is_none() {
    let transport = Arc::new(MockTransport::new());
    transport.status("pokemon/missingno", 404, serde_json::json!("Not Found"));
    let client = client(&transport);

    assert_eq!(lookup_detail(&client, "missingno").await, Ok(None));
}

#[tokio::test]
async fn test_lookup_detail_tolerates_species_failure() {
    let transport = Arc::new(MockTransport::new());
    transport.json("pokemon/bulbasaur", common::pokemon(1, "bulbasaur", &["grass"]));
    transport.status("pokemon-species/bulbasaur", 500, serde_json::json!({}));
    let client = client(&transport);

    let detail = lookup_detail(&client, "bulbasaur").await.unwrap().unwrap();
    assert_eq!(detail.types, vec!["grass"]);
    assert_eq!(detail.habitat, None);
    assert_eq!(detail.evolution_chain_id, None);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_names_in_a_batch_fetch_once() {
    let transport = Arc::new(MockTransport::new());
    transport.latency(std::time::Duration::from_millis(20));
    register(&transport, 1, "bulbasaur", &["grass", "poison"], Some("grassland"));
    let client = client(&transport);

    // The same region listed twice yields the same names twice.
    let outcome = enrich(
        &client,
        vec![
            CatalogEntry::new("bulbasaur", "", "kanto"),
            CatalogEntry::new("bulbasaur", "", "kanto"),
        ],
    )
    .await;

    assert!(outcome.entries.iter().all(|entry| entry.is_enriched()));
    assert_eq!(transport.calls_to("pokemon/bulbasaur"), 1);
    assert_eq!(transport.calls_to("pokemon-species/bulbasaur"), 1);
}
