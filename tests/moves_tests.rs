mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use pokedex_browse::moves::{load_move_page, MoveQuery, MOVES_PER_PAGE};

use common::{client, MockTransport};

fn move_body(id: u32, name: &str, move_type: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "power": 40,
        "accuracy": 100,
        "pp": 35,
        "damage_class": {"name": "physical", "url": ""},
        "type": {"name": move_type, "url": ""},
        "names": [{"name": "Pound", "language": {"name": "en", "url": ""}}]
    })
}

fn moves_world() -> Arc<MockTransport> {
    let transport = Arc::new(MockTransport::new());
    let results = json!([
        {"name": "pound", "url": ""},
        {"name": "ember", "url": ""},
        {"name": "flamethrower", "url": ""}
    ]);
    transport.json("move?limit=1", json!({"count": 3, "results": [{"name": "pound", "url": ""}]}));
    transport.json("move?limit=20&offset=0", json!({"count": 3, "results": results.clone()}));
    transport.json("move?limit=3&offset=0", json!({"count": 3, "results": results}));
    transport.json("move/pound", move_body(1, "pound", "normal"));
    transport.json("move/ember", move_body(52, "ember", "fire"));
    transport.json("move/flamethrower", move_body(53, "flamethrower", "fire"));
    transport
}

#[tokio::test]
async fn test_unfiltered_page() {
    let transport = moves_world();
    let client = client(&transport);

    let page = load_move_page(&client, &MoveQuery::default()).await.unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.per_page, MOVES_PER_PAGE);
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 1);
    let names: Vec<&str> = page.moves.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["pound", "ember", "flamethrower"]);
    assert_eq!(page.types, vec!["fire", "normal"]);
    assert_eq!(page.moves[0].localized_name("en"), "Pound");
}

#[tokio::test]
async fn test_type_filtered_page() {
    let transport = moves_world();
    let client = client(&transport);

    let query = MoveQuery {
        page: 1,
        move_type: Some(" Fire ".into()),
    };
    let page = load_move_page(&client, &query).await.unwrap();
    assert_eq!(page.total, 2);
    let names: Vec<&str> = page.moves.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["ember", "flamethrower"]);
    assert_eq!(page.types, vec!["fire"]);
}

#[tokio::test]
async fn test_failed_move_detail_is_skipped() {
    let transport = moves_world();
    transport.fail("move/ember");
    let client = client(&transport);

    let page = load_move_page(&client, &MoveQuery::default()).await.unwrap();
    let names: Vec<&str> = page.moves.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["pound", "flamethrower"]);
}

#[tokio::test]
async fn test_page_beyond_any_offset_is_empty() {
    let transport = moves_world();
    let client = client(&transport);

    let page = load_move_page(
        &client,
        &MoveQuery {
            page: usize::MAX,
            move_type: None,
        },
    )
    .await
    .unwrap();
    assert!(page.moves.is_empty());
    assert_eq!(page.total, 3);
    assert_eq!(transport.calls_to("move?limit=20&offset=0"), 0);

    let filtered = load_move_page(
        &client,
        &MoveQuery {
            page: usize::MAX,
            move_type: Some("fire".into()),
        },
    )
    .await
    .unwrap();
    assert!(filtered.moves.is_empty());
    assert_eq!(filtered.total, 2);
}
