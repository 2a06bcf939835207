use std::sync::Arc;

use axum::{http::StatusCode, routing::post, Json, Router};
use deck::{
    load_deck, seed_cards, CatalogClient, CatalogError, DeckOrigin, InstantAnimator,
    StackController, SwipeOutcome,
};
use serde_json::{json, Value};
use shared::domain::{CardId, SwipeDirection};
use tokio::net::TcpListener;

async fn spawn_proxy(status: StatusCode, body: Value) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new().route(
        "/api/search",
        post(move |Json(request): Json<Value>| {
            let body = body.clone();
            async move {
                assert!(request["query"].is_string(), "query must be sent");
                (status, Json(body))
            }
        }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn listing(id: &str, name: &str, price: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "from search",
        "image": "https://img.example/x.jpg",
        "price": price,
        "rating": 4.5,
        "category": "Beer",
        "reviewsCount": 0,
        "attributes": {},
        "abv": "6.1%"
    })
}

#[tokio::test]
async fn search_results_become_the_deck() {
    let url = spawn_proxy(
        StatusCode::OK,
        json!({ "data": [
            listing("s1", "Stout", "$7.50"),
            listing("s2", "Porter", "$8.00"),
            listing("s1", "Stout again", "$7.50"),
        ]}),
    )
    .await;
    let client = CatalogClient::new(format!("{url}/"));

    let loaded = load_deck(&client, Some("dark beer")).await;
    assert_eq!(loaded.origin, DeckOrigin::Search);
    let ids: Vec<&str> = loaded.cards.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["s1", "s2"]);
    assert_eq!(loaded.cards[0].price, 7.5);
    assert_eq!(loaded.cards[1].abv, "6.1%");

    let deck = StackController::new(loaded.cards, Arc::new(InstantAnimator));
    let outcome = deck.swipe_active(SwipeDirection::Like).await;
    assert_eq!(
        outcome,
        SwipeOutcome::Committed {
            card_id: CardId::new("s2"),
            direction: SwipeDirection::Like,
        }
    );
}

#[tokio::test]
async fn proxy_error_is_reported_and_deck_falls_back_to_seed() {
    let url = spawn_proxy(
        StatusCode::BAD_GATEWAY,
        json!({ "error": "External API error: 502 Bad Gateway" }),
    )
    .await;
    let client = CatalogClient::new(url);

    let error = client.search("lager").await.expect_err("proxy error");
    match error {
        CatalogError::Proxy(exception) => {
            assert_eq!(exception.status, 502);
            assert!(exception.message.contains("External API error"));
        }
        other => panic!("unexpected error: {other}"),
    }

    let loaded = load_deck(&client, Some("lager")).await;
    assert_eq!(loaded.origin, DeckOrigin::Seed);
    assert_eq!(loaded.cards, seed_cards());
}

#[tokio::test]
async fn empty_search_falls_back_to_seed() {
    let url = spawn_proxy(StatusCode::OK, json!({ "data": [] })).await;
    let client = CatalogClient::new(url);

    let loaded = load_deck(&client, Some("nothing matches")).await;
    assert_eq!(loaded.origin, DeckOrigin::Seed);
}

#[tokio::test]
async fn unreachable_proxy_falls_back_to_seed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let client = CatalogClient::new(format!("http://{addr}"));

    assert!(matches!(
        client.search("ipa").await,
        Err(CatalogError::Transport(_))
    ));
    let loaded = load_deck(&client, Some("ipa")).await;
    assert_eq!(loaded.origin, DeckOrigin::Seed);
}

#[tokio::test]
async fn blank_query_uses_seed_without_searching() {
    let client = CatalogClient::new("http://127.0.0.1:9");
    let loaded = load_deck(&client, Some("   ")).await;
    assert_eq!(loaded.origin, DeckOrigin::Seed);
    let loaded = load_deck(&client, None).await;
    assert_eq!(loaded.cards.len(), 8);
}
