//! Fetches deck contents from the search proxy, falling back to the bundled
//! seed deck when search is unavailable.

use std::collections::HashSet;

use reqwest::Client;
use shared::{
    domain::Card,
    error::{ErrorBody, ProxyException},
    protocol::{SearchRequest, SearchResponse, SEARCH_ROUTE},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::seed::seed_cards;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("search proxy request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("search proxy returned an error: {0}")]
    Proxy(#[from] ProxyException),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckOrigin {
    Search,
    Seed,
}

#[derive(Debug, Clone)]
pub struct LoadedDeck {
    pub cards: Vec<Card>,
    pub origin: DeckOrigin,
}

impl LoadedDeck {
    fn seed() -> Self {
        Self {
            cards: seed_cards(),
            origin: DeckOrigin::Seed,
        }
    }
}

pub struct CatalogClient {
    http: Client,
    proxy_url: String,
}

impl CatalogClient {
    pub fn new(proxy_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            proxy_url: proxy_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Card>, CatalogError> {
        let response = self
            .http
            .post(format!("{}{}", self.proxy_url, SEARCH_ROUTE))
            .json(&SearchRequest {
                query: Some(query.to_string()),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.to_string(),
            };
            return Err(ProxyException::new(status.as_u16(), message).into());
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.data.iter().map(Card::from).collect())
    }
}

/// Loads the deck for `query`. Without a query, or when the search fails or
/// comes back empty, the bundled seed deck is used instead.
pub async fn load_deck(client: &CatalogClient, query: Option<&str>) -> LoadedDeck {
    let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return LoadedDeck::seed();
    };

    match client.search(query).await {
        Ok(cards) if cards.is_empty() => {
            warn!(query, "search returned no products, using bundled deck");
            LoadedDeck::seed()
        }
        Ok(cards) => {
            let cards = dedupe_by_id(cards);
            info!(query, count = cards.len(), "loaded deck from search");
            LoadedDeck {
                cards,
                origin: DeckOrigin::Search,
            }
        }
        Err(error) => {
            warn!(query, %error, "search unavailable, using bundled deck");
            LoadedDeck::seed()
        }
    }
}

// The stack identifies cards by id, so a repeated id would make two cards
// indistinguishable.
fn dedupe_by_id(cards: Vec<Card>) -> Vec<Card> {
    let mut seen = HashSet::new();
    cards
        .into_iter()
        .filter(|card| {
            let fresh = seen.insert(card.id.clone());
            if !fresh {
                warn!(card_id = %card.id, "dropping search result with duplicate id");
            }
            fresh
        })
        .collect()
}
