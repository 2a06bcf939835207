use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{Card, CardId};

pub const SEARCH_ROUTE: &str = "/api/search";

/// Body of `POST /api/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub data: Vec<Listing>,
}

/// A search result in the normalized card shape. Upstream fields that have
/// no named slot are carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub price: String,
    pub rating: f64,
    pub category: String,
    #[serde(rename = "reviewsCount")]
    pub reviews_count: usize,
    pub attributes: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abv: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Listing {
    /// Parses the display price (`"$12.49"`, `"1,200.00"`) back to a number.
    /// Anything unparsable counts as free.
    pub fn numeric_price(&self) -> f64 {
        let cleaned: String = self
            .price
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();
        cleaned.parse().unwrap_or(0.0)
    }
}

impl From<&Listing> for Card {
    fn from(listing: &Listing) -> Self {
        Card {
            id: CardId::new(listing.id.clone()),
            name: listing.name.clone(),
            description: listing.description.clone(),
            image: listing.image.clone(),
            price: listing.numeric_price(),
            abv: listing.abv.clone().unwrap_or_default(),
            rating: listing.rating,
        }
    }
}
