use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    Like,
    Nope,
    Superlike,
}

impl SwipeDirection {
    pub const ALL: [SwipeDirection; 3] = [Self::Like, Self::Nope, Self::Superlike];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Nope => "nope",
            Self::Superlike => "superlike",
        }
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown swipe direction '{0}' (expected like, nope or superlike)")]
pub struct UnknownDirection(pub String);

impl FromStr for SwipeDirection {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "like" => Ok(Self::Like),
            "nope" => Ok(Self::Nope),
            "superlike" | "super" => Ok(Self::Superlike),
            other => Err(UnknownDirection(other.to_string())),
        }
    }
}

/// A product shown on one card of the deck. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub description: String,
    pub image: String,
    pub price: f64,
    pub abv: String,
    pub rating: f64,
}

/// Per-direction swipe counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub like: u32,
    pub nope: u32,
    pub superlike: u32,
}

impl Tally {
    pub fn get(&self, direction: SwipeDirection) -> u32 {
        match direction {
            SwipeDirection::Like => self.like,
            SwipeDirection::Nope => self.nope,
            SwipeDirection::Superlike => self.superlike,
        }
    }

    pub fn increment(&mut self, direction: SwipeDirection) {
        *self.slot(direction) += 1;
    }

    pub fn decrement(&mut self, direction: SwipeDirection) {
        let slot = self.slot(direction);
        debug_assert!(*slot > 0, "tally for {direction} would go negative");
        *slot = slot.saturating_sub(1);
    }

    pub fn total(&self) -> u32 {
        self.like + self.nope + self.superlike
    }

    fn slot(&mut self, direction: SwipeDirection) -> &mut u32 {
        match direction {
            SwipeDirection::Like => &mut self.like,
            SwipeDirection::Nope => &mut self.nope,
            SwipeDirection::Superlike => &mut self.superlike,
        }
    }
}

/// One committed swipe, kept for undo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub card: Card,
    pub swipe: SwipeDirection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parses_wire_names_and_alias() {
        assert_eq!("like".parse::<SwipeDirection>(), Ok(SwipeDirection::Like));
        assert_eq!(" NOPE ".parse::<SwipeDirection>(), Ok(SwipeDirection::Nope));
        assert_eq!("super".parse::<SwipeDirection>(), Ok(SwipeDirection::Superlike));
        assert!("maybe".parse::<SwipeDirection>().is_err());
    }

    #[test]
    fn direction_serializes_lowercase() {
        let json = serde_json::to_string(&SwipeDirection::Superlike).expect("json");
        assert_eq!(json, "\"superlike\"");
    }

    #[test]
    fn tally_counts_per_direction() {
        let mut tally = Tally::default();
        tally.increment(SwipeDirection::Like);
        tally.increment(SwipeDirection::Like);
        tally.increment(SwipeDirection::Nope);
        tally.decrement(SwipeDirection::Like);

        assert_eq!(tally.get(SwipeDirection::Like), 1);
        assert_eq!(tally.get(SwipeDirection::Nope), 1);
        assert_eq!(tally.get(SwipeDirection::Superlike), 0);
        assert_eq!(tally.total(), 2);
    }

    #[test]
    fn history_entry_flattens_card_fields() {
        let entry = HistoryEntry {
            card: Card {
                id: CardId::new("b1"),
                name: "Budweiser".into(),
                description: "lager".into(),
                image: "img".into(),
                price: 9.0,
                abv: "5.0%".into(),
                rating: 4.0,
            },
            swipe: SwipeDirection::Like,
        };
        let value = serde_json::to_value(&entry).expect("json");
        assert_eq!(value["id"], "b1");
        assert_eq!(value["swipe"], "like");
    }
}
