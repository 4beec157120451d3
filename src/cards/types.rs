//! Card and sales record type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque store identifier; stores hand out either numeric or text keys
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CardId {
    Int(i64),
    Text(String),
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{}", id),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for CardId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<i32> for CardId {
    fn from(id: i32) -> Self {
        Self::Int(i64::from(id))
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

/// A lightweight candidate match shown before a card group is loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: CardId,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Suggestion {
    pub fn new(id: impl Into<CardId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: None,
        }
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// A title's full record, including its complete sales history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardGroup {
    pub id: CardId,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Sales in the order the store returned them
    #[serde(default)]
    pub sold_cards: Vec<SoldCard>,
}

impl CardGroup {
    /// Number of recorded sales
    pub fn sale_count(&self) -> usize {
        self.sold_cards.len()
    }
}

/// One completed sale; `link_url` identifies it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoldCard {
    pub link_url: String,
    pub sold_date: String,
    pub price: f64,
    pub currency: String,
}

impl SoldCard {
    /// Price prefixed with its currency, two decimals (e.g. `£12.50`)
    pub fn display_price(&self) -> String {
        format!("{}{:.2}", self.currency, self.price)
    }
}
