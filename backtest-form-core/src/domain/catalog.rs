//! Reference catalogs: the coins and indicators offered by the service.
//!
//! Catalog entries are read-only. They are replaced wholesale by the loader
//! and only ever looked up by the presentation layer.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque identifier assigned by the reference-data service.
///
/// The service may send ids as JSON strings or numbers; both are kept as text
/// so they can be written into a parameter row unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CatalogId(pub String);

impl CatalogId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for CatalogId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<'de> Deserialize<'de> for CatalogId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(i64),
            Float(f64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => CatalogId(s),
            RawId::Int(n) => CatalogId(n.to_string()),
            RawId::Float(n) => CatalogId(n.to_string()),
        })
    }
}

/// A tradable coin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub id: CatalogId,
    pub symbol: String,
    pub name: String,
}

impl Coin {
    /// Label shown in the coin selector, e.g. `Bitcoin (BTC)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.symbol)
    }
}

/// A selectable indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    pub id: CatalogId,
    pub name: String,
}

/// Both catalogs as currently known to the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalogs {
    pub coins: Vec<Coin>,
    pub indicators: Vec<Indicator>,
}

impl Catalogs {
    /// Find a coin by the symbol stored in the form's `coin` field.
    pub fn coin_by_symbol(&self, symbol: &str) -> Option<&Coin> {
        self.coins.iter().find(|c| c.symbol == symbol)
    }

    /// Find an indicator by the id stored in a parameter row.
    pub fn indicator_by_id(&self, id: &str) -> Option<&Indicator> {
        self.indicators.iter().find(|i| i.id.as_str() == id)
    }

    pub fn coin_position(&self, symbol: &str) -> Option<usize> {
        self.coins.iter().position(|c| c.symbol == symbol)
    }

    pub fn indicator_position(&self, id: &str) -> Option<usize> {
        self.indicators.iter().position(|i| i.id.as_str() == id)
    }
}
