use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A watchlist entry with the last quote seen for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub symbol: String,

    /// Display name; defaults to the symbol
    pub name: String,

    pub last_price: Option<Decimal>,
    pub last_change: Option<String>,
    pub last_change_amount: Option<Decimal>,
    pub added_at: DateTime<Utc>,
}

/// Add-to-watchlist request as received at the boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FavoriteRequest {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl FavoriteRequest {
    pub fn new(symbol: &str, name: Option<&str>) -> Self {
        Self {
            symbol: Some(symbol.to_string()),
            name: name.map(str::to_string),
        }
    }
}

/// A favorite as shown to the user, with the freshest figures available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteView {
    pub symbol: String,
    pub name: String,
    pub price: Decimal,
    pub change: String,
    pub change_amount: Decimal,
    pub added_at: DateTime<Utc>,

    /// True when the quote could not be refreshed and stored values are shown.
    pub stale: bool,
}
