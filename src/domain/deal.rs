// src/domain/deal.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Columns requested from the `deals` table. Status is filtered on, never read back.
pub const DEAL_COLUMNS: &str =
    "id,unique_id,listing_title,price,listing_url,online_store,discovered_at,item_name,batch_id,city,state";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: i64,
    #[serde(default, deserialize_with = "text_or_number")]
    pub unique_id: Option<String>,
    pub listing_title: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    pub listing_url: Option<String>,
    pub online_store: Option<String>,
    pub discovered_at: Option<String>,
    pub item_name: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub batch_id: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl Deal {
    pub fn price(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }

    pub fn store_label(&self) -> &str {
        self.online_store.as_deref().unwrap_or("Unknown")
    }

    pub fn item_label(&self) -> &str {
        self.item_name.as_deref().unwrap_or("Item")
    }

    pub fn title_label(&self) -> &str {
        self.listing_title.as_deref().unwrap_or("Untitled")
    }

    /// "City, ST" for local pickups, "Online" otherwise.
    pub fn location_label(&self) -> String {
        match self.city.as_deref() {
            Some(city) if !city.is_empty() => {
                format!("{}, {}", city, self.state.as_deref().unwrap_or(""))
            }
            _ => "Online".to_string(),
        }
    }

    pub fn discovered(&self) -> Option<DateTime<Utc>> {
        self.discovered_at.as_deref().and_then(parse_timestamp)
    }

    /// Price formatted the way the cards show it: whole dollars stay whole.
    pub fn price_label(&self) -> String {
        let p = self.price();
        if p.fract() == 0.0 {
            format!("${}", p as i64)
        } else {
            format!("${p}")
        }
    }
}

// Ingestion writes some identifiers as integers and some as text.
fn text_or_number<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::String(s)) => Some(s),
        None | Some(Value::Null) => None,
        Some(other) => Some(other.to_string()),
    })
}

/// Lifecycle status stored on each deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealStatus {
    New,
    Saved,
    Deleted,
}

impl DealStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DealStatus::New => "new",
            DealStatus::Saved => "saved",
            DealStatus::Deleted => "deleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(DealStatus::New),
            "saved" => Some(DealStatus::Saved),
            "deleted" => Some(DealStatus::Deleted),
            _ => None,
        }
    }
}

impl fmt::Display for DealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Random,
    ItemName,
    StoreName,
    PriceAsc,
    PriceDesc,
    Newest,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::Random,
        SortKey::ItemName,
        SortKey::StoreName,
        SortKey::PriceAsc,
        SortKey::PriceDesc,
        SortKey::Newest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Random => "random",
            SortKey::ItemName => "item_name",
            SortKey::StoreName => "name",
            SortKey::PriceAsc => "price_asc",
            SortKey::PriceDesc => "price_desc",
            SortKey::Newest => "newest",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Random => "Shuffle",
            SortKey::ItemName => "Item",
            SortKey::StoreName => "Store",
            SortKey::PriceAsc => "Price: Low to High",
            SortKey::PriceDesc => "Price: High to Low",
            SortKey::Newest => "Newest",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

/// Card stack or table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Card,
    Table,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Card => "card",
            ViewMode::Table => "table",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "card" => Some(ViewMode::Card),
            "table" => Some(ViewMode::Table),
            _ => None,
        }
    }
}

/// Sorts `deals` in place. Every key except `Random` is a stable sort.
pub fn sort_deals<R: Rng + ?Sized>(deals: &mut [Deal], key: SortKey, rng: &mut R) {
    match key {
        SortKey::Random => deals.shuffle(rng),
        SortKey::ItemName => deals.sort_by(|a, b| {
            locale_compare(
                a.item_name.as_deref().unwrap_or(""),
                b.item_name.as_deref().unwrap_or(""),
            )
        }),
        SortKey::StoreName => deals.sort_by(|a, b| {
            locale_compare(
                a.online_store.as_deref().unwrap_or(""),
                b.online_store.as_deref().unwrap_or(""),
            )
        }),
        SortKey::PriceAsc => deals.sort_by(|a, b| a.price().total_cmp(&b.price())),
        SortKey::PriceDesc => deals.sort_by(|a, b| b.price().total_cmp(&a.price())),
        // Unparseable timestamps go last, keeping their relative order.
        SortKey::Newest => deals.sort_by(|a, b| match (a.discovered(), b.discovered()) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
    }
}

/// Case-insensitive first, then lowercase before uppercase on ties.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let folded = a.to_lowercase().cmp(&b.to_lowercase());
    if folded != Ordering::Equal {
        return folded;
    }
    // 'a' (0x61) sorts after 'A' (0x41) in byte order; flip it.
    b.cmp(a)
}

/// Accepts RFC 3339, or a naive date-time / date (taken as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
