// src/domain/config.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form JSON object used for platform settings and store options.
pub type JsonObject = Map<String, Value>;

/// Marketplaces the scanner knows how to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    Facebook,
    Craigslist,
    Ebay,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Facebook, Platform::Craigslist, Platform::Ebay];

    /// Key used both in the JSON document and as the form field name.
    pub fn key(self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Craigslist => "craigslist",
            Platform::Ebay => "ebay",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Craigslist => "Craigslist",
            Platform::Ebay => "eBay",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default)]
    pub allowed_states: Vec<String>,
    #[serde(default)]
    pub facebook: JsonObject,
    #[serde(default)]
    pub craigslist: JsonObject,
    #[serde(default)]
    pub ebay: JsonObject,
}

impl Defaults {
    pub fn platform(&self, platform: Platform) -> &JsonObject {
        match platform {
            Platform::Facebook => &self.facebook,
            Platform::Craigslist => &self.craigslist,
            Platform::Ebay => &self.ebay,
        }
    }

    pub fn platform_mut(&mut self, platform: Platform) -> &mut JsonObject {
        match platform {
            Platform::Facebook => &mut self.facebook,
            Platform::Craigslist => &mut self.craigslist,
            Platform::Ebay => &mut self.ebay,
        }
    }
}

/// One item the scanner hunts for.
///
/// `min_price` and `max_price` are inclusive and independently optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemRule {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
    #[serde(default)]
    pub store_options: JsonObject,
}

impl ItemRule {
    pub fn price_range_label(&self) -> String {
        match (self.min_price, self.max_price) {
            (Some(lo), Some(hi)) => format!("${lo} – ${hi}"),
            (Some(lo), None) => format!("${lo}+"),
            (None, Some(hi)) => format!("up to ${hi}"),
            (None, None) => "Any price".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Configuration {
    pub defaults: Defaults,
    #[serde(default)]
    pub items: Vec<ItemRule>,
}

/// Immutable snapshot as stored by the configuration API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationVersion {
    pub version: i64,
    pub config_data: Configuration,
}
