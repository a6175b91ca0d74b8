// src/forms/config_form.rs
//
// The configuration editor posts plain form fields; this turns them into a
// typed `Configuration` or a set of field errors, never a half-parsed value.

use crate::domain::config::JsonObject;
use crate::domain::{Configuration, Defaults, ItemRule, Platform};
use crate::forms::{FieldErrors, FieldId};
use serde_json::Value;
use std::collections::BTreeMap;

/// Editor action carried by the submit button that was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorOp {
    Save,
    AddItem,
    RemoveItem(usize),
}

impl EditorOp {
    fn parse(raw: &str) -> Self {
        if raw == "add-item" {
            return EditorOp::AddItem;
        }
        raw.strip_prefix("remove-item-")
            .and_then(|i| i.parse().ok())
            .map(EditorOp::RemoveItem)
            .unwrap_or(EditorOp::Save)
    }
}

/// Raw editor values, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigForm {
    pub allowed_states: String,
    pub facebook: String,
    pub craigslist: String,
    pub ebay: String,
    pub items: Vec<ItemForm>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemForm {
    pub name: String,
    pub aliases: String,
    pub min_price: String,
    pub max_price: String,
    pub exclude_keywords: String,
    pub store_options: String,
}

impl ConfigForm {
    /// Pre-fills the editor from an existing configuration.
    pub fn from_config(config: &Configuration) -> Self {
        let d = &config.defaults;
        Self {
            allowed_states: d.allowed_states.join(", "),
            facebook: pretty_object(&d.facebook),
            craigslist: pretty_object(&d.craigslist),
            ebay: pretty_object(&d.ebay),
            items: config
                .items
                .iter()
                .map(|item| ItemForm {
                    name: item.name.clone(),
                    aliases: item.aliases.join(", "),
                    min_price: item.min_price.map(|p| p.to_string()).unwrap_or_default(),
                    max_price: item.max_price.map(|p| p.to_string()).unwrap_or_default(),
                    exclude_keywords: item.exclude_keywords.join(", "),
                    store_options: pretty_object(&item.store_options),
                })
                .collect(),
        }
    }

    /// Reads an `application/x-www-form-urlencoded` body.
    pub fn from_urlencoded(body: &[u8]) -> (Self, EditorOp) {
        let mut form = ConfigForm::default();
        let mut op = EditorOp::Save;
        let mut items: BTreeMap<usize, ItemForm> = BTreeMap::new();

        for (key, value) in url::form_urlencoded::parse(body) {
            let value = value.into_owned();
            match key.as_ref() {
                "op" => op = EditorOp::parse(&value),
                "allowed_states" => form.allowed_states = value,
                "facebook" => form.facebook = value,
                "craigslist" => form.craigslist = value,
                "ebay" => form.ebay = value,
                other => {
                    let Some((field, index)) = item_field(other) else {
                        continue;
                    };
                    let item = items.entry(index).or_default();
                    match field {
                        "name" => item.name = value,
                        "aliases" => item.aliases = value,
                        "min-price" => item.min_price = value,
                        "max-price" => item.max_price = value,
                        "exclude" => item.exclude_keywords = value,
                        "store-options" => item.store_options = value,
                        _ => {}
                    }
                }
            }
        }

        // Indices can have gaps after removals; order is what matters.
        form.items = items.into_values().collect();
        (form, op)
    }

    pub fn apply(&mut self, op: EditorOp) {
        match op {
            EditorOp::Save => {}
            EditorOp::AddItem => self.items.push(ItemForm::default()),
            EditorOp::RemoveItem(i) => {
                if i < self.items.len() {
                    self.items.remove(i);
                }
            }
        }
    }

    /// Parses every field; any malformed one rejects the whole form.
    pub fn to_config(&self) -> Result<Configuration, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut defaults = Defaults {
            allowed_states: split_list(&self.allowed_states)
                .into_iter()
                .map(|s| s.to_uppercase())
                .collect(),
            ..Default::default()
        };

        for platform in Platform::ALL {
            let raw = match platform {
                Platform::Facebook => &self.facebook,
                Platform::Craigslist => &self.craigslist,
                Platform::Ebay => &self.ebay,
            };
            match parse_object(raw) {
                Ok(obj) => *defaults.platform_mut(platform) = obj,
                Err(msg) => errors.insert(
                    FieldId::Platform(platform),
                    format!("Invalid JSON in {} settings: {msg}", platform.label()),
                ),
            }
        }

        let mut items = Vec::with_capacity(self.items.len());
        for (i, raw) in self.items.iter().enumerate() {
            let min_price = parse_price(&raw.min_price)
                .map_err(|msg| errors.insert(FieldId::ItemMinPrice(i), msg));
            let max_price = parse_price(&raw.max_price)
                .map_err(|msg| errors.insert(FieldId::ItemMaxPrice(i), msg));
            let store_options = parse_object(&raw.store_options).map_err(|msg| {
                errors.insert(
                    FieldId::ItemStoreOptions(i),
                    format!("Invalid JSON in Item {} store options: {msg}", i + 1),
                )
            });

            if let (Ok(min_price), Ok(max_price), Ok(store_options)) =
                (min_price, max_price, store_options)
            {
                items.push(ItemRule {
                    name: raw.name.trim().to_string(),
                    aliases: split_list(&raw.aliases),
                    min_price,
                    max_price,
                    exclude_keywords: split_list(&raw.exclude_keywords),
                    store_options,
                });
            }
        }

        if errors.is_empty() {
            Ok(Configuration { defaults, items })
        } else {
            Err(errors)
        }
    }
}

/// `item-min-price-3` -> `("min-price", 3)`.
fn item_field(key: &str) -> Option<(&str, usize)> {
    let rest = key.strip_prefix("item-")?;
    let (field, index) = rest.rsplit_once('-')?;
    Some((field, index.parse().ok()?))
}

/// Comma or newline separated, blanks dropped.
fn split_list(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_object(raw: &str) -> Result<JsonObject, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(JsonObject::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(obj)) => Ok(obj),
        Ok(_) => Err("expected a JSON object".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_price(raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(p) if p.is_finite() => Ok(Some(p)),
        _ => Err(format!("{raw:?} is not a number")),
    }
}

fn pretty_object(obj: &JsonObject) -> String {
    serde_json::to_string_pretty(obj).unwrap_or_else(|_| "{}".to_string())
}
