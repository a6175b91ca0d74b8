pub mod config_form;

use crate::config_api::{LocSegment, ValidationError};
use crate::domain::Platform;
use std::collections::BTreeMap;

pub use config_form::{ConfigForm, ItemForm};

/// A control on the configuration editor that can carry an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldId {
    AllowedStates,
    Platform(Platform),
    ItemName(usize),
    ItemAliases(usize),
    ItemMinPrice(usize),
    ItemMaxPrice(usize),
    ItemExclude(usize),
    ItemStoreOptions(usize),
    /// Errors that point at no specific control.
    Form,
}

impl FieldId {
    /// `name` attribute of the matching form control.
    pub fn input_name(self) -> String {
        match self {
            FieldId::AllowedStates => "allowed_states".into(),
            FieldId::Platform(p) => p.key().into(),
            FieldId::ItemName(i) => format!("item-name-{i}"),
            FieldId::ItemAliases(i) => format!("item-aliases-{i}"),
            FieldId::ItemMinPrice(i) => format!("item-min-price-{i}"),
            FieldId::ItemMaxPrice(i) => format!("item-max-price-{i}"),
            FieldId::ItemExclude(i) => format!("item-exclude-{i}"),
            FieldId::ItemStoreOptions(i) => format!("item-store-options-{i}"),
            FieldId::Form => "form".into(),
        }
    }

    /// `id` of the element that displays this field's error.
    pub fn error_id(self) -> String {
        match self {
            FieldId::AllowedStates => "allowed-states-error".into(),
            other => format!("{}-error", other.input_name()),
        }
    }

    /// Maps a validation `loc` such as `["body","items",0,"name"]` to a control.
    pub fn from_loc(loc: &[LocSegment]) -> Option<FieldId> {
        let path = match loc.first() {
            Some(LocSegment::Key(k)) if k == "body" => &loc[1..],
            _ => loc,
        };
        match path {
            [LocSegment::Key(section), LocSegment::Key(field), ..] if section == "defaults" => {
                if field == "allowed_states" {
                    Some(FieldId::AllowedStates)
                } else {
                    Platform::from_key(field).map(FieldId::Platform)
                }
            }
            [LocSegment::Key(section), LocSegment::Index(i), LocSegment::Key(field), ..]
                if section == "items" =>
            {
                let i = *i as usize;
                match field.as_str() {
                    "name" => Some(FieldId::ItemName(i)),
                    "aliases" => Some(FieldId::ItemAliases(i)),
                    "min_price" => Some(FieldId::ItemMinPrice(i)),
                    "max_price" => Some(FieldId::ItemMaxPrice(i)),
                    "exclude_keywords" => Some(FieldId::ItemExclude(i)),
                    "store_options" => Some(FieldId::ItemStoreOptions(i)),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Error messages keyed by the control they belong to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors {
    errors: BTreeMap<FieldId, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes each 422 entry to its control; unknown locations land on `FieldId::Form`.
    pub fn from_validation(errors: &[ValidationError]) -> Self {
        let mut out = Self::new();
        for e in errors {
            match FieldId::from_loc(&e.loc) {
                Some(field) => out.insert(field, e.msg.clone()),
                None => {
                    let loc: Vec<String> = e.loc.iter().map(ToString::to_string).collect();
                    out.insert(FieldId::Form, format!("{}: {}", loc.join("."), e.msg));
                }
            }
        }
        out
    }

    /// Keeps the first message per field.
    pub fn insert(&mut self, field: FieldId, msg: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| msg.into());
    }

    pub fn get(&self, field: FieldId) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.errors.keys().copied()
    }
}
