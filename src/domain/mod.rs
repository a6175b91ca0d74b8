pub mod config;
pub mod deal;
pub mod swipe;

pub use config::{Configuration, ConfigurationVersion, Defaults, ItemRule, Platform};
pub use deal::{Deal, DealStatus, SortKey, ViewMode};
