pub mod supabase;

use crate::auth::TokenSource;
use crate::domain::{Deal, DealStatus};
use thiserror::Error;

pub use supabase::SupabaseStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("data service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// The hosted `deals` table.
pub trait DealStore: Send + Sync {
    /// Every deal with `status`, projected to the columns in `DEAL_COLUMNS`.
    fn fetch_by_status(
        &self,
        auth: &dyn TokenSource,
        status: DealStatus,
    ) -> Result<Vec<Deal>, StoreError>;

    fn update_status(
        &self,
        auth: &dyn TokenSource,
        id: i64,
        status: DealStatus,
    ) -> Result<(), StoreError>;
}
