// src/state/deals.rs
//
// In-memory deal lists for one browser session.

use crate::auth::TokenSource;
use crate::domain::deal::sort_deals;
use crate::domain::swipe::{Commit, Direction, SwipeEngine, SwipePhase};
use crate::domain::{Deal, DealStatus, SortKey, ViewMode};
use crate::store::{DealStore, StoreError};
use rand::Rng;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, error, info};

pub const NO_NEW_DEALS: &str = "Come back later—there are no new deals right now.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Discover,
    Saved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Empty,
    Reloaded(usize),
}

#[derive(Debug, Default)]
pub struct DealsState {
    deals: Vec<Deal>,
    total: usize,
    loaded_status: Option<DealStatus>,
    sort: SortKey,
    view: ViewMode,
    tab: Tab,
    message: Option<String>,
    detail: Option<i64>,
    swipe: SwipeEngine,
    saved: Vec<Deal>,
    pending_delete: Option<i64>,
    /// Deals moved out of `new` this session whose change the store has not shown yet.
    acted: HashSet<i64>,
}

impl DealsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deals(&self) -> &[Deal] {
        &self.deals
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_status.is_some()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.deals.iter().any(|d| d.id == id)
    }

    /// Topmost card of the stack. Cards render in reverse, so this is the first deal.
    pub fn top(&self) -> Option<&Deal> {
        self.deals.first()
    }

    pub fn swipe_phase(&self) -> SwipePhase {
        self.swipe.phase()
    }

    /// `remaining / total`, shown only in card mode while cards remain.
    pub fn counter(&self) -> Option<(usize, usize)> {
        (self.view == ViewMode::Card && !self.deals.is_empty())
            .then_some((self.deals.len(), self.total))
    }

    /// Replaces the collection with every deal in `status`, sorted by `sort`.
    ///
    /// On failure the previous collection is left as it was.
    pub fn load<R: Rng + ?Sized>(
        &mut self,
        store: &dyn DealStore,
        auth: &dyn TokenSource,
        status: DealStatus,
        sort: SortKey,
        rng: &mut R,
    ) -> Result<(), StoreError> {
        let mut fetched = store.fetch_by_status(auth, status).map_err(|e| {
            error!(%status, error = %e, "failed to load deals");
            e
        })?;
        self.drop_acted(&mut fetched, status);
        self.sort = sort;
        self.replace(fetched, status, rng);
        Ok(())
    }

    /// Hides deals already acted on. Once the store stops listing one as `new`
    /// its commit has landed and the id is forgotten.
    fn drop_acted(&mut self, fetched: &mut Vec<Deal>, status: DealStatus) {
        if status != DealStatus::New || self.acted.is_empty() {
            return;
        }
        self.acted.retain(|id| fetched.iter().any(|d| d.id == *id));
        let before = fetched.len();
        fetched.retain(|d| !self.acted.contains(&d.id));
        if fetched.len() != before {
            debug!(hidden = before - fetched.len(), "hiding deals with unsettled commits");
        }
    }

    fn replace<R: Rng + ?Sized>(&mut self, mut fetched: Vec<Deal>, status: DealStatus, rng: &mut R) {
        sort_deals(&mut fetched, self.sort, rng);
        self.total = fetched.len();
        self.deals = fetched;
        self.loaded_status = Some(status);
        self.message = None;
        self.detail = None;
        self.rebind();
    }

    /// Changes the sort and reloads, which reshuffles `random`.
    pub fn change_sort<R: Rng + ?Sized>(
        &mut self,
        store: &dyn DealStore,
        auth: &dyn TokenSource,
        sort: SortKey,
        rng: &mut R,
    ) -> Result<(), StoreError> {
        self.load(store, auth, DealStatus::New, sort, rng)
    }

    /// Re-checks for new deals. An empty result keeps the current state and sets a message.
    pub fn refresh<R: Rng + ?Sized>(
        &mut self,
        store: &dyn DealStore,
        auth: &dyn TokenSource,
        rng: &mut R,
    ) -> Result<RefreshOutcome, StoreError> {
        let mut fetched = store
            .fetch_by_status(auth, DealStatus::New)
            .map_err(|e| {
                error!(error = %e, "failed to refresh deals");
                e
            })?;
        self.drop_acted(&mut fetched, DealStatus::New);
        if fetched.is_empty() {
            self.message = Some(NO_NEW_DEALS.to_string());
            return Ok(RefreshOutcome::Empty);
        }
        let n = fetched.len();
        info!(count = n, "new deals found on refresh");
        self.replace(fetched, DealStatus::New, rng);
        Ok(RefreshOutcome::Reloaded(n))
    }

    /// Drops `id` from the visible list right away and hands back the remote update.
    pub fn apply_terminal_action(&mut self, id: i64, status: DealStatus) -> Commit {
        self.deals.retain(|d| d.id != id);
        self.acted.insert(id);
        if self.detail == Some(id) {
            self.detail = None;
        }
        self.rebind();
        Commit {
            deal_id: id,
            status,
        }
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
    }

    /// Returns true when the discover list still needs its first load.
    pub fn switch_tab(&mut self, tab: Tab) -> bool {
        self.tab = tab;
        tab == Tab::Discover && !self.is_loaded()
    }

    fn rebind(&mut self) {
        self.swipe.bind(self.deals.first().map(|d| d.id));
    }

    // -- swipe ---------------------------------------------------------------

    /// A whole drag reported on release: `dx` is the final horizontal offset.
    pub fn swipe(&mut self, card: i64, dx: f64) -> SwipePhase {
        let phase = self.swipe.swipe(card, dx);
        if phase == SwipePhase::SnappingBack {
            self.swipe.bind(self.swipe.top());
        }
        phase
    }

    pub fn force_swipe(&mut self, direction: Direction) -> SwipePhase {
        self.swipe.force(direction)
    }

    /// Finishes a committing card once its animation has played.
    pub fn finish_swipe(&mut self) -> Option<Commit> {
        let commit = self.swipe.complete()?;
        Some(self.apply_terminal_action(commit.deal_id, commit.status))
    }

    // -- detail --------------------------------------------------------------

    pub fn open_detail(&mut self, id: i64) -> bool {
        if self.contains(id) {
            self.detail = Some(id);
            true
        } else {
            false
        }
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub fn detail(&self) -> Option<&Deal> {
        let id = self.detail?;
        self.deals.iter().find(|d| d.id == id)
    }

    /// Save or reject the deal open in the detail view.
    pub fn detail_action(&mut self, status: DealStatus) -> Option<Commit> {
        let id = self.detail.take()?;
        Some(self.apply_terminal_action(id, status))
    }

    // -- saved ---------------------------------------------------------------

    pub fn load_saved(
        &mut self,
        store: &dyn DealStore,
        auth: &dyn TokenSource,
    ) -> Result<(), StoreError> {
        self.saved = store
            .fetch_by_status(auth, DealStatus::Saved)
            .map_err(|e| {
                error!(error = %e, "failed to load saved deals");
                e
            })?;
        Ok(())
    }

    pub fn saved(&self) -> &[Deal] {
        &self.saved
    }

    /// Saved deals grouped by item name ("Other" when missing), groups in name order.
    pub fn saved_groups(&self) -> Vec<(String, Vec<&Deal>)> {
        let mut groups: BTreeMap<String, Vec<&Deal>> = BTreeMap::new();
        for deal in &self.saved {
            let key = match deal.item_name.as_deref() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => "Other".to_string(),
            };
            groups.entry(key).or_default().push(deal);
        }
        groups.into_iter().collect()
    }

    pub fn request_delete(&mut self, id: i64) {
        self.pending_delete = Some(id);
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    /// saved → deleted for the deal awaiting confirmation.
    pub fn confirm_delete(&mut self) -> Option<Commit> {
        let id = self.pending_delete.take()?;
        self.saved.retain(|d| d.id != id);
        Some(Commit {
            deal_id: id,
            status: DealStatus::Deleted,
        })
    }
}
