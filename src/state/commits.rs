// src/state/commits.rs
//
// Deal status changes are applied locally first and sent afterwards.
// Failures are kept here so the UI can show them and retry.

use crate::auth::TokenSource;
use crate::domain::swipe::Commit;
use crate::store::{DealStore, StoreError};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct FailedCommit {
    pub commit: Commit,
    pub error: String,
}

#[derive(Default)]
struct Ledger {
    in_flight: HashSet<i64>,
    failed: Vec<FailedCommit>,
}

#[derive(Clone, Default)]
pub struct CommitQueue {
    ledger: Arc<Mutex<Ledger>>,
}

impl CommitQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends `commit` on a background thread without waiting for it.
    ///
    /// Returns `None` when a commit for the same deal is already in flight.
    pub fn dispatch(
        &self,
        store: Arc<dyn DealStore>,
        bearer: Option<String>,
        commit: Commit,
    ) -> Option<JoinHandle<()>> {
        if !self.begin(commit.deal_id) {
            debug!(deal_id = commit.deal_id, "commit already in flight, skipping");
            return None;
        }
        let queue = self.clone();
        Some(std::thread::spawn(move || {
            let result = store.update_status(&bearer, commit.deal_id, commit.status);
            queue.finish(commit, result.err().map(|e| e.to_string()));
        }))
    }

    /// Sends `commit` and waits for the outcome.
    ///
    /// `Ok(false)` means a commit for the same deal was already in flight and nothing was sent.
    pub fn run_now(
        &self,
        store: &dyn DealStore,
        auth: &dyn TokenSource,
        commit: Commit,
    ) -> Result<bool, StoreError> {
        if !self.begin(commit.deal_id) {
            debug!(deal_id = commit.deal_id, "commit already in flight, not sending");
            return Ok(false);
        }
        let result = store.update_status(auth, commit.deal_id, commit.status);
        self.finish(commit, result.as_ref().err().map(ToString::to_string));
        result.map(|()| true)
    }

    /// Re-dispatches every failed commit.
    pub fn retry_failed(
        &self,
        store: Arc<dyn DealStore>,
        bearer: Option<String>,
    ) -> Vec<JoinHandle<()>> {
        let failed = std::mem::take(&mut self.lock().failed);
        failed
            .into_iter()
            .filter_map(|f| self.dispatch(Arc::clone(&store), bearer.clone(), f.commit))
            .collect()
    }

    pub fn failed(&self) -> Vec<FailedCommit> {
        self.lock().failed.clone()
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight.len()
    }

    fn begin(&self, deal_id: i64) -> bool {
        self.lock().in_flight.insert(deal_id)
    }

    fn finish(&self, commit: Commit, error: Option<String>) {
        let mut ledger = self.lock();
        ledger.in_flight.remove(&commit.deal_id);
        ledger.failed.retain(|f| f.commit.deal_id != commit.deal_id);
        if let Some(error) = error {
            warn!(deal_id = commit.deal_id, status = %commit.status, %error, "status commit failed");
            ledger.failed.push(FailedCommit { commit, error });
        }
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(|p| p.into_inner())
    }
}
