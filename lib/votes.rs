//! Optimistic tracking of votes submitted but not yet confirmed on chain.
//!
//! The contract's voter lists only reflect a vote after the transaction
//! confirms. Entries here stand in for that gap so the client does not
//! re-offer a vote the user just cast. Entries expire after a fixed window
//! and are pruned on a timer; losing them is always safe, since the
//! contract rejects duplicate votes anyway.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{IssueId, VotePhase};

/// How long a locally recorded vote keeps suppressing an issue.
pub const VOTE_EXPIRY_SECS: u64 = 10 * 60;

/// Default cadence for [`VoteTracker::spawn_prune_task`].
pub const DEFAULT_PRUNE_PERIOD: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error")]
    Io(#[from] std::io::Error),
    #[error("serialization error")]
    Json(#[from] serde_json::Error),
}

/// A vote the user has submitted, keyed by issue and phase.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize,
)]
pub struct LocalVote {
    pub issue_id: IssueId,
    pub kind: VotePhase,
    pub cast_at: u64,
}

impl LocalVote {
    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.cast_at) >= VOTE_EXPIRY_SECS
    }
}

/// Clonable handle over the local vote set.
#[derive(Clone, Debug, Default)]
pub struct VoteTracker {
    votes: Arc<Mutex<Vec<LocalVote>>>,
}

impl VoteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vote, replacing any existing entry for the same issue and
    /// phase.
    pub fn record(&self, issue_id: IssueId, kind: VotePhase, now: u64) {
        let mut votes = self.votes.lock();
        votes.retain(|vote| {
            !(vote.issue_id == issue_id && vote.kind == kind)
        });
        votes.push(LocalVote {
            issue_id,
            kind,
            cast_at: now,
        });
    }

    /// Drop a recorded vote, e.g. after the transaction failed. Returns
    /// whether an entry was present.
    pub fn remove(&self, issue_id: IssueId, kind: VotePhase) -> bool {
        let mut votes = self.votes.lock();
        let before = votes.len();
        votes.retain(|vote| {
            !(vote.issue_id == issue_id && vote.kind == kind)
        });
        votes.len() != before
    }

    pub fn contains(
        &self,
        issue_id: IssueId,
        kind: VotePhase,
        now: u64,
    ) -> bool {
        self.votes.lock().iter().any(|vote| {
            vote.issue_id == issue_id
                && vote.kind == kind
                && !vote.is_expired(now)
        })
    }

    /// Drop expired entries, returning how many were removed.
    pub fn prune(&self, now: u64) -> usize {
        let mut votes = self.votes.lock();
        let before = votes.len();
        votes.retain(|vote| !vote.is_expired(now));
        before - votes.len()
    }

    /// Unexpired entries, for handing to the eligibility filter.
    pub fn snapshot(&self, now: u64) -> Vec<LocalVote> {
        self.votes
            .lock()
            .iter()
            .copied()
            .filter(|vote| !vote.is_expired(now))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.lock().is_empty()
    }

    /// Load the tracker from a JSON store file.
    ///
    /// A missing or unreadable store yields an empty tracker: optimistic
    /// state is disposable, the contract rejects duplicate votes.
    pub fn load(path: &Path) -> Self {
        let votes = match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(votes) => votes,
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        %err,
                        "corrupt local vote store, starting empty"
                    );
                    Vec::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Vec::new()
            }
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    %err,
                    "unreadable local vote store, starting empty"
                );
                Vec::new()
            }
        };
        Self {
            votes: Arc::new(Mutex::new(votes)),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let votes = self.votes.lock().clone();
        let contents = serde_json::to_string_pretty(&votes)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Prune on an interval until the handle is dropped or aborted.
    pub fn spawn_prune_task(
        &self,
        period: Duration,
    ) -> tokio::task::JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let removed = tracker.prune(unix_now());
                if removed > 0 {
                    tracing::debug!(
                        removed,
                        "pruned expired local votes"
                    );
                }
            }
        })
    }
}

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
