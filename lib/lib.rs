//! Client-side library for the CivicChain issue-reporting platform.
//!
//! The contract owns all durable state and enforces vote thresholds, role
//! checks, and status transitions. This crate holds everything a client
//! needs around that: the chain-facing record types, the
//! voting-eligibility filter with its optimistic local-vote overlay, the
//! nearest-ward lookup, pre-upload validation, and the pinning client for
//! issue photos.

pub mod filter;
pub mod geo;
pub mod metrics;
pub mod pinning;
pub mod types;
pub mod validation;
pub mod votes;

pub use filter::{IssueFilter, eligible_issues, filter_issues};
pub use geo::nearest_ward;
pub use metrics::{WardMetrics, ward_metrics};
pub use votes::{LocalVote, VOTE_EXPIRY_SECS, VoteTracker};
