//! Chain-facing record types shared across the workspace.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

mod address;
mod issue;
mod ward;

pub use address::{Address, AddressParseError, Txid, TxidParseError};
pub use issue::{
    CONFIRM_THRESHOLD, ISSUE_CATEGORIES, Issue, IssueId, IssueStatus,
    NOT_RESOLVED_THRESHOLD, RESOLVED_THRESHOLD, SPAM_THRESHOLD,
    UnknownStatusCode, VotePhase,
};
pub use ward::{WardCouncillor, WardInfo};

/// A latitude/longitude pair in decimal degrees.
#[derive(
    Clone, Copy, Debug, PartialEq, Deserialize, Serialize, ToSchema,
)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}
