use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{Address, GeoPoint};

/// Votes required before the contract moves an issue out of a voting
/// status. Mirrors the on-chain constants; the contract is the enforcement
/// point, these exist for display and progress hints.
pub const CONFIRM_THRESHOLD: u64 = 3;
pub const SPAM_THRESHOLD: u64 = 3;
pub const RESOLVED_THRESHOLD: u64 = 3;
pub const NOT_RESOLVED_THRESHOLD: u64 = 3;

/// Suggested report categories. The contract stores the category as a free
/// string, so anything outside this list is also valid.
pub const ISSUE_CATEGORIES: [&str; 7] = [
    "Road Maintenance",
    "Street Lighting",
    "Garbage Collection",
    "Water Supply",
    "Public Safety",
    "Parks & Recreation",
    "Traffic Management",
];

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
    Deserialize,
    Serialize,
    ToSchema,
)]
pub struct IssueId(pub u64);

impl IssueId {
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for IssueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for IssueId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

#[derive(Debug, Error)]
#[error("unknown issue status code {0}")]
pub struct UnknownStatusCode(pub u8);

/// Issue lifecycle as the contract encodes it.
///
/// The numeric codes are the contract's; the ordered workflow is
/// PendingVerification through FullyResolved, with Spam as the terminal
/// state for reports voted down during verification.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
    strum::FromRepr,
)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[repr(u8)]
#[serde(into = "u8", try_from = "u8")]
pub enum IssueStatus {
    #[strum(serialize = "Pending Verification")]
    PendingVerification = 0,
    #[strum(serialize = "Verified")]
    Verified = 1,
    #[strum(serialize = "Acknowledged")]
    Acknowledged = 2,
    #[strum(serialize = "In Progress")]
    InProgress = 3,
    #[strum(serialize = "Completed")]
    Completed = 4,
    #[strum(serialize = "Pending Completion Verification")]
    PendingCompletionVerification = 5,
    #[strum(serialize = "Fully Resolved")]
    FullyResolved = 6,
    #[strum(serialize = "Spam")]
    Spam = 7,
}

impl From<IssueStatus> for u8 {
    fn from(status: IssueStatus) -> u8 {
        status as u8
    }
}

impl TryFrom<u8> for IssueStatus {
    type Error = UnknownStatusCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_repr(code).ok_or(UnknownStatusCode(code))
    }
}

impl IssueStatus {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(code: u8) -> Option<Self> {
        Self::from_repr(code)
    }

    /// No further transitions exist from these states.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::FullyResolved | Self::Spam)
    }

    /// Statuses a ward councillor may move this issue to.
    ///
    /// Citizen voting drives every other transition through the contract's
    /// thresholds, so only the three manual workflow steps appear here.
    pub fn councillor_transitions(self) -> &'static [IssueStatus] {
        match self {
            Self::Verified => &[Self::Acknowledged],
            Self::Acknowledged => &[Self::InProgress],
            Self::InProgress => &[Self::Completed],
            _ => &[],
        }
    }

    /// Which community vote, if any, this status is collecting.
    pub fn vote_phase(self) -> Option<VotePhase> {
        match self {
            Self::PendingVerification => Some(VotePhase::Verification),
            Self::PendingCompletionVerification => {
                Some(VotePhase::Completion)
            }
            _ => None,
        }
    }
}

/// The two community-vote rounds an issue goes through.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VotePhase {
    Verification,
    Completion,
}

/// A reported civic issue as returned by the contract's view functions.
///
/// Coordinates are kept as the decimal strings the contract stores; parsing
/// happens at the geo boundary (`coordinates`).
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct Issue {
    pub id: IssueId,
    #[schema(value_type = String)]
    pub reporter: Address,
    pub ward: u32,
    pub category: String,
    pub description: String,
    pub latitude: String,
    pub longitude: String,
    #[schema(value_type = u8)]
    pub status: IssueStatus,
    pub confirm_votes: u64,
    pub spam_votes: u64,
    #[schema(value_type = Vec<String>)]
    pub initial_voters: Vec<Address>,
    pub resolved_votes: u64,
    pub not_resolved_votes: u64,
    #[schema(value_type = Vec<String>)]
    pub completion_voters: Vec<Address>,
    pub created_at: u64,
    pub updated_at: u64,
    /// Unix seconds; the contract writes 0 until completion.
    pub completed_at: u64,
    pub image_cid: String,
    pub image_filenames: Vec<String>,
}

impl Issue {
    /// The voter list for the given phase.
    pub fn voters_for(&self, phase: VotePhase) -> &[Address] {
        match phase {
            VotePhase::Verification => &self.initial_voters,
            VotePhase::Completion => &self.completion_voters,
        }
    }

    /// Whether `address` has already voted in this issue's current phase.
    ///
    /// Always false for statuses that are not collecting votes.
    pub fn has_voted(&self, address: &Address) -> bool {
        self.status
            .vote_phase()
            .is_some_and(|phase| self.voters_for(phase).contains(address))
    }

    pub fn coordinates(&self) -> Option<GeoPoint> {
        let latitude = self.latitude.trim().parse().ok()?;
        let longitude = self.longitude.trim().parse().ok()?;
        Some(GeoPoint {
            latitude,
            longitude,
        })
    }

    pub fn completion_time(&self) -> Option<u64> {
        (self.completed_at != 0).then_some(self.completed_at)
    }

    pub fn has_images(&self) -> bool {
        !self.image_cid.is_empty() && !self.image_filenames.is_empty()
    }
}
