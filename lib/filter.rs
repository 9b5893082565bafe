//! Voting-eligibility filtering.
//!
//! The contract exposes full issue lists; everything here is a pure scan
//! over those records. The one subtlety is optimistic local votes: a vote
//! submitted but not yet confirmed on chain must suppress an issue exactly
//! like an on-chain voter-list entry, until the entry expires.

use crate::types::{Address, Issue, IssueStatus};
use crate::votes::LocalVote;

/// Criteria for selecting issues from a contract snapshot.
///
/// An empty status whitelist matches every status. The voted-check only
/// applies when both `user` and `exclude_user_voted` are set, and only to
/// issues whose current status is collecting votes.
#[derive(Clone, Debug, Default)]
pub struct IssueFilter {
    pub statuses: Vec<IssueStatus>,
    pub ward: Option<u32>,
    pub user: Option<Address>,
    pub exclude_user_voted: bool,
}

impl IssueFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(
        mut self,
        statuses: impl IntoIterator<Item = IssueStatus>,
    ) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn in_ward(mut self, ward: u32) -> Self {
        self.ward = Some(ward);
        self
    }

    /// Exclude issues the given user has already voted on in their
    /// current phase.
    pub fn excluding_votes_by(mut self, user: Address) -> Self {
        self.user = Some(user);
        self.exclude_user_voted = true;
        self
    }

    fn matches(&self, issue: &Issue) -> bool {
        if !self.statuses.is_empty()
            && !self.statuses.contains(&issue.status)
        {
            return false;
        }
        if self.ward.is_some_and(|ward| issue.ward != ward) {
            return false;
        }
        if self.exclude_user_voted {
            if let Some(user) = &self.user {
                if issue.has_voted(user) {
                    return false;
                }
            }
        }
        true
    }
}

/// Select issues matching the filter, preserving input order.
pub fn filter_issues<'a>(
    issues: &'a [Issue],
    filter: &IssueFilter,
) -> Vec<&'a Issue> {
    issues.iter().filter(|issue| filter.matches(issue)).collect()
}

/// [`filter_issues`], additionally suppressing issues with an unexpired
/// local vote for their current phase.
///
/// On-chain confirmation lags submission; consulting the local votes stops
/// a client from re-offering a vote the user just cast. Once an entry
/// expires the on-chain voter list is authoritative again.
pub fn eligible_issues<'a>(
    issues: &'a [Issue],
    filter: &IssueFilter,
    local_votes: &[LocalVote],
    now: u64,
) -> Vec<&'a Issue> {
    issues
        .iter()
        .filter(|issue| filter.matches(issue))
        .filter(|issue| !locally_voted(issue, local_votes, now))
        .collect()
}

fn locally_voted(
    issue: &Issue,
    local_votes: &[LocalVote],
    now: u64,
) -> bool {
    let Some(phase) = issue.status.vote_phase() else {
        return false;
    };
    local_votes.iter().any(|vote| {
        vote.issue_id == issue.id
            && vote.kind == phase
            && !vote.is_expired(now)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IssueId, VotePhase};
    use crate::votes::VOTE_EXPIRY_SECS;

    fn issue(id: u64, ward: u32, status: IssueStatus) -> Issue {
        Issue {
            id: IssueId(id),
            reporter: "0x1".parse().unwrap(),
            ward,
            category: "Street Lighting".to_string(),
            description: "lamp out".to_string(),
            latitude: "0".to_string(),
            longitude: "0".to_string(),
            status,
            confirm_votes: 0,
            spam_votes: 0,
            initial_voters: vec![],
            resolved_votes: 0,
            not_resolved_votes: 0,
            completion_voters: vec![],
            created_at: 0,
            updated_at: 0,
            completed_at: 0,
            image_cid: String::new(),
            image_filenames: vec![],
        }
    }

    fn user() -> Address {
        "0xfeed".parse().unwrap()
    }

    #[test]
    fn empty_voter_lists_return_all_matches() {
        let issues = vec![
            issue(1, 4, IssueStatus::PendingVerification),
            issue(2, 4, IssueStatus::Verified),
            issue(3, 5, IssueStatus::PendingVerification),
        ];
        let filter = IssueFilter::new()
            .with_statuses([IssueStatus::PendingVerification])
            .excluding_votes_by(user());
        let matched = filter_issues(&issues, &filter);
        assert_eq!(
            matched.iter().map(|i| i.id.0).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }

    #[test]
    fn empty_status_whitelist_matches_all_statuses() {
        let issues = vec![
            issue(1, 4, IssueStatus::Spam),
            issue(2, 4, IssueStatus::FullyResolved),
        ];
        let matched = filter_issues(&issues, &IssueFilter::new());
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn ward_filter_applies() {
        let issues = vec![
            issue(1, 4, IssueStatus::Verified),
            issue(2, 5, IssueStatus::Verified),
        ];
        let filter = IssueFilter::new().in_ward(5);
        let matched = filter_issues(&issues, &filter);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, IssueId(2));
    }

    #[test]
    fn on_chain_vote_excludes_issue_in_its_phase() {
        let mut voted = issue(1, 4, IssueStatus::PendingVerification);
        voted.initial_voters.push(user());
        let issues =
            vec![voted, issue(2, 4, IssueStatus::PendingVerification)];

        let filter = IssueFilter::new()
            .with_statuses([IssueStatus::PendingVerification])
            .excluding_votes_by(user());
        let matched = filter_issues(&issues, &filter);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, IssueId(2));
    }

    #[test]
    fn completion_phase_consults_completion_voters() {
        let mut voted =
            issue(1, 4, IssueStatus::PendingCompletionVerification);
        // A verification-phase vote does not block the completion round.
        voted.initial_voters.push(user());
        let filter = IssueFilter::new().excluding_votes_by(user());
        assert_eq!(filter_issues(&[voted.clone()], &filter).len(), 1);

        voted.completion_voters.push(user());
        assert!(filter_issues(&[voted], &filter).is_empty());
    }

    #[test]
    fn voted_check_requires_flag_and_user() {
        let mut voted = issue(1, 4, IssueStatus::PendingVerification);
        voted.initial_voters.push(user());
        let filter = IssueFilter {
            user: Some(user()),
            exclude_user_voted: false,
            ..IssueFilter::new()
        };
        assert_eq!(filter_issues(&[voted], &filter).len(), 1);
    }

    #[test]
    fn local_vote_suppresses_like_an_on_chain_vote() {
        let issues = vec![
            issue(1, 4, IssueStatus::PendingVerification),
            issue(2, 4, IssueStatus::PendingVerification),
        ];
        let filter = IssueFilter::new().excluding_votes_by(user());
        let local = vec![LocalVote {
            issue_id: IssueId(1),
            kind: VotePhase::Verification,
            cast_at: 1_000,
        }];

        let matched = eligible_issues(&issues, &filter, &local, 1_010);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, IssueId(2));
    }

    #[test]
    fn expired_local_vote_stops_suppressing() {
        let issues = vec![issue(1, 4, IssueStatus::PendingVerification)];
        let filter = IssueFilter::new().excluding_votes_by(user());
        let local = vec![LocalVote {
            issue_id: IssueId(1),
            kind: VotePhase::Verification,
            cast_at: 1_000,
        }];

        let now = 1_000 + VOTE_EXPIRY_SECS;
        assert_eq!(eligible_issues(&issues, &filter, &local, now).len(), 1);
        assert!(
            eligible_issues(&issues, &filter, &local, now - 1).is_empty()
        );
    }

    #[test]
    fn local_vote_for_other_phase_does_not_suppress() {
        let issues = vec![issue(1, 4, IssueStatus::PendingVerification)];
        let filter = IssueFilter::new().excluding_votes_by(user());
        let local = vec![LocalVote {
            issue_id: IssueId(1),
            kind: VotePhase::Completion,
            cast_at: 1_000,
        }];
        assert_eq!(
            eligible_issues(&issues, &filter, &local, 1_001).len(),
            1
        );
    }
}
