//! Per-ward dashboard numbers derived from an issue snapshot.

use itertools::Itertools;
use serde::Serialize;

use crate::types::{Issue, IssueStatus};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WardMetrics {
    pub total: usize,
    pub resolved: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub resolution_rate: f64,
}

/// Summarize a slice of issues, typically pre-filtered to one ward.
pub fn ward_metrics(issues: &[Issue]) -> WardMetrics {
    let by_status = issues.iter().counts_by(|issue| issue.status);
    let count = |status: IssueStatus| {
        by_status.get(&status).copied().unwrap_or(0)
    };

    let total = issues.len();
    let resolved = count(IssueStatus::FullyResolved);
    let in_progress =
        count(IssueStatus::InProgress) + count(IssueStatus::Acknowledged);
    let pending = count(IssueStatus::PendingVerification)
        + count(IssueStatus::Verified);
    let resolution_rate = if total > 0 {
        resolved as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    WardMetrics {
        total,
        resolved,
        in_progress,
        pending,
        resolution_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IssueId;

    fn issue(id: u64, status: IssueStatus) -> Issue {
        Issue {
            id: IssueId(id),
            reporter: "0x1".parse().unwrap(),
            ward: 1,
            category: "Garbage Collection".to_string(),
            description: "overflowing bins".to_string(),
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

    #[test]
    fn empty_input_yields_zeroes() {
        assert_eq!(ward_metrics(&[]), WardMetrics::default());
    }

    #[test]
    fn buckets_and_rate() {
        let issues = vec![
            issue(1, IssueStatus::PendingVerification),
            issue(2, IssueStatus::Verified),
            issue(3, IssueStatus::Acknowledged),
            issue(4, IssueStatus::InProgress),
            issue(5, IssueStatus::FullyResolved),
            issue(6, IssueStatus::Spam),
            issue(7, IssueStatus::Completed),
            issue(8, IssueStatus::FullyResolved),
        ];
        let metrics = ward_metrics(&issues);
        assert_eq!(metrics.total, 8);
        assert_eq!(metrics.resolved, 2);
        assert_eq!(metrics.in_progress, 2);
        assert_eq!(metrics.pending, 2);
        assert!((metrics.resolution_rate - 25.0).abs() < 1e-9);
    }
}
