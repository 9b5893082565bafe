//! The full citizen voting loop: report, vote, eligibility with the
//! optimistic local tracker, councillor workflow.

use civic_chain::filter::{IssueFilter, eligible_issues};
use civic_chain::types::{Address, IssueId, IssueStatus, VotePhase};
use civic_chain::votes::VoteTracker;
use civic_chain_integration_tests::{MockNode, fixture_issue, spawn};
use civic_chain_rpc_api::RpcClient;
use jsonrpsee::http_client::HttpClientBuilder;

fn node_address() -> Address {
    "0xc0ffee".parse().unwrap()
}

#[tokio::test]
async fn reported_issue_starts_pending_verification() -> anyhow::Result<()>
{
    let node = MockNode::new(node_address());
    let (addr, handle) = spawn(node).await?;
    let client =
        HttpClientBuilder::default().build(format!("http://{addr}"))?;

    let id = client
        .report_issue(
            3,
            "Street Lighting".to_string(),
            "dark stretch near the park".to_string(),
            "12.97".to_string(),
            "77.59".to_string(),
            String::new(),
            vec![],
        )
        .await?;

    let issue = client.get_issue(id).await?.unwrap();
    assert_eq!(issue.status, IssueStatus::PendingVerification);
    assert_eq!(issue.ward, 3);
    assert!(issue.initial_voters.is_empty());

    handle.stop()?;
    Ok(())
}

#[tokio::test]
async fn confirmed_vote_lands_in_the_voter_list() -> anyhow::Result<()> {
    let node = MockNode::new(node_address()).with_issues(vec![
        fixture_issue(0, 1, IssueStatus::PendingVerification),
    ]);
    let voter = node.node_address();
    let (addr, handle) = spawn(node).await?;
    let client =
        HttpClientBuilder::default().build(format!("http://{addr}"))?;

    client.vote_on_issue(IssueId(0), true).await?;

    let issue = client.get_issue(IssueId(0)).await?.unwrap();
    assert_eq!(issue.confirm_votes, 1);
    assert_eq!(issue.initial_voters, vec![voter]);

    // Once confirmed on chain, the filter excludes it without any local
    // tracker help.
    let issues = client.get_all_issues().await?;
    let filter = IssueFilter::new().excluding_votes_by(voter);
    assert!(eligible_issues(&issues, &filter, &[], 0).is_empty());

    handle.stop()?;
    Ok(())
}

#[tokio::test]
async fn local_vote_bridges_the_confirmation_gap() -> anyhow::Result<()> {
    let node = MockNode::new(node_address()).with_issues(vec![
        fixture_issue(0, 1, IssueStatus::PendingVerification),
        fixture_issue(1, 1, IssueStatus::PendingVerification),
    ]);
    let (addr, handle) = spawn(node).await?;
    let client =
        HttpClientBuilder::default().build(format!("http://{addr}"))?;

    // A vote cast by some other account: the chain's voter list never
    // mentions this user, so only the local tracker can suppress it.
    let user: Address = "0xa11ce".parse()?;
    let dir = tempfile::tempdir()?;
    let store = dir.path().join("voted-issues.json");

    let tracker = VoteTracker::new();
    tracker.record(IssueId(0), VotePhase::Verification, 1_000);
    tracker.save(&store)?;

    let issues = client.get_all_issues().await?;
    let filter = IssueFilter::new().excluding_votes_by(user);

    let reloaded = VoteTracker::load(&store);
    let local = reloaded.snapshot(1_010);
    let eligible = eligible_issues(&issues, &filter, &local, 1_010);
    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0].id, IssueId(1));

    // After the expiry window the tracker stops interfering.
    let stale = reloaded.snapshot(1_000 + 600);
    let eligible = eligible_issues(&issues, &filter, &stale, 1_000 + 600);
    assert_eq!(eligible.len(), 2);

    handle.stop()?;
    Ok(())
}

#[tokio::test]
async fn completion_round_uses_its_own_voter_list() -> anyhow::Result<()> {
    let node = MockNode::new(node_address()).with_issues(vec![
        fixture_issue(0, 1, IssueStatus::PendingCompletionVerification),
    ]);
    let voter = node.node_address();
    let (addr, handle) = spawn(node).await?;
    let client =
        HttpClientBuilder::default().build(format!("http://{addr}"))?;

    client.vote_on_completion(IssueId(0), true).await?;
    let issue = client.get_issue(IssueId(0)).await?.unwrap();
    assert_eq!(issue.resolved_votes, 1);
    assert_eq!(issue.completion_voters, vec![voter]);
    assert!(issue.initial_voters.is_empty());

    handle.stop()?;
    Ok(())
}

#[tokio::test]
async fn councillor_workflow_moves_status() -> anyhow::Result<()> {
    let node = MockNode::new(node_address())
        .with_issues(vec![fixture_issue(0, 1, IssueStatus::Verified)]);
    let (addr, handle) = spawn(node).await?;
    let client =
        HttpClientBuilder::default().build(format!("http://{addr}"))?;

    for status in [
        IssueStatus::Acknowledged,
        IssueStatus::InProgress,
        IssueStatus::Completed,
    ] {
        let current =
            client.get_issue(IssueId(0)).await?.unwrap().status;
        assert!(current.councillor_transitions().contains(&status));
        client.update_issue_status(IssueId(0), status).await?;
    }

    let issue = client.get_issue(IssueId(0)).await?.unwrap();
    assert_eq!(issue.status, IssueStatus::Completed);

    handle.stop()?;
    Ok(())
}
