//! In-process mock civic node for end-to-end client tests.
//!
//! Implements the RPC surface over in-memory state with the contract's
//! observable behavior (voter lists, status moves, id assignment), so the
//! HTTP client and the client-side logic can be exercised without a chain.

use std::net::SocketAddr;
use std::sync::Arc;

use jsonrpsee::core::{RpcResult, async_trait};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObjectOwned;
use parking_lot::Mutex;

use civic_chain::types::{
    Address, Issue, IssueId, IssueStatus, Txid, WardCouncillor, WardInfo,
};
use civic_chain_rpc_api::{RpcServer, TxInfo};

fn not_found(what: &str) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(-32000, format!("{what} not found"), None::<()>)
}

#[derive(Default)]
struct MockState {
    issues: Vec<Issue>,
    wards: Vec<WardInfo>,
    councillors: Vec<(Address, WardCouncillor)>,
    next_issue_id: u64,
    tx_counter: u8,
}

impl MockState {
    fn next_txid(&mut self) -> Txid {
        self.tx_counter = self.tx_counter.wrapping_add(1);
        Txid([self.tx_counter; 32])
    }
}

/// Mock node. Submitted transactions act as the configured node account,
/// the way the real node signs with its own wallet.
#[derive(Clone)]
pub struct MockNode {
    node_address: Address,
    state: Arc<Mutex<MockState>>,
}

impl MockNode {
    pub fn new(node_address: Address) -> Self {
        Self {
            node_address,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub fn with_wards(self, wards: Vec<WardInfo>) -> Self {
        self.state.lock().wards = wards;
        self
    }

    pub fn with_issues(self, issues: Vec<Issue>) -> Self {
        {
            let mut state = self.state.lock();
            state.next_issue_id = issues
                .iter()
                .map(|issue| issue.id.0 + 1)
                .max()
                .unwrap_or(0);
            state.issues = issues;
        }
        self
    }

    pub fn with_councillor(
        self,
        address: Address,
        councillor: WardCouncillor,
    ) -> Self {
        self.state.lock().councillors.push((address, councillor));
        self
    }

    pub fn node_address(&self) -> Address {
        self.node_address
    }
}

#[async_trait]
impl RpcServer for MockNode {
    async fn get_all_issues(&self) -> RpcResult<Vec<Issue>> {
        Ok(self.state.lock().issues.clone())
    }

    async fn get_issues_by_ward(
        &self,
        ward: u32,
    ) -> RpcResult<Vec<Issue>> {
        Ok(self
            .state
            .lock()
            .issues
            .iter()
            .filter(|issue| issue.ward == ward)
            .cloned()
            .collect())
    }

    async fn get_issue(&self, id: IssueId) -> RpcResult<Option<Issue>> {
        Ok(self
            .state
            .lock()
            .issues
            .iter()
            .find(|issue| issue.id == id)
            .cloned())
    }

    async fn get_all_wards(&self) -> RpcResult<Vec<WardInfo>> {
        Ok(self.state.lock().wards.clone())
    }

    async fn get_ward_info(
        &self,
        ward: u32,
    ) -> RpcResult<Option<WardInfo>> {
        Ok(self
            .state
            .lock()
            .wards
            .iter()
            .find(|info| info.ward == ward)
            .cloned())
    }

    async fn councillor_info(
        &self,
        address: Address,
    ) -> RpcResult<Option<WardCouncillor>> {
        Ok(self
            .state
            .lock()
            .councillors
            .iter()
            .find(|(registered, _)| *registered == address)
            .map(|(_, councillor)| councillor.clone()))
    }

    async fn get_transaction_info(
        &self,
        txid: Txid,
    ) -> RpcResult<Option<TxInfo>> {
        // Every txid this mock hands out confirms instantly.
        let state = self.state.lock();
        let known = txid.0[0] != 0 && txid.0[0] <= state.tx_counter;
        Ok(known.then_some(TxInfo {
            confirmations: Some(1),
            block_height: Some(u64::from(txid.0[0])),
        }))
    }

    async fn report_issue(
        &self,
        ward: u32,
        category: String,
        description: String,
        latitude: String,
        longitude: String,
        image_cid: String,
        image_filenames: Vec<String>,
    ) -> RpcResult<IssueId> {
        let mut state = self.state.lock();
        let id = IssueId(state.next_issue_id);
        state.next_issue_id += 1;
        state.issues.push(Issue {
            id,
            reporter: self.node_address,
            ward,
            category,
            description,
            latitude,
            longitude,
            status: IssueStatus::PendingVerification,
            confirm_votes: 0,
            spam_votes: 0,
            initial_voters: vec![],
            resolved_votes: 0,
            not_resolved_votes: 0,
            completion_voters: vec![],
            created_at: 0,
            updated_at: 0,
            completed_at: 0,
            image_cid,
            image_filenames,
        });
        Ok(id)
    }

    async fn vote_on_issue(
        &self,
        id: IssueId,
        is_confirm: bool,
    ) -> RpcResult<Txid> {
        let mut state = self.state.lock();
        let voter = self.node_address;
        let issue = state
            .issues
            .iter_mut()
            .find(|issue| issue.id == id)
            .ok_or_else(|| not_found("issue"))?;
        if is_confirm {
            issue.confirm_votes += 1;
        } else {
            issue.spam_votes += 1;
        }
        issue.initial_voters.push(voter);
        Ok(state.next_txid())
    }

    async fn vote_on_completion(
        &self,
        id: IssueId,
        is_resolved: bool,
    ) -> RpcResult<Txid> {
        let mut state = self.state.lock();
        let voter = self.node_address;
        let issue = state
            .issues
            .iter_mut()
            .find(|issue| issue.id == id)
            .ok_or_else(|| not_found("issue"))?;
        if is_resolved {
            issue.resolved_votes += 1;
        } else {
            issue.not_resolved_votes += 1;
        }
        issue.completion_voters.push(voter);
        Ok(state.next_txid())
    }

    async fn update_issue_status(
        &self,
        id: IssueId,
        new_status: IssueStatus,
    ) -> RpcResult<Txid> {
        let mut state = self.state.lock();
        let issue = state
            .issues
            .iter_mut()
            .find(|issue| issue.id == id)
            .ok_or_else(|| not_found("issue"))?;
        issue.status = new_status;
        Ok(state.next_txid())
    }

    async fn register_councillor(&self, ward: u32) -> RpcResult<Txid> {
        let mut state = self.state.lock();
        let address = self.node_address;
        state.councillors.push((
            address,
            WardCouncillor {
                ward,
                is_active: true,
            },
        ));
        Ok(state.next_txid())
    }

    async fn register_ward(
        &self,
        ward: u32,
        latitude: String,
        longitude: String,
    ) -> RpcResult<Txid> {
        let mut state = self.state.lock();
        state.wards.push(WardInfo {
            ward,
            latitude,
            longitude,
            is_active: true,
        });
        Ok(state.next_txid())
    }

    async fn initialize_registry(&self) -> RpcResult<Txid> {
        Ok(self.state.lock().next_txid())
    }
}

/// Start the mock node on an ephemeral port.
pub async fn spawn(
    node: MockNode,
) -> anyhow::Result<(SocketAddr, ServerHandle)> {
    let server = Server::builder().build("127.0.0.1:0").await?;
    let addr = server.local_addr()?;
    let handle = server.start(node.into_rpc());
    Ok((addr, handle))
}

pub fn fixture_wards() -> Vec<WardInfo> {
    vec![
        WardInfo {
            ward: 1,
            latitude: "0".to_string(),
            longitude: "0".to_string(),
            is_active: true,
        },
        WardInfo {
            ward: 2,
            latitude: "10".to_string(),
            longitude: "10".to_string(),
            is_active: true,
        },
    ]
}

pub fn fixture_issue(
    id: u64,
    ward: u32,
    status: IssueStatus,
) -> Issue {
    Issue {
        id: IssueId(id),
        reporter: "0xbeef".parse().expect("fixture address"),
        ward,
        category: "Road Maintenance".to_string(),
        description: "collapsed storm drain".to_string(),
        latitude: "1".to_string(),
        longitude: "1".to_string(),
        status,
        confirm_votes: 0,
        spam_votes: 0,
        initial_voters: vec![],
        resolved_votes: 0,
        not_resolved_votes: 0,
        completion_voters: vec![],
        created_at: 1_700_000_000,
        updated_at: 1_700_000_000,
        completed_at: 0,
        image_cid: String::new(),
        image_filenames: vec![],
    }
}
