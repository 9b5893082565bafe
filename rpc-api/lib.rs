//! RPC API
//!
//! The civic node fronts the on-chain contract: view methods proxy the
//! contract's read-only functions, submit methods build and sign the
//! corresponding entry-function transactions with the node's wallet. All
//! invariants (vote thresholds, role checks, transition legality) are
//! enforced by the contract, not here.

use jsonrpsee::{core::RpcResult, proc_macros::rpc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use civic_chain::types::{
    Address, Issue, IssueId, IssueStatus, Txid, WardCouncillor, WardInfo,
};

/// Confirmation data for a submitted transaction.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct TxInfo {
    /// None while the transaction is still in the mempool.
    pub confirmations: Option<u32>,
    pub block_height: Option<u64>,
}

#[rpc(client, server)]
pub trait Rpc {
    /// Get every issue known to the contract
    #[method(name = "get_all_issues")]
    async fn get_all_issues(&self) -> RpcResult<Vec<Issue>>;

    /// Get the issues reported in a ward
    #[method(name = "get_issues_by_ward")]
    async fn get_issues_by_ward(
        &self,
        ward: u32,
    ) -> RpcResult<Vec<Issue>>;

    /// Get a single issue by id
    #[method(name = "get_issue")]
    async fn get_issue(&self, id: IssueId) -> RpcResult<Option<Issue>>;

    /// Get all registered wards
    #[method(name = "get_all_wards")]
    async fn get_all_wards(&self) -> RpcResult<Vec<WardInfo>>;

    /// Get a single ward's registration
    #[method(name = "get_ward_info")]
    async fn get_ward_info(
        &self,
        ward: u32,
    ) -> RpcResult<Option<WardInfo>>;

    /// Get the councillor registration for an address, if any
    #[method(name = "councillor_info")]
    async fn councillor_info(
        &self,
        address: Address,
    ) -> RpcResult<Option<WardCouncillor>>;

    /// Get confirmation info for a submitted transaction
    #[method(name = "get_transaction_info")]
    async fn get_transaction_info(
        &self,
        txid: Txid,
    ) -> RpcResult<Option<TxInfo>>;

    /// Report a new issue. Returns the contract-assigned issue id
    #[method(name = "report_issue")]
    async fn report_issue(
        &self,
        ward: u32,
        category: String,
        description: String,
        latitude: String,
        longitude: String,
        image_cid: String,
        image_filenames: Vec<String>,
    ) -> RpcResult<IssueId>;

    /// Vote on a pending issue's authenticity (confirm or spam)
    #[method(name = "vote_on_issue")]
    async fn vote_on_issue(
        &self,
        id: IssueId,
        is_confirm: bool,
    ) -> RpcResult<Txid>;

    /// Vote on whether a completed issue is actually resolved
    #[method(name = "vote_on_completion")]
    async fn vote_on_completion(
        &self,
        id: IssueId,
        is_resolved: bool,
    ) -> RpcResult<Txid>;

    /// Move an issue through the councillor workflow.
    /// The contract rejects callers without an active councillor
    /// registration for the issue's ward
    #[method(name = "update_issue_status")]
    async fn update_issue_status(
        &self,
        id: IssueId,
        new_status: IssueStatus,
    ) -> RpcResult<Txid>;

    /// Register the node's account as councillor for a ward
    #[method(name = "register_councillor")]
    async fn register_councillor(&self, ward: u32) -> RpcResult<Txid>;

    /// Register a ward with centroid coordinates (admin)
    #[method(name = "register_ward")]
    async fn register_ward(
        &self,
        ward: u32,
        latitude: String,
        longitude: String,
    ) -> RpcResult<Txid>;

    /// Initialize the issue and ward registries (admin, once)
    #[method(name = "initialize_registry")]
    async fn initialize_registry(&self) -> RpcResult<Txid>;
}
