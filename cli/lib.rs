use std::{
    net::Ipv4Addr,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{ArgAction, Parser, Subcommand};
use http::HeaderMap;
use itertools::Itertools as _;
use jsonrpsee::{core::client::ClientT, http_client::HttpClientBuilder};
use tracing_subscriber::layer::SubscriberExt as _;

use civic_chain::{
    filter::{IssueFilter, eligible_issues, filter_issues},
    geo::nearest_ward,
    metrics::ward_metrics,
    pinning::{PinningClient, PinningConfig},
    types::{
        Address, GeoPoint, Issue, IssueId, IssueStatus, Txid, VotePhase,
    },
    validation::{
        ImageFile, validate_image_files, validate_report_input,
    },
    votes::{VoteTracker, unix_now},
};
use civic_chain_rpc_api::RpcClient;
use url::{Host, Url};

#[derive(Clone, Debug, Subcommand)]
#[command(arg_required_else_help(true))]
pub enum Command {
    /// Check councillor registration for an address
    CouncillorStatus {
        address: Address,
    },
    /// List the issues a user can still vote on, consulting both the
    /// on-chain voter lists and votes recorded locally but not yet
    /// confirmed
    EligibleIssues {
        #[arg(long)]
        user: Address,
        #[arg(long)]
        ward: Option<u32>,
        /// Restrict to one vote round; both when omitted
        #[arg(long, value_enum)]
        phase: Option<VotePhase>,
    },
    /// Drop a locally recorded vote, e.g. after its transaction failed
    ForgetVote {
        issue_id: IssueId,
        #[arg(long, value_enum)]
        phase: VotePhase,
    },
    /// Get a single issue
    GetIssue {
        issue_id: IssueId,
    },
    /// Get confirmation info for a submitted transaction
    GetTransactionInfo {
        txid: Txid,
    },
    /// Initialize the issue and ward registries (admin, once)
    InitializeRegistry,
    /// List issues, optionally scoped to a ward and/or status
    ListIssues {
        #[arg(long)]
        ward: Option<u32>,
        #[arg(long, value_enum)]
        status: Option<IssueStatus>,
    },
    /// List registered wards
    ListWards,
    /// Find the active ward nearest to a coordinate
    NearestWard {
        #[arg(long)]
        latitude: f64,
        #[arg(long)]
        longitude: f64,
    },
    /// Register the node's account as councillor for a ward
    RegisterCouncillor {
        ward: u32,
    },
    /// Register a ward with centroid coordinates (admin)
    RegisterWard {
        ward: u32,
        #[arg(long)]
        latitude: String,
        #[arg(long)]
        longitude: String,
    },
    /// Report a new issue. Images are validated and pinned first; the
    /// ward is derived from the coordinates when not given
    ReportIssue {
        #[arg(long)]
        ward: Option<u32>,
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        latitude: String,
        #[arg(long)]
        longitude: String,
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },
    /// Verify pinning-service credentials
    TestPinning,
    /// Move an issue through the councillor workflow
    UpdateStatus {
        issue_id: IssueId,
        #[arg(value_enum)]
        status: IssueStatus,
    },
    /// Vote on whether a completed issue is actually resolved
    VoteCompletion {
        issue_id: IssueId,
        #[arg(long, action = ArgAction::Set)]
        resolved: bool,
    },
    /// Vote on a pending issue's authenticity
    VoteIssue {
        issue_id: IssueId,
        #[arg(long, action = ArgAction::Set)]
        confirm: bool,
    },
    /// Dashboard metrics for a ward
    WardMetrics {
        ward: u32,
    },
}

const DEFAULT_RPC_HOST: Host = Host::Ipv4(Ipv4Addr::LOCALHOST);

const DEFAULT_RPC_PORT: u16 = 9545;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    /// Host used for requests to the RPC server
    #[arg(default_value_t = DEFAULT_RPC_HOST, long, value_parser = Host::parse)]
    pub rpc_host: Host,
    /// Port used for requests to the RPC server
    #[arg(default_value_t = DEFAULT_RPC_PORT, long)]
    pub rpc_port: u16,
    /// Timeout for RPC requests in seconds.
    #[arg(default_value_t = DEFAULT_TIMEOUT_SECS, long = "timeout")]
    timeout_secs: u64,
    /// Path to the local optimistic-vote store
    #[arg(long)]
    pub vote_store: Option<PathBuf>,
    #[arg(short, long, help = "Enable verbose HTTP output")]
    pub verbose: bool,
}

impl Cli {
    fn rpc_url(&self) -> url::Url {
        Url::parse(&format!("http://{}:{}", self.rpc_host, self.rpc_port))
            .unwrap()
    }

    fn vote_store_path(&self) -> PathBuf {
        self.vote_store.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("civic-chain")
                .join("voted-issues.json")
        })
    }
}

fn summarize(issue: &Issue) -> String {
    let preview = if issue.description.len() > 50 {
        format!("{}...", &issue.description[..50])
    } else {
        issue.description.clone()
    };
    format!(
        "  #{} [ward {}] {}: {} ({})",
        issue.id, issue.ward, issue.category, preview, issue.status
    )
}

fn statuses_for_phase(phase: Option<VotePhase>) -> Vec<IssueStatus> {
    match phase {
        Some(VotePhase::Verification) => {
            vec![IssueStatus::PendingVerification]
        }
        Some(VotePhase::Completion) => {
            vec![IssueStatus::PendingCompletionVerification]
        }
        None => vec![
            IssueStatus::PendingVerification,
            IssueStatus::PendingCompletionVerification,
        ],
    }
}

fn load_image_files(paths: &[PathBuf]) -> anyhow::Result<Vec<ImageFile>> {
    let files = paths
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let bytes = std::fs::read(path).map_err(|err| {
                anyhow::anyhow!("failed to read {}: {err}", path.display())
            })?;
            Ok(ImageFile { name, bytes })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    validate_image_files(&files).map_err(|errors| {
        anyhow::anyhow!(errors.iter().map(|e| e.to_string()).join("; "))
    })?;
    Ok(files)
}

/// Handle a command, returning CLI output
async fn handle_command<RpcClient>(
    rpc_client: &RpcClient,
    command: Command,
    vote_store: &Path,
) -> anyhow::Result<String>
where
    RpcClient: ClientT + Sync,
{
    Ok(match command {
        Command::CouncillorStatus { address } => {
            match rpc_client.councillor_info(address).await? {
                Some(councillor) => format!(
                    "{address} is {}councillor for ward {}",
                    if councillor.is_active { "" } else { "(inactive) " },
                    councillor.ward
                ),
                None => format!("{address} is not a councillor"),
            }
        }
        Command::EligibleIssues { user, ward, phase } => {
            let issues = rpc_client.get_all_issues().await?;
            let tracker = VoteTracker::load(vote_store);
            let now = unix_now();

            let mut filter = IssueFilter::new()
                .with_statuses(statuses_for_phase(phase))
                .excluding_votes_by(user);
            if let Some(ward) = ward {
                filter = filter.in_ward(ward);
            }
            let local = tracker.snapshot(now);
            let eligible = eligible_issues(&issues, &filter, &local, now);

            // Piggyback the periodic cleanup on every read.
            tracker.prune(now);
            tracker.save(vote_store)?;

            if eligible.is_empty() {
                "No issues awaiting your vote".to_string()
            } else {
                let mut output = format!(
                    "Issues awaiting your vote ({}):\n",
                    eligible.len()
                );
                for issue in eligible {
                    output.push_str(&summarize(issue));
                    output.push('\n');
                }
                output
            }
        }
        Command::ForgetVote { issue_id, phase } => {
            let tracker = VoteTracker::load(vote_store);
            let removed = tracker.remove(issue_id, phase);
            tracker.save(vote_store)?;
            if removed {
                format!("Dropped local {phase} vote for issue {issue_id}")
            } else {
                format!(
                    "No local {phase} vote recorded for issue {issue_id}"
                )
            }
        }
        Command::GetIssue { issue_id } => {
            match rpc_client.get_issue(issue_id).await? {
                Some(issue) => serde_json::to_string_pretty(&issue)?,
                None => format!("Issue {issue_id} not found"),
            }
        }
        Command::GetTransactionInfo { txid } => {
            let tx_info = rpc_client.get_transaction_info(txid).await?;
            serde_json::to_string_pretty(&tx_info)?
        }
        Command::InitializeRegistry => {
            let txid = rpc_client.initialize_registry().await?;
            format!("{txid}")
        }
        Command::ListIssues { ward, status } => {
            let issues = match ward {
                Some(ward) => {
                    rpc_client.get_issues_by_ward(ward).await?
                }
                None => rpc_client.get_all_issues().await?,
            };
            let filter = IssueFilter::new().with_statuses(status);
            let matched = filter_issues(&issues, &filter);
            serde_json::to_string_pretty(&matched)?
        }
        Command::ListWards => {
            let wards = rpc_client.get_all_wards().await?;
            if wards.is_empty() {
                "No wards registered".to_string()
            } else {
                let mut output =
                    format!("Registered wards ({}):\n", wards.len());
                for ward in wards {
                    output.push_str(&format!(
                        "  Ward {}: {}, {}{}\n",
                        ward.ward,
                        ward.latitude,
                        ward.longitude,
                        if ward.is_active { "" } else { " (inactive)" }
                    ));
                }
                output
            }
        }
        Command::NearestWard {
            latitude,
            longitude,
        } => {
            let wards = rpc_client.get_all_wards().await?;
            let point = GeoPoint::new(latitude, longitude);
            match nearest_ward(point, &wards) {
                Some(ward) => format!("Nearest ward: {ward}"),
                None => "No active wards registered".to_string(),
            }
        }
        Command::RegisterCouncillor { ward } => {
            let txid = rpc_client.register_councillor(ward).await?;
            format!("{txid}")
        }
        Command::RegisterWard {
            ward,
            latitude,
            longitude,
        } => {
            let txid = rpc_client
                .register_ward(ward, latitude, longitude)
                .await?;
            format!("{txid}")
        }
        Command::ReportIssue {
            ward,
            category,
            description,
            latitude,
            longitude,
            images,
        } => {
            validate_report_input(&category, &description)?;

            let ward = match ward {
                Some(ward) => {
                    if rpc_client.get_ward_info(ward).await?.is_none() {
                        anyhow::bail!("ward {ward} is not registered");
                    }
                    ward
                }
                None => {
                    let point = GeoPoint::new(
                        latitude.parse().map_err(|_| {
                            anyhow::anyhow!(
                                "latitude {latitude:?} is not a number"
                            )
                        })?,
                        longitude.parse().map_err(|_| {
                            anyhow::anyhow!(
                                "longitude {longitude:?} is not a number"
                            )
                        })?,
                    );
                    let wards = rpc_client.get_all_wards().await?;
                    nearest_ward(point, &wards).ok_or_else(|| {
                        anyhow::anyhow!(
                            "no active wards registered; pass --ward"
                        )
                    })?
                }
            };

            let (image_cid, image_filenames) = if images.is_empty() {
                (String::new(), Vec::new())
            } else {
                let files = load_image_files(&images)?;
                let pinning =
                    PinningClient::new(PinningConfig::from_env()?)?;
                let pinned = pinning.pin_images(&files, None).await?;
                (pinned.cid, pinned.filenames)
            };

            let issue_id = rpc_client
                .report_issue(
                    ward,
                    category,
                    description,
                    latitude,
                    longitude,
                    image_cid,
                    image_filenames,
                )
                .await?;
            format!("Issue reported with id {issue_id} in ward {ward}")
        }
        Command::TestPinning => {
            let pinning = PinningClient::new(PinningConfig::from_env()?)?;
            let () = pinning.test_authentication().await?;
            "Pinning service authentication OK".to_string()
        }
        Command::UpdateStatus { issue_id, status } => {
            let txid = rpc_client
                .update_issue_status(issue_id, status)
                .await?;
            format!("{txid}")
        }
        Command::VoteCompletion { issue_id, resolved } => {
            let txid = rpc_client
                .vote_on_completion(issue_id, resolved)
                .await?;
            let tracker = VoteTracker::load(vote_store);
            tracker.record(issue_id, VotePhase::Completion, unix_now());
            tracker.prune(unix_now());
            tracker.save(vote_store)?;
            format!("{txid}")
        }
        Command::VoteIssue { issue_id, confirm } => {
            let txid =
                rpc_client.vote_on_issue(issue_id, confirm).await?;
            let tracker = VoteTracker::load(vote_store);
            tracker.record(
                issue_id,
                VotePhase::Verification,
                unix_now(),
            );
            tracker.prune(unix_now());
            tracker.save(vote_store)?;
            format!("{txid}")
        }
        Command::WardMetrics { ward } => {
            let issues = rpc_client.get_issues_by_ward(ward).await?;
            let metrics = ward_metrics(&issues);
            let mut output = format!("Ward {ward} metrics:\n");
            output.push_str(&format!("  Total:       {}\n", metrics.total));
            output.push_str(&format!(
                "  Resolved:    {}\n",
                metrics.resolved
            ));
            output.push_str(&format!(
                "  In progress: {}\n",
                metrics.in_progress
            ));
            output.push_str(&format!(
                "  Pending:     {}\n",
                metrics.pending
            ));
            output.push_str(&format!(
                "  Resolution rate: {:.1}%\n",
                metrics.resolution_rate
            ));
            output
        }
    })
}

fn set_tracing_subscriber() -> anyhow::Result<()> {
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stdout()))
        .with_file(true)
        .with_line_number(true);

    let subscriber = tracing_subscriber::registry().with(stdout_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<String> {
        if self.verbose {
            set_tracing_subscriber()?;
        }
        let request_id = uuid::Uuid::new_v4().as_simple().to_string();
        tracing::info!(%request_id);
        let builder = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(self.timeout_secs))
            .set_max_logging_length(1024)
            .set_headers(HeaderMap::from_iter([(
                http::header::HeaderName::from_static("x-request-id"),
                http::header::HeaderValue::from_str(&request_id)?,
            )]));
        let client = builder.build(self.rpc_url())?;
        let vote_store = self.vote_store_path();
        let result =
            handle_command(&client, self.command, &vote_store).await?;
        Ok(result)
    }
}
