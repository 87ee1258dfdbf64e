//! Runtime bridge - connects the sync TUI thread with the async Tokio worker
//!
//! The UI pushes `RuntimeCommand`s and polls `RuntimeEvent`s over std mpsc
//! channels; the worker thread owns its own Tokio runtime, the resolved
//! provider, and both contract clients. Dropping the bridge sends Shutdown,
//! so listener teardown is deterministic.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use alloy_primitives::{Address, TxHash};
use tokio::runtime::Runtime;

use crate::domain::Campaign;
use crate::infrastructure::ethereum::{ChainError, FetchMode, NetworkProfile};
use crate::infrastructure::pinning::PinningConfig;
use crate::infrastructure::runtime::worker::run_worker;

/// Wallet credential sources, from config.
#[derive(Debug, Clone, Default)]
pub struct WalletSource {
    /// Env var holding a hex private key; checked first.
    pub private_key_env: Option<String>,
    /// Encrypted keystore file; requires a password from the UI.
    pub keystore: Option<PathBuf>,
}

/// Everything the worker needs at startup.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub profiles: Vec<NetworkProfile>,
    pub wallet: WalletSource,
    pub pinning: Option<PinningConfig>,
    pub fetch_mode: FetchMode,
}

/// Commands sent from the TUI to the async worker.
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// Connect the local wallet; the password is only set when the keystore
    /// path is in use.
    ConnectWallet { password: Option<String> },
    DisconnectWallet,
    /// Re-fetch every pool summary.
    RefreshPools,
    /// Pools created by the connected account.
    FetchMyPools,
    /// The connected account's contribution to one pool.
    FetchContribution { pool: Address },
    CreatePool {
        goal_eth: String,
        duration_hours: u64,
        social_link: String,
        purpose: String,
        image_url: String,
    },
    Contribute { pool: Address, amount_eth: String },
    Withdraw { pool: Address },
    WithdrawTo { pool: Address, to: Address },
    Refund { pool: Address },
    /// Upload a campaign image to the pinning gateway.
    PinImage { path: PathBuf },
    Shutdown,
}

/// What kind of write just confirmed.
#[derive(Debug, Clone)]
pub enum TxKind {
    Create,
    Contribute { amount_eth: String },
    Withdraw,
    Refund,
}

/// Events sent from the async worker to the TUI.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// An endpoint was skipped during resolution.
    ResolverNote { message: String },
    /// A read-only connection is up.
    NetworkResolved {
        name: String,
        chain_id: u64,
        endpoint: String,
        factory_configured: bool,
    },
    /// Every candidate endpoint failed; the UI should show demo data.
    DemoMode,
    WalletConnecting,
    WalletConnected {
        account: Address,
        balance_eth: String,
        chain_id: u64,
    },
    /// Periodic re-sync while connected (balance / chain id refresh).
    WalletSynced { balance_eth: String, chain_id: u64 },
    WalletDisconnected,
    CampaignsLoaded {
        campaigns: Vec<Campaign>,
        /// Pools dropped by a best-effort batch fetch.
        skipped: usize,
    },
    MyPoolsLoaded { pools: Vec<Address> },
    ContributionLoaded { pool: Address, amount_eth: String },
    TxConfirmed {
        kind: TxKind,
        pool: Option<Address>,
        hash: TxHash,
    },
    ImagePinned { url: String },
    Failure { context: String, error: ChainError },
}

/// Bridge between the sync TUI thread and the async Tokio runtime.
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    pub fn new(config: WorkerConfig) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        thread::spawn(move || {
            let rt = match Runtime::new() {
                Ok(rt) => rt,
                Err(err) => {
                    let _ = evt_tx.send(RuntimeEvent::Failure {
                        context: "runtime".to_string(),
                        error: ChainError::Transport(format!("failed to start runtime: {err}")),
                    });
                    return;
                }
            };
            rt.block_on(async {
                if let Err(err) = run_worker(config, cmd_rx, evt_tx.clone()).await {
                    let _ = evt_tx.send(RuntimeEvent::Failure {
                        context: "worker".to_string(),
                        error: ChainError::Transport(format!("worker exited: {err:#}")),
                    });
                }
            });
        });

        Ok(Self { cmd_tx, evt_rx })
    }

    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("worker channel closed"))
    }

    /// Poll for events (non-blocking).
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
