//! Async worker - owns the resolved provider and both contract clients
//!
//! Resolves a read-only network connection at startup, then serves commands
//! from the UI thread. Wallet connection builds a second, signer-backed
//! client; disconnecting drops it while the read-only client survives so
//! browsing keeps working.

use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

use alloy::network::EthereumWallet;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::Address;
use anyhow::Result;

use crate::domain::units::wei_to_eth_string;
use crate::infrastructure::ethereum::{
    connect_read_only, resolve_network, ChainError, ChainResult, ContractClient, HttpProbe,
    ResolvedNetwork,
};
use crate::infrastructure::pinning::PinningClient;
use crate::infrastructure::runtime::bridge::{
    RuntimeCommand, RuntimeEvent, TxKind, WalletSource, WorkerConfig,
};

/// How often the connected wallet's balance and chain id are re-read.
const WALLET_SYNC_INTERVAL: Duration = Duration::from_secs(10);

struct ConnectedWallet {
    client: ContractClient,
    provider: DynProvider,
    account: Address,
    balance_eth: String,
    chain_id: u64,
}

/// Run the worker loop until Shutdown.
pub async fn run_worker(
    config: WorkerConfig,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    let resolution = resolve_network(&HttpProbe, &config.profiles).await;
    for note in &resolution.notes {
        let _ = evt_tx.send(RuntimeEvent::ResolverNote {
            message: note.clone(),
        });
    }

    let network = resolution.network;
    let mut read_client: Option<ContractClient> = None;

    match &network {
        Some(net) => match build_read_client(net).await {
            Ok(client) => {
                let _ = evt_tx.send(RuntimeEvent::NetworkResolved {
                    name: net.name.clone(),
                    chain_id: net.chain_id,
                    endpoint: net.endpoint.clone(),
                    factory_configured: client.is_factory_configured(),
                });
                read_client = Some(client);
            }
            Err(error) => {
                let _ = evt_tx.send(RuntimeEvent::Failure {
                    context: format!("connect {}", net.endpoint),
                    error,
                });
                let _ = evt_tx.send(RuntimeEvent::DemoMode);
            }
        },
        None => {
            let _ = evt_tx.send(RuntimeEvent::DemoMode);
        }
    }

    // Initial snapshot of the campaign list.
    if let Some(client) = read_client.as_mut() {
        refresh_pools(client, &config, &evt_tx).await;
    }

    let mut wallet_client: Option<ContractClient> = None;
    let mut wallet_provider: Option<DynProvider> = None;
    let mut account: Option<Address> = None;
    let mut last_sync = Instant::now();

    loop {
        while let Ok(cmd) = cmd_rx.try_recv() {
            match cmd {
                RuntimeCommand::Shutdown => return Ok(()),

                RuntimeCommand::ConnectWallet { password } => {
                    let Some(net) = &network else {
                        fail(&evt_tx, "connect wallet", ChainError::NotConnected);
                        let _ = evt_tx.send(RuntimeEvent::WalletDisconnected);
                        continue;
                    };
                    let _ = evt_tx.send(RuntimeEvent::WalletConnecting);
                    match connect_wallet(&config.wallet, net, password).await {
                        Ok(connected) => {
                            let _ = evt_tx.send(RuntimeEvent::WalletConnected {
                                account: connected.account,
                                balance_eth: connected.balance_eth.clone(),
                                chain_id: connected.chain_id,
                            });
                            account = Some(connected.account);
                            wallet_provider = Some(connected.provider);
                            wallet_client = Some(connected.client);
                        }
                        Err(error) => {
                            fail(&evt_tx, "connect wallet", error);
                            let _ = evt_tx.send(RuntimeEvent::WalletDisconnected);
                        }
                    }
                }

                RuntimeCommand::DisconnectWallet => {
                    wallet_client = None;
                    wallet_provider = None;
                    account = None;
                    let _ = evt_tx.send(RuntimeEvent::WalletDisconnected);
                }

                RuntimeCommand::RefreshPools => {
                    match active_client(&mut wallet_client, &mut read_client) {
                        Some(client) => refresh_pools(client, &config, &evt_tx).await,
                        None => {
                            let _ = evt_tx.send(RuntimeEvent::DemoMode);
                        }
                    }
                }

                RuntimeCommand::FetchMyPools => {
                    let Some(owner) = account else {
                        fail(&evt_tx, "my pools", ChainError::NotConnected);
                        continue;
                    };
                    if let Some(client) = active_client(&mut wallet_client, &mut read_client) {
                        match client.get_pools_by_owner(owner).await {
                            Ok(pools) => {
                                let _ = evt_tx.send(RuntimeEvent::MyPoolsLoaded { pools });
                            }
                            Err(error) => fail(&evt_tx, "my pools", error),
                        }
                    }
                }

                RuntimeCommand::FetchContribution { pool } => {
                    let Some(contributor) = account else {
                        fail(&evt_tx, "contribution", ChainError::NotConnected);
                        continue;
                    };
                    if let Some(client) = active_client(&mut wallet_client, &mut read_client) {
                        match client.get_contribution(pool, contributor).await {
                            Ok(amount_eth) => {
                                let _ = evt_tx
                                    .send(RuntimeEvent::ContributionLoaded { pool, amount_eth });
                            }
                            Err(error) => fail(&evt_tx, "contribution", error),
                        }
                    }
                }

                RuntimeCommand::CreatePool {
                    goal_eth,
                    duration_hours,
                    social_link,
                    purpose,
                    image_url,
                } => {
                    let Some(client) = wallet_client.as_mut() else {
                        fail(&evt_tx, "create pool", ChainError::NotConnected);
                        continue;
                    };
                    match client
                        .create_pool(&goal_eth, duration_hours, &social_link, &purpose, &image_url)
                        .await
                    {
                        Ok(hash) => {
                            let _ = evt_tx.send(RuntimeEvent::TxConfirmed {
                                kind: TxKind::Create,
                                pool: None,
                                hash,
                            });
                        }
                        Err(error) => fail(&evt_tx, "create pool", error),
                    }
                }

                RuntimeCommand::Contribute { pool, amount_eth } => {
                    let Some(client) = wallet_client.as_mut() else {
                        fail(&evt_tx, "contribute", ChainError::NotConnected);
                        continue;
                    };
                    // Pre-flight against live chain state; the UI's local
                    // snapshot may be stale.
                    match client.is_deadline_passed(pool).await {
                        Ok(false) => {}
                        Ok(true) => {
                            fail(
                                &evt_tx,
                                "contribute",
                                ChainError::ContractRevert(
                                    "funding deadline has passed".to_string(),
                                ),
                            );
                            continue;
                        }
                        Err(error) => {
                            fail(&evt_tx, "contribute", error);
                            continue;
                        }
                    }
                    match client.contribute_to_pool(pool, &amount_eth).await {
                        Ok(hash) => {
                            let _ = evt_tx.send(RuntimeEvent::TxConfirmed {
                                kind: TxKind::Contribute { amount_eth },
                                pool: Some(pool),
                                hash,
                            });
                        }
                        Err(error) => fail(&evt_tx, "contribute", error),
                    }
                }

                RuntimeCommand::Withdraw { pool } => {
                    let (Some(client), Some(owner)) = (wallet_client.as_mut(), account) else {
                        fail(&evt_tx, "withdraw", ChainError::NotConnected);
                        continue;
                    };
                    if !preflight_withdraw(client, pool, owner, &evt_tx, "withdraw").await {
                        continue;
                    }
                    match client.withdraw_from_pool(pool).await {
                        Ok(hash) => {
                            let _ = evt_tx.send(RuntimeEvent::TxConfirmed {
                                kind: TxKind::Withdraw,
                                pool: Some(pool),
                                hash,
                            });
                        }
                        Err(error) => fail(&evt_tx, "withdraw", error),
                    }
                }

                RuntimeCommand::WithdrawTo { pool, to } => {
                    let (Some(client), Some(owner)) = (wallet_client.as_mut(), account) else {
                        fail(&evt_tx, "withdraw to", ChainError::NotConnected);
                        continue;
                    };
                    if !preflight_withdraw(client, pool, owner, &evt_tx, "withdraw to").await {
                        continue;
                    }
                    match client.withdraw_to_from_pool(pool, to).await {
                        Ok(hash) => {
                            let _ = evt_tx.send(RuntimeEvent::TxConfirmed {
                                kind: TxKind::Withdraw,
                                pool: Some(pool),
                                hash,
                            });
                        }
                        Err(error) => fail(&evt_tx, "withdraw to", error),
                    }
                }

                RuntimeCommand::Refund { pool } => {
                    let Some(client) = wallet_client.as_mut() else {
                        fail(&evt_tx, "refund", ChainError::NotConnected);
                        continue;
                    };
                    match client.can_refund(pool).await {
                        Ok(true) => {}
                        Ok(false) => {
                            fail(
                                &evt_tx,
                                "refund",
                                ChainError::ContractRevert(
                                    "refund requires a missed goal after the deadline".to_string(),
                                ),
                            );
                            continue;
                        }
                        Err(error) => {
                            fail(&evt_tx, "refund", error);
                            continue;
                        }
                    }
                    match client.refund_from_pool(pool).await {
                        Ok(hash) => {
                            let _ = evt_tx.send(RuntimeEvent::TxConfirmed {
                                kind: TxKind::Refund,
                                pool: Some(pool),
                                hash,
                            });
                        }
                        Err(error) => fail(&evt_tx, "refund", error),
                    }
                }

                RuntimeCommand::PinImage { path } => {
                    let Some(pin_config) = config.pinning.clone() else {
                        fail(
                            &evt_tx,
                            "pin image",
                            ChainError::Transport("pinning gateway not configured".to_string()),
                        );
                        continue;
                    };
                    let evt_tx = evt_tx.clone();
                    tokio::spawn(async move {
                        let result = match PinningClient::new(pin_config) {
                            Ok(client) => client.pin_file(&path).await,
                            Err(err) => Err(err),
                        };
                        match result {
                            Ok(url) => {
                                let _ = evt_tx.send(RuntimeEvent::ImagePinned { url });
                            }
                            Err(err) => fail(
                                &evt_tx,
                                "pin image",
                                ChainError::Transport(format!("{err:#}")),
                            ),
                        }
                    });
                }
            }
        }

        // Periodic wallet re-sync, the accountsChanged/chainChanged analog.
        if last_sync.elapsed() >= WALLET_SYNC_INTERVAL {
            if let (Some(provider), Some(owner)) = (&wallet_provider, account) {
                match sync_wallet(provider, owner).await {
                    Ok((balance_eth, chain_id)) => {
                        let stale = wallet_client
                            .as_ref()
                            .map(|client| client.chain_id() != chain_id)
                            .unwrap_or(true);
                        if stale {
                            // Chain switched under us: rebind the facade.
                            let factory_override = network
                                .as_ref()
                                .filter(|net| net.chain_id == chain_id)
                                .and_then(|net| net.factory);
                            match ContractClient::configure(
                                provider.clone(),
                                Some(owner),
                                factory_override,
                            )
                            .await
                            {
                                Ok(client) => wallet_client = Some(client),
                                Err(error) => fail(&evt_tx, "rebind contracts", error),
                            }
                        }
                        let _ = evt_tx.send(RuntimeEvent::WalletSynced {
                            balance_eth,
                            chain_id,
                        });
                    }
                    Err(error) => fail(&evt_tx, "wallet sync", error),
                }
            }
            last_sync = Instant::now();
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Prefer the signer-backed client; fall back to read-only browsing, which
/// survives a wallet disconnect.
fn active_client<'a, T>(
    wallet: &'a mut Option<T>,
    read_only: &'a mut Option<T>,
) -> Option<&'a mut T> {
    wallet.as_mut().or(read_only.as_mut())
}

/// Chain-side withdraw eligibility check before spending gas. Returns false
/// (after reporting) when the send should be skipped.
async fn preflight_withdraw(
    client: &mut ContractClient,
    pool: Address,
    owner: Address,
    evt_tx: &Sender<RuntimeEvent>,
    context: &str,
) -> bool {
    match client.can_withdraw(pool, owner).await {
        Ok(true) => true,
        Ok(false) => {
            fail(
                evt_tx,
                context,
                ChainError::ContractRevert(
                    "withdraw requires pool ownership and a met goal".to_string(),
                ),
            );
            false
        }
        Err(error) => {
            fail(evt_tx, context, error);
            false
        }
    }
}

fn fail(evt_tx: &Sender<RuntimeEvent>, context: &str, error: ChainError) {
    let _ = evt_tx.send(RuntimeEvent::Failure {
        context: context.to_string(),
        error,
    });
}

async fn build_read_client(network: &ResolvedNetwork) -> ChainResult<ContractClient> {
    let provider = connect_read_only(&network.endpoint)
        .map_err(|err| ChainError::Transport(format!("{err:#}")))?;
    ContractClient::configure(provider, None, network.factory).await
}

async fn refresh_pools(
    client: &mut ContractClient,
    config: &WorkerConfig,
    evt_tx: &Sender<RuntimeEvent>,
) {
    // Without a recorded factory deployment there is nothing to call; go
    // straight to the demo dataset.
    if !client.is_factory_configured() {
        let _ = evt_tx.send(RuntimeEvent::DemoMode);
        return;
    }
    match client.fetch_campaigns(config.fetch_mode).await {
        Ok(batch) => {
            let _ = evt_tx.send(RuntimeEvent::CampaignsLoaded {
                campaigns: batch.campaigns,
                skipped: batch.skipped,
            });
        }
        Err(error) => {
            fail(evt_tx, "load campaigns", error);
            // A whole-batch failure still leaves the screen usable.
            let _ = evt_tx.send(RuntimeEvent::DemoMode);
        }
    }
}

async fn connect_wallet(
    source: &WalletSource,
    network: &ResolvedNetwork,
    password: Option<String>,
) -> ChainResult<ConnectedWallet> {
    let signer = load_signer(source, password)?;
    let account = signer.address();

    let url = network
        .endpoint
        .parse()
        .map_err(|err| ChainError::Transport(format!("invalid endpoint URL: {err}")))?;
    let wallet = EthereumWallet::from(signer);
    let provider = ProviderBuilder::new()
        .wallet(wallet)
        .connect_http(url)
        .erased();

    let chain_id = provider.get_chain_id().await?;
    let balance = provider.get_balance(account).await?;

    let factory_override = if chain_id == network.chain_id {
        network.factory
    } else {
        None
    };
    let client = ContractClient::configure(provider.clone(), Some(account), factory_override).await?;

    Ok(ConnectedWallet {
        client,
        provider,
        account,
        balance_eth: wei_to_eth_string(balance),
        chain_id,
    })
}

/// Load the signer: env-var private key first, then the keystore file.
/// A configured keystore with no password means the user declined the prompt.
fn load_signer(source: &WalletSource, password: Option<String>) -> ChainResult<PrivateKeySigner> {
    let env_name = source
        .private_key_env
        .as_deref()
        .unwrap_or("FUNDRACE_PRIVATE_KEY");
    if let Ok(raw) = std::env::var(env_name) {
        if !raw.trim().is_empty() {
            return raw.trim().parse().map_err(|err| {
                ChainError::Transport(format!("invalid private key in ${env_name}: {err}"))
            });
        }
    }

    if let Some(path) = &source.keystore {
        let Some(password) = password else {
            return Err(ChainError::UserRejected);
        };
        return PrivateKeySigner::decrypt_keystore(path, password)
            .map_err(|err| ChainError::Transport(format!("keystore decrypt failed: {err}")));
    }

    Err(ChainError::NotConnected)
}

async fn sync_wallet(provider: &DynProvider, account: Address) -> ChainResult<(String, u64)> {
    let chain_id = provider.get_chain_id().await?;
    let balance = provider.get_balance(account).await?;
    Ok((wei_to_eth_string(balance), chain_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnecting_leaves_the_read_only_client_selected() {
        let mut wallet = Some("signer-backed");
        let mut read_only = Some("read-only");
        assert_eq!(
            active_client(&mut wallet, &mut read_only).copied(),
            Some("signer-backed")
        );

        // Disconnect drops only the signer-bound client; browsing continues
        // through the read-only one.
        wallet = None;
        assert_eq!(
            active_client(&mut wallet, &mut read_only).copied(),
            Some("read-only")
        );

        read_only = None;
        assert_eq!(active_client(&mut wallet, &mut read_only), None);
    }
}
