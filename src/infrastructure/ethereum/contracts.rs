//! Contract access facade
//!
//! `ContractClient` is the single typed gateway to the two contract
//! families: the `CryptoFundRacing` factory and the `Pool` campaign
//! instances it creates. Pool bindings are created lazily and cached per
//! address; the cache lives and dies with the client, so reconfiguring the
//! provider/signer drops every stale binding at once.

use std::collections::HashMap;

use alloy::providers::{DynProvider, Provider};
use alloy::sol;
use alloy_primitives::{address, utils::parse_ether, Address, TxHash, U256};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::units::wei_to_eth_string;
use crate::domain::{Campaign, PoolSummary};
use crate::infrastructure::ethereum::error::{ChainError, ChainResult};

sol! {
    #[sol(rpc)]
    interface CryptoFundRacing {
        function createPool(
            uint256 goal,
            uint256 durationInHours,
            string socialLink,
            string purpose,
            string imageUrl
        ) external returns (address pool);
        function getAllPools() external view returns (address[] memory);
        function getPoolsByOwner(address owner) external view returns (address[] memory);
    }

    #[sol(rpc)]
    interface Pool {
        function contribute() external payable;
        function withdraw() external;
        function withdrawTo(address to) external;
        function refund() external;
        function getPoolInfo()
            external
            view
            returns (
                address owner,
                uint256 goal,
                uint256 deadline,
                uint256 totalContributed,
                string memory socialLink,
                string memory purpose,
                string memory imageUrl
            );
        function getIsFinished() external view returns (bool);
        function contributions(address contributor) external view returns (uint256);
    }
}

/// Chain ids with a recorded factory deployment.
pub const BASE_MAINNET_CHAIN_ID: u64 = 8453;
pub const SEPOLIA_CHAIN_ID: u64 = 11155111;

/// Sentinel for networks whose deployment has not been recorded yet.
pub const UNSET_ADDRESS: Address = Address::ZERO;

/// Local development deployment.
pub const LOCAL_FACTORY: Address = address!("131ce2c464E60649CBC27df91F1C3dcEe158Bb93");

/// Static chain-id -> factory address table. Deployed addresses for public
/// networks land here; unrecognized chains fall back to the local address.
pub fn factory_address(chain_id: u64) -> Address {
    match chain_id {
        BASE_MAINNET_CHAIN_ID => UNSET_ADDRESS,
        SEPOLIA_CHAIN_ID => UNSET_ADDRESS,
        _ => LOCAL_FACTORY,
    }
}

/// How a batch campaign fetch treats a single pool's failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchMode {
    /// Drop the failing pool and keep the rest (counted and reported).
    #[default]
    BestEffort,
    /// Abort the whole batch on the first failure.
    FailFast,
}

/// Result of a batch campaign fetch.
#[derive(Debug, Clone)]
pub struct CampaignBatch {
    pub campaigns: Vec<Campaign>,
    /// Pools whose detail fetch failed in best-effort mode.
    pub skipped: usize,
}

pub struct ContractClient {
    provider: DynProvider,
    signer: Option<Address>,
    chain_id: u64,
    factory_address: Address,
    factory: CryptoFundRacing::CryptoFundRacingInstance<DynProvider>,
    pools: HashMap<Address, Pool::PoolInstance<DynProvider>>,
}

impl ContractClient {
    /// Bind the factory to the given provider/signer pair. The factory
    /// address comes from the static table keyed by the provider's chain id
    /// unless the config override wins.
    pub async fn configure(
        provider: DynProvider,
        signer: Option<Address>,
        factory_override: Option<Address>,
    ) -> ChainResult<Self> {
        let chain_id = provider.get_chain_id().await?;
        let factory_addr = factory_override.unwrap_or_else(|| factory_address(chain_id));
        let factory = CryptoFundRacing::new(factory_addr, provider.clone());
        Ok(Self {
            provider,
            signer,
            chain_id,
            factory_address: factory_addr,
            factory,
            pools: HashMap::new(),
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn factory_addr(&self) -> Address {
        self.factory_address
    }

    pub fn is_factory_configured(&self) -> bool {
        self.factory_address != UNSET_ADDRESS
    }

    pub fn signer_address(&self) -> Option<Address> {
        self.signer
    }

    fn require_signer(&self) -> ChainResult<Address> {
        self.signer.ok_or(ChainError::NotConnected)
    }

    /// One binding per pool, lazily created and cached by address.
    fn pool(&mut self, address: Address) -> Pool::PoolInstance<DynProvider> {
        self.pools
            .entry(address)
            .or_insert_with(|| Pool::new(address, self.provider.clone()))
            .clone()
    }

    // --- factory operations ---

    /// Create a pool and wait for the transaction to land.
    pub async fn create_pool(
        &self,
        goal_eth: &str,
        duration_hours: u64,
        social_link: &str,
        purpose: &str,
        image_url: &str,
    ) -> ChainResult<TxHash> {
        self.require_signer()?;
        let goal_wei = parse_amount(goal_eth)?;
        let hash = self
            .factory
            .createPool(
                goal_wei,
                U256::from(duration_hours),
                social_link.to_string(),
                purpose.to_string(),
                image_url.to_string(),
            )
            .send()
            .await?
            .watch()
            .await?;
        Ok(hash)
    }

    pub async fn get_all_pools(&self) -> ChainResult<Vec<Address>> {
        Ok(self.factory.getAllPools().call().await?)
    }

    pub async fn get_pools_by_owner(&self, owner: Address) -> ChainResult<Vec<Address>> {
        Ok(self.factory.getPoolsByOwner(owner).call().await?)
    }

    // --- pool operations ---

    pub async fn contribute_to_pool(
        &mut self,
        pool: Address,
        amount_eth: &str,
    ) -> ChainResult<TxHash> {
        self.require_signer()?;
        let amount = parse_amount(amount_eth)?;
        let binding = self.pool(pool);
        let hash = binding.contribute().value(amount).send().await?.watch().await?;
        Ok(hash)
    }

    pub async fn withdraw_from_pool(&mut self, pool: Address) -> ChainResult<TxHash> {
        self.require_signer()?;
        let binding = self.pool(pool);
        let hash = binding.withdraw().send().await?.watch().await?;
        Ok(hash)
    }

    pub async fn withdraw_to_from_pool(&mut self, pool: Address, to: Address) -> ChainResult<TxHash> {
        self.require_signer()?;
        let binding = self.pool(pool);
        let hash = binding.withdrawTo(to).send().await?.watch().await?;
        Ok(hash)
    }

    pub async fn refund_from_pool(&mut self, pool: Address) -> ChainResult<TxHash> {
        self.require_signer()?;
        let binding = self.pool(pool);
        let hash = binding.refund().send().await?.watch().await?;
        Ok(hash)
    }

    /// Two read calls composed into one summary.
    pub async fn get_pool_details(&mut self, pool: Address) -> ChainResult<PoolSummary> {
        let binding = self.pool(pool);
        fetch_summary(pool, binding).await
    }

    /// The contributor's recorded contribution, as a decimal ETH string.
    pub async fn get_contribution(
        &mut self,
        pool: Address,
        contributor: Address,
    ) -> ChainResult<String> {
        let binding = self.pool(pool);
        let wei = binding.contributions(contributor).call().await?;
        Ok(wei_to_eth_string(wei))
    }

    pub async fn is_deadline_passed(&mut self, pool: Address) -> ChainResult<bool> {
        Ok(self.get_pool_details(pool).await?.deadline_passed(Utc::now()))
    }

    pub async fn can_withdraw(&mut self, pool: Address, candidate: Address) -> ChainResult<bool> {
        Ok(self.get_pool_details(pool).await?.can_withdraw(candidate))
    }

    pub async fn can_refund(&mut self, pool: Address) -> ChainResult<bool> {
        Ok(self.get_pool_details(pool).await?.can_refund(Utc::now()))
    }

    /// Enumerate pools and fetch every summary concurrently. Per-pool
    /// failures are isolated or fatal depending on the mode.
    pub async fn fetch_campaigns(&mut self, mode: FetchMode) -> ChainResult<CampaignBatch> {
        let addresses = self.get_all_pools().await?;
        let bindings: Vec<_> = addresses
            .into_iter()
            .map(|address| (address, self.pool(address)))
            .collect();

        let results = futures::future::join_all(
            bindings
                .into_iter()
                .map(|(address, binding)| fetch_summary(address, binding)),
        )
        .await;

        let mut campaigns = Vec::new();
        let mut skipped = 0;
        for result in results {
            match result {
                Ok(summary) => campaigns.push(Campaign::from_summary(summary)),
                Err(err) => match mode {
                    FetchMode::FailFast => return Err(err),
                    FetchMode::BestEffort => skipped += 1,
                },
            }
        }
        Ok(CampaignBatch { campaigns, skipped })
    }
}

async fn fetch_summary(
    address: Address,
    binding: Pool::PoolInstance<DynProvider>,
) -> ChainResult<PoolSummary> {
    let info = binding.getPoolInfo().call().await?;
    let is_finished = binding.getIsFinished().call().await?;

    Ok(PoolSummary {
        address,
        owner: info.owner,
        goal_wei: info.goal,
        total_contributed_wei: info.totalContributed,
        deadline: seconds_to_utc(info.deadline),
        social_link: info.socialLink,
        purpose: info.purpose,
        image_url: info.imageUrl,
        is_finished,
    })
}

/// On-chain deadlines are unix seconds; out-of-range values saturate.
fn seconds_to_utc(seconds: U256) -> DateTime<Utc> {
    let secs = u64::try_from(seconds).unwrap_or(u64::MAX);
    let secs = i64::try_from(secs).unwrap_or(i64::MAX);
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn parse_amount(value: &str) -> ChainResult<U256> {
    parse_ether(value.trim())
        .map_err(|err| ChainError::Transport(format!("invalid ETH amount '{value}': {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_address_table() {
        // Public networks are unset until a deployment is recorded; anything
        // else falls back to the local dev address.
        assert_eq!(factory_address(BASE_MAINNET_CHAIN_ID), UNSET_ADDRESS);
        assert_eq!(factory_address(SEPOLIA_CHAIN_ID), UNSET_ADDRESS);
        assert_eq!(factory_address(31337), LOCAL_FACTORY);
        assert_eq!(factory_address(1), LOCAL_FACTORY);
    }

    #[test]
    fn test_seconds_to_utc() {
        let deadline = seconds_to_utc(U256::from(1_700_000_000u64));
        assert_eq!(deadline.timestamp(), 1_700_000_000);

        // Absurd on-chain values must not panic.
        let far = seconds_to_utc(U256::MAX);
        assert!(far > Utc::now());
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(parse_amount("1.5").is_ok());
        assert!(matches!(
            parse_amount("lots"),
            Err(ChainError::Transport(_))
        ));
    }
}
