//! Pool summaries and the campaign view model
//!
//! A `PoolSummary` is the facade's mapping of raw contract return values; the
//! chain is the source of truth and nothing here is persisted. `Campaign`
//! layers the UI fields on top and is rebuilt on every fetch.

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Duration, Utc};

use crate::domain::units::{wei_to_eth_f64, wei_to_eth_string};

/// Snapshot of a single funding pool, read from `getPoolInfo` + `getIsFinished`.
#[derive(Debug, Clone)]
pub struct PoolSummary {
    pub address: Address,
    pub owner: Address,
    pub goal_wei: U256,
    pub total_contributed_wei: U256,
    pub deadline: DateTime<Utc>,
    pub social_link: String,
    pub purpose: String,
    pub image_url: String,
    pub is_finished: bool,
}

impl PoolSummary {
    pub fn goal_eth(&self) -> String {
        wei_to_eth_string(self.goal_wei)
    }

    pub fn total_contributed_eth(&self) -> String {
        wei_to_eth_string(self.total_contributed_wei)
    }

    pub fn is_active(&self) -> bool {
        !self.is_finished
    }

    pub fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline
    }

    pub fn is_funded(&self) -> bool {
        self.total_contributed_wei >= self.goal_wei
    }

    /// Fraction of the goal raised, clamped to [0, 1]. Display only.
    pub fn progress_fraction(&self) -> f64 {
        let goal = wei_to_eth_f64(self.goal_wei);
        if goal <= 0.0 {
            return 0.0;
        }
        (wei_to_eth_f64(self.total_contributed_wei) / goal).clamp(0.0, 1.0)
    }

    /// Owner-only withdrawal: the candidate must be the recorded owner and
    /// the goal must be reached. Addresses compare case-insensitively because
    /// both sides are normalized `Address` values.
    pub fn can_withdraw(&self, candidate: Address) -> bool {
        candidate == self.owner && self.is_funded()
    }

    /// Refund eligibility: deadline passed and still under-funded.
    pub fn can_refund(&self, now: DateTime<Utc>) -> bool {
        self.deadline_passed(now) && self.total_contributed_wei < self.goal_wei
    }
}

/// View model shown in the campaign list; one per pool, rebuilt per fetch.
#[derive(Debug, Clone)]
pub struct Campaign {
    pub id: String,
    pub title: String,
    pub description: String,
    pub summary: PoolSummary,
}

impl Campaign {
    pub fn from_summary(summary: PoolSummary) -> Self {
        let id = short_id(summary.address);
        let title = if summary.purpose.trim().is_empty() {
            format!("Funding Pool {id}")
        } else {
            summary.purpose.clone()
        };
        let description = format!(
            "Decentralized funding pool created by {}. Target: {} ETH.",
            short_addr(summary.owner),
            summary.goal_eth(),
        );
        Self {
            id,
            title,
            description,
            summary,
        }
    }

    /// Fixed demo dataset shown when no network can be resolved or the
    /// factory has no pools yet.
    pub fn demo_set() -> Vec<Campaign> {
        let now = Utc::now();
        vec![
            demo_campaign(
                "0x742d35cc6634c0532925a3b8d4c0532925a3b8d4",
                "DeFi Trading Bot Revolution",
                "Building an AI-powered trading bot that uses machine learning to optimize DeFi yield farming strategies across multiple protocols.",
                "50",
                "32.5",
                now + Duration::days(30),
                "https://images.unsplash.com/photo-1639762681485-074b7f938ba0?w=400&h=200&fit=crop",
            ),
            demo_campaign(
                "0x8ba1f109551bd432803012645ac136ddd64dba72",
                "NFT Marketplace for Digital Art",
                "Creating a next-generation NFT marketplace with zero gas fees, advanced royalty systems, and creator-friendly features.",
                "75",
                "45.8",
                now + Duration::days(45),
                "https://images.unsplash.com/photo-1618005182384-a83a8bd57fbe?w=400&h=200&fit=crop",
            ),
            demo_campaign(
                "0x9f2d35cc6634c0532925a3b8d4c0532925a3b8d4",
                "Blockchain Gaming Platform",
                "Developing a play-to-earn gaming ecosystem where players can earn crypto rewards through skill-based gameplay.",
                "100",
                "78.2",
                now + Duration::days(60),
                "https://images.unsplash.com/photo-1511512578047-dfb367046420?w=400&h=200&fit=crop",
            ),
        ]
    }
}

fn demo_campaign(
    address: &str,
    title: &str,
    description: &str,
    goal_eth: &str,
    raised_eth: &str,
    deadline: DateTime<Utc>,
    image_url: &str,
) -> Campaign {
    let address: Address = address.parse().unwrap_or(Address::ZERO);
    let summary = PoolSummary {
        address,
        owner: address,
        goal_wei: crate::domain::units::eth_to_wei(goal_eth).unwrap_or(U256::ZERO),
        total_contributed_wei: crate::domain::units::eth_to_wei(raised_eth).unwrap_or(U256::ZERO),
        deadline,
        social_link: String::new(),
        purpose: title.to_string(),
        image_url: image_url.to_string(),
        is_finished: false,
    };
    Campaign {
        id: short_id(address),
        title: title.to_string(),
        description: description.to_string(),
        summary,
    }
}

/// Last 8 hex chars of an address, used as the campaign id.
pub fn short_id(address: Address) -> String {
    let hexed = format!("{address:x}");
    hexed
        .chars()
        .rev()
        .take(8)
        .collect::<String>()
        .chars()
        .rev()
        .collect()
}

/// "0x1234..abcd" style display form.
pub fn short_addr(address: Address) -> String {
    let full = format!("{address:#x}");
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use chrono::Duration;

    fn summary(goal: u64, total: u64, hours_left: i64) -> PoolSummary {
        PoolSummary {
            address: address!("0000000000000000000000000000000000000001"),
            owner: address!("00000000000000000000000000000000000000aa"),
            goal_wei: U256::from(goal),
            total_contributed_wei: U256::from(total),
            deadline: Utc::now() + Duration::hours(hours_left),
            social_link: String::new(),
            purpose: "books".to_string(),
            image_url: String::new(),
            is_finished: false,
        }
    }

    #[test]
    fn owner_of_a_funded_pool_can_withdraw() {
        let pool = summary(100, 100, 24);
        assert!(pool.can_withdraw(pool.owner));
    }

    #[test]
    fn funded_pool_allows_withdraw_even_after_deadline() {
        let pool = summary(100, 150, -24);
        assert!(pool.can_withdraw(pool.owner));
        assert!(!pool.can_refund(Utc::now()));
    }

    #[test]
    fn non_owner_cannot_withdraw() {
        let pool = summary(100, 150, 24);
        assert!(!pool.can_withdraw(address!("00000000000000000000000000000000000000bb")));
    }

    #[test]
    fn underfunded_pool_past_deadline_allows_refund_only() {
        let pool = summary(100, 40, -1);
        assert!(pool.can_refund(Utc::now()));
        assert!(!pool.can_withdraw(pool.owner));
    }

    #[test]
    fn refund_is_closed_while_the_deadline_is_in_the_future() {
        let pool = summary(100, 40, 1);
        assert!(!pool.can_refund(Utc::now()));
    }

    #[test]
    fn exactly_meeting_the_goal_counts_as_funded() {
        let pool = summary(100, 100, 1);
        assert!(pool.is_funded());
        assert!((pool.progress_fraction() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn campaign_id_is_the_address_suffix() {
        let campaign = Campaign::from_summary(summary(100, 0, 1));
        assert_eq!(campaign.id.len(), 8);
        assert_eq!(campaign.id, "00000001");
    }

    #[test]
    fn demo_set_has_three_open_campaigns() {
        let demo = Campaign::demo_set();
        assert_eq!(demo.len(), 3);
        for campaign in &demo {
            assert!(campaign.summary.is_active());
            assert!(!campaign.summary.deadline_passed(Utc::now()));
        }
    }

    #[test]
    fn short_addr_keeps_prefix_and_suffix() {
        let formatted = short_addr(address!("131ce2c464E60649CBC27df91F1C3dcEe158Bb93"));
        assert_eq!(formatted, "0x131c...bb93");
    }
}
