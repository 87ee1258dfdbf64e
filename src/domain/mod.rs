//! Domain models: pool summaries, the campaign view model, wallet state,
//! and base-unit conversion.

pub mod pool;
pub mod units;
pub mod wallet;

pub use pool::{short_addr, short_id, Campaign, PoolSummary};
pub use wallet::{WalletState, WalletStatus};
