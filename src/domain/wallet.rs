//! Wallet connection state machine
//!
//! Mirrors the signer the worker holds. Transitions happen only in response
//! to explicit connect/disconnect commands and worker sync events, so the
//! UI thread owns this struct without any locking.

use alloy_primitives::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletStatus {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone)]
pub struct WalletState {
    pub status: WalletStatus,
    pub account: Option<Address>,
    pub balance_eth: String,
    pub chain_id: Option<u64>,
}

impl Default for WalletState {
    fn default() -> Self {
        Self {
            status: WalletStatus::Disconnected,
            account: None,
            balance_eth: "0".to_string(),
            chain_id: None,
        }
    }
}

impl WalletState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.status == WalletStatus::Connected
    }

    pub fn is_connecting(&self) -> bool {
        self.status == WalletStatus::Connecting
    }

    /// User-initiated connect request. Returns false if a connect is already
    /// in flight or the wallet is connected.
    pub fn begin_connect(&mut self) -> bool {
        if self.status != WalletStatus::Disconnected {
            return false;
        }
        self.status = WalletStatus::Connecting;
        true
    }

    /// Permission granted and a snapshot taken.
    pub fn connected(&mut self, account: Address, balance_eth: String, chain_id: u64) {
        self.status = WalletStatus::Connected;
        self.account = Some(account);
        self.balance_eth = balance_eth;
        self.chain_id = Some(chain_id);
    }

    /// Connect attempt failed; fall back to disconnected.
    pub fn connect_failed(&mut self) {
        if self.status == WalletStatus::Connecting {
            self.disconnect();
        }
    }

    /// External re-sync while connected; no state transition.
    pub fn sync(&mut self, balance_eth: String, chain_id: u64) {
        if self.status == WalletStatus::Connected {
            self.balance_eth = balance_eth;
            self.chain_id = Some(chain_id);
        }
    }

    pub fn disconnect(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn connect_goes_through_connecting() {
        let mut wallet = WalletState::new();
        assert!(wallet.begin_connect());
        assert!(wallet.is_connecting());
        assert!(!wallet.begin_connect());

        wallet.connected(
            address!("00000000000000000000000000000000000000aa"),
            "1.5".to_string(),
            31337,
        );
        assert!(wallet.is_connected());
        assert_eq!(wallet.chain_id, Some(31337));
    }

    #[test]
    fn failed_connect_returns_to_disconnected() {
        let mut wallet = WalletState::new();
        wallet.begin_connect();
        wallet.connect_failed();
        assert_eq!(wallet.status, WalletStatus::Disconnected);
        assert!(wallet.account.is_none());
    }

    #[test]
    fn sync_only_applies_while_connected() {
        let mut wallet = WalletState::new();
        wallet.sync("9.9".to_string(), 1);
        assert_eq!(wallet.balance_eth, "0");

        wallet.begin_connect();
        wallet.connected(
            address!("00000000000000000000000000000000000000aa"),
            "1".to_string(),
            31337,
        );
        wallet.sync("2".to_string(), 31337);
        assert_eq!(wallet.balance_eth, "2");
    }

    #[test]
    fn disconnect_clears_everything() {
        let mut wallet = WalletState::new();
        wallet.begin_connect();
        wallet.connected(
            address!("00000000000000000000000000000000000000aa"),
            "1".to_string(),
            31337,
        );
        wallet.disconnect();
        assert_eq!(wallet.status, WalletStatus::Disconnected);
        assert!(wallet.account.is_none());
        assert!(wallet.chain_id.is_none());
    }
}
