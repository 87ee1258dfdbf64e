//! Tokio runtime bridge between the TUI thread and chain access

mod bridge;
mod worker;

pub use bridge::{
    RuntimeBridge, RuntimeCommand, RuntimeEvent, TxKind, WalletSource, WorkerConfig,
};
