//! Infrastructure layer - external service integrations
//!
//! - Alloy-based network resolution and the contract access facade
//! - Tokio runtime bridge for async operations
//! - HTTP client for the image pinning gateway

pub mod ethereum;
pub mod pinning;
pub mod runtime;
