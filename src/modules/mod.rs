//! Feature modules layered on top of the main loop
//!
//! - export: CSV/JSON dumps of the campaign list

pub mod export;
