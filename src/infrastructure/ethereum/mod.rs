//! Ethereum infrastructure - Alloy providers, network resolution, and the
//! contract access facade.

mod contracts;
mod error;
mod resolver;

pub use contracts::{
    factory_address, CampaignBatch, ContractClient, FetchMode, LOCAL_FACTORY, UNSET_ADDRESS,
};
pub use error::{ChainError, ChainResult};
pub use resolver::{
    connect_read_only, resolve_network, EndpointProbe, HttpProbe, NetworkProfile, Resolution,
    ResolvedNetwork,
};
