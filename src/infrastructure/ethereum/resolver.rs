//! Read-only network resolution
//!
//! Probes candidate JSON-RPC endpoints in config order and accepts the first
//! one whose reported chain id matches the profile. No retries: a failed
//! endpoint is noted and skipped. Total failure is not an error; the caller
//! degrades to demo data.

use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy_primitives::Address;
use anyhow::{Context, Result};

/// One candidate network, in probe order.
#[derive(Debug, Clone)]
pub struct NetworkProfile {
    pub name: String,
    /// Expected chain id; 0 accepts whatever the endpoint reports.
    pub chain_id: u64,
    pub endpoints: Vec<String>,
    /// Config override for the deployed factory address.
    pub factory: Option<Address>,
}

/// Outcome of a successful probe.
#[derive(Debug, Clone)]
pub struct ResolvedNetwork {
    pub name: String,
    pub chain_id: u64,
    pub endpoint: String,
    pub factory: Option<Address>,
}

/// Seam for asking an endpoint its chain id, so probe ordering is testable
/// without a live node.
#[async_trait::async_trait]
pub trait EndpointProbe: Send + Sync {
    async fn chain_id(&self, url: &str) -> Result<u64>;
}

/// Production probe backed by an HTTP provider.
pub struct HttpProbe;

#[async_trait::async_trait]
impl EndpointProbe for HttpProbe {
    async fn chain_id(&self, url: &str) -> Result<u64> {
        let rpc_url = url.parse().context("invalid endpoint URL")?;
        let provider = ProviderBuilder::new().connect_http(rpc_url);
        Ok(provider.get_chain_id().await?)
    }
}

#[derive(Debug)]
pub struct Resolution {
    pub network: Option<ResolvedNetwork>,
    /// Human-readable notes for every endpoint that was skipped.
    pub notes: Vec<String>,
}

/// Try each profile in order, each endpoint in order; stop at the first
/// endpoint whose reported chain id matches.
pub async fn resolve_network(probe: &dyn EndpointProbe, profiles: &[NetworkProfile]) -> Resolution {
    let mut notes = Vec::new();

    for profile in profiles {
        for endpoint in &profile.endpoints {
            match probe.chain_id(endpoint).await {
                Ok(id) if id == profile.chain_id || profile.chain_id == 0 => {
                    return Resolution {
                        network: Some(ResolvedNetwork {
                            name: profile.name.clone(),
                            chain_id: id,
                            endpoint: endpoint.clone(),
                            factory: profile.factory,
                        }),
                        notes,
                    };
                }
                Ok(id) => notes.push(format!(
                    "{endpoint}: reported chain id {id}, expected {} for {}",
                    profile.chain_id, profile.name
                )),
                Err(err) => notes.push(format!("{endpoint}: {err:#}")),
            }
        }
    }

    Resolution {
        network: None,
        notes,
    }
}

/// Build a read-only provider for a resolved endpoint.
pub fn connect_read_only(endpoint: &str) -> Result<DynProvider> {
    let rpc_url = endpoint.parse().context("invalid endpoint URL")?;
    Ok(ProviderBuilder::new().connect_http(rpc_url).erased())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted probe that records the order endpoints were queried in.
    struct ScriptedProbe {
        responses: Vec<(&'static str, Result<u64, &'static str>)>,
        queried: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl EndpointProbe for ScriptedProbe {
        async fn chain_id(&self, url: &str) -> Result<u64> {
            self.queried.lock().unwrap().push(url.to_string());
            for (candidate, response) in &self.responses {
                if *candidate == url {
                    return response
                        .map_err(|message| anyhow::anyhow!("{message}"));
                }
            }
            anyhow::bail!("unexpected endpoint {url}")
        }
    }

    fn profile(name: &str, chain_id: u64, endpoints: &[&str]) -> NetworkProfile {
        NetworkProfile {
            name: name.to_string(),
            chain_id,
            endpoints: endpoints.iter().map(|s| s.to_string()).collect(),
            factory: None,
        }
    }

    #[tokio::test]
    async fn first_healthy_endpoint_wins_and_later_ones_are_never_probed() {
        let probe = ScriptedProbe {
            responses: vec![
                ("http://a", Err("connection refused")),
                ("http://b", Ok(8453)),
                ("http://c", Ok(8453)),
            ],
            queried: Mutex::new(Vec::new()),
        };
        let profiles = vec![profile("base", 8453, &["http://a", "http://b", "http://c"])];

        let resolution = resolve_network(&probe, &profiles).await;

        let network = resolution.network.unwrap();
        assert_eq!(network.endpoint, "http://b");
        assert_eq!(network.chain_id, 8453);
        assert_eq!(resolution.notes.len(), 1);
        assert_eq!(
            *probe.queried.lock().unwrap(),
            vec!["http://a".to_string(), "http://b".to_string()]
        );
    }

    #[tokio::test]
    async fn chain_id_mismatch_skips_to_the_next_profile() {
        let probe = ScriptedProbe {
            responses: vec![("http://a", Ok(1)), ("http://local", Ok(31337))],
            queried: Mutex::new(Vec::new()),
        };
        let profiles = vec![
            profile("base", 8453, &["http://a"]),
            profile("local", 31337, &["http://local"]),
        ];

        let resolution = resolve_network(&probe, &profiles).await;

        let network = resolution.network.unwrap();
        assert_eq!(network.name, "local");
        assert!(resolution.notes[0].contains("expected 8453"));
    }

    #[tokio::test]
    async fn wildcard_profile_accepts_any_chain() {
        let probe = ScriptedProbe {
            responses: vec![("http://x", Ok(42))],
            queried: Mutex::new(Vec::new()),
        };
        let profiles = vec![profile("cli", 0, &["http://x"])];

        let resolution = resolve_network(&probe, &profiles).await;
        assert_eq!(resolution.network.unwrap().chain_id, 42);
    }

    #[tokio::test]
    async fn total_failure_yields_no_network_and_a_note_per_endpoint() {
        let probe = ScriptedProbe {
            responses: vec![
                ("http://a", Err("timeout")),
                ("http://b", Err("refused")),
            ],
            queried: Mutex::new(Vec::new()),
        };
        let profiles = vec![profile("base", 8453, &["http://a", "http://b"])];

        let resolution = resolve_network(&probe, &profiles).await;
        assert!(resolution.network.is_none());
        assert_eq!(resolution.notes.len(), 2);
    }
}
