use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::infrastructure::ethereum::{FetchMode, NetworkProfile};
use crate::infrastructure::pinning::PinningConfig;
use crate::infrastructure::runtime::WalletSource;

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkSpec {
    pub name: String,
    pub chain_id: u64,
    pub endpoints: Vec<String>,
    pub factory: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletConfig {
    pub private_key_env: Option<String>,
    pub keystore: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub networks: Vec<NetworkSpec>,

    #[serde(default)]
    pub wallet: WalletConfig,

    pub pinning: Option<PinningConfig>,

    #[serde(default)]
    pub fetch_mode: FetchMode,
}

impl Config {
    /// Candidate networks in probe order. An invalid factory address in the
    /// config file is a hard error rather than a silent fallback.
    pub fn network_profiles(&self) -> anyhow::Result<Vec<NetworkProfile>> {
        if self.networks.is_empty() {
            return Ok(default_profiles());
        }
        self.networks
            .iter()
            .map(|spec| {
                let factory = spec
                    .factory
                    .as_deref()
                    .map(|raw| {
                        raw.trim().parse().map_err(|err| {
                            anyhow::anyhow!("network {}: bad factory address: {err}", spec.name)
                        })
                    })
                    .transpose()?;
                Ok(NetworkProfile {
                    name: spec.name.clone(),
                    chain_id: spec.chain_id,
                    endpoints: spec.endpoints.clone(),
                    factory,
                })
            })
            .collect()
    }

    pub fn wallet_source(&self) -> WalletSource {
        WalletSource {
            private_key_env: self.wallet.private_key_env.clone(),
            keystore: self.wallet.keystore.clone(),
        }
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    toml::from_str::<Config>(&content).unwrap_or_default()
}

/// Explicit path from --config; unlike `load`, problems are reported.
pub fn load_path(path: &std::path::Path) -> anyhow::Result<Config> {
    let content = fs::read_to_string(path)
        .map_err(|err| anyhow::anyhow!("read {}: {err}", path.display()))?;
    toml::from_str(&content).map_err(|err| anyhow::anyhow!("parse {}: {err}", path.display()))
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("FUNDRACE_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("fundrace").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("fundrace").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "fundrace", "fundrace")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("fundrace"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("fundrace"));
    }
    directories::ProjectDirs::from("io", "fundrace", "fundrace")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Built-in networks, probed in this order when the config names none.
pub fn default_profiles() -> Vec<NetworkProfile> {
    vec![
        NetworkProfile {
            name: "base".to_string(),
            chain_id: 8453,
            endpoints: vec![
                "https://mainnet.base.org".to_string(),
                "https://base.llamarpc.com".to_string(),
            ],
            factory: None,
        },
        NetworkProfile {
            name: "sepolia".to_string(),
            chain_id: 11155111,
            endpoints: vec![
                "https://rpc.sepolia.org".to_string(),
                "https://ethereum-sepolia-rpc.publicnode.com".to_string(),
            ],
            factory: None,
        },
        NetworkProfile {
            name: "local".to_string(),
            chain_id: 31337,
            endpoints: vec!["http://localhost:8545".to_string()],
            factory: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_falls_back_to_builtin_profiles() {
        let config = Config::default();
        let profiles = config.network_profiles().unwrap();
        assert_eq!(profiles.len(), 3);
        assert_eq!(profiles[0].chain_id, 8453);
        assert_eq!(profiles[2].name, "local");
    }

    #[test]
    fn bad_factory_address_is_an_error() {
        let config: Config = toml::from_str(
            r#"
            [[networks]]
            name = "dev"
            chain_id = 31337
            endpoints = ["http://localhost:8545"]
            factory = "not-an-address"
            "#,
        )
        .unwrap();
        assert!(config.network_profiles().is_err());
    }

    #[test]
    fn factory_address_parses() {
        let config: Config = toml::from_str(
            r#"
            fetch_mode = "fail-fast"

            [[networks]]
            name = "dev"
            chain_id = 31337
            endpoints = ["http://localhost:8545"]
            factory = "0x131ce2c464E60649CBC27df91F1C3dcEe158Bb93"
            "#,
        )
        .unwrap();
        let profiles = config.network_profiles().unwrap();
        assert!(profiles[0].factory.is_some());
        assert_eq!(config.fetch_mode, FetchMode::FailFast);
    }
}
