//! Campaign image pinning via an IPFS pinning gateway
//!
//! Optional path: a multipart upload to a Pinata-style endpoint returning a
//! CID, turned into a public gateway URL for the campaign image. The
//! endpoint is interchangeable; credentials come from config.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

fn default_api_url() -> String {
    "https://api.pinata.cloud/pinning/pinFileToIPFS".to_string()
}

fn default_gateway() -> String {
    "https://ipfs.io".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PinningConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_gateway")]
    pub gateway: String,
    pub api_key: String,
    pub secret_api_key: String,
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

pub struct PinningClient {
    http: reqwest::Client,
    config: PinningConfig,
}

impl PinningClient {
    pub fn new(config: PinningConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self { http, config })
    }

    /// Upload a file and return its public gateway URL.
    pub async fn pin_file(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&self.config.api_url)
            .header("pinata_api_key", &self.config.api_key)
            .header("pinata_secret_api_key", &self.config.secret_api_key)
            .multipart(form)
            .send()
            .await
            .context("pinning upload failed")?
            .error_for_status()
            .context("pinning gateway rejected the upload")?;

        let pinned: PinResponse = response
            .json()
            .await
            .context("unexpected pinning gateway response")?;

        Ok(format!(
            "{}/ipfs/{}",
            self.config.gateway.trim_end_matches('/'),
            pinned.ipfs_hash
        ))
    }
}
