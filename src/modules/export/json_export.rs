//! JSON Export
//!
//! Writes campaign data to a JSON file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::pool::Campaign;

/// Exportable campaign (flattened, display-ready strings for chain values)
#[derive(Serialize)]
struct ExportableCampaign {
    address: String,
    title: String,
    description: String,
    owner: String,
    goal_eth: String,
    contributed_eth: String,
    deadline: String,
    finished: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    social_link: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    purpose: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    image_url: String,
}

impl From<&Campaign> for ExportableCampaign {
    fn from(campaign: &Campaign) -> Self {
        let summary = &campaign.summary;
        Self {
            address: format!("{:#x}", summary.address),
            title: campaign.title.clone(),
            description: campaign.description.clone(),
            owner: format!("{:#x}", summary.owner),
            goal_eth: summary.goal_eth(),
            contributed_eth: summary.total_contributed_eth(),
            deadline: summary.deadline.to_rfc3339(),
            finished: summary.is_finished,
            social_link: summary.social_link.clone(),
            purpose: summary.purpose.clone(),
            image_url: summary.image_url.clone(),
        }
    }
}

pub fn write_campaigns(
    path: &Path,
    campaigns: &[Campaign],
) -> Result<usize, Box<dyn std::error::Error>> {
    let exportable: Vec<ExportableCampaign> =
        campaigns.iter().map(ExportableCampaign::from).collect();
    let json = serde_json::to_string_pretty(&exportable)?;

    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(campaigns.len())
}
