//! CSV Export
//!
//! Writes campaign rows to a CSV file.

use std::path::Path;

use crate::domain::pool::Campaign;

pub fn write_campaigns(
    path: &Path,
    campaigns: &[Campaign],
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "address",
        "title",
        "owner",
        "goal_eth",
        "contributed_eth",
        "deadline",
        "finished",
        "social_link",
        "purpose",
    ])?;

    for campaign in campaigns {
        let summary = &campaign.summary;
        wtr.write_record([
            format!("{:#x}", summary.address),
            campaign.title.clone(),
            format!("{:#x}", summary.owner),
            summary.goal_eth(),
            summary.total_contributed_eth(),
            summary.deadline.to_rfc3339(),
            summary.is_finished.to_string(),
            summary.social_link.clone(),
            summary.purpose.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(campaigns.len())
}
