//! Export Module
//!
//! Writes the currently loaded campaign list to disk.
//!
//! - 'e' key triggers export of whatever the list view shows
//! - CSV for spreadsheets, JSON for tooling; both files are written
//! - Files saved under the platform data dir, e.g. ~/.local/share/fundrace/exports/

mod csv_export;
mod json_export;

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use directories::ProjectDirs;

use crate::core::{Action, NotifyLevel};
use crate::domain::pool::Campaign;

/// Get the export directory path, creating it if needed
fn get_export_dir() -> std::io::Result<PathBuf> {
    let export_dir = crate::config::data_dir()
        .or_else(|| {
            ProjectDirs::from("io", "fundrace", "fundrace")
                .map(|dirs| dirs.data_dir().to_path_buf())
        })
        .unwrap_or_else(|| PathBuf::from(".fundrace"))
        .join("exports");
    fs::create_dir_all(&export_dir)?;
    Ok(export_dir)
}

/// Generate a timestamped filename
fn generate_filename(prefix: &str, extension: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d-%H%M%S");
    format!("{}-{}.{}", prefix, timestamp, extension)
}

/// Export the given campaigns as CSV and JSON.
pub fn export_campaigns(campaigns: &[Campaign]) -> Action {
    if campaigns.is_empty() {
        return Action::Notify("No campaigns to export".to_string(), NotifyLevel::Warn);
    }

    let export_dir = match get_export_dir() {
        Ok(dir) => dir,
        Err(e) => {
            return Action::Notify(
                format!("Failed to create export directory: {}", e),
                NotifyLevel::Error,
            )
        }
    };

    let csv_path = export_dir.join(generate_filename("campaigns", "csv"));
    if let Err(e) = csv_export::write_campaigns(&csv_path, campaigns) {
        return Action::Notify(format!("CSV export failed: {}", e), NotifyLevel::Error);
    }

    let json_path = export_dir.join(generate_filename("campaigns", "json"));
    match json_export::write_campaigns(&json_path, campaigns) {
        Ok(count) => Action::Notify(
            format!("Exported {} campaigns to {}", count, export_dir.display()),
            NotifyLevel::Info,
        ),
        Err(e) => Action::Notify(format!("JSON export failed: {}", e), NotifyLevel::Error),
    }
}
