//! Actions command implementation

use std::fs;

use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::output::{json, table};
use crate::policy::{PolicyDocument, ScanAction};

#[derive(Debug, Serialize, Tabled)]
struct ActionRow {
    #[tabled(rename = "SCAN")]
    scan: String,

    #[tabled(rename = "SITE PROFILE")]
    site_profile: String,

    #[tabled(rename = "SCANNER PROFILE")]
    scanner_profile: String,
}

impl From<&&ScanAction> for ActionRow {
    fn from(action: &&ScanAction) -> Self {
        let scan = serde_json::to_value(action.scan)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());

        ActionRow {
            scan,
            site_profile: action.site_profile.clone().unwrap_or_else(|| "-".to_string()),
            scanner_profile: action
                .scanner_profile
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ActionsOutput {
    git_ref: String,
    pipeline: Vec<ActionRow>,
    on_demand: Vec<ActionRow>,
}

/// Run the actions command to show what a ref would trigger
pub fn run(path: &str, git_ref: &str, format: OutputFormat) -> Result<()> {
    let raw = fs::read_to_string(path)?;
    let doc = PolicyDocument::parse(&raw)?;

    let pipeline: Vec<ActionRow> = doc.pipeline_actions(git_ref).iter().map(Into::into).collect();
    let on_demand: Vec<ActionRow> = doc
        .on_demand_actions(git_ref)
        .iter()
        .map(Into::into)
        .collect();

    match format {
        OutputFormat::Json => {
            let output = ActionsOutput {
                git_ref: git_ref.to_string(),
                pipeline,
                on_demand,
            };
            println!("{}", json::format_json(&output)?);
        }
        _ => {
            println!("{}\n", format!("Actions for {git_ref}").bold());
            println!("{}", "Pipeline scans".bold());
            println!("{}\n", table::format_table(&pipeline));
            println!("{}", "On-demand DAST scans".bold());
            println!("{}", table::format_table(&on_demand));
        }
    }

    Ok(())
}
