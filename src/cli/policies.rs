//! Policies command implementation

use std::fs;

use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::output::{json, table};
use crate::policy::PolicyDocument;

#[derive(Debug, Serialize, Tabled)]
struct PolicyRow {
    #[tabled(rename = "KIND")]
    kind: &'static str,

    #[tabled(rename = "NAME")]
    name: String,

    #[tabled(rename = "ENABLED")]
    enabled: &'static str,

    #[tabled(rename = "RULES")]
    rules: usize,

    #[tabled(rename = "ACTIONS")]
    actions: usize,
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled { "yes" } else { "no" }
}

/// Run the policies command to list the policies a document defines
pub fn run(path: &str, format: OutputFormat) -> Result<()> {
    let raw = fs::read_to_string(path)?;
    let doc = PolicyDocument::parse(&raw)?;

    let mut rows: Vec<PolicyRow> = doc
        .scan_execution_policy
        .iter()
        .map(|policy| PolicyRow {
            kind: "scan_execution_policy",
            name: policy.name.clone(),
            enabled: enabled_label(policy.enabled),
            rules: policy.rules.len(),
            actions: policy.actions.len(),
        })
        .collect();

    rows.extend(doc.scan_result_policy.iter().map(|policy| PolicyRow {
        kind: "scan_result_policy",
        name: policy.name.clone(),
        enabled: enabled_label(policy.enabled),
        rules: policy.rules.len(),
        actions: policy.actions.len(),
    }));

    match format {
        OutputFormat::Json => println!("{}", json::format_json(&rows)?),
        _ => println!("{}", table::format_table(&rows)),
    }

    Ok(())
}
