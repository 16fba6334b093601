//! Report command implementation

use std::fs;

use colored::Colorize;

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use crate::output::json;
use crate::schema::{self, ReportType, ValidationContext};

/// Run the report command to validate a security report file
pub fn run(
    path: &str,
    report_type: ReportType,
    version_override: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let raw = fs::read_to_string(path)?;
    let document: serde_json::Value = serde_json::from_str(&raw)?;

    let declared = version_override
        .map(str::to_string)
        .or_else(|| version_of(&document));

    let result = schema::validate_report(
        report_type,
        &document,
        declared.as_deref(),
        &ValidationContext::default(),
    );

    match format {
        OutputFormat::Json => println!("{}", json::format_json(&result)?),
        _ => {
            if result.valid {
                println!(
                    "{} {} is a valid {} report",
                    "✓".green(),
                    path.bold(),
                    report_type
                );
            } else {
                println!(
                    "{} {} is not a valid {} report",
                    "✗".red(),
                    path.bold(),
                    report_type
                );
            }
            for warning in result.warnings.iter().chain(&result.deprecation_warnings) {
                println!("  {} {}", "⚠".yellow(), warning);
            }
            for error in &result.errors {
                println!("  {} {}", "→".red(), error);
            }
        }
    }

    if result.valid {
        Ok(())
    } else {
        Err(Error::Other("report failed validation".to_string()))
    }
}

fn version_of(document: &serde_json::Value) -> Option<String> {
    document
        .get("version")
        .and_then(|version| version.as_str())
        .map(str::to_string)
}
