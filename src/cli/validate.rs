//! Validate command implementation

use std::fs;

use colored::Colorize;

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use crate::output::json;
use crate::policy::{PolicyDocument, validation};

/// Run the validate command against a policy file
pub fn run(path: &str, format: OutputFormat) -> Result<()> {
    let raw = fs::read_to_string(path)?;
    let doc = PolicyDocument::parse(&raw)?;
    let result = validation::validate_document(&doc);

    match format {
        OutputFormat::Json => println!("{}", json::format_json(&result)?),
        _ => {
            if result.valid {
                println!("{} {} is a valid policy document", "✓".green(), path.bold());
            } else {
                println!(
                    "{} {} is not a valid policy document",
                    "✗".red(),
                    path.bold()
                );
                for error in &result.errors {
                    println!("  {} {}", "→".red(), error);
                }
            }
        }
    }

    if result.valid {
        Ok(())
    } else {
        Err(Error::Other("policy document failed validation".to_string()))
    }
}
