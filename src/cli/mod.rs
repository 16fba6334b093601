//! CLI command definitions and handlers

use clap::{Parser, Subcommand, ValueEnum};

pub mod actions;
pub mod policies;
pub mod report;
pub mod validate;

use crate::schema::ReportType;

/// Output format options
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty format - human-optimized rich formatting
    #[default]
    Pretty,
    /// Table format - machine-parseable, one row per entry
    Table,
    /// JSON format - structured for scripts/APIs
    Json,
}

/// Scanpol CLI - Security scan orchestration policy engine
#[derive(Parser, Debug)]
#[command(name = "scanpol")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "SCANPOL_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(long, global = true, env = "SCANPOL_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a policy document
    #[command(after_help = "EXAMPLES:\n  \
        scanpol validate .security/policy.yml\n  \
        scanpol validate policy.yml --format json")]
    Validate {
        /// Path to the policy YAML file
        file: String,
    },

    /// List the policies a document defines
    Policies {
        /// Path to the policy YAML file
        file: String,
    },

    /// Show the scan actions a ref would trigger
    #[command(after_help = "EXAMPLES:\n  \
        scanpol actions policy.yml --ref refs/heads/main\n  \
        scanpol actions policy.yml --ref release/42")]
    Actions {
        /// Path to the policy YAML file
        file: String,

        /// Git ref to resolve (refs/heads/..., refs/tags/..., or a bare branch name)
        #[arg(long = "ref", short = 'r')]
        git_ref: String,
    },

    /// Validate a security report against its declared schema version
    #[command(after_help = "EXAMPLES:\n  \
        scanpol report gl-dast-report.json --type dast\n  \
        scanpol report report.json --type sast --report-version 15.0.0")]
    Report {
        /// Path to the report JSON file
        file: String,

        /// Report type the document claims to be
        #[arg(long = "type", short = 't', value_enum)]
        report_type: ReportType,

        /// Override the version declared inside the report
        #[arg(long = "report-version")]
        report_version: Option<String>,
    },

    /// Display version information
    Version,
}
