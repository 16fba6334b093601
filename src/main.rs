//! Scanpol CLI - Security scan orchestration policy engine

use clap::Parser;

use scanpol::cli::{self, Cli, Commands};
use scanpol::error::Result;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    scanpol::verify()?;

    match cli.command {
        Commands::Validate { file } => cli::validate::run(&file, cli.format),
        Commands::Policies { file } => cli::policies::run(&file, cli.format),
        Commands::Actions { file, git_ref } => cli::actions::run(&file, &git_ref, cli.format),
        Commands::Report {
            file,
            report_type,
            report_version,
        } => cli::report::run(&file, report_type, report_version.as_deref(), cli.format),
        Commands::Version => {
            println!("scanpol version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
