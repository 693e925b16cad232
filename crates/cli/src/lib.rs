pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "warmind",
    about = "Warmind operator CLI",
    long_about = "Inspect configuration, check runtime readiness, apply migrations, and import item definitions.",
    after_help = "Examples:\n  warmind doctor --json\n  warmind migrate\n  warmind manifest import items.json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, outbound addresses, DB connectivity, and stored item definitions")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(subcommand, about = "Manage the stored item definitions")]
    Manifest(ManifestCommand),
}

#[derive(Debug, Subcommand)]
enum ManifestCommand {
    #[command(about = "Upsert item definitions from a JSON array export")]
    Import {
        #[arg(help = "Path to a JSON array of {itemHash, itemName, tierType, classType, bucketTypeHash}")]
        path: PathBuf,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Manifest(ManifestCommand::Import { path }) => commands::manifest::import(&path),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
