//! BloodConnect CLI - Database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bc-cli migrate
//!
//! # Load blood bank listings into the lookup cache
//! bc-cli seed blood-banks --file seed/blood_banks.json
//!
//! # Delete expired passcodes
//! bc-cli passcodes purge
//! ```
//!
//! All commands read `DATABASE_URL` from the environment (or `.env`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bc-cli")]
#[command(author, version, about = "BloodConnect CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database from files
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage login passcodes
    Passcodes {
        #[command(subcommand)]
        action: PasscodeAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Load blood bank listings into the lookup cache
    BloodBanks {
        /// JSON file of `{ "postalCode": ..., "data": [...] }` records
        #[arg(short, long)]
        file: String,
    },
}

#[derive(Subcommand)]
enum PasscodeAction {
    /// Delete passcodes past their expiry
    Purge,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::BloodBanks { file } => commands::seed::blood_banks(&file).await?,
        },
        Commands::Passcodes { action } => match action {
            PasscodeAction::Purge => commands::passcodes::purge().await?,
        },
    }
    Ok(())
}
