pub mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fournee_core::weather::{DEFAULT_OUTLOOK_DAYS, MAX_OUTLOOK_DAYS};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "fournee",
    about = "Fournée operator CLI",
    long_about = "Operate the Fournée production planner: schema migrations, demo data, recommendation runs, weather outlook and readiness checks.",
    after_help = "Examples:\n  fournee seed\n  fournee generate --user 1\n  fournee outlook --user 1 --days 3\n  fournee doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo shop (products, a year of sales, events)")]
    Seed {
        #[arg(long, help = "Day the demo history leads up to (YYYY-MM-DD, default today)")]
        today: Option<NaiveDate>,
    },
    #[command(about = "Generate and store production recommendations for a shop")]
    Generate {
        #[arg(long, help = "Shop (user) id")]
        user: i64,
        #[arg(long, help = "Target date (YYYY-MM-DD, default tomorrow)")]
        date: Option<NaiveDate>,
    },
    #[command(about = "Show the weather outlook used for recommendations at a shop")]
    Outlook {
        #[arg(long, help = "Shop (user) id")]
        user: i64,
        #[arg(
            long,
            default_value_t = DEFAULT_OUTLOOK_DAYS,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_OUTLOOK_DAYS)),
            help = "Number of days after today (1-16)"
        )]
        days: u32,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, weather client setup, DB connectivity and schema state")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed { today } => commands::seed::run(today),
        Command::Generate { user, date } => commands::generate::run(user, date),
        Command::Outlook { user, days } => commands::outlook::run(user, days),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
