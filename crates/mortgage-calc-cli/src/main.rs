mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::application::ApplyArgs;
use commands::calculator::{CalcArgs, PaymentArgs};
use commands::lead::LeadArgs;

/// Mortgage affordability calculator
#[derive(Parser)]
#[command(
    name = "mcalc",
    version,
    about = "Mortgage affordability calculator",
    long_about = "Compute fixed-rate annuity payments with decimal precision, \
                  render the calculator view, list mortgage programs and submit \
                  leads or full applications to the configured endpoints."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// TOML configuration file (programs, rate policy, display, endpoints)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly payment, overpayment and total paid
    Payment(PaymentArgs),
    /// Month-by-month amortization schedule
    Schedule(PaymentArgs),
    /// Formatted calculator view as shown on the site
    View(CalcArgs),
    /// List the configured mortgage programs
    Programs,
    /// Submit a calculator lead
    Lead(LeadArgs),
    /// Validate and submit a full mortgage application
    Apply(ApplyArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match commands::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::calculator::run_payment(&config, args),
        Commands::Schedule(args) => commands::calculator::run_schedule(&config, args),
        Commands::View(args) => commands::calculator::run_view(&config, args),
        Commands::Programs => commands::calculator::run_programs(&config),
        Commands::Lead(args) => commands::lead::run_lead(&config, args),
        Commands::Apply(args) => commands::application::run_apply(&config, args),
        Commands::Version => {
            println!("mcalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
