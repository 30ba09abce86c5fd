mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::scenarios::{CompareMethodsArgs, SensitivityArgs};
use commands::simulate::{AllocateArgs, SimulateArgs};

/// Import landed-cost simulations
#[derive(Parser)]
#[command(
    name = "icsim",
    version,
    about = "Import landed-cost simulations",
    long_about = "A CLI for simulating the fully-loaded cost of importing goods with decimal \
                  precision. Allocates international freight and customs fees across product \
                  lines, applies import duty on the CFR base and ICMS on the duty-inclusive \
                  base, and reports per-line and per-unit landed cost."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log level for diagnostics on stderr (overridden by RUST_LOG)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a landed-cost simulation
    Simulate(SimulateArgs),
    /// Allocate a single shared cost across product lines
    Allocate(AllocateArgs),
    /// 2-way sensitivity grid over exchange rate, tax rates or shared costs
    Sensitivity(SensitivityArgs),
    /// Compare freight allocation methods on the same simulation
    CompareMethods(CompareMethodsArgs),
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

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Allocate(args) => commands::simulate::run_allocate(args),
        Commands::Sensitivity(args) => commands::scenarios::run_sensitivity(args),
        Commands::CompareMethods(args) => commands::scenarios::run_compare_methods(args),
        Commands::Version => {
            println!("icsim {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
