mod args;
mod commands;
pub mod defaults;
mod printing;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use args::{InitArgs, RunArgs};
use commands::{init, run, validate};

/// Clonevo: A Clonal Evolution Simulator
///
/// This tool simulates how a tumour's cell population grows, mutates and
/// splits into clones, cycle by cycle, over a pool of parallel shards.
#[derive(Parser, Debug)]
#[command(name = "clonevo")]
#[command(author, version, about = "Simulates clonal evolution of cancer cells", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize a new simulation configuration.
    ///
    /// Writes the parameters for a new experiment (population size, mutation
    /// rate, gene layout, etc.) but does not run it yet.
    Init(Box<InitArgs>),

    /// Run a simulation from a configuration file.
    ///
    /// Executes every configured iteration cycle by cycle.
    Run(RunArgs),

    /// Validate a configuration file.
    ///
    /// Checks every parameter and loads the mutation-advantage table, if any.
    Validate {
        /// Configuration path
        #[arg(short, long, default_value = defaults::OUTPUT_CONFIG)]
        config: PathBuf,
    },
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => {
            init::init_simulation(&args)?;
        }
        Commands::Run(args) => {
            run::run_simulation(&args)?;
        }
        Commands::Validate { config } => {
            validate::validate_config(&config)?;
        }
    }

    Ok(())
}
