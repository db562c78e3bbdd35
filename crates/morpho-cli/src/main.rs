//! morpho CLI — simulation, benchmarking, and inspection.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "morpho")]
#[command(version, about = "morpho — tetrahedral soft-body simulation engine")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation from a JSON input file or a built-in scenario.
    Simulate {
        /// Path to simulation input (JSON).
        #[arg(short, long, conflicts_with = "scenario")]
        input: Option<String>,

        /// Built-in scenario to run instead of an input file.
        #[arg(short, long)]
        scenario: Option<String>,

        /// TOML file overriding the input's solver configuration.
        #[arg(short, long)]
        config: Option<String>,

        /// Override the run duration (seconds).
        #[arg(short, long)]
        duration: Option<f32>,

        /// Stop early once the body settles or diverges.
        #[arg(long)]
        until_steady: bool,

        /// Write final positions and metrics here (JSON).
        #[arg(short, long)]
        output: Option<String>,

        /// Write a binary state snapshot of the final tick here.
        #[arg(long)]
        snapshot: Option<String>,
    },

    /// Run benchmark suite.
    Benchmark {
        /// Which scenario to run (tet_drop, cantilever, squash, all).
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Output file path (CSV, or JSON with --json).
        #[arg(short, long)]
        output: Option<String>,

        /// Export JSON instead of CSV.
        #[arg(long)]
        json: bool,
    },

    /// Write a built-in scenario as a JSON input file.
    Export {
        /// Scenario name (tet_drop, cantilever, squash).
        scenario: String,

        /// Output path.
        #[arg(short, long, default_value = "simulation.json")]
        output: String,
    },

    /// Inspect a state snapshot file.
    Inspect {
        /// Path to snapshot file.
        path: String,

        /// Second snapshot to compare positions against.
        #[arg(long)]
        compare: Option<String>,
    },

    /// Validate a config (.toml) or simulation input (.json).
    Validate {
        /// Path to config or input file.
        path: String,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Simulate {
            input,
            scenario,
            config,
            duration,
            until_steady,
            output,
            snapshot,
        } => commands::simulate(commands::SimulateArgs {
            input: input.as_deref(),
            scenario: scenario.as_deref(),
            config: config.as_deref(),
            duration,
            until_steady,
            output: output.as_deref(),
            snapshot: snapshot.as_deref(),
        }),
        Commands::Benchmark { scenario, output, json } => commands::benchmark(&scenario, output.as_deref(), json),
        Commands::Export { scenario, output } => commands::export(&scenario, &output),
        Commands::Inspect { path, compare } => commands::inspect(&path, compare.as_deref()),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_simulate_flags() {
        let cli = Cli::try_parse_from(["morpho", "-v", "simulate", "--scenario", "squash", "--until-steady"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Simulate {
                until_steady: true,
                input: None,
                ..
            }
        ));
    }

    #[test]
    fn input_and_scenario_conflict() {
        assert!(Cli::try_parse_from(["morpho", "simulate", "-i", "a.json", "-s", "squash"]).is_err());
    }
}
