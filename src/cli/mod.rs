//! Command-line parsing for the matrix balancer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the balancing code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "ras",
    version,
    about = "Bi-proportional (RAS) balancing of matrices against row and column totals"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` wins if set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Balance the built-in 4x4 example and print before/after tables.
    Demo(BalanceArgs),
    /// Balance a problem read from CSV.
    Balance(FileArgs),
    /// Simulate a noisy flow-of-funds table, balance it, and report quality
    /// and sectoral balances.
    Simulate(SimulateArgs),
    /// Simulate and balance a quarterly series (quarters run in parallel).
    Series(SeriesArgs),
}

/// Options shared by every balancing command.
#[derive(Debug, Args, Clone)]
pub struct BalanceArgs {
    /// Convergence tolerance on the summed absolute marginal deviation.
    #[arg(long, default_value_t = 1e-6)]
    pub tolerance: f64,

    /// Maximum number of row+column iterations (0 = evaluate input only).
    #[arg(long, default_value_t = 1000)]
    pub max_iterations: usize,

    /// Check the input before iterating and stop at once if already balanced.
    #[arg(long)]
    pub precheck: bool,

    /// Reject inputs whose row and column grand totals differ by more than this
    /// relative tolerance (default: accept and report non-convergence).
    #[arg(long, value_name = "REL_TOL")]
    pub strict_grand_total: Option<f64>,

    /// Stop iterating once this many milliseconds have elapsed.
    #[arg(long, value_name = "MS")]
    pub time_budget_ms: Option<u64>,

    /// Exit with code 3 when a run does not converge.
    #[arg(long)]
    pub require_convergence: bool,

    /// Export the balanced matrix (or series summary) to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the run record(s) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

/// Options for `ras balance`.
#[derive(Debug, Args)]
pub struct FileArgs {
    /// Problem CSV (`label,<columns...>,target` with a final `target` row).
    #[arg(long, short = 'i', value_name = "CSV")]
    pub input: PathBuf,

    #[command(flatten)]
    pub balance: BalanceArgs,
}

/// Options for `ras simulate`.
#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Overall scale of the economy (billions).
    #[arg(long, default_value_t = 1000.0)]
    pub scale: f64,

    /// Measurement error multiplier.
    #[arg(long, default_value_t = 0.1)]
    pub noise_level: f64,

    /// Random seed for the simulated observations.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[command(flatten)]
    pub balance: BalanceArgs,
}

/// Options for `ras series`.
#[derive(Debug, Args)]
pub struct SeriesArgs {
    /// Number of quarters to generate.
    #[arg(long, short = 'n', default_value_t = 8)]
    pub quarters: usize,

    /// Scale of the first quarter (billions).
    #[arg(long, default_value_t = 1000.0)]
    pub scale: f64,

    /// Compounding growth per quarter (0.02 = 2%).
    #[arg(long, default_value_t = 0.02)]
    pub growth_rate: f64,

    /// First day of the first quarter (YYYY-MM-DD).
    #[arg(long, default_value = "2024-01-01")]
    pub start: NaiveDate,

    /// Random seed for the simulated observations.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[command(flatten)]
    pub balance: BalanceArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn balance_flags_parse() {
        let cli = Cli::parse_from([
            "ras",
            "balance",
            "-i",
            "in.csv",
            "--tolerance",
            "1e-9",
            "--max-iterations",
            "0",
            "--strict-grand-total",
            "1e-6",
            "--export-json",
            "out.json",
        ]);
        let Command::Balance(args) = cli.command else {
            panic!("expected balance subcommand");
        };
        assert_eq!(args.input, PathBuf::from("in.csv"));
        assert_eq!(args.balance.tolerance, 1e-9);
        assert_eq!(args.balance.max_iterations, 0);
        assert_eq!(args.balance.strict_grand_total, Some(1e-6));
        assert_eq!(args.balance.export_json, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn series_defaults() {
        let cli = Cli::parse_from(["ras", "series"]);
        let Command::Series(args) = cli.command else {
            panic!("expected series subcommand");
        };
        assert_eq!(args.quarters, 8);
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(args.balance.max_iterations, 1000);
    }

    #[test]
    fn verbosity_is_global() {
        let cli = Cli::parse_from(["ras", "demo", "-vv", "--precheck"]);
        assert_eq!(cli.verbose, 2);
        let Command::Demo(args) = cli.command else {
            panic!("expected demo subcommand");
        };
        assert!(args.precheck);
    }
}
