//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - builds or loads the balancing problem(s)
//! - runs the balancing pipeline
//! - prints reports and writes optional exports

use clap::{CommandFactory, Parser};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use crate::cli::{BalanceArgs, Command, FileArgs, SeriesArgs, SimulateArgs};
use crate::data::{
    INSTRUMENTS, INSTRUMENTS_SHORT, SECTORS, SECTORS_SHORT, SeriesParams, SimulationParams,
    example_problem, generate_quarterly_series, simulate_fof,
};
use crate::domain::{BalanceConfig, BalanceProblem};
use crate::error::AppError;
use crate::math::{col_sums, row_sums};
use crate::report::{
    DEFAULT_LIABILITY_SHARES, Liabilities, format_balances, format_legend, format_matrix,
    format_quality, format_run_summary, format_series_summary, format_targets, sectoral_balances,
};

pub mod pipeline;

/// Entry point for the `ras` binary.
pub fn run() -> Result<(), AppError> {
    // `ras` alone (or `ras --tolerance ...`) behaves like `ras demo ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_tracing(cli.verbose);

    match cli.command {
        Command::Demo(args) => handle_demo(&args),
        Command::Balance(args) => handle_balance(&args),
        Command::Simulate(args) => handle_simulate(&args),
        Command::Series(args) => handle_series(&args),
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    // Reports go to stdout; logs stay on stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_demo(args: &BalanceArgs) -> Result<(), AppError> {
    let config = balance_config_from_args(args);
    let problem = example_problem();

    println!(
        "{}",
        format_matrix(&problem.matrix, &problem.row_labels, &problem.col_labels, "Original matrix")
    );
    print_targets(&problem, &problem.matrix);

    let out = pipeline::run_balance(problem, &config)?;

    println!(
        "{}",
        format_matrix(&out.run.matrix, &out.problem.row_labels, &out.problem.col_labels, "Balanced matrix")
    );
    print_targets(&out.problem, &out.run.matrix);
    println!("{}", format_run_summary(&out.problem, &out.run));
    println!("{}", format_quality(&out.quality));

    pipeline::enforce_convergence(out.run.converged, &config)
}

fn handle_balance(args: &FileArgs) -> Result<(), AppError> {
    let config = balance_config_from_args(&args.balance);
    let problem = crate::io::load_problem(&args.input)?;

    let out = pipeline::run_balance(problem, &config)?;

    println!(
        "{}",
        format_matrix(&out.run.matrix, &out.problem.row_labels, &out.problem.col_labels, "Balanced matrix")
    );
    println!("{}", format_run_summary(&out.problem, &out.run));
    println!("{}", format_quality(&out.quality));

    pipeline::enforce_convergence(out.run.converged, &config)
}

fn handle_simulate(args: &SimulateArgs) -> Result<(), AppError> {
    let config = balance_config_from_args(&args.balance);
    let mut rng = StdRng::seed_from_u64(args.seed);
    let data = simulate_fof(
        &mut rng,
        &SimulationParams {
            scale: args.scale,
            noise_level: args.noise_level,
        },
    )?;
    let problem = data.to_problem(format!("simulated (seed {})", args.seed));

    println!("{}", format_legend("Sectors", &SECTORS_SHORT, &SECTORS));
    println!("{}", format_legend("Instruments", &INSTRUMENTS_SHORT, &INSTRUMENTS));
    println!(
        "{}",
        format_matrix(&problem.matrix, &problem.row_labels, &problem.col_labels, "Noisy observations")
    );

    let out = pipeline::run_balance(problem, &config)?;

    println!(
        "{}",
        format_matrix(&out.run.matrix, &out.problem.row_labels, &out.problem.col_labels, "Balanced holdings")
    );
    println!("{}", format_run_summary(&out.problem, &out.run));
    println!("{}", format_quality(&out.quality));

    let cells = (data.true_matrix.nrows() * data.true_matrix.ncols()).max(1) as f64;
    let mae_noisy = (&data.noisy - &data.true_matrix).abs().sum() / cells;
    let mae_balanced = (&out.run.matrix - &data.true_matrix).abs().sum() / cells;
    println!("Mean absolute error vs true holdings: noisy={mae_noisy:.3} balanced={mae_balanced:.3}");

    let balances = sectoral_balances(
        &out.run.matrix,
        Liabilities::Shares(&DEFAULT_LIABILITY_SHARES),
        &out.problem.row_labels,
    )?;
    println!();
    println!("{}", format_balances(&balances));
    println!("(liabilities allocated by stylized issuance shares)");

    pipeline::enforce_convergence(out.run.converged, &config)
}

fn handle_series(args: &SeriesArgs) -> Result<(), AppError> {
    let config = balance_config_from_args(&args.balance);
    let mut rng = StdRng::seed_from_u64(args.seed);
    let quarters = generate_quarterly_series(
        &mut rng,
        &SeriesParams {
            n_quarters: args.quarters,
            scale: args.scale,
            growth_rate: args.growth_rate,
            start: args.start,
        },
    )?;
    let problems: Vec<BalanceProblem> = quarters.iter().map(|q| q.to_problem()).collect();

    let out = pipeline::run_series(problems, &config)?;

    println!("{}", format_series_summary(&out.problems, &out.results));

    // Validation failures are per quarter; surface the first one as the exit status.
    if let Some(err) = out.results.iter().find_map(|r| r.as_ref().err()) {
        return Err(err.clone().into());
    }
    pipeline::enforce_convergence(out.all_converged(), &config)
}

fn print_targets(problem: &BalanceProblem, m: &crate::domain::Matrix) {
    println!(
        "{}",
        format_targets(&problem.row_labels, &problem.row_targets, &row_sums(m), "Row targets")
    );
    println!(
        "{}",
        format_targets(&problem.col_labels, &problem.col_targets, &col_sums(m), "Column targets")
    );
}

pub fn balance_config_from_args(args: &BalanceArgs) -> BalanceConfig {
    BalanceConfig {
        tolerance: args.tolerance,
        max_iterations: args.max_iterations,
        precheck: args.precheck,
        strict_grand_total: args.strict_grand_total,
        time_budget_ms: args.time_budget_ms,
        require_convergence: args.require_convergence,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
    }
}

/// Rewrite argv so `ras` defaults to `ras demo`.
///
/// Rules:
/// - `ras`                      -> `ras demo`
/// - `ras --precheck ...`       -> `ras demo --precheck ...`
/// - `ras -v --precheck ...`    -> `ras -v demo --precheck ...`
/// - `ras -v series ...`        -> unchanged (global flags may precede a subcommand)
/// - `ras --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let first = argv
        .iter()
        .skip(1)
        .position(|a| !is_verbose_flag(a))
        .map(|p| p + 1);

    let Some(idx) = first else {
        argv.push("demo".to_string());
        return argv;
    };

    let arg = argv[idx].as_str();
    let is_top_level_help_or_version = matches!(arg, "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version || is_subcommand(arg) {
        return argv;
    }

    if arg.starts_with('-') {
        argv.insert(idx, "demo".to_string());
    }
    argv
}

/// `-v`, `-vv`, ... or `--verbose`.
fn is_verbose_flag(arg: &str) -> bool {
    arg == "--verbose"
        || arg
            .strip_prefix('-')
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c == 'v'))
}

fn is_subcommand(arg: &str) -> bool {
    crate::cli::Cli::command()
        .get_subcommands()
        .any(|sub| sub.get_name() == arg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_demo() {
        assert_eq!(rewrite_args(argv(&["ras"])), argv(&["ras", "demo"]));
        assert_eq!(
            rewrite_args(argv(&["ras", "--max-iterations", "5"])),
            argv(&["ras", "demo", "--max-iterations", "5"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(rewrite_args(argv(&["ras", "--help"])), argv(&["ras", "--help"]));
        assert_eq!(
            rewrite_args(argv(&["ras", "series", "-n", "4"])),
            argv(&["ras", "series", "-n", "4"])
        );
    }

    #[test]
    fn verbose_flags_may_precede_a_subcommand() {
        assert_eq!(
            rewrite_args(argv(&["ras", "-v", "series", "-n", "2"])),
            argv(&["ras", "-v", "series", "-n", "2"])
        );
        let cli = crate::cli::Cli::try_parse_from(rewrite_args(argv(&["ras", "-vv", "series", "-n", "2"])))
            .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Series(args) = cli.command else {
            panic!("expected series subcommand");
        };
        assert_eq!(args.quarters, 2);
    }

    #[test]
    fn verbose_flags_alone_still_default_to_demo() {
        assert_eq!(rewrite_args(argv(&["ras", "--verbose"])), argv(&["ras", "--verbose", "demo"]));
        assert_eq!(
            rewrite_args(argv(&["ras", "-v", "--precheck"])),
            argv(&["ras", "-v", "demo", "--precheck"])
        );
        let cli = crate::cli::Cli::try_parse_from(rewrite_args(argv(&["ras", "-v", "--precheck"]))).unwrap();
        assert_eq!(cli.verbose, 1);
        let Command::Demo(args) = cli.command else {
            panic!("expected demo subcommand");
        };
        assert!(args.precheck);
    }

    #[test]
    fn config_mirrors_flags() {
        let cli = crate::cli::Cli::parse_from([
            "ras",
            "demo",
            "--precheck",
            "--time-budget-ms",
            "50",
            "--require-convergence",
        ]);
        let Command::Demo(args) = cli.command else {
            panic!("expected demo subcommand");
        };
        let config = balance_config_from_args(&args);
        assert!(config.precheck);
        assert!(config.require_convergence);
        assert_eq!(config.time_budget_ms, Some(50));
        assert_eq!(
            config.options().time_budget,
            Some(std::time::Duration::from_millis(50))
        );
    }
}
