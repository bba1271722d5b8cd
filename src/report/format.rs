//! Formatted terminal output: matrices, run summaries, quality and balances.
//!
//! We keep formatting code in one place so:
//! - the balancing code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{BalanceProblem, Matrix, RunResult};
use crate::error::BalanceError;
use crate::math::{col_sums, row_sums, stable_sum};
use crate::report::balances::SectorBalance;
use crate::report::quality::QualityMetrics;

const BANNER_WIDTH: usize = 60;
const LABEL_WIDTH: usize = 10;
const CELL_WIDTH: usize = 10;

/// Render a matrix with a `Total` column and a `Total` row under a banner.
pub fn format_matrix(m: &Matrix, row_labels: &[String], col_labels: &[String], title: &str) -> String {
    let mut out = String::new();
    let rule = "=".repeat(BANNER_WIDTH);

    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!("{title:^BANNER_WIDTH$}\n"));
    out.push_str(&rule);
    out.push_str("\n\n");

    out.push_str(&format!("{:<LABEL_WIDTH$}", ""));
    for j in 0..m.ncols() {
        let label = col_labels.get(j).map(String::as_str).unwrap_or("");
        out.push_str(&format!(" {:>CELL_WIDTH$}", truncate(label, CELL_WIDTH)));
    }
    out.push_str(&format!(" {:>CELL_WIDTH$}\n", "Total"));

    let rows = row_sums(m);
    for (i, total) in rows.iter().enumerate() {
        let label = row_labels.get(i).map(String::as_str).unwrap_or("");
        out.push_str(&format!("{:<LABEL_WIDTH$}", truncate(label, LABEL_WIDTH)));
        for j in 0..m.ncols() {
            out.push_str(&format!(" {}", fmt_cell(m[(i, j)])));
        }
        out.push_str(&format!(" {}\n", fmt_cell(*total)));
    }

    out.push_str(&format!("{:<LABEL_WIDTH$}", "Total"));
    for total in col_sums(m) {
        out.push_str(&format!(" {}", fmt_cell(total)));
    }
    out.push_str(&format!(" {}\n", fmt_cell(stable_sum(rows))));

    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    out
}

/// List each target next to the achieved total.
pub fn format_targets(labels: &[String], targets: &[f64], achieved: &[f64], heading: &str) -> String {
    let mut out = format!("{heading}:\n");
    for (i, target) in targets.iter().enumerate() {
        let label = labels.get(i).map(String::as_str).unwrap_or("");
        let got = achieved.get(i).copied().unwrap_or(f64::NAN);
        out.push_str(&format!(
            "  {:<LABEL_WIDTH$} target={target:>12.3} achieved={got:>12.3} diff={:>+12.6}\n",
            truncate(label, LABEL_WIDTH),
            got - target,
        ));
    }
    out
}

/// Map short table labels to their full names, one per line.
pub fn format_legend(heading: &str, short: &[&str], long: &[&str]) -> String {
    let mut out = format!("{heading}:\n");
    for (s, l) in short.iter().zip(long) {
        out.push_str(&format!("  {s:<LABEL_WIDTH$} {l}\n"));
    }
    out
}

/// Format the outcome of one balancing run.
pub fn format_run_summary(problem: &BalanceProblem, run: &RunResult) -> String {
    let mut out = String::new();

    out.push_str("=== ras - Bi-proportional Matrix Balancing ===\n");
    out.push_str(&format!("Problem: {}\n", problem.name));
    out.push_str(&format!(
        "Shape: {} rows x {} cols\n",
        problem.matrix.nrows(),
        problem.matrix.ncols()
    ));
    out.push_str(&format!(
        "Grand totals: rows={:.3} cols={:.3}\n",
        stable_sum(problem.row_targets.iter().copied()),
        stable_sum(problem.col_targets.iter().copied()),
    ));
    out.push_str(&format!(
        "Status: {} after {} iteration(s) | deviation={:.3e}\n",
        run.termination.display_name(),
        run.iterations,
        run.deviation,
    ));
    if !run.converged {
        out.push_str("Warning: marginals are NOT within tolerance; treat the matrix as approximate.\n");
    }

    out
}

/// Format marginal quality metrics.
pub fn format_quality(q: &QualityMetrics) -> String {
    let mut out = String::from("Balance quality:\n");
    out.push_str(&format!("  max row error : {:.6e}\n", q.max_row_error));
    out.push_str(&format!("  max col error : {:.6e}\n", q.max_col_error));
    out.push_str(&format!("  rms row error : {:.6e}\n", q.rms_row_error));
    out.push_str(&format!("  rms col error : {:.6e}\n", q.rms_col_error));
    out.push_str(&format!("  max row %     : {}\n", fmt_pct(q.max_row_pct_error)));
    out.push_str(&format!("  max col %     : {}\n", fmt_pct(q.max_col_pct_error)));
    out
}

/// Format sectoral balances as a table.
pub fn format_balances(balances: &[SectorBalance]) -> String {
    let mut out = String::from("Sectoral financial balances:\n");
    out.push_str(
        format!(
            "{:<LABEL_WIDTH$} {:>12} {:>12} {:>12}\n",
            "sector", "assets", "liabilities", "net"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<LABEL_WIDTH$} {:-<12} {:-<12} {:-<12}\n", "", "", "", "").trim_end());
    out.push('\n');

    for b in balances {
        out.push_str(&format!(
            "{:<LABEL_WIDTH$} {:>12.1} {:>12.1} {:>+12.1}\n",
            truncate(&b.sector, LABEL_WIDTH),
            b.assets,
            b.liabilities,
            b.net_position,
        ));
    }
    out.push_str("(positive = net lender, negative = net borrower)\n");
    out
}

/// One line per problem of a batch run.
pub fn format_series_summary(
    problems: &[BalanceProblem],
    results: &[Result<RunResult, BalanceError>],
) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<LABEL_WIDTH$} {:>12} {:>8} {:>12} {:<24}\n",
            "period", "total", "iters", "deviation", "status"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!("{:-<LABEL_WIDTH$} {:-<12} {:-<8} {:-<12} {:-<24}\n", "", "", "", "", "").trim_end(),
    );
    out.push('\n');

    for (p, r) in problems.iter().zip(results) {
        let total = stable_sum(p.row_targets.iter().copied());
        let line = match r {
            Ok(run) => format!(
                "{:<LABEL_WIDTH$} {:>12.1} {:>8} {:>12.3e} {:<24}",
                truncate(&p.name, LABEL_WIDTH),
                total,
                run.iterations,
                run.deviation,
                run.termination.display_name(),
            ),
            Err(e) => format!(
                "{:<LABEL_WIDTH$} {:>12.1} {:>8} {:>12} error: {e}",
                truncate(&p.name, LABEL_WIDTH),
                total,
                "-",
                "-",
            ),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

fn fmt_cell(v: f64) -> String {
    format!("{v:>CELL_WIDTH$.1}")
}

fn fmt_pct(v: Option<f64>) -> String {
    match v {
        Some(p) => format!("{p:.6}%"),
        None => "n/a".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
