// Charge Arena Benchmark Runner v0.2.0
// Monte Carlo per scenario, seedable ChaCha8 streams, per-tick invariant audit
//
// Usage:
//   cargo run --release --bin bench                      # Run all scenarios (30 runs each)
//   cargo run --release --bin bench -- --runs 5          # Quick mode (5 runs each)
//   cargo run --release --bin bench -- pacing            # Filter by name, label or category
//   cargo run --release --bin bench -- --time-series     # Enable JSONL output
//   cargo run --release --bin bench -- --config sim.json # Base config for knobs scenarios leave alone

mod report;
mod scenarios;
mod monte_carlo;
mod metrics;
mod time_series;

use anyhow::Context;
use clap::Parser;
use charge_arena::SimConfig;
use report::*;
use scenarios::*;
use metrics::run_learning_comparison;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scenarios must pass at least this share of their seeded runs.
const REQUIRED_PASS_RATE: f64 = 0.933;

/// Paired learning comparison: baseline population over ten simulated minutes.
const COMPARISON_BOTS: usize = 10;
const COMPARISON_TICKS: u64 = 36_000;

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "bench", version, about = "Monte Carlo benchmark for the charge arena simulation")]
struct Args {
    /// Seeded runs per scenario
    #[arg(long, default_value_t = 30)]
    runs: usize,

    /// Base seed; run i uses seed + i
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Write one JSONL time series per run
    #[arg(long)]
    time_series: bool,

    /// JSON SimConfig supplying defaults the scenarios do not override
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory for reports
    #[arg(long, default_value = "benchmark-results")]
    out: PathBuf,

    /// Only run scenarios whose name, label or category contains this
    filter: Option<String>,
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let base = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };

    let all_scenarios = scenarios();
    let to_run: Vec<&Scenario> = match &args.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower)
                          || s.category.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        anyhow::bail!("no scenarios match filter {:?}", args.filter);
    }

    let ts_dir = args.time_series.then(|| args.out.join("time-series"));

    info!(runs = args.runs, seed = args.seed, scenarios = to_run.len(), "starting benchmark");
    println!("\n  Charge Arena Benchmark Runner v0.2.0");
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", args.runs, args.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<34} {:>5} {:>11} {:>12} {:>7} {:>6} {:>8}",
        "Scenario", "Pass%", "Games/bot", "AvgDiff", "Skill", "Viol", "Time");
    println!("  {}", "-".repeat(92));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();

    for scenario in &to_run {
        let report = monte_carlo::run_monte_carlo(
            scenario,
            &base,
            args.runs,
            args.seed,
            ts_dir.as_deref(),
        )?;

        let pass_pct = report.pass_rate * 100.0;
        let violations: u32 = report.individual_runs.iter().map(|r| r.invariant_violations).sum();
        let status = if report.pass_rate >= REQUIRED_PASS_RATE { "PASS" } else { "FAIL" };

        println!("  {:<34} {:>4}% {:>11.1} {:>6.1}±{:<5.1} {:>7.3} {:>6} {:>6.0}ms  {}",
            report.label,
            pass_pct as u32,
            report.games_per_agent.mean,
            report.pooled_avg_diff.mean,
            report.pooled_avg_diff.half_width(),
            report.mean_skill.mean,
            violations,
            report.elapsed_ms.mean,
            status,
        );

        mc_reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();

    // ─── Validation ─────────────────────────────────────────────────────

    let total_invariant_violations: u32 = mc_reports.iter()
        .flat_map(|r| &r.individual_runs)
        .map(|r| r.invariant_violations)
        .sum();

    // Paired learning comparison only when a learning scenario was selected
    let learning = if to_run.iter().any(|s| s.category == "learning") {
        Some(run_learning_comparison(&base, COMPARISON_BOTS, COMPARISON_TICKS, args.seed)?)
    } else {
        None
    };

    let validation = Validation {
        invariants_hold: total_invariant_violations == 0,
        total_invariant_violations,
        learning,
    };

    // ─── Summary ────────────────────────────────────────────────────────

    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.pass_rate >= REQUIRED_PASS_RATE).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(92));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_elapsed.as_secs_f64());

    println!("  Validation:");
    println!("    Invariants:           {} ({} violations)",
        if validation.invariants_hold { "PASS" } else { "FAIL" },
        validation.total_invariant_violations);
    if let Some(cmp) = &validation.learning {
        println!("    Learning on/off diff: {:.1} vs {:.1} ({:+.1}%), mean skill {:.3}\n",
            cmp.with_learning_avg_diff,
            cmp.without_learning_avg_diff,
            cmp.improvement_pct,
            cmp.with_learning_mean_skill);
    } else {
        println!();
    }

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis();
    let timestamp = format!("{}", ts);
    let all_pass = failed == 0 && validation.all_pass();

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        n_runs_per_scenario: args.runs,
        base_seed: args.seed,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        validation,
        scenarios: mc_reports,
    };

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    let path = args.out.join(format!("bench-{}.json", timestamp));
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&path, &json).with_context(|| format!("writing {}", path.display()))?;
    println!("  Results saved to: {}\n", path.display());

    if !all_pass {
        std::process::exit(1);
    }
    Ok(())
}
