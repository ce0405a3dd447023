// Monte Carlo Infrastructure — N runs per scenario with statistical aggregation
// Each scenario runs N times with seeds base..base+N, computing mean ± 95% CI

use charge_arena::agent::SKILL_MIN;
use charge_arena::*;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::metrics::{InvariantTracker, SpreadTracker};
use crate::report::*;
use crate::scenarios::Scenario;
use crate::time_series::TimeSeriesRecorder;

use std::path::Path;
use std::time::Instant;

/// Run a single scenario iteration with a specific seed.
pub fn run_single(
    scenario: &Scenario,
    base: &SimConfig,
    seed: u64,
    time_series_dir: Option<&Path>,
) -> anyhow::Result<BenchResult> {
    let start = Instant::now();
    let config = scenario.config(base, seed);
    let bots = config.agent_count;
    let mut sim = ChargeArena::with_config(config)?;

    let mut invariants = InvariantTracker::new(bots);
    let mut spread = SpreadTracker::new();
    let mut time_series = time_series_dir.map(|_| TimeSeriesRecorder::new());

    for tick in 0..scenario.ticks {
        let frame_dt = scenario.frame_curve.map(|curve| curve(tick));
        let result = sim.tick_core(frame_dt)?;

        invariants.record_tick(&result);
        spread.record_tick(&result);
        if let Some(ts) = time_series.as_mut() {
            ts.record(&result);
        }
    }

    if let (Some(ts), Some(dir)) = (&time_series, time_series_dir) {
        let path = dir.join(format!("seed-{seed}.jsonl"));
        match ts.write_jsonl(&path) {
            Ok(lines) => debug!(path = %path.display(), lines, "time series written"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to write time series"),
        }
    }

    let elapsed = start.elapsed();
    let elapsed_secs = elapsed.as_secs_f64().max(0.001);
    let stats = sim.stats();
    let games_per_agent = stats.total_games as f64 / bots as f64;

    // Evaluate pass/fail
    let criteria = &scenario.criteria;
    let mut failures = Vec::new();
    if invariants.violations > criteria.max_invariant_violations {
        failures.push(format!("{} invariant violations", invariants.violations));
    }
    if let Some(min_games) = criteria.min_games_per_agent {
        if games_per_agent < min_games {
            failures.push(format!("{games_per_agent:.1} games per agent, wanted {min_games}"));
        }
    }
    if criteria.require_skill_gain && stats.mean_skill <= SKILL_MIN {
        failures.push("no skill gain".to_string());
    }
    if let Some(max_skill) = criteria.max_mean_skill {
        if stats.mean_skill > max_skill {
            failures.push(format!("mean skill {:.3} above {max_skill}", stats.mean_skill));
        }
    }
    debug!(scenario = scenario.name, seed, games = stats.total_games, failures = failures.len(), "run finished");

    Ok(BenchResult {
        scenario: scenario.label.to_string(),
        name: scenario.name.to_string(),
        category: scenario.category.to_string(),
        seed,
        pass: failures.is_empty(),
        failures,
        ticks: scenario.ticks,
        simulated_secs: sim.clock().elapsed(),
        total_games: stats.total_games,
        games_per_agent,
        pooled_avg_diff: stats.pooled_avg_diff,
        mean_skill: stats.mean_skill,
        leader_score: stats.leader_score,
        winners: stats.winners,
        level_ups: invariants.level_ups,
        overheat_releases: invariants.overheat_releases,
        spike_releases: invariants.spike_releases,
        invariant_violations: invariants.violations,
        violation_messages: invariants.messages,
        initial_spread: spread.initial_spread,
        final_spread: spread.final_spread,
        elapsed_ms: elapsed.as_millis(),
        ticks_per_sec: scenario.ticks as f64 / elapsed_secs,
    })
}

/// Run Monte Carlo: N seeded runs of a scenario in parallel, aggregate stats.
pub fn run_monte_carlo(
    scenario: &Scenario,
    base: &SimConfig,
    n_runs: usize,
    base_seed: u64,
    time_series_base: Option<&Path>,
) -> anyhow::Result<MonteCarloReport> {
    let ts_dir = time_series_base.map(|root| root.join(scenario.name.to_lowercase()));

    let results = (0..n_runs as u64)
        .into_par_iter()
        .map(|i| run_single(scenario, base, base_seed + i, ts_dir.as_deref()))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(aggregate(scenario, results))
}

fn sample(results: &[BenchResult], f: impl Fn(&BenchResult) -> f64) -> Stats {
    Stats::from_samples(&results.iter().map(f).collect::<Vec<_>>())
}

/// Aggregate individual runs into a MonteCarloReport.
fn aggregate(scenario: &Scenario, results: Vec<BenchResult>) -> MonteCarloReport {
    let n = results.len();
    let passed = results.iter().filter(|r| r.pass).count();

    MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs: n,
        pass_rate: if n == 0 { 0.0 } else { passed as f64 / n as f64 },
        games_per_agent: sample(&results, |r| r.games_per_agent),
        pooled_avg_diff: sample(&results, |r| r.pooled_avg_diff),
        mean_skill: sample(&results, |r| r.mean_skill),
        leader_score: sample(&results, |r| r.leader_score as f64),
        winners: sample(&results, |r| r.winners as f64),
        overheat_releases: sample(&results, |r| r.overheat_releases as f64),
        final_spread: sample(&results, |r| r.final_spread),
        elapsed_ms: sample(&results, |r| r.elapsed_ms as f64),
        ticks_per_sec: sample(&results, |r| r.ticks_per_sec),
        individual_runs: results,
    }
}
