// Benchmark Report Types
// Structured JSON output, one file per suite run

use serde::Serialize;

use crate::metrics::LearningComparison;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96; // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: samples.iter().copied().fold(f64::INFINITY, f64::min),
            max: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }

    pub fn half_width(&self) -> f64 {
        (self.ci_upper - self.ci_lower) / 2.0
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BenchResult {
    pub scenario: String,
    pub name: String,
    pub category: String,
    pub seed: u64,
    pub pass: bool,
    pub failures: Vec<String>,
    pub ticks: u64,
    pub simulated_secs: f64,
    pub total_games: u64,
    pub games_per_agent: f64,
    pub pooled_avg_diff: f64,
    pub mean_skill: f64,
    pub leader_score: u32,
    pub winners: u32,
    pub level_ups: u32,
    pub overheat_releases: u32,
    pub spike_releases: u32,
    pub invariant_violations: u32,
    pub violation_messages: Vec<String>,
    pub initial_spread: Option<f64>,
    pub final_spread: f64,
    pub elapsed_ms: u128,
    pub ticks_per_sec: f64,
}

// ─── Monte Carlo Report (per-scenario aggregation) ──────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloReport {
    pub scenario_name: String,
    pub label: String,
    pub category: String,
    pub n_runs: usize,
    pub pass_rate: f64,
    pub games_per_agent: Stats,
    pub pooled_avg_diff: Stats,
    pub mean_skill: Stats,
    pub leader_score: Stats,
    pub winners: Stats,
    pub overheat_releases: Stats,
    pub final_spread: Stats,
    pub elapsed_ms: Stats,
    pub ticks_per_sec: Stats,
    pub individual_runs: Vec<BenchResult>,
}

// ─── Suite Validation ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Validation {
    pub invariants_hold: bool,
    pub total_invariant_violations: u32,
    /// Paired run on the baseline population; `None` when skipped by the filter.
    pub learning: Option<LearningComparison>,
}

impl Validation {
    pub fn all_pass(&self) -> bool {
        self.invariants_hold
    }
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub n_runs_per_scenario: usize,
    pub base_seed: u64,
    pub summary: Summary,
    pub validation: Validation,
    pub scenarios: Vec<MonteCarloReport>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_from_samples() {
        let s = Stats::from_samples(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.n, 4);
        assert!((s.mean - 2.5).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert!(s.ci_lower < s.mean && s.mean < s.ci_upper);
        assert!((s.half_width() - 1.96 * s.std_dev / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_stats_empty_and_single() {
        assert_eq!(Stats::from_samples(&[]).n, 0);
        let one = Stats::from_samples(&[7.0]);
        assert_eq!(one.std_dev, 0.0);
        assert_eq!(one.ci_lower, 7.0);
    }
}
