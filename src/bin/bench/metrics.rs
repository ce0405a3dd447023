// Per-Tick Metric Trackers — Invariants, Accuracy Spread, Learning Comparison
// Trackers only read TickResult snapshots; they never touch the simulation

use charge_arena::agent::{
    LEVEL_MAX, POWER_MAX, SKILL_MAX, SKILL_MIN, TARGET_MAX, TARGET_MIN, TEMP_CEILING,
    TEMP_FLOOR, WIN_SCORE,
};
use charge_arena::*;

/// Violation messages kept per run; the count keeps going past this.
const MAX_RECORDED_VIOLATIONS: usize = 10;

// ─── Invariant Tracker ──────────────────────────────────────────────────────

/// Checks every agent's bounds each tick, plus monotonic skill and level.
pub struct InvariantTracker {
    pub violations: u32,
    pub messages: Vec<String>,
    pub overheat_releases: u32,
    pub spike_releases: u32,
    pub level_ups: u32,
    pub wins: u32,
    last_skill: Vec<f64>,
    last_level: Vec<u8>,
}

impl InvariantTracker {
    pub fn new(agents: usize) -> Self {
        Self {
            violations: 0,
            messages: Vec::new(),
            overheat_releases: 0,
            spike_releases: 0,
            level_ups: 0,
            wins: 0,
            last_skill: vec![SKILL_MIN; agents],
            last_level: vec![1; agents],
        }
    }

    pub fn record_tick(&mut self, result: &TickResult) {
        for a in &result.agents {
            let i = a.id as usize;
            if a.power > POWER_MAX {
                self.violation(result.tick, format!("agent {} power {}", a.id, a.power));
            }
            if !(TEMP_FLOOR..=TEMP_CEILING).contains(&a.temperature) {
                self.violation(result.tick, format!("agent {} temperature {:.2}", a.id, a.temperature));
            }
            if !(1..=LEVEL_MAX).contains(&a.level) {
                self.violation(result.tick, format!("agent {} level {}", a.id, a.level));
            }
            if !(SKILL_MIN..=SKILL_MAX).contains(&a.skill_level) {
                self.violation(result.tick, format!("agent {} skill {:.3}", a.id, a.skill_level));
            }
            if !(TARGET_MIN..=TARGET_MAX).contains(&a.target) {
                self.violation(result.tick, format!("agent {} target {}", a.id, a.target));
            }
            if a.games_played > 0 && a.avg_diff < 0.0 {
                self.violation(result.tick, format!("agent {} avg_diff {:.2}", a.id, a.avg_diff));
            }
            if let (Some(&skill), Some(&level)) = (self.last_skill.get(i), self.last_level.get(i)) {
                if a.skill_level < skill {
                    self.violation(result.tick, format!("agent {} skill fell {skill:.3} -> {:.3}", a.id, a.skill_level));
                }
                if a.level < level {
                    self.violation(result.tick, format!("agent {} level fell {level} -> {}", a.id, a.level));
                }
                self.last_skill[i] = a.skill_level;
                self.last_level[i] = a.level;
            }
        }

        for r in &result.releases {
            match r.category {
                FeedbackCategory::Overheat => {
                    self.overheat_releases += 1;
                    if r.score_after > r.score_before {
                        self.violation(result.tick, format!("agent {} gained score while overheated", r.agent_id));
                    }
                }
                FeedbackCategory::PowerSpike | FeedbackCategory::TemperatureSpike => {
                    self.spike_releases += 1;
                }
                FeedbackCategory::LevelUp => self.level_ups += 1,
                FeedbackCategory::Win => {
                    self.wins += 1;
                    if r.score_after != WIN_SCORE {
                        self.violation(result.tick, format!("agent {} won with {}", r.agent_id, r.score_after));
                    }
                }
                _ => {}
            }
        }
    }

    fn violation(&mut self, tick: u64, message: String) {
        self.violations += 1;
        if self.messages.len() < MAX_RECORDED_VIOLATIONS {
            self.messages.push(format!("tick {tick}: {message}"));
        }
    }
}

// ─── Accuracy Spread Tracker ────────────────────────────────────────────────

/// Standard deviation of per-agent avg_diff, sampled once every agent has
/// played. Learning should narrow it over a long run.
pub struct SpreadTracker {
    pub initial_spread: Option<f64>,
    pub final_spread: f64,
}

impl SpreadTracker {
    pub fn new() -> Self {
        Self { initial_spread: None, final_spread: 0.0 }
    }

    pub fn record_tick(&mut self, result: &TickResult) {
        if result.agents.iter().any(|a| a.games_played == 0) {
            return;
        }
        let spread = std_dev(result.agents.iter().map(|a| a.avg_diff));
        self.initial_spread.get_or_insert(spread);
        self.final_spread = spread;
    }
}

fn std_dev(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

// ─── Learning Comparison (Paired Runs) ──────────────────────────────────────

/// Same seed and population, learning on versus off.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LearningComparison {
    pub seed: u64,
    pub with_learning_avg_diff: f64,
    pub without_learning_avg_diff: f64,
    pub with_learning_mean_skill: f64,
    /// Positive when learning lowered the pooled average diff.
    pub improvement_pct: f64,
}

pub fn run_learning_comparison(
    base: &SimConfig,
    bots: usize,
    ticks: u64,
    seed: u64,
) -> anyhow::Result<LearningComparison> {
    let learning = run_pooled(SimConfig { seed, agent_count: bots, player_count: 0, ..base.clone() }, ticks)?;
    let frozen = run_pooled(
        SimConfig { seed, agent_count: bots, player_count: 0, learning_rate: 0.0, ..base.clone() },
        ticks,
    )?;

    let improvement_pct = if frozen.pooled_avg_diff > 0.0 {
        (frozen.pooled_avg_diff - learning.pooled_avg_diff) / frozen.pooled_avg_diff * 100.0
    } else {
        0.0
    };

    Ok(LearningComparison {
        seed,
        with_learning_avg_diff: learning.pooled_avg_diff,
        without_learning_avg_diff: frozen.pooled_avg_diff,
        with_learning_mean_skill: learning.mean_skill,
        improvement_pct,
    })
}

fn run_pooled(config: SimConfig, ticks: u64) -> anyhow::Result<PopulationStats> {
    let frame = config.variable_step.then(|| config.reference_dt());
    let mut sim = ChargeArena::with_config(config)?;
    sim.run_batch_core(ticks, frame)?;
    Ok(sim.stats())
}
