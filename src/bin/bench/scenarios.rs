// Scenario Definitions — population size, frame pacing and learning knobs
// Every scenario is plain data plus an optional frame-time curve

use charge_arena::SimConfig;

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub bots: usize,
    pub ticks: u64,
    pub frame_rate: f64,
    pub learning_rate: f64,
    pub randomness: f64,
    /// Frame time for each tick. `Some` switches the run to a variable-step clock.
    pub frame_curve: Option<fn(u64) -> f64>,
    pub criteria: PassCriteria,
}

pub struct PassCriteria {
    pub max_invariant_violations: u32,
    /// Mean releases per agent by the end of the run.
    pub min_games_per_agent: Option<f64>,
    /// Mean skill must have moved above 1.0.
    pub require_skill_gain: bool,
    /// Mean skill must not exceed this (learning disabled or nobody to learn from).
    pub max_mean_skill: Option<f64>,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            max_invariant_violations: 0,
            min_games_per_agent: None,
            require_skill_gain: false,
            max_mean_skill: None,
        }
    }
}

impl Scenario {
    /// Simulation config for one seeded run. Fields a scenario does not
    /// control come from `base`.
    pub fn config(&self, base: &SimConfig, seed: u64) -> SimConfig {
        SimConfig {
            seed,
            agent_count: self.bots,
            player_count: 0,
            frame_rate: self.frame_rate,
            variable_step: self.frame_curve.is_some(),
            learning_rate: self.learning_rate,
            randomness: self.randomness,
            ..base.clone()
        }
    }
}

// ─── Frame Curves ───────────────────────────────────────────────────────────

const FRAME_60: f64 = 1.0 / 60.0;

/// Smooth 60 FPS with a half-second stall every 300 frames.
fn stall_frames(tick: u64) -> f64 {
    if tick > 0 && tick % 300 == 0 { 0.5 } else { FRAME_60 }
}

/// 60 FPS wobbling between roughly 8ms and 25ms.
fn jittery_frames(tick: u64) -> f64 {
    FRAME_60 + 0.008 * (tick as f64 / 7.0).sin()
}

/// Slow device: around 24 FPS with periodic dips.
fn slow_device_frames(tick: u64) -> f64 {
    let base = 1.0 / 24.0;
    if tick % 90 < 10 { base * 2.5 } else { base }
}

// ─── Scenario Table ─────────────────────────────────────────────────────────

fn base(name: &'static str, label: &'static str, category: &'static str) -> Scenario {
    Scenario {
        name,
        label,
        category,
        bots: 10,
        ticks: 3_600,
        frame_rate: 60.0,
        learning_rate: 0.1,
        randomness: 0.2,
        frame_curve: None,
        criteria: PassCriteria::default(),
    }
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            criteria: PassCriteria { min_games_per_agent: Some(4.0), ..PassCriteria::default() },
            ..base("STRESS_BASELINE", "Stress: 10 bots, 1 min @60", "stress")
        },
        Scenario {
            ticks: 36_000,
            criteria: PassCriteria {
                min_games_per_agent: Some(40.0),
                require_skill_gain: true,
                ..PassCriteria::default()
            },
            ..base("STRESS_LONG_RUN", "Stress: 10 bots, 10 min @60", "stress")
        },
        Scenario {
            bots: 200,
            criteria: PassCriteria { min_games_per_agent: Some(4.0), ..PassCriteria::default() },
            ..base("LARGE_POPULATION", "Stress: 200 bots, 1 min @60", "stress")
        },
        Scenario {
            bots: 2,
            ticks: 18_000,
            ..base("DUEL", "Duel: 2 bots, 5 min", "population")
        },
        Scenario {
            bots: 1,
            criteria: PassCriteria { max_mean_skill: Some(1.0), ..PassCriteria::default() },
            ..base("SOLO", "Solo bot never learns", "population")
        },
        Scenario {
            frame_rate: 20.0,
            ticks: 1_200,
            criteria: PassCriteria { min_games_per_agent: Some(4.0), ..PassCriteria::default() },
            ..base("LOW_FRAME_RATE", "Fixed step @20", "pacing")
        },
        Scenario {
            frame_curve: Some(stall_frames),
            ..base("FRAME_STALLS", "Variable step with stalls", "pacing")
        },
        Scenario {
            frame_curve: Some(jittery_frames),
            ..base("JITTERY_FRAMES", "Variable step with jitter", "pacing")
        },
        Scenario {
            frame_rate: 24.0,
            ticks: 1_440,
            frame_curve: Some(slow_device_frames),
            ..base("SLOW_DEVICE", "Variable step ~24 FPS", "pacing")
        },
        Scenario {
            randomness: 0.9,
            ..base("HIGH_NOISE", "Hold noise ±90%", "learning")
        },
        Scenario {
            learning_rate: 0.0,
            ticks: 18_000,
            criteria: PassCriteria { max_mean_skill: Some(1.0), ..PassCriteria::default() },
            ..base("NO_LEARNING", "Learning disabled", "learning")
        },
        Scenario {
            learning_rate: 0.5,
            ticks: 18_000,
            criteria: PassCriteria { require_skill_gain: true, ..PassCriteria::default() },
            ..base("FAST_LEARNERS", "Learning rate 0.5", "learning")
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_configs_validate() {
        let base = SimConfig::default();
        for s in scenarios() {
            let cfg = s.config(&base, 3);
            assert!(cfg.validate().is_ok(), "{} has an invalid config", s.name);
            assert_eq!(cfg.variable_step, s.frame_curve.is_some());
        }
    }

    #[test]
    fn test_frame_curves_are_non_negative() {
        for tick in 0..2_000 {
            assert!(stall_frames(tick) > 0.0);
            assert!(jittery_frames(tick) > 0.0);
            assert!(slow_device_frames(tick) > 0.0);
        }
    }
}
