// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Charge Arena Simulation Suite - Agent State Machine
//
// One agent alternates between Idle and Charging. A charge accumulates power
// and heat; the release compares power against the round's target, scores the
// round, checks the level table and starts a new round.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chaos::sample_chaos_factor;
use crate::config::SimConfig;
use crate::types::*;

// ---------------------------------------------------------------------------
// Game rule constants
// ---------------------------------------------------------------------------

pub const POWER_MAX: u32 = 1000;
pub const TEMP_FLOOR: f64 = 30.0;
pub const TEMP_CEILING: f64 = 100.0;
/// Releasing above this temperature takes the overheat branch.
pub const OVERHEAT_THRESHOLD: f64 = 50.0;
pub const TARGET_MIN: u32 = 300;
pub const TARGET_MAX: u32 = 900;
pub const LEVEL_MAX: u8 = 5;
pub const LEVEL_THRESHOLDS: [u32; LEVEL_MAX as usize] = [100, 250, 500, 750, 1000];
pub const WIN_SCORE: u32 = 1000;
pub const SKILL_MIN: f64 = 1.0;
pub const SKILL_MAX: f64 = 2.0;

const CHARGE_STEP_MIN: u32 = 5;
const CHARGE_STEP_MAX: u32 = 30;
const TEMP_RISE_MAX_HUNDREDTHS: u32 = 28;
const TEMP_RISE_BASE: f64 = 0.02;
const SPIKE_PERCENT: u32 = 10;
const JITTER_MAX: i32 = 10;
const CHAOS_BOOST_MAX: i32 = 10;
const IDLE_COOL_PER_FRAME: f64 = 0.5;
const RELEASE_COOL: f64 = 5.0;

const GREAT_DIFF: u32 = 50;
const GOOD_DIFF: u32 = 100;
const OVERHEAT_PENALTY: i64 = 10;
const MISS_PENALTY: i64 = 5;

/// Mean power gained per charging tick, and the tick length it was tuned at.
const MEAN_CHARGE_PER_TICK: f64 = 15.0;
const CHARGE_TICK_SECS: f64 = 0.05;
const MIN_HOLD_SECS: f64 = 0.1;
const DELAY_MIN_SECS: f64 = 0.5;
const DELAY_MAX_SECS: f64 = 2.0;

// ---------------------------------------------------------------------------
// Tuning
// ---------------------------------------------------------------------------

/// Per-run knobs every agent shares.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentTuning {
    pub learning_rate: f64,
    pub randomness: f64,
    /// Length of one nominal frame; idle cooling is 0.5 per reference frame.
    pub reference_dt: f64,
}

impl From<&SimConfig> for AgentTuning {
    fn from(config: &SimConfig) -> Self {
        Self {
            learning_rate: config.learning_rate,
            randomness: config.randomness,
            reference_dt: config.reference_dt(),
        }
    }
}

impl Default for AgentTuning {
    fn default() -> Self {
        Self::from(&SimConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Agent {
    pub(crate) id: u32,
    pub(crate) control: Control,
    pub(crate) tuning: AgentTuning,
    pub(crate) rng: ChaCha8Rng,

    pub(crate) phase: Phase,
    pub(crate) target: u32,
    pub(crate) target_jitter: i32,
    pub(crate) power: u32,
    pub(crate) temperature: f64,
    pub(crate) chaos_factor: f64,
    pub(crate) pending_spike: PendingSpike,

    pub(crate) hold_time: f64,
    pub(crate) action_timer: f64,
    pub(crate) hold_duration: f64,
    pub(crate) next_action_delay: f64,

    pub(crate) score: u32,
    pub(crate) level: u8,
    pub(crate) skill_level: f64,

    pub(crate) games_played: u32,
    pub(crate) total_diff: u64,
    pub(crate) avg_diff: f64,
    pub(crate) last_diff: Option<u32>,

    pub(crate) feedback: FeedbackCategory,
    pub(crate) standing: Option<CompetitiveStanding>,
    pub(crate) top_score: u32,
}

impl Agent {
    pub fn new(id: u32, control: Control, tuning: AgentTuning, mut rng: ChaCha8Rng) -> Self {
        let target = rng.gen_range(TARGET_MIN..=TARGET_MAX);
        let chaos_factor = sample_chaos_factor(&mut rng);
        let next_action_delay = rng.gen_range(DELAY_MIN_SECS..=DELAY_MAX_SECS);
        let hold_duration = rng.gen_range(DELAY_MIN_SECS..=DELAY_MAX_SECS);
        Self {
            id,
            control,
            tuning,
            rng,
            phase: Phase::Idle,
            target,
            target_jitter: 0,
            power: 0,
            temperature: TEMP_FLOOR,
            chaos_factor,
            pending_spike: PendingSpike::None,
            hold_time: 0.0,
            action_timer: 0.0,
            hold_duration,
            next_action_delay,
            score: 0,
            level: 1,
            skill_level: SKILL_MIN,
            games_played: 0,
            total_diff: 0,
            avg_diff: 0.0,
            last_diff: None,
            feedback: FeedbackCategory::Ready,
            standing: None,
            top_score: 0,
        }
    }

    pub fn id(&self) -> u32 { self.id }
    pub fn control(&self) -> Control { self.control }
    pub fn phase(&self) -> Phase { self.phase }
    pub fn is_holding(&self) -> bool { self.phase == Phase::Charging }
    pub fn target(&self) -> u32 { self.target }
    pub fn power(&self) -> u32 { self.power }
    pub fn temperature(&self) -> f64 { self.temperature }
    pub fn chaos_factor(&self) -> f64 { self.chaos_factor }
    pub fn pending_spike(&self) -> PendingSpike { self.pending_spike }
    pub fn score(&self) -> u32 { self.score }
    pub fn level(&self) -> u8 { self.level }
    pub fn skill_level(&self) -> f64 { self.skill_level }
    pub fn games_played(&self) -> u32 { self.games_played }
    pub fn total_diff(&self) -> u64 { self.total_diff }
    pub fn avg_diff(&self) -> f64 { self.avg_diff }
    pub fn feedback(&self) -> FeedbackCategory { self.feedback }
    pub fn standing(&self) -> Option<CompetitiveStanding> { self.standing }

    /// Level 5 at exactly 1000. The agent keeps playing afterwards.
    pub fn has_won(&self) -> bool {
        self.level == LEVEL_MAX && self.score == WIN_SCORE
    }

    /// Advance the agent by `dt` seconds.
    ///
    /// Bots start and end charges on their own timers and return the outcome
    /// when a release happens. Player agents only charge or cool here.
    pub fn update(&mut self, dt: f64) -> Option<ReleaseOutcome> {
        self.action_timer += dt;
        match self.phase {
            Phase::Charging => {
                self.charge(dt);
                if self.control == Control::Bot && self.hold_time >= self.hold_duration {
                    let outcome = self.release();
                    self.next_action_delay = self.rng.gen_range(DELAY_MIN_SECS..=DELAY_MAX_SECS);
                    self.hold_duration = self.plan_hold_duration();
                    return Some(outcome);
                }
            }
            Phase::Idle => {
                self.cool_down(dt);
                if self.control == Control::Bot && self.action_timer >= self.next_action_delay {
                    self.start_charge();
                    self.hold_duration = self.plan_hold_duration();
                }
            }
        }
        None
    }

    /// Start charging. Returns false if already charging.
    pub fn begin_hold(&mut self) -> bool {
        if self.phase == Phase::Charging {
            return false;
        }
        self.start_charge();
        true
    }

    /// Release an ongoing charge. Idle agents have nothing to release.
    pub fn end_hold(&mut self) -> Option<ReleaseOutcome> {
        if self.phase != Phase::Charging {
            return None;
        }
        Some(self.release())
    }

    fn start_charge(&mut self) {
        self.phase = Phase::Charging;
        self.hold_time = 0.0;
        self.action_timer = 0.0;
        self.chaos_factor = sample_chaos_factor(&mut self.rng);
        debug!(agent = self.id, chaos = self.chaos_factor, target = self.target, "charge started");
    }

    fn charge(&mut self, dt: f64) {
        self.hold_time += dt;
        let step = self.rng.gen_range(CHARGE_STEP_MIN..=CHARGE_STEP_MAX);
        self.power = (self.power + step).min(POWER_MAX);
        let rise = self.rng.gen_range(0..=TEMP_RISE_MAX_HUNDREDTHS) as f64 / 100.0 + TEMP_RISE_BASE;
        self.temperature = (self.temperature + rise).min(TEMP_CEILING);

        if self.rng.gen_range(0..100) < SPIKE_PERCENT {
            if self.rng.gen_range(0..2) == 0 {
                self.power = (self.power * 2).min(POWER_MAX);
                self.pending_spike = PendingSpike::Power;
            } else {
                self.temperature = (self.temperature * 2.0).min(TEMP_CEILING);
                self.pending_spike = PendingSpike::Temperature;
            }
        }
        self.target_jitter = self.rng.gen_range(-JITTER_MAX..=JITTER_MAX);
    }

    fn cool_down(&mut self, dt: f64) {
        let frames = dt / self.tuning.reference_dt;
        self.temperature = (self.temperature - IDLE_COOL_PER_FRAME * frames).max(TEMP_FLOOR);
    }

    fn release(&mut self) -> ReleaseOutcome {
        let chaos_boost = self.rng.gen_range(-CHAOS_BOOST_MAX..=CHAOS_BOOST_MAX);
        let outcome = self.resolve_release(chaos_boost);
        self.action_timer = 0.0;
        outcome
    }

    /// Score the current charge with a given chaos boost and start a new round.
    pub(crate) fn resolve_release(&mut self, chaos_boost: i32) -> ReleaseOutcome {
        let diff = self.target.abs_diff(self.power);
        let score_before = self.score;
        let boost = chaos_boost as i64;
        let mut score = self.score as i64;

        let spike = std::mem::take(&mut self.pending_spike);
        let mut category = match spike.feedback() {
            Some(forced) => forced,
            None if self.temperature > OVERHEAT_THRESHOLD => {
                score -= OVERHEAT_PENALTY + boost;
                FeedbackCategory::Overheat
            }
            None if diff < GREAT_DIFF => {
                score += ((100 - diff) as f64 * self.chaos_factor).round() as i64 + boost;
                FeedbackCategory::Great
            }
            None if diff < GOOD_DIFF => {
                score += ((50 - diff / 2) as f64 * self.chaos_factor).round() as i64 + boost;
                FeedbackCategory::Good
            }
            None => {
                score -= MISS_PENALTY + boost;
                FeedbackCategory::Bad
            }
        };
        let mut score = score.max(0) as u32;

        if score >= LEVEL_THRESHOLDS[(self.level - 1) as usize] {
            if self.level == LEVEL_MAX {
                score = WIN_SCORE;
                category = FeedbackCategory::Win;
                info!(agent = self.id, games = self.games_played + 1, "agent won");
            } else {
                self.level += 1;
                category = FeedbackCategory::LevelUp;
                info!(agent = self.id, level = self.level, score, "level up");
            }
        }
        self.score = score;

        self.phase = Phase::Idle;
        self.power = 0;
        self.temperature = (self.temperature - RELEASE_COOL).max(TEMP_FLOOR);
        self.target = self.rng.gen_range(TARGET_MIN..=TARGET_MAX);
        self.target_jitter = 0;

        self.games_played += 1;
        self.total_diff += diff as u64;
        self.avg_diff = self.total_diff as f64 / self.games_played as f64;
        self.last_diff = Some(diff);
        self.feedback = category;

        debug!(
            agent = self.id,
            diff,
            chaos_boost,
            score = self.score,
            category = category.as_str(),
            "released"
        );

        ReleaseOutcome {
            agent_id: self.id,
            diff,
            chaos_boost,
            score_before,
            score_after: self.score,
            category,
            level: self.level,
            standing: None,
            skill_gain: 0.0,
        }
    }

    fn plan_hold_duration(&mut self) -> f64 {
        let r = self.tuning.randomness;
        let noise = self.rng.gen_range(-r..=r) / self.skill_level;
        planned_hold_duration(self.target, self.chaos_factor, noise)
    }

    /// Compare against the population after a release and learn from the
    /// leader when it is more accurate. Returns the standing and the skill
    /// actually gained.
    pub fn adapt(&mut self, standings: &Standings) -> (CompetitiveStanding, f64) {
        let standing = if standings.leader_id == self.id {
            CompetitiveStanding::Leader
        } else if self.score as f64 > standings.average_score {
            CompetitiveStanding::AboveAverage
        } else {
            CompetitiveStanding::BelowAverage
        };

        let mut gained = 0.0;
        if standing != CompetitiveStanding::Leader
            && self.games_played > 0
            && standings.leader_avg_diff < self.avg_diff
        {
            let before = self.skill_level;
            let delta = skill_gain(self.tuning.learning_rate, standings.leader_avg_diff, self.avg_diff);
            self.skill_level = (self.skill_level + delta).min(SKILL_MAX);
            gained = self.skill_level - before;
        }

        self.standing = Some(standing);
        self.top_score = standings.leader_score;
        (standing, gained)
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            control: self.control,
            holding: self.is_holding(),
            target: self.target,
            target_jitter: self.target_jitter,
            power: self.power,
            temperature: self.temperature,
            score: self.score,
            level: self.level,
            skill_level: self.skill_level,
            chaos_factor: self.chaos_factor,
            games_played: self.games_played,
            avg_diff: self.avg_diff,
            last_diff: self.last_diff,
            feedback: self.feedback,
            standing: self.standing,
            top_score: self.top_score,
            won: self.has_won(),
        }
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Seconds to hold so that mean charging lands on `target`, perturbed by
/// `noise` and floored at 0.1s.
pub fn planned_hold_duration(target: u32, chaos_factor: f64, noise: f64) -> f64 {
    let base = (target as f64 / MEAN_CHARGE_PER_TICK) * CHARGE_TICK_SECS / chaos_factor;
    (base * (1.0 + noise)).max(MIN_HOLD_SECS)
}

/// Skill increment for an agent whose accuracy trails the leader's.
pub fn skill_gain(learning_rate: f64, leader_avg_diff: f64, own_avg_diff: f64) -> f64 {
    learning_rate * (1.0 / (1.0 + leader_avg_diff / (own_avg_diff + 1.0)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
