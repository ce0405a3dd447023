// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Charge Arena Simulation Suite - Type Definitions

use serde::{Deserialize, Serialize};

// ─── Control ─────────────────────────────────────────────────────────────────

/// Who triggers an agent's charge/release transitions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Control {
    /// Internal timers start and end every charge.
    #[default]
    Bot,
    /// begin_hold / end_hold from outside.
    Player,
}

// ─── Phase ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    #[default]
    Idle,
    Charging,
}

// ─── Pending Spike ───────────────────────────────────────────────────────────

/// Spike recorded during a charge, consumed by the next release.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PendingSpike {
    #[default]
    None,
    Power,
    Temperature,
}

impl PendingSpike {
    /// Feedback a pending spike forces on the release, if any.
    pub fn feedback(self) -> Option<FeedbackCategory> {
        match self {
            Self::None => None,
            Self::Power => Some(FeedbackCategory::PowerSpike),
            Self::Temperature => Some(FeedbackCategory::TemperatureSpike),
        }
    }
}

// ─── Feedback ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FeedbackCategory {
    #[default]
    Ready,
    Great,
    Good,
    Bad,
    Overheat,
    LevelUp,
    Win,
    PowerSpike,
    TemperatureSpike,
}

impl FeedbackCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Great => "great",
            Self::Good => "good",
            Self::Bad => "bad",
            Self::Overheat => "overheat",
            Self::LevelUp => "level-up",
            Self::Win => "win",
            Self::PowerSpike => "power-spike",
            Self::TemperatureSpike => "temperature-spike",
        }
    }
}

/// Where an agent stood relative to its peers at its last release.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CompetitiveStanding {
    Leader,
    AboveAverage,
    BelowAverage,
}

impl CompetitiveStanding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leader => "leader",
            Self::AboveAverage => "above-average",
            Self::BelowAverage => "below-average",
        }
    }
}

// ─── Standings ───────────────────────────────────────────────────────────────

/// Read-only view of the population handed to agents after a release.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Standings {
    pub leader_id: u32,
    pub leader_score: u32,
    pub leader_avg_diff: f64,
    pub average_score: f64,
}

// ─── ReleaseOutcome ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReleaseOutcome {
    pub agent_id: u32,
    pub diff: u32,
    pub chaos_boost: i32,
    pub score_before: u32,
    pub score_after: u32,
    pub category: FeedbackCategory,
    pub level: u8,
    #[serde(default)]
    pub standing: Option<CompetitiveStanding>,
    #[serde(default)]
    pub skill_gain: f64,
}

// ─── AgentSnapshot ───────────────────────────────────────────────────────────

/// Everything a renderer or metrics collector may read about one agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSnapshot {
    pub id: u32,
    pub control: Control,
    pub holding: bool,
    pub target: u32,
    pub target_jitter: i32,
    pub power: u32,
    pub temperature: f64,
    pub score: u32,
    pub level: u8,
    pub skill_level: f64,
    pub chaos_factor: f64,
    pub games_played: u32,
    pub avg_diff: f64,
    pub last_diff: Option<u32>,
    pub feedback: FeedbackCategory,
    pub standing: Option<CompetitiveStanding>,
    pub top_score: u32,
    pub won: bool,
}

// ─── PopulationStats ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PopulationStats {
    pub leader_id: u32,
    pub leader_score: u32,
    pub average_score: f64,
    pub total_games: u64,
    /// Sum of every diff over sum of games, 0 before the first release.
    pub pooled_avg_diff: f64,
    pub mean_skill: f64,
    pub winners: u32,
    pub charging: u32,
}

// ─── Leaderboard / Summary ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub id: u32,
    pub score: u32,
    pub level: u8,
    pub avg_diff: f64,
    pub skill_level: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub total_games: u64,
    pub average_diff: f64,
    pub winners: u32,
    pub mean_skill: f64,
    pub leaderboard: Vec<LeaderboardEntry>,
}

// ─── TickResult ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct TickResult {
    pub tick: u64,
    pub elapsed: f64,
    pub dt: f64,
    pub agents: Vec<AgentSnapshot>,
    pub releases: Vec<ReleaseOutcome>,
    pub stats: PopulationStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_serialize_kebab_case() {
        let json = serde_json::to_string(&FeedbackCategory::LevelUp).unwrap();
        assert_eq!(json, "\"level-up\"");
        let json = serde_json::to_string(&CompetitiveStanding::BelowAverage).unwrap();
        assert_eq!(json, "\"below-average\"");
        assert_eq!(FeedbackCategory::TemperatureSpike.as_str(), "temperature-spike");
        assert_eq!(CompetitiveStanding::AboveAverage.as_str(), "above-average");
    }

    #[test]
    fn test_spike_feedback() {
        assert_eq!(PendingSpike::None.feedback(), None);
        assert_eq!(PendingSpike::Power.feedback(), Some(FeedbackCategory::PowerSpike));
        assert_eq!(
            PendingSpike::Temperature.feedback(),
            Some(FeedbackCategory::TemperatureSpike)
        );
    }
}
