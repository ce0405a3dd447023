// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Charge Arena Simulation Suite - Population
//
// Owns the agents and answers the two questions an agent asks after a
// release: who leads, and what the average score is. Nothing is cached; every
// query reads the current agent states.

use tracing::warn;

use crate::agent::{Agent, AgentTuning};
use crate::config::SimConfig;
use crate::rng::derive_agent_rng;
use crate::types::*;

/// Entries in the run summary leaderboard.
pub const SUMMARY_LEADERBOARD_SIZE: usize = 3;

#[derive(Debug, Clone)]
pub struct Population {
    agents: Vec<Agent>,
}

impl Population {
    /// Build `agent_count` agents with ids `0..agent_count`; the first
    /// `player_count` of them are player controlled.
    pub fn new(config: &SimConfig) -> Self {
        let tuning = AgentTuning::from(config);
        let agents = (0..config.agent_count as u32)
            .map(|id| {
                let control = if (id as usize) < config.player_count {
                    Control::Player
                } else {
                    Control::Bot
                };
                Agent::new(id, control, tuning, derive_agent_rng(config.seed, id))
            })
            .collect();
        Self { agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: u32) -> Option<&Agent> {
        self.agents.get(id as usize)
    }

    pub(crate) fn agent_mut(&mut self, id: u32) -> Option<&mut Agent> {
        self.agents.get_mut(id as usize)
    }

    /// Advance every agent by `dt`, then resolve this tick's releases against
    /// one standings snapshot taken after all agents have moved.
    pub fn tick(&mut self, dt: f64) -> Vec<ReleaseOutcome> {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!(dt, "invalid step floored to zero");
            0.0
        };

        let mut releases: Vec<ReleaseOutcome> =
            self.agents.iter_mut().filter_map(|agent| agent.update(dt)).collect();
        self.apply_standings(&mut releases);
        releases
    }

    /// Let each released agent compare itself against the current population.
    pub(crate) fn apply_standings(&mut self, releases: &mut [ReleaseOutcome]) {
        if releases.is_empty() {
            return;
        }
        let Some(standings) = self.standings() else {
            return;
        };
        for outcome in releases.iter_mut() {
            if let Some(agent) = self.agents.get_mut(outcome.agent_id as usize) {
                let (standing, gained) = agent.adapt(&standings);
                outcome.standing = Some(standing);
                outcome.skill_gain = gained;
            }
        }
    }

    /// Highest score; ties go to the agent that comes first.
    pub fn leader(&self) -> Option<&Agent> {
        self.agents.iter().fold(None, |best: Option<&Agent>, agent| match best {
            Some(b) if b.score() >= agent.score() => Some(b),
            _ => Some(agent),
        })
    }

    pub fn average_score(&self) -> f64 {
        if self.agents.is_empty() {
            return 0.0;
        }
        self.agents.iter().map(|a| a.score() as f64).sum::<f64>() / self.agents.len() as f64
    }

    pub fn standings(&self) -> Option<Standings> {
        let leader = self.leader()?;
        Some(Standings {
            leader_id: leader.id(),
            leader_score: leader.score(),
            leader_avg_diff: leader.avg_diff(),
            average_score: self.average_score(),
        })
    }

    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        self.agents.iter().map(Agent::snapshot).collect()
    }

    pub fn stats(&self) -> PopulationStats {
        let (leader_id, leader_score) = self
            .leader()
            .map(|l| (l.id(), l.score()))
            .unwrap_or((0, 0));
        let n = self.agents.len().max(1) as f64;
        PopulationStats {
            leader_id,
            leader_score,
            average_score: self.average_score(),
            total_games: self.total_games(),
            pooled_avg_diff: self.pooled_avg_diff(),
            mean_skill: self.agents.iter().map(Agent::skill_level).sum::<f64>() / n,
            winners: self.agents.iter().filter(|a| a.has_won()).count() as u32,
            charging: self.agents.iter().filter(|a| a.is_holding()).count() as u32,
        }
    }

    pub fn total_games(&self) -> u64 {
        self.agents.iter().map(|a| a.games_played() as u64).sum()
    }

    /// Every diff ever recorded over every game played.
    pub fn pooled_avg_diff(&self) -> f64 {
        let games = self.total_games();
        if games == 0 {
            return 0.0;
        }
        self.agents.iter().map(Agent::total_diff).sum::<u64>() as f64 / games as f64
    }

    /// Top `n` agents by score. Equal scores keep creation order.
    pub fn leaderboard(&self, n: usize) -> Vec<LeaderboardEntry> {
        let mut ranked: Vec<&Agent> = self.agents.iter().collect();
        ranked.sort_by(|a, b| b.score().cmp(&a.score()));
        ranked
            .into_iter()
            .take(n)
            .enumerate()
            .map(|(i, a)| LeaderboardEntry {
                rank: i + 1,
                id: a.id(),
                score: a.score(),
                level: a.level(),
                avg_diff: a.avg_diff(),
                skill_level: a.skill_level(),
            })
            .collect()
    }

    pub fn summary(&self) -> RunSummary {
        let stats = self.stats();
        RunSummary {
            total_games: stats.total_games,
            average_diff: stats.pooled_avg_diff,
            winners: stats.winners,
            mean_skill: stats.mean_skill,
            leaderboard: self.leaderboard(SUMMARY_LEADERBOARD_SIZE),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn population(n: usize) -> Population {
        Population::new(&SimConfig { agent_count: n, seed: 5, ..SimConfig::default() })
    }

    fn set_record(p: &mut Population, id: u32, score: u32, games: u32, avg_diff: f64) {
        let a = p.agent_mut(id).unwrap();
        a.score = score;
        a.games_played = games;
        a.total_diff = (avg_diff * games as f64) as u64;
        a.avg_diff = avg_diff;
    }

    fn release_stub(agent_id: u32) -> ReleaseOutcome {
        ReleaseOutcome {
            agent_id,
            diff: 0,
            chaos_boost: 0,
            score_before: 0,
            score_after: 0,
            category: FeedbackCategory::Bad,
            level: 1,
            standing: None,
            skill_gain: 0.0,
        }
    }

    #[test]
    fn test_ids_and_controls() {
        let p = Population::new(&SimConfig { agent_count: 4, player_count: 1, ..SimConfig::default() });
        assert_eq!(p.len(), 4);
        let ids: Vec<u32> = p.agents().iter().map(Agent::id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(p.agent(0).unwrap().control(), Control::Player);
        assert_eq!(p.agent(3).unwrap().control(), Control::Bot);
        assert!(p.agent(4).is_none());
    }

    #[test]
    fn test_three_agent_scenario() {
        let mut p = population(3);
        set_record(&mut p, 0, 100, 4, 20.0);
        set_record(&mut p, 1, 50, 4, 60.0);
        set_record(&mut p, 2, 10, 4, 90.0);

        assert_eq!(p.leader().unwrap().id(), 0);
        assert!((p.average_score() - 160.0 / 3.0).abs() < 1e-9);

        let mut releases = vec![release_stub(2)];
        p.apply_standings(&mut releases);
        assert_eq!(releases[0].standing, Some(CompetitiveStanding::BelowAverage));
        assert!(releases[0].skill_gain > 0.0);
        assert!(p.agent(2).unwrap().skill_level() > 1.0);
        assert_eq!(p.agent(0).unwrap().skill_level(), 1.0);
    }

    #[test]
    fn test_leader_tie_goes_to_first() {
        let mut p = population(4);
        set_record(&mut p, 1, 70, 1, 10.0);
        set_record(&mut p, 3, 70, 1, 5.0);
        assert_eq!(p.leader().unwrap().id(), 1);
    }

    #[test]
    fn test_leader_of_fresh_population_is_first_agent() {
        let p = population(5);
        assert_eq!(p.leader().unwrap().id(), 0);
        assert_eq!(p.average_score(), 0.0);
    }

    #[test]
    fn test_same_tick_releases_share_one_snapshot() {
        let mut p = population(3);
        set_record(&mut p, 0, 200, 5, 10.0);
        set_record(&mut p, 1, 120, 5, 40.0);
        set_record(&mut p, 2, 30, 5, 80.0);
        let mut releases = vec![release_stub(1), release_stub(2)];
        p.apply_standings(&mut releases);
        // average (200 + 120 + 30) / 3 = 116.7
        assert_eq!(releases[0].standing, Some(CompetitiveStanding::AboveAverage));
        assert_eq!(releases[1].standing, Some(CompetitiveStanding::BelowAverage));
        assert_eq!(p.agent(1).unwrap().top_score, 200);
        assert_eq!(p.agent(2).unwrap().top_score, 200);
    }

    #[test]
    fn test_leaderboard_sorted_and_stable() {
        let mut p = population(5);
        set_record(&mut p, 0, 10, 1, 1.0);
        set_record(&mut p, 1, 300, 1, 1.0);
        set_record(&mut p, 2, 80, 1, 1.0);
        set_record(&mut p, 3, 300, 1, 1.0);
        let board = p.leaderboard(3);
        let ids: Vec<u32> = board.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[2].rank, 3);
        assert_eq!(p.leaderboard(10).len(), 5);
    }

    #[test]
    fn test_summary_pools_diffs() {
        let mut p = population(2);
        set_record(&mut p, 0, 10, 2, 30.0);
        set_record(&mut p, 1, 20, 6, 50.0);
        let summary = p.summary();
        assert_eq!(summary.total_games, 8);
        // (60 + 300) / 8
        assert!((summary.average_diff - 45.0).abs() < 1e-9);
        assert_eq!(summary.leaderboard.len(), 2);
        assert_eq!(summary.leaderboard[0].id, 1);
        assert_eq!(summary.mean_skill, 1.0);
    }

    #[test]
    fn test_stats_before_any_game() {
        let p = population(3);
        let stats = p.stats();
        assert_eq!(stats.total_games, 0);
        assert_eq!(stats.pooled_avg_diff, 0.0);
        assert_eq!(stats.winners, 0);
    }

    #[test]
    fn test_invalid_dt_floored() {
        let mut p = population(3);
        let before: Vec<f64> = p.agents().iter().map(|a| a.action_timer).collect();
        p.tick(-1.0);
        p.tick(f64::NAN);
        let after: Vec<f64> = p.agents().iter().map(|a| a.action_timer).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_tick_is_reproducible() {
        let mut a = population(6);
        let mut b = population(6);
        for _ in 0..2_000 {
            let ra = a.tick(1.0 / 60.0);
            let rb = b.tick(1.0 / 60.0);
            assert_eq!(ra, rb);
        }
        assert_eq!(a.snapshots(), b.snapshots());
    }

    #[test]
    fn test_releases_carry_standing() {
        let mut p = population(4);
        let mut seen = 0;
        for _ in 0..60 * 30 {
            for r in p.tick(1.0 / 60.0) {
                assert!(r.standing.is_some());
                seen += 1;
            }
        }
        assert!(seen > 0);
    }
}
