// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Charge Arena Simulation Suite - Simulation Core

use tracing::debug;
use wasm_bindgen::prelude::*;

use crate::agent::Agent;
use crate::clock::{ClockError, SimulationClock};
use crate::config::{ConfigError, SimConfig};
use crate::population::Population;
use crate::types::*;

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("no agent with id {0}")]
    UnknownAgent(u32),
    #[error("agent {0} is bot controlled")]
    NotPlayerControlled(u32),
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ─── ChargeArena struct ──────────────────────────────────────────────────────

#[wasm_bindgen]
pub struct ChargeArena {
    pub(crate) config: SimConfig,
    pub(crate) population: Population,
    pub(crate) clock: SimulationClock,
}

// ─── Internal Logic (Testable, pure Rust) ────────────────────────────────────

impl ChargeArena {
    pub fn with_config(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    pub(crate) fn from_validated(config: SimConfig) -> Self {
        Self {
            population: Population::new(&config),
            clock: SimulationClock::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Advance one tick. `frame_dt` is required for variable-step runs and
    /// ignored for fixed-step runs.
    pub fn tick_core(&mut self, frame_dt: Option<f64>) -> Result<TickResult, SimError> {
        let dt = self.clock.advance(frame_dt)?;
        let releases = self.population.tick(dt);
        Ok(TickResult {
            tick: self.clock.ticks(),
            elapsed: self.clock.elapsed(),
            dt,
            agents: self.population.snapshots(),
            releases,
            stats: self.population.stats(),
        })
    }

    /// Run `ticks` ticks, discarding the snapshots.
    pub fn run_batch_core(&mut self, ticks: u64, frame_dt: Option<f64>) -> Result<(), SimError> {
        for _ in 0..ticks {
            let dt = self.clock.advance(frame_dt)?;
            self.population.tick(dt);
        }
        Ok(())
    }

    /// Start charging a player agent. Returns false if it was already charging.
    pub fn begin_hold_core(&mut self, id: u32) -> Result<bool, SimError> {
        let agent = self.player_mut(id)?;
        Ok(agent.begin_hold())
    }

    /// Release a player agent's charge and resolve it against the current
    /// population. `None` when the agent was not charging.
    pub fn end_hold_core(&mut self, id: u32) -> Result<Option<ReleaseOutcome>, SimError> {
        let agent = self.player_mut(id)?;
        let Some(outcome) = agent.end_hold() else {
            return Ok(None);
        };
        let mut releases = [outcome];
        self.population.apply_standings(&mut releases);
        let [outcome] = releases;
        debug!(agent = id, diff = outcome.diff, "player release");
        Ok(Some(outcome))
    }

    fn player_mut(&mut self, id: u32) -> Result<&mut Agent, SimError> {
        let agent = self.population.agent_mut(id).ok_or(SimError::UnknownAgent(id))?;
        if agent.control() != Control::Player {
            return Err(SimError::NotPlayerControlled(id));
        }
        Ok(agent)
    }

    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        self.population.snapshots()
    }

    pub fn stats(&self) -> PopulationStats {
        self.population.stats()
    }

    pub fn summary(&self) -> RunSummary {
        self.population.summary()
    }

    pub fn leaderboard(&self, n: usize) -> Vec<LeaderboardEntry> {
        self.population.leaderboard(n)
    }

    /// Restart from tick 0 with the same configuration and seed.
    pub fn reset_core(&mut self) {
        *self = Self::from_validated(self.config.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TimeStep;

    fn arena(config: SimConfig) -> ChargeArena {
        ChargeArena::with_config(config).expect("valid config")
    }

    #[test]
    fn test_rejects_invalid_config() {
        let err = ChargeArena::with_config(SimConfig { agent_count: 0, ..SimConfig::default() });
        assert!(matches!(err, Err(SimError::Config(ConfigError::EmptyPopulation))));
    }

    #[test]
    fn test_tick_result_shape() {
        let mut sim = arena(SimConfig { agent_count: 4, ..SimConfig::default() });
        let result = sim.tick_core(None).unwrap();
        assert_eq!(result.tick, 1);
        assert_eq!(result.agents.len(), 4);
        assert!((result.dt - 1.0 / 60.0).abs() < 1e-12);
        assert!((result.elapsed - result.dt).abs() < 1e-12);
    }

    #[test]
    fn test_variable_clock_requires_frame_time() {
        let mut sim = arena(SimConfig { variable_step: true, ..SimConfig::default() });
        assert!(matches!(sim.clock().mode(), TimeStep::Variable { .. }));
        assert!(matches!(
            sim.tick_core(None),
            Err(SimError::Clock(ClockError::MissingFrameTime))
        ));
        assert!(matches!(
            sim.tick_core(Some(-0.5)),
            Err(SimError::Clock(ClockError::InvalidStep(_)))
        ));
        assert_eq!(sim.tick_core(Some(1.0)).unwrap().dt, 0.25);
    }

    #[test]
    fn test_player_actions_routed() {
        let mut sim = arena(SimConfig { agent_count: 3, player_count: 1, ..SimConfig::default() });
        assert!(matches!(sim.begin_hold_core(9), Err(SimError::UnknownAgent(9))));
        assert!(matches!(sim.begin_hold_core(2), Err(SimError::NotPlayerControlled(2))));
        assert!(matches!(sim.end_hold_core(1), Err(SimError::NotPlayerControlled(1))));

        assert_eq!(sim.end_hold_core(0).unwrap(), None);
        assert!(sim.begin_hold_core(0).unwrap());
        assert!(!sim.begin_hold_core(0).unwrap());
        sim.run_batch_core(20, None).unwrap();
        let outcome = sim.end_hold_core(0).unwrap().expect("release while charging");
        assert_eq!(outcome.agent_id, 0);
        assert!(outcome.standing.is_some());
        assert_eq!(sim.population().agent(0).unwrap().games_played(), 1);
    }

    #[test]
    fn test_reset_replays_same_run() {
        let mut sim = arena(SimConfig { agent_count: 5, seed: 77, ..SimConfig::default() });
        sim.run_batch_core(600, None).unwrap();
        let first = sim.snapshots();
        sim.reset_core();
        assert_eq!(sim.clock().ticks(), 0);
        assert_eq!(sim.stats().total_games, 0);
        sim.run_batch_core(600, None).unwrap();
        assert_eq!(sim.snapshots(), first);
    }

    #[test]
    fn test_summary_and_leaderboard() {
        let mut sim = arena(SimConfig::default());
        sim.run_batch_core(60 * 60, None).unwrap();
        let summary = sim.summary();
        assert!(summary.total_games > 0);
        assert_eq!(summary.leaderboard.len(), 3);
        assert!(summary.leaderboard[0].score >= summary.leaderboard[1].score);
        assert_eq!(sim.leaderboard(10).len(), 10);
    }
}
