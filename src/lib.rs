// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Charge Arena Simulation Suite

pub mod types;
pub mod chaos;
pub mod config;
pub mod rng;
pub mod agent;
pub mod population;
pub mod clock;
pub mod simulation;

pub use types::*;
pub use agent::Agent;
pub use clock::{ClockError, SimulationClock, TimeStep};
pub use config::{ConfigError, SimConfig};
pub use population::Population;
pub use simulation::{ChargeArena, SimError};

use wasm_bindgen::prelude::*;

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl ChargeArena {
    /// Browser constructor: variable-step clock fed by the frame loop.
    /// Agents `0..player_count` answer to begin_hold/end_hold.
    #[wasm_bindgen(constructor)]
    pub fn new(agent_count: u32, player_count: u32, seed: u64) -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let agent_count = (agent_count as usize).max(1);
        let config = SimConfig {
            seed,
            agent_count,
            player_count: (player_count as usize).min(agent_count),
            variable_step: true,
            ..SimConfig::default()
        };
        ChargeArena::from_validated(config)
    }

    /// Advance by one frame of `dt` seconds and return the `TickResult`.
    pub fn tick(&mut self, dt: f64) -> Result<JsValue, JsValue> {
        let result = self.tick_core(Some(dt)).map_err(to_js_error)?;
        Ok(serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL))
    }

    /// Run N ticks of `dt` without returning results.
    pub fn run_batch(&mut self, ticks: u32, dt: f64) -> Result<(), JsValue> {
        self.run_batch_core(ticks as u64, Some(dt)).map_err(to_js_error)
    }

    pub fn get_agents(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.snapshots()).unwrap_or(JsValue::NULL)
    }

    pub fn get_stats(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.stats()).unwrap_or(JsValue::NULL)
    }

    pub fn get_summary(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.summary()).unwrap_or(JsValue::NULL)
    }

    pub fn get_leaderboard(&self, n: u32) -> JsValue {
        serde_wasm_bindgen::to_value(&self.leaderboard(n as usize)).unwrap_or(JsValue::NULL)
    }

    pub fn begin_hold(&mut self, id: u32) -> Result<bool, JsValue> {
        self.begin_hold_core(id).map_err(to_js_error)
    }

    /// Release agent `id`; returns the outcome or `null` if it was idle.
    pub fn end_hold(&mut self, id: u32) -> Result<JsValue, JsValue> {
        let outcome = self.end_hold_core(id).map_err(to_js_error)?;
        Ok(serde_wasm_bindgen::to_value(&outcome).unwrap_or(JsValue::NULL))
    }

    /// Reset simulation to initial state
    pub fn reset(&mut self) {
        self.reset_core();
    }
}

fn to_js_error(err: SimError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
