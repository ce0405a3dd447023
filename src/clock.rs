// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Charge Arena Simulation Suite - Simulation Clock

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClockError {
    #[error("frame time must be finite and non-negative, got {0}")]
    InvalidStep(f64),
    #[error("variable-step clock needs a frame time")]
    MissingFrameTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TimeStep {
    /// Every tick advances by the same `dt`; frame times are ignored.
    Fixed { dt: f64 },
    /// Each tick advances by the caller's frame time, capped at `max_dt`.
    Variable { max_dt: f64 },
}

/// Simulated time source. Counts ticks and elapsed seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationClock {
    mode: TimeStep,
    elapsed: f64,
    ticks: u64,
}

impl SimulationClock {
    pub fn new(mode: TimeStep) -> Self {
        Self { mode, elapsed: 0.0, ticks: 0 }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        if config.variable_step {
            Self::new(TimeStep::Variable { max_dt: config.max_step })
        } else {
            Self::new(TimeStep::Fixed { dt: config.reference_dt() })
        }
    }

    pub fn mode(&self) -> TimeStep {
        self.mode
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance one tick and return the step to simulate.
    pub fn advance(&mut self, frame_dt: Option<f64>) -> Result<f64, ClockError> {
        let dt = match self.mode {
            TimeStep::Fixed { dt } => dt,
            TimeStep::Variable { max_dt } => {
                let frame = frame_dt.ok_or(ClockError::MissingFrameTime)?;
                if !frame.is_finite() || frame < 0.0 {
                    return Err(ClockError::InvalidStep(frame));
                }
                // a stalled frame must not turn into one giant step
                frame.min(max_dt)
            }
        };
        self.elapsed += dt;
        self.ticks += 1;
        Ok(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_step_ignores_frame_time() {
        let mut clock = SimulationClock::new(TimeStep::Fixed { dt: 0.05 });
        assert_eq!(clock.advance(None), Ok(0.05));
        assert_eq!(clock.advance(Some(3.0)), Ok(0.05));
        assert_eq!(clock.ticks(), 2);
        assert!((clock.elapsed() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_variable_step_clamps() {
        let mut clock = SimulationClock::new(TimeStep::Variable { max_dt: 0.25 });
        assert_eq!(clock.advance(Some(0.016)), Ok(0.016));
        assert_eq!(clock.advance(Some(2.0)), Ok(0.25));
        assert_eq!(clock.advance(Some(0.0)), Ok(0.0));
        assert_eq!(clock.ticks(), 3);
    }

    #[test]
    fn test_variable_step_rejects_bad_frames() {
        let mut clock = SimulationClock::new(TimeStep::Variable { max_dt: 0.25 });
        assert_eq!(clock.advance(Some(-0.1)), Err(ClockError::InvalidStep(-0.1)));
        assert!(matches!(clock.advance(Some(f64::INFINITY)), Err(ClockError::InvalidStep(_))));
        assert_eq!(clock.advance(None), Err(ClockError::MissingFrameTime));
        assert_eq!(clock.ticks(), 0);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_from_config() {
        let fixed = SimulationClock::from_config(&SimConfig::default());
        assert!(matches!(fixed.mode(), TimeStep::Fixed { .. }));
        let variable = SimulationClock::from_config(&SimConfig {
            variable_step: true,
            max_step: 0.1,
            ..SimConfig::default()
        });
        assert_eq!(variable.mode(), TimeStep::Variable { max_dt: 0.1 });
    }
}
