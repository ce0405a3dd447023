// Per-Tick JSONL Time Series Recorder
// One JSON line per tick: clock, population aggregates and that tick's releases

use serde::Serialize;
use charge_arena::{FeedbackCategory, TickResult};
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct TickSnapshot {
    pub tick: u64,
    pub elapsed: f64,
    pub dt: f64,
    pub leader_id: u32,
    pub leader_score: u32,
    pub average_score: f64,
    pub total_games: u64,
    pub pooled_avg_diff: f64,
    pub mean_skill: f64,
    pub charging: u32,
    pub winners: u32,
    pub releases: u32,
    pub overheats: u32,
    pub mean_release_diff: Option<f64>,
}

impl TickSnapshot {
    pub fn from_result(result: &TickResult) -> Self {
        let stats = &result.stats;
        let releases = result.releases.len() as u32;
        let overheats = result
            .releases
            .iter()
            .filter(|r| r.category == FeedbackCategory::Overheat)
            .count() as u32;
        let mean_release_diff = (releases > 0).then(|| {
            result.releases.iter().map(|r| r.diff as f64).sum::<f64>() / releases as f64
        });

        Self {
            tick: result.tick,
            elapsed: result.elapsed,
            dt: result.dt,
            leader_id: stats.leader_id,
            leader_score: stats.leader_score,
            average_score: stats.average_score,
            total_games: stats.total_games,
            pooled_avg_diff: stats.pooled_avg_diff,
            mean_skill: stats.mean_skill,
            charging: stats.charging,
            winners: stats.winners,
            releases,
            overheats,
            mean_release_diff,
        }
    }
}

/// Time series recorder that accumulates snapshots and writes JSONL
pub struct TimeSeriesRecorder {
    snapshots: Vec<TickSnapshot>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    pub fn record(&mut self, result: &TickResult) {
        self.snapshots.push(TickSnapshot::from_result(result));
    }

    /// Write all snapshots to a JSONL file and return the number of lines written
    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<usize> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        for snapshot in &self.snapshots {
            serde_json::to_writer(&mut file, snapshot)?;
            writeln!(file)?;
        }
        file.flush()?;
        Ok(self.snapshots.len())
    }
}
