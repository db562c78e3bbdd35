//! Benchmark metrics — data collected during a benchmark run.

use morpho_types::{MorphoError, MorphoResult};
use serde::{Deserialize, Serialize};

/// Metrics collected from a benchmark scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Vertex count.
    pub vertex_count: usize,
    /// Tets kept by the connectivity builder.
    pub tet_count: usize,
    /// Ticks attempted.
    pub ticks: u64,
    /// Ticks aborted by the bad-tet check.
    pub failed_ticks: u64,
    /// Total wall-clock time (seconds).
    pub total_wall_time: f64,
    /// Average wall-clock time per tick (seconds).
    pub avg_tick_time: f64,
    /// Minimum tick time.
    pub min_tick_time: f64,
    /// Maximum tick time.
    pub max_tick_time: f64,
    /// Final kinetic energy (should approach zero once the body settles).
    pub final_kinetic_energy: f64,
    /// Maximum vertex displacement from the initial position.
    pub max_displacement: f32,
    /// Largest per-tick displacement on the last successful tick.
    pub final_tick_displacement: f32,
    /// Largest velocity change on the last successful tick.
    pub final_velocity_delta: f32,
    /// First tick the convergence monitor called steady, if any.
    pub steady_tick: Option<u64>,
    /// The convergence monitor saw a divergence.
    pub diverged: bool,
    /// Telemetry events dispatched during the run.
    pub events: u64,
}

impl BenchmarkMetrics {
    /// CSV header line.
    pub fn to_csv_header() -> String {
        "scenario,vertex_count,tet_count,ticks,failed_ticks,total_wall_time_s,avg_tick_ms,min_tick_ms,max_tick_ms,final_ke,max_displacement,final_tick_displacement,final_velocity_delta,steady_tick,diverged".to_string()
    }

    /// Format this metrics instance as a CSV data row.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{:.6},{:.4},{:.4},{:.4},{:.6e},{:.6},{:.3e},{:.3e},{},{}",
            self.scenario,
            self.vertex_count,
            self.tet_count,
            self.ticks,
            self.failed_ticks,
            self.total_wall_time,
            self.avg_tick_time * 1000.0,
            self.min_tick_time * 1000.0,
            self.max_tick_time * 1000.0,
            self.final_kinetic_energy,
            self.max_displacement,
            self.final_tick_displacement,
            self.final_velocity_delta,
            self.steady_tick.map(|t| t.to_string()).unwrap_or_default(),
            self.diverged,
        )
    }

    /// Format multiple metrics as a complete CSV string.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }

    /// Format multiple metrics as pretty JSON.
    pub fn to_json(metrics: &[BenchmarkMetrics]) -> MorphoResult<String> {
        serde_json::to_string_pretty(metrics).map_err(|e| MorphoError::Serialization(format!("metrics: {e}")))
    }
}
