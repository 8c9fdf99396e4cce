//! Timed iteration loop over the engine.
//!
//! Each outer iteration moves the nuclei by one grid cell in `steps` inner
//! advances. Every advance is timed on its own and reported under its global
//! step index; calls are never reordered, skipped or overlapped.

use crate::engine::Engine;
use crate::errors::Result;
use crate::telemetry::{ProgressRecord, ProgressSink};
use serde::Serialize;
use std::time::Instant;

/// Outer iterations of the benchmark loop.
pub const MAX_ITERS: u64 = 20;

/// Aggregate timings of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    pub steps_recorded: u64,
    pub total_seconds: f64,
    pub mean_seconds: f64,
    pub max_seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLoop {
    steps: u32,
    max_iters: u64,
}

impl RunLoop {
    pub fn new(steps: u32) -> Self {
        Self {
            steps,
            max_iters: MAX_ITERS,
        }
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn max_iters(&self) -> u64 {
        self.max_iters
    }

    /// Number of engine advances a full run performs.
    pub fn total_steps(&self) -> u64 {
        u64::from(self.steps) * self.max_iters
    }

    /// Runs all `max_iters × steps` advances and reports each to `sink`.
    ///
    /// The first engine or sink error aborts the run.
    pub fn run(&self, engine: &mut dyn Engine, sink: &mut dyn ProgressSink) -> Result<RunSummary> {
        let steps = u64::from(self.steps);
        let mut total_seconds = 0.0;
        let mut max_seconds: f64 = 0.0;

        log::info!(
            "Starting simulation loop: {} iterations × {} steps on {}",
            self.max_iters,
            steps,
            engine.backend()
        );

        for it in 0..self.max_iters {
            for step in 0..steps {
                let start = Instant::now();
                engine.advance_one_grid_cell()?;
                let elapsed_seconds = start.elapsed().as_secs_f64();

                sink.record(&ProgressRecord {
                    global_step_index: steps * it + step,
                    elapsed_seconds,
                })?;

                total_seconds += elapsed_seconds;
                max_seconds = max_seconds.max(elapsed_seconds);
            }
        }

        engine.synchronize()?;
        sink.finish()?;

        let steps_recorded = self.total_steps();
        let mean_seconds = if steps_recorded == 0 {
            0.0
        } else {
            total_seconds / steps_recorded as f64
        };

        Ok(RunSummary {
            steps_recorded,
            total_seconds,
            mean_seconds,
            max_seconds,
        })
    }
}
