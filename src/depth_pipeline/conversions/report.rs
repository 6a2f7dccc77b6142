use tracing::error;

use crate::depth_pipeline::common::{BatchSummary, DepthError, FrameTimings, Result};

/// Outcome of one manifest pass.
#[derive(Debug)]
pub struct BatchReport {
    pub summary: BatchSummary,
    /// Frame errors collected when the batch does not fail fast
    pub failures: Vec<DepthError>,
}

impl BatchReport {
    pub fn new(label: impl Into<String>, scene_id: impl Into<String>) -> Self {
        Self {
            summary: BatchSummary::new(label, scene_id),
            failures: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn frames_processed(&self) -> usize {
        self.summary.frames_total - self.summary.frames_failed
    }

    /// Records one frame. With `fail_fast` the frame error is returned,
    /// otherwise it is kept and the batch goes on.
    pub(crate) fn record(&mut self, outcome: Result<FrameTimings>, fail_fast: bool) -> Result<()> {
        match outcome {
            Ok(timings) => {
                self.summary.record_frame(&timings);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Frame failed");
                self.summary.record_failure();
                if fail_fast {
                    self.summary.log();
                    return Err(e);
                }
                self.failures.push(e);
                Ok(())
            }
        }
    }
}
