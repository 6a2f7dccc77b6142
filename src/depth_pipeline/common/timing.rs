//! Step timings for a single frame and the per-batch summary built from them.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::info;

#[derive(Debug, Clone)]
pub struct StepTiming {
    pub name: String,
    pub duration: Duration,
}

/// Ordered step durations for one frame. Repeated step names accumulate.
#[derive(Debug, Default, Clone)]
pub struct FrameTimings {
    steps: Vec<StepTiming>,
    step_map: HashMap<String, Duration>,
}

impl FrameTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, name: impl Into<String>, duration: Duration) {
        let name = name.into();
        self.steps.push(StepTiming {
            name: name.clone(),
            duration,
        });
        *self.step_map.entry(name).or_insert(Duration::ZERO) += duration;
    }

    /// Runs `f` and records its wall time under `name`.
    pub fn time<T>(&mut self, name: &str, f: impl FnOnce() -> T) -> T {
        let timer = Timer::start(name);
        let out = f();
        let (name, duration) = timer.stop();
        self.add_step(name, duration);
        out
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    pub fn get_step(&self, name: &str) -> Option<Duration> {
        self.step_map.get(name).copied()
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    pub fn stop(self) -> (String, Duration) {
        (self.name, self.start.elapsed())
    }
}

/// Totals for one manifest pass.
#[derive(Debug)]
pub struct BatchSummary {
    pub label: String,
    pub scene_id: String,
    pub frames_total: usize,
    pub frames_failed: usize,
    per_frame: Vec<Duration>,
    started: Instant,
}

impl BatchSummary {
    pub fn new(label: impl Into<String>, scene_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            scene_id: scene_id.into(),
            frames_total: 0,
            frames_failed: 0,
            per_frame: Vec::new(),
            started: Instant::now(),
        }
    }

    pub fn record_frame(&mut self, timings: &FrameTimings) {
        self.frames_total += 1;
        self.per_frame.push(timings.total_duration());
    }

    pub fn record_failure(&mut self) {
        self.frames_total += 1;
        self.frames_failed += 1;
    }

    pub fn average_frame_time(&self) -> Duration {
        if self.per_frame.is_empty() {
            return Duration::ZERO;
        }
        let total = self.per_frame.iter().sum::<Duration>().as_nanos();
        let average = total / self.per_frame.len() as u128;
        Duration::from_nanos(u64::try_from(average).unwrap_or(u64::MAX))
    }

    pub fn max_frame_time(&self) -> Duration {
        self.per_frame.iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn log(&self) {
        info!(
            batch = %self.label,
            scene = %self.scene_id,
            frames = self.frames_total,
            failed = self.frames_failed,
            total_s = self.elapsed().as_secs_f64(),
            avg_ms = self.average_frame_time().as_secs_f64() * 1000.0,
            max_ms = self.max_frame_time().as_secs_f64() * 1000.0,
            "Batch summary"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_accumulate_by_name() {
        let mut timings = FrameTimings::new();
        timings.add_step("write_viz", Duration::from_millis(2));
        timings.add_step("write_viz", Duration::from_millis(3));
        timings.add_step("noise", Duration::from_millis(5));

        assert_eq!(timings.steps().len(), 3);
        assert_eq!(timings.get_step("write_viz"), Some(Duration::from_millis(5)));
        assert_eq!(timings.total_duration(), Duration::from_millis(10));
        assert_eq!(timings.get_step("read_depth"), None);
    }

    #[test]
    fn test_summary_statistics() {
        let mut summary = BatchSummary::new("noise", "cube_demo");
        assert_eq!(summary.average_frame_time(), Duration::ZERO);

        let mut a = FrameTimings::new();
        a.add_step("noise", Duration::from_millis(10));
        let mut b = FrameTimings::new();
        b.add_step("noise", Duration::from_millis(30));
        summary.record_frame(&a);
        summary.record_frame(&b);
        summary.record_failure();

        assert_eq!(summary.frames_total, 3);
        assert_eq!(summary.frames_failed, 1);
        assert_eq!(summary.average_frame_time(), Duration::from_millis(20));
        assert_eq!(summary.max_frame_time(), Duration::from_millis(30));
    }

    #[test]
    fn test_average_keeps_nanosecond_precision() {
        let mut summary = BatchSummary::new("viz", "cube_demo");
        for ms in [10, 20, 40] {
            let mut timings = FrameTimings::new();
            timings.add_step("viz", Duration::from_millis(ms));
            summary.record_frame(&timings);
        }
        assert_eq!(summary.average_frame_time(), Duration::from_nanos(23_333_333));
    }
}
