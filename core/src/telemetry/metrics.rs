use serde::Serialize;
use std::sync::Mutex;

/// Frame counters shared by the session pipeline.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub frames_analyzed: usize,
    pub incomplete_frames: usize,
    pub posture_evaluations: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_frame(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.frames_analyzed += 1;
        }
    }

    pub fn record_incomplete(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.incomplete_frames += 1;
        }
    }

    pub fn record_posture_evaluation(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.posture_evaluations += 1;
        }
    }

    pub fn snapshot(&self) -> Metrics {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            Metrics::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
