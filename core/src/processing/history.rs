use crate::landmarks::Point2;
use crate::prelude::{AnalysisConfig, AnalysisError, AnalysisResult, SessionStage};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    pub frame_index: u64,
    /// Seconds, on whatever clock the caller feeds frames with.
    pub timestamp: f64,
    pub hip: Point2,
}

/// Bounded FIFO window of recent hip positions, owned by the caller.
#[derive(Debug, Clone)]
pub struct MotionHistory {
    samples: VecDeque<HistorySample>,
    capacity: usize,
}

impl MotionHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, returning the evicted oldest one when full.
    pub fn push(&mut self, sample: HistorySample) -> Option<HistorySample> {
        let evicted = if self.samples.len() >= self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistorySample> {
        self.samples.iter()
    }

    pub fn hip_ys(&self) -> Vec<f32> {
        self.samples.iter().map(|sample| sample.hip.y).collect()
    }

    /// Time covered by the window, when both ends carry finite stamps.
    pub fn span_seconds(&self) -> Option<f64> {
        let first = self.samples.front()?.timestamp;
        let last = self.samples.back()?.timestamp;
        let span = last - first;
        (span.is_finite() && span > 0.0).then_some(span)
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

impl Default for MotionHistory {
    fn default() -> Self {
        Self::with_capacity(AnalysisConfig::default().history_capacity)
    }
}

impl SessionStage for MotionHistory {
    fn initialize(&mut self, config: &AnalysisConfig) -> AnalysisResult<()> {
        if config.history_capacity == 0 {
            return Err(AnalysisError::InvalidConfig(
                "history capacity must be positive".into(),
            ));
        }
        self.capacity = config.history_capacity;
        self.samples = VecDeque::with_capacity(self.capacity);
        Ok(())
    }

    fn cleanup(&mut self) {
        self.reset();
    }
}
