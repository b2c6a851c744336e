use crate::landmarks::{LandmarkIndex, LandmarkSnapshot, Point2};
use crate::math::fft::FftHelper;
use crate::math::stats::StatsHelper;
use crate::prelude::{AnalysisConfig, MotionThresholds};
use crate::processing::history::{HistorySample, MotionHistory};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use LandmarkIndex::*;

/// Hip oscillation below this RMS is treated as no rocking at all.
const CADENCE_MIN_RMS: f32 = 1e-3;

/// Rocking metrics derived from the motion history and the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionAnalysis {
    /// Peak-to-peak hip excursion along y over the window.
    pub range: f32,
    pub smoothness: f32,
    pub maintains_form: bool,
    pub current_hip_position: Option<Point2>,
    /// Dominant rocking frequency once a full window is available.
    pub cadence_hz: Option<f32>,
}

impl MotionAnalysis {
    pub fn neutral(current_hip_position: Option<Point2>) -> Self {
        Self {
            range: 0.0,
            smoothness: 1.0,
            maintains_form: true,
            current_hip_position,
            cadence_hz: None,
        }
    }
}

/// Derives range of motion, smoothness and base stability while rocking.
pub struct RockingAnalyzer {
    thresholds: MotionThresholds,
    min_history: usize,
    fft: FftHelper,
}

impl RockingAnalyzer {
    pub fn new(thresholds: MotionThresholds, min_history: usize, window: usize) -> Self {
        Self {
            thresholds,
            min_history,
            fft: FftHelper::new(window),
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            config.motion.clone(),
            config.min_history,
            config.history_capacity,
        )
    }

    pub fn update(
        &self,
        history: &mut MotionHistory,
        snapshot: &LandmarkSnapshot,
        frame_index: u64,
        timestamp: f64,
    ) -> MotionAnalysis {
        let hip = match snapshot.hip_midpoint() {
            Some(hip) if snapshot.is_complete() => hip,
            _ => return MotionAnalysis::neutral(None),
        };

        history.push(HistorySample {
            frame_index,
            timestamp,
            hip,
        });

        if history.len() <= self.min_history {
            return MotionAnalysis::neutral(Some(hip));
        }

        let ys = history.hip_ys();
        let smoothness =
            (1.0 - self.thresholds.smoothness_gain * StatsHelper::mean_abs_delta(&ys)).max(0.0);

        MotionAnalysis {
            range: StatsHelper::span(&ys),
            smoothness,
            maintains_form: self.base_planted(snapshot),
            current_hip_position: Some(hip),
            cadence_hz: self.cadence(history, &ys),
        }
    }

    /// Wrists stay below the shoulders and apart, knees stay below the hips.
    fn base_planted(&self, snapshot: &LandmarkSnapshot) -> bool {
        let planted = || -> Option<bool> {
            let (left_wrist, right_wrist) = snapshot.pair(LeftWrist, RightWrist)?;
            let (left_shoulder, right_shoulder) = snapshot.pair(LeftShoulder, RightShoulder)?;
            let (left_hip, right_hip) = snapshot.pair(LeftHip, RightHip)?;
            let (left_knee, right_knee) = snapshot.pair(LeftKnee, RightKnee)?;

            let hands = (left_wrist.x - right_wrist.x).abs() > self.thresholds.min_wrist_separation
                && left_wrist.y > left_shoulder.y
                && right_wrist.y > right_shoulder.y;
            let knees = left_knee.y > left_hip.y && right_knee.y > right_hip.y;
            Some(hands && knees)
        };
        planted().unwrap_or(true)
    }

    fn cadence(&self, history: &MotionHistory, ys: &[f32]) -> Option<f32> {
        if !history.is_full() || ys.len() != self.fft.size() {
            return None;
        }
        let span = history.span_seconds()?;
        let mean = StatsHelper::mean(ys)?;
        let centered: Vec<f32> = ys.iter().map(|y| y - mean).collect();
        if StatsHelper::rms(&centered) < CADENCE_MIN_RMS {
            return None;
        }
        let bin = self.fft.dominant_bin(&centered)?;
        let sample_rate = (ys.len() - 1) as f64 / span;
        Some((bin as f64 * sample_rate / ys.len() as f64) as f32)
    }
}

impl Default for RockingAnalyzer {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RockingPhase {
    RockingBack,
    RockingForward,
}

/// Ideal hip trajectory for one rocking cycle spread over `total_frames`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePose {
    pub ideal_hip_y: f32,
    pub phase: RockingPhase,
    pub cycle_progress: f32,
}

/// Smooth sinusoidal rocking between hip heights 0.35 and 0.65.
pub fn reference_pattern(frame_index: u64, total_frames: u64) -> ReferencePose {
    let cycle_progress = if total_frames == 0 {
        0.0
    } else {
        (frame_index % total_frames) as f32 / total_frames as f32 * 2.0 * PI
    };
    ReferencePose {
        ideal_hip_y: 0.5 + cycle_progress.sin() * 0.15,
        phase: if cycle_progress < PI {
            RockingPhase::RockingBack
        } else {
            RockingPhase::RockingForward
        },
        cycle_progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::ExerciseType;
    use crate::processing::alignment::fixtures::{quadruped, truncated, with};
    use crate::processing::scoring::{FormScorer, IssueTag};

    fn at_hip_y(y: f32) -> LandmarkSnapshot {
        with(&quadruped(), &[(LeftHip, 0.45, y), (RightHip, 0.55, y)])
    }

    fn feed(analyzer: &RockingAnalyzer, history: &mut MotionHistory, ys: &[f32]) -> MotionAnalysis {
        let mut last = MotionAnalysis::neutral(None);
        for (idx, &y) in ys.iter().enumerate() {
            last = analyzer.update(history, &at_hip_y(y), idx as u64, idx as f64 / 30.0);
        }
        last
    }

    #[test]
    fn short_history_yields_neutral_metrics() {
        let analyzer = RockingAnalyzer::default();
        let mut history = MotionHistory::with_capacity(60);
        let ys: Vec<f32> = (0..10).map(|i| 0.3 + i as f32 * 0.03).collect();
        let result = feed(&analyzer, &mut history, &ys);
        assert_eq!(result.range, 0.0);
        assert_eq!(result.smoothness, 1.0);
        assert!(result.maintains_form);
        assert_eq!(history.len(), 10);
    }

    #[test]
    fn sinusoidal_rocking_range_is_peak_to_peak() {
        let analyzer = RockingAnalyzer::default();
        let mut history = MotionHistory::with_capacity(60);
        let ys: Vec<f32> = (0..70)
            .map(|i| 0.5 + 0.15 * (2.0 * PI * i as f32 / 60.0).sin())
            .collect();
        let result = feed(&analyzer, &mut history, &ys);
        assert!((result.range - 0.30).abs() < 0.01, "range {}", result.range);
        assert!(result.maintains_form);
        assert_eq!(history.len(), 60);

        let last_y = ys[ys.len() - 1];
        let scored =
            FormScorer::default().score_frame(&at_hip_y(last_y), &result, ExerciseType::Quadruped);
        assert!(!scored.issues.contains(&IssueTag::RangeTooSmall));
        assert!(!scored.issues.contains(&IssueTag::RangeTooLarge));
        assert_eq!(scored.score, 100);
    }

    #[test]
    fn jitter_lowers_smoothness_and_clamps_at_zero() {
        let analyzer = RockingAnalyzer::default();
        let mut history = MotionHistory::with_capacity(60);
        let ys: Vec<f32> = (0..30)
            .map(|i| if i % 2 == 0 { 0.40 } else { 0.60 })
            .collect();
        let result = feed(&analyzer, &mut history, &ys);
        assert_eq!(result.smoothness, 0.0);
    }

    #[test]
    fn slow_drift_stays_smooth() {
        let analyzer = RockingAnalyzer::default();
        let mut history = MotionHistory::with_capacity(60);
        let ys: Vec<f32> = (0..30).map(|i| 0.40 + i as f32 * 0.005).collect();
        let result = feed(&analyzer, &mut history, &ys);
        assert!((result.smoothness - 0.95).abs() < 1e-3);
    }

    #[test]
    fn lifted_hand_breaks_form() {
        let analyzer = RockingAnalyzer::default();
        let mut history = MotionHistory::with_capacity(60);
        feed(&analyzer, &mut history, &[0.45; 15]);
        let lifted = with(&at_hip_y(0.45), &[(RightWrist, 0.56, 0.30)]);
        let result = analyzer.update(&mut history, &lifted, 15, 0.5);
        assert!(!result.maintains_form);
    }

    #[test]
    fn incomplete_frame_is_not_recorded() {
        let analyzer = RockingAnalyzer::default();
        let mut history = MotionHistory::with_capacity(60);
        let result = analyzer.update(&mut history, &truncated(25), 0, 0.0);
        assert!(history.is_empty());
        assert_eq!(result, MotionAnalysis::neutral(None));
    }

    #[test]
    fn cadence_matches_rocking_frequency() {
        let analyzer = RockingAnalyzer::default();
        let mut history = MotionHistory::with_capacity(60);
        // 1.5 Hz sampled at 30 fps: three cycles in the 60-frame window.
        let ys: Vec<f32> = (0..60)
            .map(|i| 0.5 + 0.15 * (2.0 * PI * 1.5 * i as f32 / 30.0).sin())
            .collect();
        let result = feed(&analyzer, &mut history, &ys);
        let cadence = result.cadence_hz.unwrap();
        assert!((cadence - 1.5).abs() < 0.1, "cadence {}", cadence);
    }

    #[test]
    fn reference_pattern_spans_expected_band() {
        let start = reference_pattern(0, 60);
        assert!((start.ideal_hip_y - 0.5).abs() < 1e-6);
        assert_eq!(start.phase, RockingPhase::RockingBack);
        let quarter = reference_pattern(15, 60);
        assert!((quarter.ideal_hip_y - 0.65).abs() < 1e-4);
        let late = reference_pattern(45, 60);
        assert!((late.ideal_hip_y - 0.35).abs() < 1e-4);
        assert_eq!(late.phase, RockingPhase::RockingForward);
        assert_eq!(reference_pattern(5, 0).cycle_progress, 0.0);
    }
}
