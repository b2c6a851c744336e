use crate::generator::profile::SyntheticSession;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use log::info;
use rockcore::processing::{
    ExerciseSession, FeedbackReport, FrameOutcome, PlaybackSynchronizer, PostureVerdict,
    SessionFeedback,
};
use rockcore::telemetry::Metrics;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub ticks: usize,
    pub resolved: usize,
    pub filled: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    /// Last starting-posture verdict seen before recording.
    pub verdict: Option<PostureVerdict>,
    pub feedback: SessionFeedback,
    pub report: FeedbackReport,
    /// Mean rocking frequency, absent when no full motion window was recorded.
    pub cadence_hz: Option<f32>,
    pub metrics: Metrics,
    pub replay: Option<ReplaySummary>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self, session_data: &SyntheticSession) -> anyhow::Result<WorkflowResult> {
        let mut session = ExerciseSession::new(self.config.analysis.clone(), self.config.exercise)
            .context("creating exercise session")?;
        if self.config.skip_posture {
            session.bypass_posture_check();
        }

        let mut verdict = None;
        for frame in &session_data.setup {
            if let FrameOutcome::Posture { verdict: latest, .. } =
                session.ingest(frame.snapshot.as_ref(), frame.timestamp)
            {
                verdict = Some(latest);
            }
        }

        session
            .start_recording(session_data.recording_start())
            .with_context(|| {
                let message = verdict.as_ref().map_or("no setup frames", |v| v.message.as_str());
                format!("starting recording ({})", message)
            })?;
        for frame in &session_data.recording {
            session.ingest(frame.snapshot.as_ref(), frame.timestamp);
        }

        let feedback = session.stop_recording();
        let report = session.report(&feedback);
        let replay = self.config.replay_fps.map(|fps| self.replay(&session, fps));
        info!(
            "session finished with {} scored frames, average {:.1}",
            feedback.frame_count, feedback.average_score
        );

        Ok(WorkflowResult {
            verdict,
            feedback,
            report,
            cadence_hz: session.cadence_hz(),
            metrics: session.metrics(),
            replay,
        })
    }

    /// Steps a playback cursor over the recording the way a video player would.
    fn replay(&self, session: &ExerciseSession, fps: f32) -> ReplaySummary {
        let mut timeline = session.timeline().clone();
        let filled = if self.config.fill_gaps {
            timeline.fill_gaps()
        } else {
            0
        };
        let playback = PlaybackSynchronizer::new(timeline, self.config.analysis.playback.clone());

        let duration = playback.duration().unwrap_or(0.0);
        let step = if fps.is_finite() && fps > 0.0 {
            1.0 / f64::from(fps)
        } else {
            return ReplaySummary {
                ticks: 0,
                resolved: 0,
                filled,
            };
        };

        let ticks = (duration / step).floor() as usize + 1;
        let resolved = (0..ticks)
            .filter(|&tick| playback.resolve(tick as f64 * step).is_some())
            .count();
        ReplaySummary {
            ticks,
            resolved,
            filled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_session, FormFault, GeneratorConfig};
    use rockcore::processing::IssueTag;
    use rockcore::ExerciseType;

    #[test]
    fn runner_scores_clean_session() {
        let cfg = WorkflowConfig::from_args(ExerciseType::Quadruped, 120, 1, None);
        let data = build_session(&cfg.generator).unwrap();
        let result = Runner::new(cfg).execute(&data).unwrap();
        assert!(result.verdict.unwrap().is_correct);
        assert_eq!(result.feedback.frame_count, 120);
        assert!(result.feedback.average_score > 85.0);
        assert!(result.report.suggestions.is_empty());
        assert!(result.report.stats.is_some());
        let cadence = result.cadence_hz.unwrap();
        assert!((cadence - 0.5).abs() < 0.05, "cadence {}", cadence);
    }

    #[test]
    fn runner_surfaces_injected_fault() {
        let mut cfg = WorkflowConfig::from_args(
            ExerciseType::Quadruped,
            120,
            5,
            Some(FormFault::AnkleCollapse),
        );
        cfg.generator.fault_rate = 1.0;
        let data = build_session(&cfg.generator).unwrap();
        let result = Runner::new(cfg).execute(&data).unwrap();
        assert_eq!(result.feedback.top_issues[0], IssueTag::AnkleCollapse);
        assert!(result.feedback.average_score <= 80.0);
        assert!(!result.report.suggestions.is_empty());
    }

    #[test]
    fn runner_fails_without_confirmed_posture() {
        let mut cfg = WorkflowConfig::from_args(ExerciseType::Quadruped, 30, 2, None);
        cfg.generator.setup_frames = 0;
        let data = build_session(&cfg.generator).unwrap();
        assert!(Runner::new(cfg.clone()).execute(&data).is_err());

        cfg.skip_posture = true;
        let result = Runner::new(cfg).execute(&data).unwrap();
        assert_eq!(result.cadence_hz, None);
    }

    #[test]
    fn replay_resolves_every_tick_of_a_dense_recording() {
        let mut cfg = WorkflowConfig::from_args(ExerciseType::Quadruped, 90, 4, None);
        cfg.replay_fps = Some(30.0);
        let data = build_session(&cfg.generator).unwrap();
        let replay = Runner::new(cfg).execute(&data).unwrap().replay.unwrap();
        assert!(replay.ticks >= 89);
        assert_eq!(replay.resolved, replay.ticks);
    }

    #[test]
    fn gap_filling_recovers_dropped_frames_for_replay() {
        let generator = GeneratorConfig {
            recording_frames: 90,
            dropout: 0.2,
            seed: 9,
            ..Default::default()
        };
        let mut cfg = WorkflowConfig::from_args(ExerciseType::Quadruped, 90, 9, None);
        cfg.generator = generator;
        cfg.replay_fps = Some(30.0);
        cfg.fill_gaps = true;
        let data = build_session(&cfg.generator).unwrap();
        let dropped = data.recording.iter().filter(|f| f.snapshot.is_none()).count();

        let result = Runner::new(cfg).execute(&data).unwrap();
        let replay = result.replay.unwrap();
        assert_eq!(replay.filled, dropped);
        assert_eq!(replay.resolved, replay.ticks);
        assert_eq!(result.metrics.incomplete_frames, dropped);
        assert_eq!(result.feedback.frame_count, 90);
        if dropped > 0 {
            assert!(result.feedback.top_issues.contains(&IssueTag::NoPoseDetected));
        }
    }
}
