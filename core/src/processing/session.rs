use crate::landmarks::{LandmarkSnapshot, RecordedTimeline};
use crate::math::stats::StatsHelper;
use crate::prelude::{AnalysisConfig, AnalysisError, AnalysisResult, ExerciseType, SessionStage};
use crate::processing::aggregate::{FeedbackReport, SessionAggregator, SessionFeedback};
use crate::processing::history::MotionHistory;
use crate::processing::motion::{MotionAnalysis, RockingAnalyzer};
use crate::processing::playback::PlaybackSynchronizer;
use crate::processing::posture::{PostureEvaluator, PostureLatch, PostureState, PostureVerdict};
use crate::processing::scoring::{FormScorer, FrameAnalysis};
use crate::telemetry::{LogManager, Metrics, MetricsRecorder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Setup,
    Recording,
}

/// What a single ingested frame produced.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Pre-recording frame judged against the starting posture.
    Posture {
        verdict: PostureVerdict,
        state: PostureState,
    },
    /// Recording frame scored and folded into the session. Frames with a
    /// missing or partial pose score zero.
    Scored {
        analysis: FrameAnalysis,
        motion: MotionAnalysis,
    },
}

/// Caller-owned state for one exercise session.
///
/// Frames are fed in timestamp order through [`ExerciseSession::ingest`].
/// During setup they are judged against the starting posture; once
/// [`ExerciseSession::start_recording`] succeeds they are scored, appended to
/// the session results and recorded for playback.
pub struct ExerciseSession {
    config: AnalysisConfig,
    exercise: ExerciseType,
    phase: SessionPhase,
    evaluator: PostureEvaluator,
    latch: PostureLatch,
    analyzer: RockingAnalyzer,
    history: MotionHistory,
    scorer: FormScorer,
    aggregator: SessionAggregator,
    timeline: RecordedTimeline,
    cadence_readings: Vec<f32>,
    frame_index: u64,
    recording_started_at: f64,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl ExerciseSession {
    pub fn new(config: AnalysisConfig, exercise: ExerciseType) -> AnalysisResult<Self> {
        config.validate()?;

        let mut latch = PostureLatch::default();
        latch.initialize(&config)?;
        let mut history = MotionHistory::default();
        history.initialize(&config)?;
        let mut aggregator = SessionAggregator::default();
        aggregator.initialize(&config)?;

        Ok(Self {
            evaluator: PostureEvaluator::from_config(&config),
            analyzer: RockingAnalyzer::from_config(&config),
            scorer: FormScorer::from_config(&config),
            config,
            exercise,
            phase: SessionPhase::Setup,
            latch,
            history,
            aggregator,
            timeline: RecordedTimeline::new(),
            cadence_readings: Vec::new(),
            frame_index: 0,
            recording_started_at: 0.0,
            logger: LogManager::new(),
            metrics: MetricsRecorder::new(),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn exercise(&self) -> ExerciseType {
        self.exercise
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn posture_state(&self) -> PostureState {
        self.latch.state()
    }

    /// Switching exercise abandons any recording and starts setup over.
    pub fn set_exercise(&mut self, exercise: ExerciseType) {
        if exercise == self.exercise {
            return;
        }
        if self.phase == SessionPhase::Recording {
            self.logger
                .warn("exercise changed mid-recording, discarding recorded frames");
        }
        self.exercise = exercise;
        self.phase = SessionPhase::Setup;
        self.latch.cleanup();
        self.history.cleanup();
        self.aggregator.cleanup();
        self.timeline.clear();
        self.cadence_readings.clear();
        self.frame_index = 0;
        self.logger
            .record(&format!("exercise set to {:?}, posture check reset", exercise));
    }

    pub fn bypass_posture_check(&mut self) {
        self.latch.bypass();
        self.logger.record("posture check bypassed");
    }

    pub fn ingest(&mut self, snapshot: Option<&LandmarkSnapshot>, timestamp: f64) -> FrameOutcome {
        match self.phase {
            SessionPhase::Setup => self.check_posture(snapshot),
            SessionPhase::Recording => self.score(snapshot, timestamp),
        }
    }

    fn check_posture(&mut self, snapshot: Option<&LandmarkSnapshot>) -> FrameOutcome {
        let empty = LandmarkSnapshot::default();
        let verdict = self
            .evaluator
            .evaluate(snapshot.unwrap_or(&empty), self.exercise);
        self.metrics.record_posture_evaluation();

        let previous = self.latch.state();
        let state = self.latch.observe(verdict.is_correct);
        if state != previous {
            self.logger.record(&format!(
                "posture {:?} -> {:?}: {}",
                previous, state, verdict.message
            ));
        }
        FrameOutcome::Posture { verdict, state }
    }

    fn score(&mut self, snapshot: Option<&LandmarkSnapshot>, timestamp: f64) -> FrameOutcome {
        let elapsed = timestamp - self.recording_started_at;
        self.timeline.push(elapsed, snapshot.cloned());

        let empty = LandmarkSnapshot::default();
        let snapshot = snapshot.unwrap_or(&empty);
        if !snapshot.is_complete() {
            self.metrics.record_incomplete();
        }

        let motion = self
            .analyzer
            .update(&mut self.history, snapshot, self.frame_index, elapsed);
        let analysis = self.scorer.score_frame(snapshot, &motion, self.exercise);
        if let Some(cadence) = motion.cadence_hz {
            self.cadence_readings.push(cadence);
        }
        self.logger.detail(&format!(
            "frame {} at {:.3}s scored {} ({} issues)",
            self.frame_index,
            elapsed,
            analysis.score,
            analysis.issues.len()
        ));

        self.frame_index += 1;
        self.metrics.record_frame();
        self.aggregator.push(analysis.clone());
        FrameOutcome::Scored { analysis, motion }
    }

    /// Begins a fresh recording; previous results and timeline are dropped.
    pub fn start_recording(&mut self, timestamp: f64) -> AnalysisResult<()> {
        if !timestamp.is_finite() {
            return Err(AnalysisError::InvalidInput(format!(
                "recording start time must be finite, got {}",
                timestamp
            )));
        }
        if !self.latch.is_ready() {
            return Err(AnalysisError::NotReady(format!(
                "starting posture is {:?}",
                self.latch.state()
            )));
        }

        self.history.cleanup();
        self.aggregator.cleanup();
        self.timeline.clear();
        self.cadence_readings.clear();
        self.frame_index = 0;
        self.recording_started_at = timestamp;
        self.phase = SessionPhase::Recording;
        self.logger
            .record(&format!("recording started for {:?}", self.exercise));
        Ok(())
    }

    /// Ends the recording and summarizes it; results and timeline stay
    /// available for review until the next recording starts.
    pub fn stop_recording(&mut self) -> SessionFeedback {
        self.phase = SessionPhase::Setup;
        self.history.cleanup();
        let feedback = self.aggregator.finalize();
        self.logger.record(&format!(
            "recording stopped: {} frames, average score {:.1}",
            feedback.frame_count, feedback.average_score
        ));
        feedback
    }

    pub fn report(&self, feedback: &SessionFeedback) -> FeedbackReport {
        FeedbackReport::from_feedback(feedback, &self.config.aggregator)
    }

    /// Mean rocking frequency over the frames that had a full motion window.
    pub fn cadence_hz(&self) -> Option<f32> {
        StatsHelper::mean(&self.cadence_readings)
    }

    pub fn results(&self) -> &[FrameAnalysis] {
        self.aggregator.results()
    }

    pub fn timeline(&self) -> &RecordedTimeline {
        &self.timeline
    }

    /// Playback over a copy of the recorded timeline.
    pub fn playback(&self) -> PlaybackSynchronizer {
        PlaybackSynchronizer::new(self.timeline.clone(), self.config.playback.clone())
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.snapshot()
    }
}
