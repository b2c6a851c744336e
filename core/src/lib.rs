//! Posture and movement-quality analysis core for the quadruped rocking exercise.
//!
//! The modules take normalized pose landmark snapshots produced by an external
//! detector and turn them into structured judgments: starting-posture verdicts,
//! per-frame form scores, session feedback and playback pose lookups.

pub mod landmarks;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use landmarks::{Keypoint, LandmarkIndex, LandmarkSnapshot, RecordedTimeline};
pub use prelude::{AnalysisConfig, AnalysisError, AnalysisResult, ExerciseType, SessionStage};
pub use processing::{ExerciseSession, FrameAnalysis, PostureVerdict, SessionFeedback};
