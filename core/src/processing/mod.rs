pub mod aggregate;
pub mod alignment;
pub mod history;
pub mod motion;
pub mod playback;
pub mod posture;
pub mod scoring;
pub mod session;

pub use aggregate::{FeedbackReport, PerformanceStats, Rating, SessionAggregator, SessionFeedback};
pub use alignment::{AlignmentCheck, AlignmentChecker, CheckCategory, CheckOutcome};
pub use history::{HistorySample, MotionHistory};
pub use motion::{reference_pattern, MotionAnalysis, ReferencePose, RockingAnalyzer, RockingPhase};
pub use playback::PlaybackSynchronizer;
pub use posture::{PostureEvaluator, PostureLatch, PostureState, PostureVerdict};
pub use scoring::{FormScorer, FrameAnalysis, IssueTag, StrengthTag};
pub use session::{ExerciseSession, FrameOutcome, SessionPhase};
