use crate::landmarks::LandmarkSnapshot;
use crate::prelude::{AnalysisConfig, AnalysisResult, ExerciseType, PostureSettings, SessionStage};
use crate::processing::alignment::{AlignmentCheck, AlignmentChecker};
use serde::{Deserialize, Serialize};

const READY_MESSAGE: &str = "Perfect! You can start the exercise";

const QUADRUPED_REQUIRED: [AlignmentCheck; 4] = [
    AlignmentCheck::HandsUnderShoulders,
    AlignmentCheck::KneesUnderHips,
    AlignmentCheck::FeetFlat,
    AlignmentCheck::QuadrupedPosition,
];

const TOE_DRIVE_REQUIRED: [AlignmentCheck; 4] = [
    AlignmentCheck::HandsUnderShoulders,
    AlignmentCheck::KneesUnderHips,
    AlignmentCheck::QuadrupedPosition,
    AlignmentCheck::ToesTucked,
];

const QUADRUPED_ADVISORY: [AlignmentCheck; 3] = [
    AlignmentCheck::FeetWidth,
    AlignmentCheck::BackAlignment,
    AlignmentCheck::KeypointVisibility,
];

const TOE_DRIVE_ADVISORY: [AlignmentCheck; 3] = [
    AlignmentCheck::ToeEngagement,
    AlignmentCheck::BackAlignment,
    AlignmentCheck::KeypointVisibility,
];

pub fn required_checks(exercise: ExerciseType) -> &'static [AlignmentCheck] {
    match exercise {
        ExerciseType::Quadruped => &QUADRUPED_REQUIRED,
        ExerciseType::ToeDrive => &TOE_DRIVE_REQUIRED,
    }
}

/// Reported when failing, never required to pass.
pub fn advisory_checks(exercise: ExerciseType) -> &'static [AlignmentCheck] {
    match exercise {
        ExerciseType::Quadruped => &QUADRUPED_ADVISORY,
        ExerciseType::ToeDrive => &TOE_DRIVE_ADVISORY,
    }
}

/// Pass/fail judgment of the starting position for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureVerdict {
    pub is_correct: bool,
    pub message: String,
    /// Corrections in surfacing order, already truncated.
    pub issues: Vec<AlignmentCheck>,
    pub checks_passed: Vec<AlignmentCheck>,
}

impl PostureVerdict {
    pub fn issue_messages(&self) -> Vec<&'static str> {
        self.issues.iter().map(|check| check.correction()).collect()
    }

    pub fn passed_messages(&self) -> Vec<&'static str> {
        self.checks_passed
            .iter()
            .map(|check| check.confirmation())
            .collect()
    }
}

/// Combines alignment checks into a single starting-posture verdict.
#[derive(Debug, Clone, Default)]
pub struct PostureEvaluator {
    checker: AlignmentChecker,
    settings: PostureSettings,
}

impl PostureEvaluator {
    pub fn new(checker: AlignmentChecker, settings: PostureSettings) -> Self {
        Self { checker, settings }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            AlignmentChecker::new(config.alignment.clone()),
            config.posture.clone(),
        )
    }

    pub fn evaluate(&self, snapshot: &LandmarkSnapshot, exercise: ExerciseType) -> PostureVerdict {
        if !snapshot.is_complete() {
            return PostureVerdict {
                is_correct: false,
                message: AlignmentCheck::KeypointVisibility.correction().to_string(),
                issues: vec![AlignmentCheck::KeypointVisibility],
                checks_passed: Vec::new(),
            };
        }

        let mut failures = Vec::new();
        let mut checks_passed = Vec::new();
        let mut is_correct = true;

        for &check in required_checks(exercise) {
            if self.checker.run(check, snapshot).passed() {
                checks_passed.push(check);
            } else {
                is_correct = false;
                failures.push(check);
            }
        }
        for &check in advisory_checks(exercise) {
            if self.checker.run(check, snapshot).passed() {
                checks_passed.push(check);
            } else {
                failures.push(check);
            }
        }

        if is_correct {
            return PostureVerdict {
                is_correct,
                message: READY_MESSAGE.to_string(),
                issues: Vec::new(),
                checks_passed,
            };
        }

        let issues = prioritize(failures, self.settings.max_surfaced_issues);
        let message = issues
            .iter()
            .map(|check| check.correction())
            .collect::<Vec<_>>()
            .join(". ");

        PostureVerdict {
            is_correct,
            message,
            issues,
            checks_passed,
        }
    }
}

/// Orders failures by body region, drops repeated guidance, keeps the first `limit`.
fn prioritize(mut failures: Vec<AlignmentCheck>, limit: usize) -> Vec<AlignmentCheck> {
    failures.sort_by_key(|check| check.category());
    let mut surfaced: Vec<AlignmentCheck> = Vec::with_capacity(limit);
    for check in failures {
        if surfaced.len() >= limit.max(1) {
            break;
        }
        if surfaced
            .iter()
            .any(|kept| kept.correction() == check.correction())
        {
            continue;
        }
        surfaced.push(check);
    }
    surfaced
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PostureState {
    NotChecked,
    Passed,
    Failed,
}

/// Debounces per-frame verdicts so a confirmed posture survives noisy frames.
#[derive(Debug, Clone)]
pub struct PostureLatch {
    state: PostureState,
    consecutive_failures: u32,
    sustained_failure_frames: u32,
    bypassed: bool,
}

impl PostureLatch {
    pub fn new(sustained_failure_frames: u32) -> Self {
        Self {
            state: PostureState::NotChecked,
            consecutive_failures: 0,
            sustained_failure_frames,
            bypassed: false,
        }
    }

    pub fn state(&self) -> PostureState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == PostureState::Passed
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// Folds one frame's verdict into the latch and returns the resulting state.
    pub fn observe(&mut self, is_correct: bool) -> PostureState {
        if self.bypassed {
            return self.state;
        }
        if is_correct {
            self.consecutive_failures = 0;
            self.state = PostureState::Passed;
            return self.state;
        }

        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.state = match self.state {
            PostureState::Passed if self.consecutive_failures < self.sustained_failure_frames => {
                PostureState::Passed
            }
            _ => PostureState::Failed,
        };
        self.state
    }

    /// Skips the posture check; stays passed until the next reset.
    pub fn bypass(&mut self) {
        self.bypassed = true;
        self.consecutive_failures = 0;
        self.state = PostureState::Passed;
    }

    pub fn reset(&mut self) {
        self.state = PostureState::NotChecked;
        self.consecutive_failures = 0;
        self.bypassed = false;
    }
}

impl Default for PostureLatch {
    fn default() -> Self {
        Self::new(PostureSettings::default().sustained_failure_frames)
    }
}

impl SessionStage for PostureLatch {
    fn initialize(&mut self, config: &AnalysisConfig) -> AnalysisResult<()> {
        self.sustained_failure_frames = config.posture.sustained_failure_frames;
        self.reset();
        Ok(())
    }

    fn cleanup(&mut self) {
        self.reset();
    }
}
