use crate::landmarks::LandmarkSnapshot;
use crate::prelude::{AnalysisConfig, Deductions, ExerciseType, MotionThresholds};
use crate::processing::alignment::{AlignmentChecker, CheckOutcome};
use crate::processing::motion::MotionAnalysis;
use serde::{Deserialize, Serialize};

/// Form problems detected in a frame; wording lives in [`IssueTag::message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueTag {
    RangeTooSmall,
    RangeTooLarge,
    MovementJerky,
    BaseNotPlanted,
    AnkleCollapse,
    KneesMisaligned,
    HeadNotNeutral,
    NoPoseDetected,
    NoPoseData,
}

impl IssueTag {
    pub fn message(self) -> &'static str {
        match self {
            IssueTag::RangeTooSmall => "Rock back further - increase range of motion",
            IssueTag::RangeTooLarge => "Don't rock too far - maintain control",
            IssueTag::MovementJerky => "Make the movement smoother and more controlled",
            IssueTag::BaseNotPlanted => "Keep hands and knees planted during rocking",
            IssueTag::AnkleCollapse => "Keep ankles stable - don't let them collapse inward",
            IssueTag::KneesMisaligned => "Keep knees directly under hips",
            IssueTag::HeadNotNeutral => "Keep head in neutral position - don't look up or down",
            IssueTag::NoPoseDetected => "No pose detected",
            IssueTag::NoPoseData => "No pose data recorded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrengthTag {
    GoodRange,
    SmoothMovement,
    FormMaintained,
    StableAnkles,
    KneesAligned,
    HeadNeutral,
}

impl StrengthTag {
    pub fn message(self) -> &'static str {
        match self {
            StrengthTag::GoodRange => "Perfect rocking range!",
            StrengthTag::SmoothMovement => "Excellent smooth movement!",
            StrengthTag::FormMaintained => "Great form maintenance!",
            StrengthTag::StableAnkles => "Great ankle stability!",
            StrengthTag::KneesAligned => "Excellent knee alignment!",
            StrengthTag::HeadNeutral => "Perfect head alignment!",
        }
    }
}

/// Score and tags for one recorded frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    pub score: u8,
    pub issues: Vec<IssueTag>,
    pub strengths: Vec<StrengthTag>,
}

impl FrameAnalysis {
    pub fn no_pose() -> Self {
        Self {
            score: 0,
            issues: vec![IssueTag::NoPoseDetected],
            strengths: Vec::new(),
        }
    }
}

/// Linear penalty scorer: start at 100, subtract per failed check, clamp at 0.
#[derive(Debug, Clone, Default)]
pub struct FormScorer {
    checker: AlignmentChecker,
    motion: MotionThresholds,
    deductions: Deductions,
}

struct Tally {
    penalty: u32,
    issues: Vec<IssueTag>,
    strengths: Vec<StrengthTag>,
}

impl Tally {
    fn fail(&mut self, issue: IssueTag, deduction: u32) {
        self.issues.push(issue);
        self.penalty = self.penalty.saturating_add(deduction);
    }

    fn judge(&mut self, passed: bool, strength: StrengthTag, issue: IssueTag, deduction: u32) {
        if passed {
            self.strengths.push(strength);
        } else {
            self.fail(issue, deduction);
        }
    }

    fn judge_outcome(
        &mut self,
        outcome: CheckOutcome,
        strength: StrengthTag,
        issue: IssueTag,
        deduction: u32,
    ) {
        if !outcome.is_indeterminate() {
            self.judge(outcome.passed(), strength, issue, deduction);
        }
    }
}

impl FormScorer {
    pub fn new(
        checker: AlignmentChecker,
        motion: MotionThresholds,
        deductions: Deductions,
    ) -> Self {
        Self {
            checker,
            motion,
            deductions,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            AlignmentChecker::new(config.alignment.clone()),
            config.motion.clone(),
            config.deductions.clone(),
        )
    }

    pub fn score_frame(
        &self,
        snapshot: &LandmarkSnapshot,
        motion: &MotionAnalysis,
        exercise: ExerciseType,
    ) -> FrameAnalysis {
        if !snapshot.is_complete() {
            return FrameAnalysis::no_pose();
        }

        let d = &self.deductions;
        let mut tally = Tally {
            penalty: 0,
            issues: Vec::new(),
            strengths: Vec::new(),
        };

        if exercise.tracks_rocking() {
            if motion.range < self.motion.min_range {
                tally.fail(IssueTag::RangeTooSmall, d.range_too_small);
            } else if motion.range > self.motion.max_range {
                tally.fail(IssueTag::RangeTooLarge, d.range_too_large);
            } else {
                tally.strengths.push(StrengthTag::GoodRange);
            }
            tally.judge(
                motion.smoothness >= self.motion.min_smoothness,
                StrengthTag::SmoothMovement,
                IssueTag::MovementJerky,
                d.low_smoothness,
            );
            tally.judge(
                motion.maintains_form,
                StrengthTag::FormMaintained,
                IssueTag::BaseNotPlanted,
                d.form_lost,
            );
        }

        tally.judge_outcome(
            self.checker.ankle_stability(snapshot),
            StrengthTag::StableAnkles,
            IssueTag::AnkleCollapse,
            d.ankle_instability,
        );
        tally.judge_outcome(
            self.checker.knee_alignment(snapshot),
            StrengthTag::KneesAligned,
            IssueTag::KneesMisaligned,
            d.knee_misalignment,
        );
        tally.judge_outcome(
            self.checker.head_alignment(snapshot),
            StrengthTag::HeadNeutral,
            IssueTag::HeadNotNeutral,
            d.head_misalignment,
        );

        FrameAnalysis {
            score: 100u32.saturating_sub(tally.penalty) as u8,
            issues: tally.issues,
            strengths: tally.strengths,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::LandmarkIndex::*;
    use crate::processing::alignment::fixtures::{quadruped, truncated, with};

    fn rocking(range: f32, smoothness: f32, maintains_form: bool) -> MotionAnalysis {
        MotionAnalysis {
            range,
            smoothness,
            maintains_form,
            current_hip_position: None,
            cadence_hz: None,
        }
    }

    #[test]
    fn clean_frame_scores_full_marks() {
        let scorer = FormScorer::default();
        let result =
            scorer.score_frame(&quadruped(), &rocking(0.3, 0.9, true), ExerciseType::Quadruped);
        assert_eq!(result.score, 100);
        assert!(result.issues.is_empty());
        assert_eq!(result.strengths.len(), 6);
    }

    #[test]
    fn collapsed_ankles_cost_twenty() {
        let scorer = FormScorer::default();
        let snapshot = with(
            &quadruped(),
            &[
                (LeftKnee, 0.35, 0.72),
                (RightKnee, 0.65, 0.72),
                (LeftAnkle, 0.40, 0.74),
                (RightAnkle, 0.60, 0.74),
            ],
        );
        let result =
            scorer.score_frame(&snapshot, &rocking(0.3, 0.9, true), ExerciseType::Quadruped);
        assert_eq!(result.score, 80);
        assert_eq!(result.issues, vec![IssueTag::AnkleCollapse]);
    }

    #[test]
    fn range_bands_apply_distinct_deductions() {
        let scorer = FormScorer::default();
        let small =
            scorer.score_frame(&quadruped(), &rocking(0.05, 0.9, true), ExerciseType::Quadruped);
        assert_eq!(small.score, 80);
        assert_eq!(small.issues, vec![IssueTag::RangeTooSmall]);
        let large =
            scorer.score_frame(&quadruped(), &rocking(0.5, 0.9, true), ExerciseType::Quadruped);
        assert_eq!(large.score, 85);
        assert_eq!(large.issues, vec![IssueTag::RangeTooLarge]);
    }

    #[test]
    fn every_failure_clamps_score_at_zero() {
        let scorer = FormScorer::default();
        let snapshot = with(
            &quadruped(),
            &[
                (Nose, 0.90, 0.35),
                (LeftKnee, 0.10, 0.72),
                (RightKnee, 0.40, 0.72),
                (LeftAnkle, 0.24, 0.74),
                (RightAnkle, 0.26, 0.74),
            ],
        );
        let result =
            scorer.score_frame(&snapshot, &rocking(0.01, 0.2, false), ExerciseType::Quadruped);
        assert_eq!(result.score, 0);
        assert_eq!(result.issues.len(), 6);
        assert!(result.strengths.is_empty());
    }

    #[test]
    fn oversized_deductions_still_clamp() {
        let deductions = Deductions {
            head_misalignment: 500,
            ..Default::default()
        };
        let scorer =
            FormScorer::new(AlignmentChecker::default(), MotionThresholds::default(), deductions);
        let snapshot = with(&quadruped(), &[(Nose, 0.90, 0.35)]);
        let result =
            scorer.score_frame(&snapshot, &rocking(0.3, 0.9, true), ExerciseType::Quadruped);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn toe_drive_skips_rocking_checks() {
        let scorer = FormScorer::default();
        let result =
            scorer.score_frame(&quadruped(), &rocking(0.0, 0.0, false), ExerciseType::ToeDrive);
        assert_eq!(result.score, 100);
        assert_eq!(result.strengths.len(), 3);
    }

    #[test]
    fn incomplete_snapshot_scores_zero() {
        let scorer = FormScorer::default();
        let result = scorer.score_frame(
            &truncated(12),
            &MotionAnalysis::neutral(None),
            ExerciseType::Quadruped,
        );
        assert_eq!(result, FrameAnalysis::no_pose());
    }

    #[test]
    fn score_stays_within_bounds() {
        let scorer = FormScorer::default();
        for range in [0.0, 0.05, 0.2, 0.45, 1.0] {
            for smoothness in [0.0, 0.5, 1.0] {
                for maintains_form in [true, false] {
                    let result = scorer.score_frame(
                        &with(&quadruped(), &[(Nose, 0.8, 0.35)]),
                        &rocking(range, smoothness, maintains_form),
                        ExerciseType::Quadruped,
                    );
                    assert!(result.score <= 100);
                }
            }
        }
    }
}
