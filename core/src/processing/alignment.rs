use crate::landmarks::{LandmarkIndex, LandmarkSnapshot};
use crate::prelude::AlignmentThresholds;
use serde::{Deserialize, Serialize};

use LandmarkIndex::*;

/// Result of one geometric predicate over a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum CheckOutcome {
    Pass { deviation: Option<f32> },
    Fail { deviation: Option<f32> },
    /// Not enough landmarks to judge; callers treat it as failed or neutral.
    Indeterminate,
}

impl CheckOutcome {
    fn below(deviation: f32, tolerance: f32) -> Self {
        if !deviation.is_finite() {
            CheckOutcome::Indeterminate
        } else if deviation < tolerance {
            CheckOutcome::Pass {
                deviation: Some(deviation),
            }
        } else {
            CheckOutcome::Fail {
                deviation: Some(deviation),
            }
        }
    }

    fn from_bool(passed: bool) -> Self {
        if passed {
            CheckOutcome::Pass { deviation: None }
        } else {
            CheckOutcome::Fail { deviation: None }
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, CheckOutcome::Pass { .. })
    }

    pub fn failed(&self) -> bool {
        matches!(self, CheckOutcome::Fail { .. })
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self, CheckOutcome::Indeterminate)
    }

    pub fn deviation(&self) -> Option<f32> {
        match self {
            CheckOutcome::Pass { deviation } | CheckOutcome::Fail { deviation } => *deviation,
            CheckOutcome::Indeterminate => None,
        }
    }
}

/// Coarse body region of a check, in the order corrections are surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckCategory {
    FeetAndAnkles,
    KneesAndHips,
    HandsAndShoulders,
    BackAndSpine,
    Visibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlignmentCheck {
    HandsUnderShoulders,
    KneesUnderHips,
    FeetFlat,
    QuadrupedPosition,
    AnkleStability,
    KneeAlignment,
    HeadAlignment,
    BackAlignment,
    FeetWidth,
    ToesTucked,
    ToeEngagement,
    KeypointVisibility,
}

impl AlignmentCheck {
    pub fn category(self) -> CheckCategory {
        match self {
            AlignmentCheck::FeetFlat
            | AlignmentCheck::AnkleStability
            | AlignmentCheck::FeetWidth
            | AlignmentCheck::ToesTucked
            | AlignmentCheck::ToeEngagement => CheckCategory::FeetAndAnkles,
            AlignmentCheck::KneesUnderHips
            | AlignmentCheck::KneeAlignment
            | AlignmentCheck::QuadrupedPosition => CheckCategory::KneesAndHips,
            AlignmentCheck::HandsUnderShoulders => CheckCategory::HandsAndShoulders,
            AlignmentCheck::BackAlignment | AlignmentCheck::HeadAlignment => {
                CheckCategory::BackAndSpine
            }
            AlignmentCheck::KeypointVisibility => CheckCategory::Visibility,
        }
    }

    /// Guidance shown when the check fails.
    pub fn correction(self) -> &'static str {
        match self {
            AlignmentCheck::HandsUnderShoulders => "Position hands directly under shoulders",
            AlignmentCheck::KneesUnderHips => "Position knees directly under hips",
            AlignmentCheck::FeetFlat => "Keep feet flat on the ground",
            AlignmentCheck::QuadrupedPosition => "Get into hands and knees position",
            AlignmentCheck::AnkleStability => "Keep ankles stable - don't let them collapse inward",
            AlignmentCheck::KneeAlignment => "Keep knees directly under hips",
            AlignmentCheck::HeadAlignment => "Keep head in neutral position",
            AlignmentCheck::BackAlignment => "Keep your back flat and parallel to the floor",
            AlignmentCheck::FeetWidth => "Position your feet hip-width apart",
            AlignmentCheck::ToesTucked => "Point your toes downward for the toe drive position",
            AlignmentCheck::ToeEngagement => "Press your toes into the ground",
            AlignmentCheck::KeypointVisibility => "Please position yourself in view of the camera",
        }
    }

    /// Confirmation shown when the check passes.
    pub fn confirmation(self) -> &'static str {
        match self {
            AlignmentCheck::HandsUnderShoulders => "Hands positioned under shoulders",
            AlignmentCheck::KneesUnderHips => "Knees positioned under hips",
            AlignmentCheck::FeetFlat => "Feet flat on the ground",
            AlignmentCheck::QuadrupedPosition => "In quadruped position",
            AlignmentCheck::AnkleStability => "Ankles stable",
            AlignmentCheck::KneeAlignment => "Knees aligned with hips",
            AlignmentCheck::HeadAlignment => "Head in neutral position",
            AlignmentCheck::BackAlignment => "Back flat and level",
            AlignmentCheck::FeetWidth => "Feet hip-width apart",
            AlignmentCheck::ToesTucked => "Toes tucked under",
            AlignmentCheck::ToeEngagement => "Toes engaged",
            AlignmentCheck::KeypointVisibility => "Whole body visible",
        }
    }
}

/// Stateless geometric predicates over a single landmark snapshot.
#[derive(Debug, Clone, Default)]
pub struct AlignmentChecker {
    thresholds: AlignmentThresholds,
}

impl AlignmentChecker {
    pub fn new(thresholds: AlignmentThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &AlignmentThresholds {
        &self.thresholds
    }

    pub fn run(&self, check: AlignmentCheck, snapshot: &LandmarkSnapshot) -> CheckOutcome {
        if !snapshot.is_complete() {
            return CheckOutcome::Indeterminate;
        }
        match check {
            AlignmentCheck::HandsUnderShoulders => self.hands_under_shoulders(snapshot),
            AlignmentCheck::KneesUnderHips => self.knees_under_hips(snapshot),
            AlignmentCheck::FeetFlat => self.feet_flat(snapshot),
            AlignmentCheck::QuadrupedPosition => self.quadruped_position(snapshot),
            AlignmentCheck::AnkleStability => self.ankle_stability(snapshot),
            AlignmentCheck::KneeAlignment => self.knee_alignment(snapshot),
            AlignmentCheck::HeadAlignment => self.head_alignment(snapshot),
            AlignmentCheck::BackAlignment => self.back_alignment(snapshot),
            AlignmentCheck::FeetWidth => self.feet_width(snapshot),
            AlignmentCheck::ToesTucked => self.toes_tucked(snapshot),
            AlignmentCheck::ToeEngagement => self.toe_engagement(snapshot),
            AlignmentCheck::KeypointVisibility => self.keypoints_visible(snapshot),
        }
    }

    pub fn hands_under_shoulders(&self, snapshot: &LandmarkSnapshot) -> CheckOutcome {
        horizontal_offset(
            snapshot,
            (LeftShoulder, RightShoulder),
            (LeftWrist, RightWrist),
            self.thresholds.hands_under_shoulders,
        )
    }

    pub fn knees_under_hips(&self, snapshot: &LandmarkSnapshot) -> CheckOutcome {
        horizontal_offset(
            snapshot,
            (LeftHip, RightHip),
            (LeftKnee, RightKnee),
            self.thresholds.knees_under_hips,
        )
    }

    pub fn feet_flat(&self, snapshot: &LandmarkSnapshot) -> CheckOutcome {
        guarded(snapshot, |s| {
            let left = (s.get(LeftAnkle)?.y - s.get(LeftFootIndex)?.y).abs();
            let right = (s.get(RightAnkle)?.y - s.get(RightFootIndex)?.y).abs();
            Some(CheckOutcome::below(left.max(right), self.thresholds.feet_flat))
        })
    }

    /// Wrists below shoulders and knees below hips on each side.
    pub fn quadruped_position(&self, snapshot: &LandmarkSnapshot) -> CheckOutcome {
        guarded(snapshot, |s| {
            let hands_down =
                below(s, LeftWrist, LeftShoulder)? && below(s, RightWrist, RightShoulder)?;
            let knees_down = below(s, LeftKnee, LeftHip)? && below(s, RightKnee, RightHip)?;
            Some(CheckOutcome::from_bool(hands_down && knees_down))
        })
    }

    /// Ankle width relative to knee width; a low ratio means the ankles collapse inward.
    pub fn ankle_stability(&self, snapshot: &LandmarkSnapshot) -> CheckOutcome {
        guarded(snapshot, |s| {
            let ankle_width = s.width(LeftAnkle, RightAnkle)?;
            let knee_width = s.width(LeftKnee, RightKnee)?;
            if knee_width <= f32::EPSILON {
                return None;
            }
            let ratio = ankle_width / knee_width;
            if !ratio.is_finite() {
                return None;
            }
            let deviation = Some(ratio);
            Some(if ratio > self.thresholds.ankle_stability_ratio {
                CheckOutcome::Pass { deviation }
            } else {
                CheckOutcome::Fail { deviation }
            })
        })
    }

    pub fn knee_alignment(&self, snapshot: &LandmarkSnapshot) -> CheckOutcome {
        horizontal_offset(
            snapshot,
            (LeftKnee, RightKnee),
            (LeftHip, RightHip),
            self.thresholds.knee_alignment,
        )
    }

    pub fn head_alignment(&self, snapshot: &LandmarkSnapshot) -> CheckOutcome {
        guarded(snapshot, |s| {
            let nose = s.get(Nose)?;
            let shoulders = s.midpoint(LeftShoulder, RightShoulder)?;
            Some(CheckOutcome::below(
                (nose.x - shoulders.x).abs(),
                self.thresholds.head_alignment,
            ))
        })
    }

    /// Shoulder and hip midpoints at similar height, i.e. a level back.
    pub fn back_alignment(&self, snapshot: &LandmarkSnapshot) -> CheckOutcome {
        guarded(snapshot, |s| {
            let shoulders = s.midpoint(LeftShoulder, RightShoulder)?;
            let hips = s.hip_midpoint()?;
            Some(CheckOutcome::below(
                (shoulders.y - hips.y).abs(),
                self.thresholds.back_alignment,
            ))
        })
    }

    pub fn feet_width(&self, snapshot: &LandmarkSnapshot) -> CheckOutcome {
        guarded(snapshot, |s| {
            let ankle_width = s.width(LeftAnkle, RightAnkle)?;
            let hip_width = s.width(LeftHip, RightHip)?;
            Some(CheckOutcome::below(
                (ankle_width - hip_width).abs(),
                self.thresholds.feet_width,
            ))
        })
    }

    pub fn toes_tucked(&self, snapshot: &LandmarkSnapshot) -> CheckOutcome {
        guarded(snapshot, |s| {
            Some(CheckOutcome::from_bool(
                below(s, LeftFootIndex, LeftHeel)? && below(s, RightFootIndex, RightHeel)?,
            ))
        })
    }

    pub fn toe_engagement(&self, snapshot: &LandmarkSnapshot) -> CheckOutcome {
        guarded(snapshot, |s| {
            Some(CheckOutcome::from_bool(
                below(s, LeftFootIndex, LeftAnkle)? && below(s, RightFootIndex, RightAnkle)?,
            ))
        })
    }

    /// Every landmark the posture checks use is confidently visible.
    pub fn keypoints_visible(&self, snapshot: &LandmarkSnapshot) -> CheckOutcome {
        guarded(snapshot, |s| {
            let mut weakest = f32::INFINITY;
            for landmark in LandmarkIndex::POSTURE_KEY {
                weakest = weakest.min(s.get(landmark)?.visibility);
            }
            let deviation = Some(weakest);
            Some(if weakest > self.thresholds.min_visibility {
                CheckOutcome::Pass { deviation }
            } else {
                CheckOutcome::Fail { deviation }
            })
        })
    }
}

fn guarded<F>(snapshot: &LandmarkSnapshot, check: F) -> CheckOutcome
where
    F: FnOnce(&LandmarkSnapshot) -> Option<CheckOutcome>,
{
    if !snapshot.is_complete() {
        return CheckOutcome::Indeterminate;
    }
    check(snapshot).unwrap_or(CheckOutcome::Indeterminate)
}

/// `upper` sits above `lower` in image space (larger y is lower in the frame).
fn below(snapshot: &LandmarkSnapshot, lower: LandmarkIndex, upper: LandmarkIndex) -> Option<bool> {
    Some(snapshot.get(lower)?.y > snapshot.get(upper)?.y)
}

fn horizontal_offset(
    snapshot: &LandmarkSnapshot,
    first: (LandmarkIndex, LandmarkIndex),
    second: (LandmarkIndex, LandmarkIndex),
    tolerance: f32,
) -> CheckOutcome {
    guarded(snapshot, |s| {
        let a = s.midpoint(first.0, first.1)?;
        let b = s.midpoint(second.0, second.1)?;
        Some(CheckOutcome::below((a.x - b.x).abs(), tolerance))
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::{quadruped, truncated, with};
    use super::*;

    const ALL_CHECKS: [AlignmentCheck; 12] = [
        AlignmentCheck::HandsUnderShoulders,
        AlignmentCheck::KneesUnderHips,
        AlignmentCheck::FeetFlat,
        AlignmentCheck::QuadrupedPosition,
        AlignmentCheck::AnkleStability,
        AlignmentCheck::KneeAlignment,
        AlignmentCheck::HeadAlignment,
        AlignmentCheck::BackAlignment,
        AlignmentCheck::FeetWidth,
        AlignmentCheck::ToesTucked,
        AlignmentCheck::ToeEngagement,
        AlignmentCheck::KeypointVisibility,
    ];

    #[test]
    fn reference_stance_passes_every_check() {
        let checker = AlignmentChecker::default();
        let snapshot = quadruped();
        for check in ALL_CHECKS {
            assert!(checker.run(check, &snapshot).passed(), "{:?} failed", check);
        }
    }

    #[test]
    fn incomplete_snapshot_is_indeterminate_everywhere() {
        let checker = AlignmentChecker::default();
        for count in [0, 1, 17, 32] {
            let snapshot = truncated(count);
            for check in ALL_CHECKS {
                assert!(checker.run(check, &snapshot).is_indeterminate());
            }
        }
    }

    #[test]
    fn hands_under_shoulders_when_midpoints_coincide() {
        let checker = AlignmentChecker::default();
        let snapshot = with(
            &quadruped(),
            &[
                (LeftShoulder, 0.40, 0.40),
                (RightShoulder, 0.60, 0.40),
                (LeftWrist, 0.45, 0.70),
                (RightWrist, 0.55, 0.70),
            ],
        );
        let outcome = checker.hands_under_shoulders(&snapshot);
        assert!(outcome.passed());
        assert!(outcome.deviation().unwrap() < 1e-6);
    }

    #[test]
    fn hands_ahead_of_shoulders_fail() {
        let checker = AlignmentChecker::default();
        let snapshot = with(
            &quadruped(),
            &[(LeftWrist, 0.60, 0.70), (RightWrist, 0.70, 0.70)],
        );
        assert!(checker.hands_under_shoulders(&snapshot).failed());
    }

    #[test]
    fn narrow_ankles_are_unstable() {
        let checker = AlignmentChecker::default();
        let snapshot = with(
            &quadruped(),
            &[
                (LeftKnee, 0.35, 0.72),
                (RightKnee, 0.65, 0.72),
                (LeftAnkle, 0.40, 0.74),
                (RightAnkle, 0.60, 0.74),
            ],
        );
        let outcome = checker.ankle_stability(&snapshot);
        assert!(outcome.failed());
        assert!((outcome.deviation().unwrap() - 0.2 / 0.3).abs() < 1e-4);
    }

    #[test]
    fn zero_knee_width_is_indeterminate() {
        let checker = AlignmentChecker::default();
        let snapshot = with(
            &quadruped(),
            &[(LeftKnee, 0.50, 0.72), (RightKnee, 0.50, 0.72)],
        );
        assert!(checker.ankle_stability(&snapshot).is_indeterminate());
    }

    #[test]
    fn raised_foot_is_not_flat() {
        let checker = AlignmentChecker::default();
        let snapshot = with(&quadruped(), &[(RightFootIndex, 0.56, 0.84)]);
        assert!(checker.feet_flat(&snapshot).failed());
    }

    #[test]
    fn standing_pose_fails_quadruped_gate() {
        let checker = AlignmentChecker::default();
        let snapshot = with(
            &quadruped(),
            &[(LeftWrist, 0.44, 0.30), (RightWrist, 0.56, 0.30)],
        );
        assert!(checker.quadruped_position(&snapshot).failed());
    }

    #[test]
    fn head_turned_aside_fails() {
        let checker = AlignmentChecker::default();
        let snapshot = with(&quadruped(), &[(Nose, 0.70, 0.35)]);
        assert!(checker.head_alignment(&snapshot).failed());
    }

    #[test]
    fn low_visibility_fails_visibility_gate() {
        let checker = AlignmentChecker::default();
        let mut keypoints = quadruped().keypoints().to_vec();
        keypoints[LeftAnkle.index()].visibility = 0.2;
        let outcome = checker.keypoints_visible(&LandmarkSnapshot::new(keypoints));
        assert!(outcome.failed());
        assert_eq!(outcome.deviation(), Some(0.2));
    }

    #[test]
    fn checks_are_idempotent() {
        let checker = AlignmentChecker::default();
        let snapshot = with(&quadruped(), &[(Nose, 0.62, 0.35)]);
        for check in ALL_CHECKS {
            assert_eq!(checker.run(check, &snapshot), checker.run(check, &snapshot));
        }
    }

    #[test]
    fn categories_follow_correction_priority() {
        assert!(AlignmentCheck::FeetFlat.category() < AlignmentCheck::KneesUnderHips.category());
        assert!(
            AlignmentCheck::KneesUnderHips.category()
                < AlignmentCheck::HandsUnderShoulders.category()
        );
        assert!(
            AlignmentCheck::HandsUnderShoulders.category()
                < AlignmentCheck::BackAlignment.category()
        );
        assert!(
            AlignmentCheck::BackAlignment.category()
                < AlignmentCheck::KeypointVisibility.category()
        );
    }
}
