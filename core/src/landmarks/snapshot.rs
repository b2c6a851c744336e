use crate::landmarks::schema::LandmarkIndex;
use crate::prelude::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};

/// Single tracked body joint in normalized frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    /// Detector confidence that the joint is visible, in [0, 1].
    pub visibility: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility,
        }
    }

    pub fn with_depth(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            visibility,
        }
    }

    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility > threshold
    }

    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// Linear blend towards `other`; depth survives only when both sides carry it.
    pub fn lerp(&self, other: &Keypoint, t: f32) -> Keypoint {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Keypoint {
            x: mix(self.x, other.x),
            y: mix(self.y, other.y),
            z: match (self.z, other.z) {
                (Some(a), Some(b)) => Some(mix(a, b)),
                _ => None,
            },
            visibility: mix(self.visibility, other.visibility),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn midpoint(a: Point2, b: Point2) -> Self {
        Self::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }
}

/// Immutable per-frame set of body keypoints as delivered by the detector.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSnapshot {
    keypoints: Vec<Keypoint>,
}

impl LandmarkSnapshot {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self { keypoints }
    }

    /// Builds a snapshot from `[x, y, z, visibility]` rows.
    pub fn from_raw(rows: &[[f32; 4]]) -> AnalysisResult<Self> {
        let mut keypoints = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            if row.iter().any(|value| !value.is_finite()) {
                return Err(AnalysisError::InvalidInput(format!(
                    "keypoint {} has non-finite components",
                    idx
                )));
            }
            keypoints.push(Keypoint::with_depth(
                row[0],
                row[1],
                row[2],
                row[3].clamp(0.0, 1.0),
            ));
        }
        Ok(Self { keypoints })
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// True when every landmark of the schema is present.
    pub fn is_complete(&self) -> bool {
        self.keypoints.len() >= LandmarkIndex::COUNT
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn get(&self, landmark: LandmarkIndex) -> Option<&Keypoint> {
        self.keypoints.get(landmark.index())
    }

    pub fn pair(&self, left: LandmarkIndex, right: LandmarkIndex) -> Option<(Keypoint, Keypoint)> {
        Some((*self.get(left)?, *self.get(right)?))
    }

    pub fn midpoint(&self, left: LandmarkIndex, right: LandmarkIndex) -> Option<Point2> {
        let (l, r) = self.pair(left, right)?;
        Some(Point2::midpoint(l.position(), r.position()))
    }

    /// Horizontal distance between a left/right landmark pair.
    pub fn width(&self, left: LandmarkIndex, right: LandmarkIndex) -> Option<f32> {
        let (l, r) = self.pair(left, right)?;
        Some((l.x - r.x).abs())
    }

    pub fn hip_midpoint(&self) -> Option<Point2> {
        self.midpoint(LandmarkIndex::LeftHip, LandmarkIndex::RightHip)
    }

    /// Keypoint-wise interpolation used to bridge frames the detector missed.
    pub fn lerp(&self, other: &LandmarkSnapshot, t: f32) -> LandmarkSnapshot {
        let keypoints = self
            .keypoints
            .iter()
            .zip(other.keypoints.iter())
            .map(|(a, b)| a.lerp(b, t))
            .collect();
        LandmarkSnapshot { keypoints }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(count: usize) -> LandmarkSnapshot {
        LandmarkSnapshot::new(vec![Keypoint::new(0.5, 0.5, 1.0); count])
    }

    #[test]
    fn completeness_requires_full_schema() {
        assert!(uniform(33).is_complete());
        assert!(!uniform(32).is_complete());
        assert!(uniform(0).is_empty());
    }

    #[test]
    fn from_raw_rejects_nan() {
        let mut rows = vec![[0.5, 0.5, 0.0, 1.0]; 33];
        rows[4][1] = f32::NAN;
        assert!(matches!(
            LandmarkSnapshot::from_raw(&rows),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn midpoint_and_width_use_named_landmarks() {
        let mut keypoints = vec![Keypoint::new(0.0, 0.0, 1.0); 33];
        keypoints[LandmarkIndex::LeftHip.index()] = Keypoint::new(0.4, 0.6, 1.0);
        keypoints[LandmarkIndex::RightHip.index()] = Keypoint::new(0.6, 0.4, 1.0);
        let snapshot = LandmarkSnapshot::new(keypoints);

        let hip = snapshot.hip_midpoint().unwrap();
        assert!((hip.x - 0.5).abs() < 1e-6);
        assert!((hip.y - 0.5).abs() < 1e-6);
        let width = snapshot
            .width(LandmarkIndex::LeftHip, LandmarkIndex::RightHip)
            .unwrap();
        assert!((width - 0.2).abs() < 1e-6);
    }

    #[test]
    fn lerp_drops_depth_when_one_side_lacks_it() {
        let a = Keypoint::with_depth(0.0, 0.0, 1.0, 0.0);
        let b = Keypoint::new(1.0, 1.0, 1.0);
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid.x, 0.5);
        assert_eq!(mid.visibility, 0.5);
        assert_eq!(mid.z, None);
    }
}
