use serde::{Deserialize, Serialize};

/// Anatomical index schema of the 33-point body landmark model.
///
/// Every component addresses keypoints through this enum, so adapting to a
/// detector with a different layout only means remapping it here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    pub const COUNT: usize = 33;

    pub const ALL: [LandmarkIndex; Self::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    /// Landmarks the posture checks rely on; used for the visibility gate.
    pub const POSTURE_KEY: [LandmarkIndex; 12] = [
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_matches_detector_layout() {
        assert_eq!(LandmarkIndex::LeftShoulder.index(), 11);
        assert_eq!(LandmarkIndex::RightWrist.index(), 16);
        assert_eq!(LandmarkIndex::LeftHip.index(), 23);
        assert_eq!(LandmarkIndex::RightFootIndex.index(), 32);
        for (position, landmark) in LandmarkIndex::ALL.iter().enumerate() {
            assert_eq!(landmark.index(), position);
        }
    }

    #[test]
    fn from_index_rejects_out_of_range() {
        assert_eq!(LandmarkIndex::from_index(0), Some(LandmarkIndex::Nose));
        assert_eq!(LandmarkIndex::from_index(33), None);
    }

    #[test]
    fn landmarks_serialize_by_name() {
        let json = serde_json::to_string(&LandmarkIndex::LeftFootIndex).unwrap();
        assert_eq!(json, "\"leftFootIndex\"");
        let parsed: Vec<LandmarkIndex> = serde_json::from_str(r#"["nose", "rightHip"]"#).unwrap();
        assert_eq!(parsed, vec![LandmarkIndex::Nose, LandmarkIndex::RightHip]);
        assert!(serde_json::from_str::<LandmarkIndex>("\"tail\"").is_err());
    }
}
