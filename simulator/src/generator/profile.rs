use anyhow::Context;
use clap::ValueEnum;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rockcore::landmarks::{Keypoint, LandmarkIndex, LandmarkSnapshot};
use rockcore::processing::reference_pattern;
use serde::{Deserialize, Serialize};

/// Form breakdowns that can be injected into the recorded frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FormFault {
    AnkleCollapse,
    HeadDrop,
    LiftedHand,
    Jerky,
}

/// Configuration for generating a synthetic exercise session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub fps: f32,
    /// Frames in the starting posture before recording begins.
    pub setup_frames: usize,
    pub recording_frames: usize,
    /// Frames per full rocking cycle.
    pub cycle_frames: u64,
    /// Multiplier on the reference hip excursion.
    pub amplitude_scale: f32,
    pub noise: f32,
    /// Probability that a recorded frame has no detected pose.
    pub dropout: f32,
    pub fault: Option<FormFault>,
    /// Probability that a recorded frame carries the fault.
    pub fault_rate: f32,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            setup_frames: 15,
            recording_frames: 180,
            cycle_frames: 60,
            amplitude_scale: 1.0,
            noise: 0.004,
            dropout: 0.0,
            fault: None,
            fault_rate: 0.25,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticFrame {
    pub timestamp: f64,
    pub snapshot: Option<LandmarkSnapshot>,
}

/// Setup frames followed by recording frames on one continuous clock.
#[derive(Debug, Clone)]
pub struct SyntheticSession {
    pub setup: Vec<SyntheticFrame>,
    pub recording: Vec<SyntheticFrame>,
}

impl SyntheticSession {
    pub fn recording_start(&self) -> f64 {
        self.recording
            .first()
            .map(|frame| frame.timestamp)
            .unwrap_or_else(|| self.setup.last().map_or(0.0, |frame| frame.timestamp))
    }
}

/// Keypoints of a side-on quadruped stance with the hips at `hip_y`.
fn stance(hip_y: f32) -> Vec<Keypoint> {
    use LandmarkIndex::*;

    let mut keypoints = vec![Keypoint::new(0.5, 0.32, 0.9); LandmarkIndex::COUNT];
    let placements = [
        (Nose, 0.50, 0.35),
        (LeftShoulder, 0.45, 0.40),
        (RightShoulder, 0.55, 0.40),
        (LeftElbow, 0.445, 0.55),
        (RightElbow, 0.555, 0.55),
        (LeftWrist, 0.44, 0.70),
        (RightWrist, 0.56, 0.70),
        (LeftHip, 0.45, hip_y),
        (RightHip, 0.55, hip_y),
        (LeftKnee, 0.44, 0.72),
        (RightKnee, 0.56, 0.72),
        (LeftAnkle, 0.44, 0.74),
        (RightAnkle, 0.56, 0.74),
        (LeftHeel, 0.44, 0.73),
        (RightHeel, 0.56, 0.73),
        (LeftFootIndex, 0.44, 0.76),
        (RightFootIndex, 0.56, 0.76),
    ];
    for (landmark, x, y) in placements {
        keypoints[landmark.index()] = Keypoint::new(x, y, 0.95);
    }
    keypoints
}

fn place(keypoints: &mut [Keypoint], landmark: LandmarkIndex, x: f32, y: f32) {
    let slot = &mut keypoints[landmark.index()];
    slot.x = x;
    slot.y = y;
}

fn apply_fault(keypoints: &mut [Keypoint], fault: FormFault, frame: usize) {
    use LandmarkIndex::*;

    match fault {
        FormFault::AnkleCollapse => {
            place(keypoints, LeftAnkle, 0.47, 0.74);
            place(keypoints, RightAnkle, 0.53, 0.74);
        }
        FormFault::HeadDrop => place(keypoints, Nose, 0.66, 0.45),
        FormFault::LiftedHand => place(keypoints, RightWrist, 0.56, 0.30),
        FormFault::Jerky => {
            let kick = if frame % 2 == 0 { 0.05 } else { -0.05 };
            for hip in [LeftHip, RightHip] {
                keypoints[hip.index()].y += kick;
            }
        }
    }
}

fn jitter(keypoints: &mut [Keypoint], rng: &mut StdRng, noise: f32) {
    if noise <= 0.0 {
        return;
    }
    for keypoint in keypoints.iter_mut() {
        keypoint.x += rng.gen_range(-noise..noise);
        keypoint.y += rng.gen_range(-noise..noise);
    }
}

pub fn build_session(config: &GeneratorConfig) -> anyhow::Result<SyntheticSession> {
    if !(config.fps.is_finite() && config.fps > 0.0) {
        anyhow::bail!("generator fps must be positive, got {}", config.fps);
    }
    let total = config
        .setup_frames
        .checked_add(config.recording_frames)
        .context("overflow computing frame count for generator")?;

    let dt = 1.0 / f64::from(config.fps);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut setup = Vec::with_capacity(config.setup_frames);
    let mut recording = Vec::with_capacity(config.recording_frames);

    for frame in 0..total {
        let timestamp = frame as f64 * dt;
        if frame < config.setup_frames {
            let mut keypoints = stance(0.45);
            jitter(&mut keypoints, &mut rng, config.noise);
            setup.push(SyntheticFrame {
                timestamp,
                snapshot: Some(LandmarkSnapshot::new(keypoints)),
            });
            continue;
        }

        let recorded = frame - config.setup_frames;
        if config.dropout > 0.0 && rng.gen_bool(f64::from(config.dropout.min(1.0))) {
            recording.push(SyntheticFrame {
                timestamp,
                snapshot: None,
            });
            continue;
        }

        let reference = reference_pattern(recorded as u64, config.cycle_frames);
        let hip_y = 0.5 + (reference.ideal_hip_y - 0.5) * config.amplitude_scale;
        let mut keypoints = stance(hip_y);
        if let Some(fault) = config.fault {
            if rng.gen_bool(f64::from(config.fault_rate.clamp(0.0, 1.0))) {
                apply_fault(&mut keypoints, fault, recorded);
            }
        }
        jitter(&mut keypoints, &mut rng, config.noise);
        recording.push(SyntheticFrame {
            timestamp,
            snapshot: Some(LandmarkSnapshot::new(keypoints)),
        });
    }

    Ok(SyntheticSession { setup, recording })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_builds_expected_frame_counts() {
        let session = build_session(&GeneratorConfig::default()).unwrap();
        assert_eq!(session.setup.len(), 15);
        assert_eq!(session.recording.len(), 180);
        assert!((session.recording_start() - 0.5).abs() < 1e-9);
        assert!(session
            .recording
            .iter()
            .all(|frame| frame.snapshot.as_ref().is_some_and(|s| s.is_complete())));
    }

    #[test]
    fn same_seed_reproduces_the_session() {
        let config = GeneratorConfig {
            seed: 7,
            dropout: 0.1,
            fault: Some(FormFault::HeadDrop),
            ..Default::default()
        };
        let first = build_session(&config).unwrap();
        let second = build_session(&config).unwrap();
        for (a, b) in first.recording.iter().zip(&second.recording) {
            assert_eq!(a.snapshot, b.snapshot);
        }
    }

    #[test]
    fn hip_follows_the_reference_excursion() {
        let config = GeneratorConfig {
            noise: 0.0,
            ..Default::default()
        };
        let session = build_session(&config).unwrap();
        let hip_ys: Vec<f32> = session
            .recording
            .iter()
            .filter_map(|frame| frame.snapshot.as_ref()?.hip_midpoint())
            .map(|hip| hip.y)
            .collect();
        let max = hip_ys.iter().cloned().fold(f32::MIN, f32::max);
        let min = hip_ys.iter().cloned().fold(f32::MAX, f32::min);
        assert!((max - min - 0.30).abs() < 0.01);
    }

    #[test]
    fn full_dropout_removes_every_recorded_pose() {
        let config = GeneratorConfig {
            dropout: 1.0,
            ..Default::default()
        };
        let session = build_session(&config).unwrap();
        assert!(session.recording.iter().all(|frame| frame.snapshot.is_none()));
        assert!(session.setup.iter().all(|frame| frame.snapshot.is_some()));
    }

    #[test]
    fn zero_fps_is_rejected() {
        let config = GeneratorConfig {
            fps: 0.0,
            ..Default::default()
        };
        assert!(build_session(&config).is_err());
    }
}
