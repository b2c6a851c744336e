use crate::generator::profile::{FormFault, GeneratorConfig};
use anyhow::Context;
use rockcore::{AnalysisConfig, ExerciseType};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub exercise: ExerciseType,
    #[serde(default)]
    pub skip_posture: bool,
    /// Playback rate for replaying the recorded timeline; no replay when absent.
    #[serde(default)]
    pub replay_fps: Option<f32>,
    /// Interpolate frames without a pose before replaying.
    #[serde(default)]
    pub fill_gaps: bool,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config
            .analysis
            .validate()
            .with_context(|| format!("validating analysis settings in {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        exercise: ExerciseType,
        recording_frames: usize,
        seed: u64,
        fault: Option<FormFault>,
    ) -> Self {
        Self {
            exercise,
            skip_posture: false,
            replay_fps: None,
            fill_gaps: false,
            analysis: AnalysisConfig::default(),
            generator: GeneratorConfig {
                recording_frames,
                seed,
                fault,
                ..Default::default()
            },
        }
    }
}
