use serde::{Deserialize, Serialize};

/// Movement families the analysis understands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum ExerciseType {
    #[default]
    Quadruped,
    ToeDrive,
}

impl ExerciseType {
    /// Whether per-frame scoring includes the rocking-motion checks.
    pub fn tracks_rocking(self) -> bool {
        matches!(self, ExerciseType::Quadruped)
    }
}

/// Geometric tolerances for the alignment checks, in normalized-coordinate units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlignmentThresholds {
    pub hands_under_shoulders: f32,
    pub knees_under_hips: f32,
    pub feet_flat: f32,
    pub ankle_stability_ratio: f32,
    pub knee_alignment: f32,
    pub head_alignment: f32,
    pub back_alignment: f32,
    pub feet_width: f32,
    pub min_visibility: f32,
}

impl Default for AlignmentThresholds {
    fn default() -> Self {
        Self {
            hands_under_shoulders: 0.10,
            knees_under_hips: 0.10,
            feet_flat: 0.05,
            ankle_stability_ratio: 0.8,
            knee_alignment: 0.10,
            head_alignment: 0.10,
            back_alignment: 0.10,
            feet_width: 0.10,
            min_visibility: 0.5,
        }
    }
}

/// Quality bands applied to the rocking-motion metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MotionThresholds {
    pub min_range: f32,
    pub max_range: f32,
    pub min_smoothness: f32,
    /// Scale applied to the mean frame-to-frame hip displacement.
    pub smoothness_gain: f32,
    /// Minimum horizontal wrist separation for a planted base.
    pub min_wrist_separation: f32,
}

impl Default for MotionThresholds {
    fn default() -> Self {
        Self {
            min_range: 0.10,
            max_range: 0.40,
            min_smoothness: 0.70,
            smoothness_gain: 10.0,
            min_wrist_separation: 0.10,
        }
    }
}

/// Linear penalty model; each failed check subtracts its deduction from 100.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Deductions {
    pub range_too_small: u32,
    pub range_too_large: u32,
    pub low_smoothness: u32,
    pub form_lost: u32,
    pub ankle_instability: u32,
    pub knee_misalignment: u32,
    pub head_misalignment: u32,
}

impl Default for Deductions {
    fn default() -> Self {
        Self {
            range_too_small: 20,
            range_too_large: 15,
            low_smoothness: 15,
            form_lost: 25,
            ankle_instability: 20,
            knee_misalignment: 15,
            head_misalignment: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PostureSettings {
    pub max_surfaced_issues: usize,
    /// Consecutive failing frames needed before a passed latch reverts.
    pub sustained_failure_frames: u32,
}

impl Default for PostureSettings {
    fn default() -> Self {
        Self {
            max_surfaced_issues: 2,
            sustained_failure_frames: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AggregatorSettings {
    pub top_n: usize,
    /// Sessions averaging below this score get coaching suggestions.
    pub coaching_threshold: f32,
    pub excellent_threshold: f32,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            top_n: 3,
            coaching_threshold: 85.0,
            excellent_threshold: 90.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Accepted gap between normalized query and entry times.
    pub match_tolerance: f64,
    /// Accepted gap in seconds for the linear-scan fallback.
    pub fallback_tolerance_secs: f64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            match_tolerance: 0.01,
            fallback_tolerance_secs: 0.2,
        }
    }
}

/// Shared configuration for every analysis stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub alignment: AlignmentThresholds,
    pub motion: MotionThresholds,
    pub deductions: Deductions,
    pub posture: PostureSettings,
    pub aggregator: AggregatorSettings,
    pub playback: PlaybackSettings,
    pub history_capacity: usize,
    /// Histories at or below this length yield neutral motion metrics.
    pub min_history: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alignment: AlignmentThresholds::default(),
            motion: MotionThresholds::default(),
            deductions: Deductions::default(),
            posture: PostureSettings::default(),
            aggregator: AggregatorSettings::default(),
            playback: PlaybackSettings::default(),
            history_capacity: 60,
            min_history: 10,
        }
    }
}

impl AnalysisConfig {
    /// Parses a JSON document, filling omitted fields with defaults, and validates it.
    pub fn from_json(text: &str) -> AnalysisResult<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|err| AnalysisError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if self.history_capacity == 0 {
            return Err(AnalysisError::InvalidConfig(
                "history_capacity must be positive".into(),
            ));
        }
        if self.min_history >= self.history_capacity {
            return Err(AnalysisError::InvalidConfig(format!(
                "min_history {} must be below history_capacity {}",
                self.min_history, self.history_capacity
            )));
        }

        let a = &self.alignment;
        let tolerances = [
            ("hands_under_shoulders", a.hands_under_shoulders),
            ("knees_under_hips", a.knees_under_hips),
            ("feet_flat", a.feet_flat),
            ("ankle_stability_ratio", a.ankle_stability_ratio),
            ("knee_alignment", a.knee_alignment),
            ("head_alignment", a.head_alignment),
            ("back_alignment", a.back_alignment),
            ("feet_width", a.feet_width),
            ("min_wrist_separation", self.motion.min_wrist_separation),
            ("smoothness_gain", self.motion.smoothness_gain),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalysisError::InvalidConfig(format!(
                    "{} must be a positive finite value, got {}",
                    name, value
                )));
            }
        }

        if !(0.0..=1.0).contains(&a.min_visibility) {
            return Err(AnalysisError::InvalidConfig(
                "min_visibility must lie in [0, 1]".into(),
            ));
        }
        if self.motion.min_range >= self.motion.max_range {
            return Err(AnalysisError::InvalidConfig(format!(
                "min_range {} must be below max_range {}",
                self.motion.min_range, self.motion.max_range
            )));
        }
        if self.aggregator.top_n == 0 {
            return Err(AnalysisError::InvalidConfig("top_n must be positive".into()));
        }
        if !(self.playback.match_tolerance > 0.0 && self.playback.fallback_tolerance_secs > 0.0) {
            return Err(AnalysisError::InvalidConfig(
                "playback tolerances must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Common error type for the analysis core.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("session not ready: {0}")]
    NotReady(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Session-scoped state holders that are configured once and reset when a
/// recording starts over.
pub trait SessionStage {
    fn initialize(&mut self, config: &AnalysisConfig) -> AnalysisResult<()>;
    fn cleanup(&mut self);
}
