use crate::prelude::{AggregatorSettings, AnalysisConfig, AnalysisResult, SessionStage};
use crate::processing::scoring::{FrameAnalysis, IssueTag, StrengthTag};
use serde::{Deserialize, Serialize};

const CELEBRATION: &str = "Perfect form! Keep up the excellent work!";

/// Final judgment over every frame scored during one recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFeedback {
    pub average_score: f32,
    pub top_issues: Vec<IssueTag>,
    pub top_strengths: Vec<StrengthTag>,
    pub frame_count: usize,
}

/// Mean score plus the most frequent issue and strength tags.
pub fn finalize(results: &[FrameAnalysis], settings: &AggregatorSettings) -> SessionFeedback {
    if results.is_empty() {
        return SessionFeedback {
            average_score: 0.0,
            top_issues: vec![IssueTag::NoPoseData],
            top_strengths: Vec::new(),
            frame_count: 0,
        };
    }

    let total: u64 = results.iter().map(|frame| u64::from(frame.score)).sum();
    let average_score = (total as f64 / results.len() as f64) as f32;

    SessionFeedback {
        average_score,
        top_issues: rank_by_frequency(
            results.iter().flat_map(|frame| frame.issues.iter().copied()),
            settings.top_n,
        ),
        top_strengths: rank_by_frequency(
            results.iter().flat_map(|frame| frame.strengths.iter().copied()),
            settings.top_n,
        ),
        frame_count: results.len(),
    }
}

/// Most frequent items first; ties keep first-seen order.
fn rank_by_frequency<T, I>(items: I, top_n: usize) -> Vec<T>
where
    T: Copy + PartialEq,
    I: IntoIterator<Item = T>,
{
    let mut counts: Vec<(T, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(seen, _)| *seen == item) {
            Some((_, count)) => *count += 1,
            None => counts.push((item, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(top_n).map(|(item, _)| item).collect()
}

/// Collects per-frame results for the active recording.
#[derive(Debug, Clone, Default)]
pub struct SessionAggregator {
    settings: AggregatorSettings,
    results: Vec<FrameAnalysis>,
}

impl SessionAggregator {
    pub fn new(settings: AggregatorSettings) -> Self {
        Self {
            settings,
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: FrameAnalysis) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[FrameAnalysis] {
        &self.results
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    pub fn finalize(&self) -> SessionFeedback {
        finalize(&self.results, &self.settings)
    }
}

impl SessionStage for SessionAggregator {
    fn initialize(&mut self, config: &AnalysisConfig) -> AnalysisResult<()> {
        self.settings = config.aggregator.clone();
        self.results.clear();
        Ok(())
    }

    fn cleanup(&mut self) {
        self.results.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rating {
    Excellent,
    Good,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub accuracy_percent: u32,
    pub form_breaks: usize,
    pub rating: Rating,
}

/// User-facing wording of a session, after the presentation policy is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackReport {
    pub average_score: f32,
    pub strengths: Vec<String>,
    pub suggestions: Vec<String>,
    pub celebration: Option<String>,
    pub stats: Option<PerformanceStats>,
}

impl FeedbackReport {
    pub fn from_feedback(feedback: &SessionFeedback, settings: &AggregatorSettings) -> Self {
        let score = feedback.average_score;
        let strengths = feedback
            .top_strengths
            .iter()
            .map(|tag| tag.message().to_string())
            .collect();

        let coaching = score < settings.coaching_threshold;
        let suggestions = if coaching {
            feedback
                .top_issues
                .iter()
                .map(|tag| tag.message().to_string())
                .collect()
        } else {
            Vec::new()
        };
        let celebration = (!coaching && feedback.top_issues.is_empty())
            .then(|| CELEBRATION.to_string());

        let stats = (score > settings.coaching_threshold).then(|| PerformanceStats {
            accuracy_percent: score.round() as u32,
            form_breaks: feedback.top_issues.len(),
            rating: if score > settings.excellent_threshold {
                Rating::Excellent
            } else {
                Rating::Good
            },
        });

        Self {
            average_score: score,
            strengths,
            suggestions,
            celebration,
            stats,
        }
    }
}
