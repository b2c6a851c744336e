use crate::landmarks::{LandmarkSnapshot, RecordedTimeline, TimelineEntry};
use crate::prelude::PlaybackSettings;

/// Resolves the recorded pose closest to a playback cursor.
///
/// The timeline is sorted once on construction. Lookups first binary-search
/// normalized time (`timestamp / duration`), then fall back to a linear scan
/// in absolute seconds when the nearest candidate is not close enough, which
/// covers recordings with uneven frame spacing.
#[derive(Debug, Clone)]
pub struct PlaybackSynchronizer {
    timeline: RecordedTimeline,
    duration: Option<f64>,
    settings: PlaybackSettings,
}

impl PlaybackSynchronizer {
    pub fn new(mut timeline: RecordedTimeline, settings: PlaybackSettings) -> Self {
        if !timeline.is_sorted() {
            timeline.sort();
        }
        let duration = timeline.duration();
        Self {
            timeline,
            duration,
            settings,
        }
    }

    /// Overrides the normalization span, e.g. with the video length.
    pub fn with_duration(mut self, duration: f64) -> Self {
        if duration.is_finite() && duration > 0.0 {
            self.duration = Some(duration);
        }
        self
    }

    pub fn timeline(&self) -> &RecordedTimeline {
        &self.timeline
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn resolve(&self, query: f64) -> Option<&LandmarkSnapshot> {
        lookup(self.timeline.entries(), self.duration, &self.settings, query)
    }
}

/// One-shot lookup over a timeline that is already sorted; unsorted input
/// resolves to nothing.
pub fn resolve<'a>(
    timeline: &'a RecordedTimeline,
    query: f64,
    settings: &PlaybackSettings,
) -> Option<&'a LandmarkSnapshot> {
    if !timeline.is_sorted() {
        return None;
    }
    lookup(timeline.entries(), timeline.duration(), settings, query)
}

fn lookup<'a>(
    entries: &'a [TimelineEntry],
    duration: Option<f64>,
    settings: &PlaybackSettings,
    query: f64,
) -> Option<&'a LandmarkSnapshot> {
    if !query.is_finite() || query < 0.0 || entries.is_empty() {
        return None;
    }
    nearest_normalized(entries, duration, query, settings.match_tolerance)
        .or_else(|| nearest_linear(entries, query, settings.fallback_tolerance_secs))
        .and_then(|entry| entry.landmarks.as_ref())
}

fn normalize(seconds: f64, duration: Option<f64>) -> f64 {
    match duration {
        Some(duration) if duration > 0.0 => seconds / duration,
        _ => seconds,
    }
}

fn nearest_normalized(
    entries: &[TimelineEntry],
    duration: Option<f64>,
    query: f64,
    tolerance: f64,
) -> Option<&TimelineEntry> {
    let target = normalize(query, duration);
    let split = entries.partition_point(|entry| normalize(entry.timestamp, duration) < target);

    let (best, diff) = [split.checked_sub(1), Some(split)]
        .into_iter()
        .flatten()
        .filter_map(|idx| entries.get(idx))
        .filter(|entry| entry.timestamp.is_finite())
        .map(|entry| (entry, (normalize(entry.timestamp, duration) - target).abs()))
        .min_by(|a, b| a.1.total_cmp(&b.1))?;

    (diff < tolerance).then_some(best)
}

fn nearest_linear(entries: &[TimelineEntry], query: f64, tolerance: f64) -> Option<&TimelineEntry> {
    let (best, diff) = entries
        .iter()
        .filter(|entry| entry.timestamp.is_finite())
        .map(|entry| (entry, (entry.timestamp - query).abs()))
        .min_by(|a, b| a.1.total_cmp(&b.1))?;

    (diff <= tolerance).then_some(best)
}
