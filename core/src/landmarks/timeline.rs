use crate::landmarks::snapshot::LandmarkSnapshot;
use serde::{Deserialize, Serialize};

/// One recorded pose, stamped in seconds since the recording started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub timestamp: f64,
    pub landmarks: Option<LandmarkSnapshot>,
}

/// Append-only pose record of a single recording, replayed during review.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordedTimeline {
    entries: Vec<TimelineEntry>,
}

impl RecordedTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<TimelineEntry>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, timestamp: f64, landmarks: Option<LandmarkSnapshot>) {
        self.entries.push(TimelineEntry {
            timestamp,
            landmarks,
        });
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Orders entries by timestamp; non-finite stamps end up at the edges.
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    }

    pub fn is_sorted(&self) -> bool {
        self.entries
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    }

    /// Largest finite timestamp, i.e. the span covered by the recording.
    pub fn duration(&self) -> Option<f64> {
        self.entries
            .iter()
            .map(|entry| entry.timestamp)
            .filter(|t| t.is_finite())
            .reduce(f64::max)
    }

    /// Fills entries without landmarks from their populated neighbours.
    ///
    /// Interior gaps are linearly interpolated by entry position, leading and
    /// trailing gaps repeat the nearest populated snapshot. Returns the number
    /// of entries filled.
    pub fn fill_gaps(&mut self) -> usize {
        let populated: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.landmarks.as_ref().is_some_and(|s| !s.is_empty()))
            .map(|(idx, _)| idx)
            .collect();

        let (first, last) = match (populated.first(), populated.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return 0,
        };

        let mut filled = 0;
        let lead = self.entries[first].landmarks.clone();
        for entry in &mut self.entries[..first] {
            entry.landmarks = lead.clone();
            filled += 1;
        }

        for pair in populated.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            if end - start < 2 {
                continue;
            }
            let (from, to) = match (&self.entries[start].landmarks, &self.entries[end].landmarks) {
                (Some(from), Some(to)) => (from.clone(), to.clone()),
                _ => continue,
            };
            let span = (end - start) as f32;
            for idx in start + 1..end {
                let weight = (idx - start) as f32 / span;
                self.entries[idx].landmarks = Some(from.lerp(&to, weight));
                filled += 1;
            }
        }

        let tail = self.entries[last].landmarks.clone();
        for entry in &mut self.entries[last + 1..] {
            entry.landmarks = tail.clone();
            filled += 1;
        }

        filled
    }
}
