pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(samples: &[f32]) -> Option<f32> {
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().sum::<f32>() / samples.len() as f32)
    }

    pub fn rms(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = samples.iter().map(|&v| v * v).sum();
        (sum_sq / samples.len() as f32).sqrt()
    }

    /// Peak-to-peak excursion, `max - min`.
    pub fn span(samples: &[f32]) -> f32 {
        let mut iter = samples.iter().copied();
        let Some(first) = iter.next() else {
            return 0.0;
        };
        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        max - min
    }

    /// Mean absolute difference between consecutive samples.
    pub fn mean_abs_delta(samples: &[f32]) -> f32 {
        if samples.len() < 2 {
            return 0.0;
        }
        let total: f32 = samples.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
        total / (samples.len() - 1) as f32
    }
}
