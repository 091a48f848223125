//! Descriptive statistics over one metric's values

/// Summary of the non-null values of one metric.
///
/// Every field is `None` when there were no values. `std` is the sample
/// standard deviation and is also `None` for a single value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DescriptiveStats {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub q1: Option<f64>,
    pub q3: Option<f64>,
}

impl DescriptiveStats {
    pub const FIELDS: [&'static str; 7] = ["mean", "median", "std", "min", "max", "q1", "q3"];

    /// Mean, median, std and quartiles are rounded to 3 decimals; min and max are exact.
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return Self::default();
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let std = if sorted.len() > 1 {
            let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            Some(round3(var.sqrt()))
        } else {
            None
        };

        Self {
            mean: Some(round3(mean)),
            median: quantile(&sorted, 0.5).map(round3),
            std,
            min: sorted.first().copied(),
            max: sorted.last().copied(),
            q1: quantile(&sorted, 0.25).map(round3),
            q3: quantile(&sorted, 0.75).map(round3),
        }
    }

    /// Values in `FIELDS` order
    pub fn values(&self) -> [Option<f64>; 7] {
        [
            self.mean, self.median, self.std, self.min, self.max, self.q1, self.q3,
        ]
    }
}

/// Linear interpolation between the closest ranks of an ascending slice.
/// `None` for an empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q.clamp(0.0, 1.0) * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Round to 3 decimals, halves to even (0.0625 becomes 0.062)
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round_ties_even() / 1000.0
}
