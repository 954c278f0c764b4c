//! Tabular rendering of descriptive summaries.

use std::fmt::{self, Display, Formatter};

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::moments::{Moments, Order};
use crate::statistics::{kurtosis_of, skewness_of, variance_of};

/// One-pass descriptive summary of a dataset.
///
/// Count, mean, standard deviation, skewness and excess kurtosis come from a
/// single fourth-order moment accumulator; min and max from the same pass.
/// `Display` renders a two-column table.
#[derive(Debug, Clone)]
pub struct Summary {
    count: u64,
    mean: f64,
    std_dev: f64,
    skewness: f64,
    kurtosis: f64,
    min: f64,
    max: f64,
}

impl Summary {
    /// Summarizes a slice. Unbiased estimators throughout.
    pub fn of(values: &[f64]) -> Self {
        let moments = Moments::of(Order::Fourth, values);
        let mut min = f64::NAN;
        let mut max = f64::NAN;
        for &x in values {
            // f64::min/max ignore a NaN operand, so the NaN seeds vanish on
            // the first observation
            min = min.min(x);
            max = max.max(x);
        }
        Self {
            count: moments.count(),
            mean: moments.mean(),
            std_dev: variance_of(&moments, false).sqrt(),
            skewness: skewness_of(&moments, false),
            kurtosis: kurtosis_of(&moments, false),
            min,
            max,
        }
    }

    /// Number of observations.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Arithmetic mean.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased standard deviation.
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Adjusted Fisher-Pearson skewness.
    pub fn skewness(&self) -> f64 {
        self.skewness
    }

    /// Sample-adjusted excess kurtosis.
    pub fn kurtosis(&self) -> f64 {
        self.kurtosis
    }

    /// Smallest observation; NaN when empty.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest observation; NaN when empty.
    pub fn max(&self) -> f64 {
        self.max
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Metric").set_alignment(CellAlignment::Center),
                Cell::new("Value").set_alignment(CellAlignment::Center),
            ]);

        let rows: [(&str, String); 7] = [
            ("Count", self.count.to_string()),
            ("Mean", format!("{:.6}", self.mean)),
            ("Std dev", format!("{:.6}", self.std_dev)),
            ("Skewness", format!("{:+.4}", self.skewness)),
            ("Kurtosis", format!("{:+.4}", self.kurtosis)),
            ("Min", format!("{:.6}", self.min)),
            ("Max", format!("{:.6}", self.max)),
        ];
        for (metric, value) in rows {
            table.add_row(vec![
                Cell::new(metric).set_alignment(CellAlignment::Left),
                Cell::new(&value).set_alignment(CellAlignment::Right),
            ]);
        }
        write!(f, "{table}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn summarizes_the_fibonacci_scenario() {
        let s = Summary::of(&[1.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0]);
        assert_eq!(s.count(), 7);
        assert_abs_diff_eq!(s.mean(), 33.0 / 7.0, epsilon = 1e-14);
        assert_relative_eq!(
            s.std_dev(),
            (5754.0 / 49.0 / 6.0f64).sqrt(),
            max_relative = 1e-13
        );
        assert_eq!(s.min(), 1.0);
        assert_eq!(s.max(), 13.0);
        assert!(s.skewness() > 0.0);
    }

    #[test]
    fn empty_summary_is_all_nan() {
        let s = Summary::of(&[]);
        assert_eq!(s.count(), 0);
        assert!(s.mean().is_nan());
        assert!(s.std_dev().is_nan());
        assert!(s.min().is_nan());
        assert!(s.max().is_nan());
    }

    #[test]
    fn renders_a_table_with_all_rows() {
        let s = Summary::of(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let rendered = s.to_string();
        for label in ["Metric", "Value", "Count", "Mean", "Std dev", "Skewness", "Kurtosis", "Min", "Max"] {
            assert!(rendered.contains(label), "missing {label}");
        }
        assert!(rendered.contains('5'));
    }
}
