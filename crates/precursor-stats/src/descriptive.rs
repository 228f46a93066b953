/// Count and mean of a dataset.
///
/// Used for aggregating step counts, so values are `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    /// Number of values in the dataset.
    pub count: usize,
    /// The arithmetic mean of the dataset.
    pub mean: f64,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from values in any order.
    ///
    /// Returns `None` if the dataset is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use precursor_stats::descriptive::DescriptiveStats;
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.count, 5);
    /// assert_eq!(stats.mean, 3.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let (count, sum) = values
            .into_iter()
            .fold((0, 0.0), |(count, sum), value| (count + 1, sum + value));
        if count == 0 {
            return None;
        }
        Some(Self {
            count,
            mean: sum / count as f64,
        })
    }
}

/// Arithmetic mean of a set of step counts, `None` when empty.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean_steps<I>(steps: I) -> Option<f64>
where
    I: IntoIterator<Item = usize>,
{
    DescriptiveStats::new(steps.into_iter().map(|s| s as f64)).map(|stats| stats.mean)
}
