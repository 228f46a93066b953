//! Kaplan-Meier estimation of steps-to-failure.
//!
//! Each observation is a number of steps a state was followed before its entity
//! failed. Histories that end without a failure are right-censored: the state
//! survived at least that many steps, but the true horizon is unknown.
//!
//! ```text
//! Event:     |----x    (failed 4 steps later)
//! Censored:  |------>  (history ended 6 steps later, no failure seen)
//! ```
//!
//! A plain mean over both kinds underestimates how long healthy states last,
//! so the estimator keeps censored observations in the at-risk set without
//! counting them as failures.

/// Kaplan-Meier survival curve over discrete step counts.
///
/// Parallel vectors describe the step function at each step where at least one
/// failure was observed.
#[derive(Debug, Clone, PartialEq)]
pub struct KaplanMeierCurve {
    /// Step counts at which failures were observed.
    pub times: Vec<usize>,
    /// Survival probability right after each step in `times`.
    pub survival_prob: Vec<f64>,
    /// Observations still at risk at each step.
    pub at_risk: Vec<usize>,
    /// Failures observed at each step.
    pub events: Vec<usize>,
}

impl KaplanMeierCurve {
    /// Computes the curve from `(steps, is_censored)` observations.
    ///
    /// # Examples
    ///
    /// ```
    /// # use precursor_stats::survival::KaplanMeierCurve;
    /// let curve = KaplanMeierCurve::from_data(vec![(1, false), (3, true), (5, false)]);
    /// assert_eq!(curve.times, vec![1, 5]);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_data(mut data: Vec<(usize, bool)>) -> Self {
        data.sort_by_key(|(time, _)| *time);

        let mut times = vec![];
        let mut survival_prob = vec![];
        let mut at_risk = vec![];
        let mut events = vec![];

        let mut current_survival = 1.0;
        let total = data.len();

        let mut i = 0;
        while i < total {
            let current_time = data[i].0;
            let risk = total - i;
            let group_end = data[i..]
                .iter()
                .position(|(time, _)| *time != current_time)
                .map_or(total, |offset| i + offset);
            let event_count = data[i..group_end]
                .iter()
                .filter(|(_, censored)| !censored)
                .count();

            if event_count > 0 {
                current_survival *= 1.0 - event_count as f64 / risk as f64;
                times.push(current_time);
                survival_prob.push(current_survival);
                at_risk.push(risk);
                events.push(event_count);
            }

            i = group_end;
        }

        Self {
            times,
            survival_prob,
            at_risk,
            events,
        }
    }

    /// Returns the median number of steps to failure.
    ///
    /// The median is the step at which survival first drops to 50% or below,
    /// linearly interpolated from the previous event step. `None` when the
    /// curve never reaches 50% (too few failures observed).
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn median_survival(&self) -> Option<f64> {
        let i = self.survival_prob.iter().position(|&p| p <= 0.5)?;
        if i == 0 {
            return Some(self.times[0] as f64);
        }
        let t0 = self.times[i - 1] as f64;
        let t1 = self.times[i] as f64;
        let s0 = self.survival_prob[i - 1];
        let s1 = self.survival_prob[i];
        Some(t0 + (0.5 - s0) / (s1 - s0) * (t1 - t0))
    }
}
