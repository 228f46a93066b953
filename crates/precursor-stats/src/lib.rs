//! Small statistical helpers shared by the failure-precursor pipeline.
//!
//! - **Descriptive statistics** ([`descriptive`]): count and mean of step counts
//! - **Survival analysis** ([`survival`]): Kaplan-Meier estimation of the number of steps a
//!   state survives before a failure, accounting for histories that end without one
//!
//! # Examples
//!
//! ## Averaging steps to failure
//!
//! ```
//! use precursor_stats::descriptive::mean_steps;
//!
//! assert_eq!(mean_steps([2, 3, 3, 4]), Some(3.0));
//! ```
//!
//! ## Estimating steps to failure
//!
//! ```
//! use precursor_stats::survival::KaplanMeierCurve;
//!
//! // (steps until failure, is_censored)
//! let observations = vec![(2, false), (4, true), (3, false)];
//! let curve = KaplanMeierCurve::from_data(observations);
//! assert!(curve.median_survival().is_some());
//! ```

pub mod descriptive;
pub mod survival;
