//! Multi-dose concentration by superposition
//!
//! The depot model is linear, so the concentration after a history of doses
//! is the sum of the single-dose curves, each shifted to its own
//! administration time. Doses are given as three parallel columns: amounts,
//! times and formulation ids, where index `i` of each column describes one
//! dose.
//!
//! # Usage
//!
//! ```rust
//! use esterpk::superposition::{total_concentration, SuperpositionOptions};
//!
//! // 5 mg valerate every 7 days, queried on day 20
//! let c = total_concentration(
//!     20.0,
//!     &[5.0, 5.0, 5.0],
//!     &[0.0, 7.0, 14.0],
//!     &["valerate", "valerate", "valerate"],
//!     &SuperpositionOptions::default(),
//! )
//! .unwrap();
//! assert!(c > 0.0);
//! ```
//!
//! With [`SuperpositionOptions::intervals`] set, the time column holds gaps
//! between consecutive doses instead, see [`normalize_intervals`].

use std::borrow::Cow;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::curve::{evaluate_single_dose, CurveOptions};
use crate::error::{EsterError, Mode};
use crate::formulation::{Formulation, FormulationRegistry};

/// Options for a multi-dose query
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuperpositionOptions {
    /// Linear scale applied to every dose amount (default: 1.0)
    pub conversion_factor: f64,
    /// Uncertainty-aware prediction (not supported)
    pub random: bool,
    /// Interpret dose times as gaps between consecutive doses
    pub intervals: bool,
}

impl Default for SuperpositionOptions {
    fn default() -> Self {
        Self {
            conversion_factor: 1.0,
            random: false,
            intervals: false,
        }
    }
}

impl SuperpositionOptions {
    /// Set the dose conversion factor
    pub fn with_conversion_factor(mut self, factor: f64) -> Self {
        self.conversion_factor = factor;
        self
    }

    /// Request uncertainty-aware prediction
    ///
    /// Every query made with this option fails with
    /// [`EsterError::UnsupportedMode`].
    pub fn with_random(mut self, random: bool) -> Self {
        self.random = random;
        self
    }

    /// Interpret dose times as intervals between doses
    pub fn with_intervals(mut self, intervals: bool) -> Self {
        self.intervals = intervals;
        self
    }
}

/// Convert dose intervals to absolute administration times
///
/// The running sum starts at `-intervals[0]`, so the first dose lands on
/// time zero and dose `i` lands on `intervals[1] + ... + intervals[i]`. The
/// first entry only anchors the sequence.
///
/// ```rust
/// use esterpk::superposition::normalize_intervals;
///
/// assert_eq!(normalize_intervals(&[5.0, 7.0, 7.0]), vec![0.0, 7.0, 14.0]);
/// ```
pub fn normalize_intervals(intervals: &[f64]) -> Vec<f64> {
    let Some(first) = intervals.first() else {
        return Vec::new();
    };
    let mut total = -first;
    intervals
        .iter()
        .map(|gap| {
            total += gap;
            total
        })
        .collect()
}

/// A validated dose history, ready to be evaluated at any query time
struct Regimen<'a> {
    doses: &'a [f64],
    times: Cow<'a, [f64]>,
    formulations: Vec<&'a Formulation>,
    conversion_factor: f64,
}

impl<'a> Regimen<'a> {
    /// Check the query and resolve every formulation before any numeric work
    fn prepare<S: AsRef<str>>(
        registry: &'a FormulationRegistry,
        doses: &'a [f64],
        dose_times: &'a [f64],
        formulation_ids: &[S],
        options: &SuperpositionOptions,
    ) -> Result<Self, EsterError> {
        if options.random {
            tracing::debug!("rejecting random superposition over {} doses", doses.len());
            return Err(EsterError::UnsupportedMode(Mode::Random));
        }

        if doses.len() != dose_times.len() || doses.len() != formulation_ids.len() {
            return Err(EsterError::LengthMismatch {
                doses: doses.len(),
                times: dose_times.len(),
                formulations: formulation_ids.len(),
            });
        }

        let formulations = formulation_ids
            .iter()
            .map(|id| registry.lookup(id.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let times = if options.intervals {
            Cow::Owned(normalize_intervals(dose_times))
        } else {
            Cow::Borrowed(dose_times)
        };

        Ok(Self {
            doses,
            times,
            formulations,
            conversion_factor: options.conversion_factor,
        })
    }

    fn concentration(&self, t: f64) -> Result<f64, EsterError> {
        let curve = CurveOptions::default();
        let mut sum = 0.0;
        for ((&dose, &time), formulation) in self
            .doses
            .iter()
            .zip(self.times.iter())
            .zip(self.formulations.iter())
        {
            sum += evaluate_single_dose(
                t - time,
                dose * self.conversion_factor,
                formulation,
                &curve,
            )?;
        }
        Ok(sum)
    }
}

impl FormulationRegistry {
    /// Total concentration at `t` from a dose history, using this registry
    ///
    /// # Errors
    ///
    /// - [`EsterError::UnsupportedMode`] if `options.random` is set
    /// - [`EsterError::LengthMismatch`] if the three columns differ in length
    /// - [`EsterError::UnknownFormulation`] for the first id not in the registry
    pub fn total_concentration<S: AsRef<str>>(
        &self,
        t: f64,
        doses: &[f64],
        dose_times: &[f64],
        formulation_ids: &[S],
        options: &SuperpositionOptions,
    ) -> Result<f64, EsterError> {
        Regimen::prepare(self, doses, dose_times, formulation_ids, options)?.concentration(t)
    }

    /// Total concentration at each of `times`, evaluated in parallel
    ///
    /// The query is validated once; the output has the same order as `times`.
    pub fn concentration_curve<S: AsRef<str>>(
        &self,
        times: &[f64],
        doses: &[f64],
        dose_times: &[f64],
        formulation_ids: &[S],
        options: &SuperpositionOptions,
    ) -> Result<Vec<f64>, EsterError> {
        let regimen = Regimen::prepare(self, doses, dose_times, formulation_ids, options)?;
        times
            .par_iter()
            .map(|&t| regimen.concentration(t))
            .collect()
    }
}

/// Total concentration at `t` from a dose history, using the builtin registry
///
/// See [`FormulationRegistry::total_concentration`].
pub fn total_concentration<S: AsRef<str>>(
    t: f64,
    doses: &[f64],
    dose_times: &[f64],
    formulation_ids: &[S],
    options: &SuperpositionOptions,
) -> Result<f64, EsterError> {
    FormulationRegistry::global().total_concentration(
        t,
        doses,
        dose_times,
        formulation_ids,
        options,
    )
}

/// Total concentration at each of `times`, using the builtin registry
pub fn concentration_curve<S: AsRef<str>>(
    times: &[f64],
    doses: &[f64],
    dose_times: &[f64],
    formulation_ids: &[S],
    options: &SuperpositionOptions,
) -> Result<Vec<f64>, EsterError> {
    FormulationRegistry::global().concentration_curve(
        times,
        doses,
        dose_times,
        formulation_ids,
        options,
    )
}
