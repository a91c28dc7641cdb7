//! Closed-form single-dose concentration curve
//!
//! A dose enters an injection depot and moves through two downstream
//! compartments with first-order rates `k1`, `k2` and `k3`. The general
//! solution divides by `(k1 - k2)`, `(k1 - k3)` and `(k2 - k3)`, so when two
//! or more rates coincide the limiting form of the solution is used instead.
//! The choice is made on exact floating-point equality, see [`RateCase`].

use serde::{Deserialize, Serialize};

use crate::error::{EsterError, Mode};
use crate::formulation::Formulation;

/// Options for a single-dose evaluation
///
/// `secondary_depot` and `initial_bolus` are amounts already present in the
/// downstream compartments at the time of the dose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveOptions {
    /// Residual amount in the last compartment, decays with `k3`
    pub secondary_depot: f64,
    /// Residual amount in the middle compartment, feeds the last one
    pub initial_bolus: f64,
    /// Request the steady-state curve (not supported)
    pub steady_state: bool,
    /// Dosing interval used by the steady-state curve
    pub interval: f64,
}

impl Default for CurveOptions {
    fn default() -> Self {
        Self {
            secondary_depot: 0.0,
            initial_bolus: 0.0,
            steady_state: false,
            interval: 1.0,
        }
    }
}

impl CurveOptions {
    pub fn with_secondary_depot(mut self, amount: f64) -> Self {
        self.secondary_depot = amount;
        self
    }

    pub fn with_initial_bolus(mut self, amount: f64) -> Self {
        self.initial_bolus = amount;
        self
    }

    pub fn with_steady_state(mut self, interval: f64) -> Self {
        self.steady_state = true;
        self.interval = interval;
        self
    }
}

/// Which closed form of the primary term applies to a set of rates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateCase {
    /// `k1 == k2 == k3`
    AllEqual,
    /// `k1 == k2 != k3`
    FirstSecondEqual,
    /// `k1 == k3 != k2`
    FirstThirdEqual,
    /// `k2 == k3 != k1`
    SecondThirdEqual,
    /// All three rates differ
    Distinct,
}

impl RateCase {
    pub fn classify(k1: f64, k2: f64, k3: f64) -> Self {
        match (k1 == k2, k1 == k3, k2 == k3) {
            (true, _, true) => RateCase::AllEqual,
            (true, _, false) => RateCase::FirstSecondEqual,
            (false, true, _) => RateCase::FirstThirdEqual,
            (false, false, true) => RateCase::SecondThirdEqual,
            (false, false, false) => RateCase::Distinct,
        }
    }
}

/// Concentration contributed by one dose, `elapsed` days after it was given
///
/// Returns zero before the dose (`elapsed < 0`). A result that is NaN or
/// below zero from rounding is returned as zero.
///
/// # Errors
///
/// [`EsterError::UnsupportedMode`] when `options.steady_state` is set.
///
/// # Example
///
/// ```rust
/// use esterpk::curve::{evaluate_single_dose, CurveOptions};
/// use esterpk::formulation::lookup_formulation;
///
/// let valerate = lookup_formulation("valerate").unwrap();
/// let c = evaluate_single_dose(2.0, 1.0, valerate, &CurveOptions::default()).unwrap();
/// assert_eq!(c as i64, 61);
/// ```
pub fn evaluate_single_dose(
    elapsed: f64,
    dose: f64,
    formulation: &Formulation,
    options: &CurveOptions,
) -> Result<f64, EsterError> {
    if options.steady_state {
        tracing::debug!(
            "rejecting steady-state curve (interval = {})",
            options.interval
        );
        return Err(EsterError::UnsupportedMode(Mode::SteadyState));
    }

    if elapsed < 0.0 {
        return Ok(0.0);
    }

    let (k1, k2, k3) = formulation.rates();
    let t = elapsed;
    let mut ret = 0.0;

    if options.secondary_depot > 0.0 {
        ret += options.secondary_depot * (-k3 * t).exp();
    }

    if options.initial_bolus > 0.0 {
        ret += residual_bolus(options.initial_bolus, k2, k3, t);
    }

    if dose > 0.0 && formulation.d() > 0.0 {
        ret += dose * formulation.d() * primary(k1, k2, k3, t);
    }

    // f64::max drops NaN in favour of the other operand
    let clamped = ret.max(0.0);
    if clamped != ret {
        tracing::trace!("clamping {} to 0 at t = {}", ret, t);
    }
    Ok(clamped)
}

fn residual_bolus(amount: f64, k2: f64, k3: f64, t: f64) -> f64 {
    if k2 == k3 {
        amount * k2 * t * (-k2 * t).exp()
    } else {
        amount * k2 / (k2 - k3) * ((-k3 * t).exp() - (-k2 * t).exp())
    }
}

/// Primary term for a unit dose and `d = 1`
fn primary(k1: f64, k2: f64, k3: f64, t: f64) -> f64 {
    match RateCase::classify(k1, k2, k3) {
        RateCase::AllEqual => k1 * k1 * t * t * (-k1 * t).exp() / 2.0,
        RateCase::FirstSecondEqual => {
            k1 * k1 * ((-k3 * t).exp() - (-k1 * t).exp() * (1.0 + (k1 - k3) * t))
                / (k1 - k3).powi(2)
        }
        RateCase::FirstThirdEqual => {
            k1 * k2 * ((-k2 * t).exp() - (-k1 * t).exp() * (1.0 + (k1 - k2) * t))
                / (k1 - k2).powi(2)
        }
        RateCase::SecondThirdEqual => {
            k1 * k2 * ((-k1 * t).exp() - (-k2 * t).exp() * (1.0 - (k1 - k2) * t))
                / (k1 - k2).powi(2)
        }
        RateCase::Distinct => distinct(k1, k2, k3, t),
    }
}

fn distinct(k1: f64, k2: f64, k3: f64, t: f64) -> f64 {
    k1 * k2
        * ((-k1 * t).exp() / ((k1 - k2) * (k1 - k3)) - (-k2 * t).exp() / ((k1 - k2) * (k2 - k3))
            + (-k3 * t).exp() / ((k1 - k3) * (k2 - k3)))
}
