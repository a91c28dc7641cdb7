use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EsterError;
use crate::formulation::FormulationRegistry;
use crate::superposition::SuperpositionOptions;

/// A single administered dose
///
/// A [Dose] is an amount of a formulation given at a specific time. Whether
/// `time` is an absolute timestamp or the gap since the previous dose is
/// decided per query by [`SuperpositionOptions::intervals`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Dose {
    time: f64,
    amount: f64,
    formulation: String,
}

impl Dose {
    /// Create a new dose
    ///
    /// # Arguments
    ///
    /// * `time` - Time of administration, in days
    /// * `amount` - Amount administered, in mg
    /// * `formulation` - Registry id of the formulation
    pub fn new(time: f64, amount: f64, formulation: impl Into<String>) -> Self {
        Dose {
            time,
            amount,
            formulation: formulation.into(),
        }
    }

    /// Get the time of administration
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Get the amount administered
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Get the formulation id
    pub fn formulation(&self) -> &str {
        &self.formulation
    }

    /// Set the time of administration
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Set the amount administered
    pub fn set_amount(&mut self, amount: f64) {
        self.amount = amount;
    }
}

impl fmt::Display for Dose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mg {} at t = {}",
            self.amount, self.formulation, self.time
        )
    }
}

/// An ordered history of doses
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DoseHistory {
    doses: Vec<Dose>,
}

impl DoseHistory {
    /// Create a dose history from a list of doses, keeping their order
    pub fn new(doses: Vec<Dose>) -> Self {
        DoseHistory { doses }
    }

    /// Get the doses
    pub fn doses(&self) -> &[Dose] {
        &self.doses
    }

    /// Add a dose at the end of the history
    pub fn push(&mut self, dose: Dose) {
        self.doses.push(dose);
    }

    pub fn len(&self) -> usize {
        self.doses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doses.is_empty()
    }

    /// Split the history into the parallel columns used by
    /// [`crate::superposition`]: amounts, times and formulation ids
    pub fn columns(&self) -> (Vec<f64>, Vec<f64>, Vec<&str>) {
        let amounts = self.doses.iter().map(|d| d.amount).collect();
        let times = self.doses.iter().map(|d| d.time).collect();
        let ids = self.doses.iter().map(|d| d.formulation.as_str()).collect();
        (amounts, times, ids)
    }

    /// Total concentration at `t`, using the builtin registry
    pub fn concentration(&self, t: f64, options: &SuperpositionOptions) -> Result<f64, EsterError> {
        self.concentration_with(FormulationRegistry::global(), t, options)
    }

    /// Total concentration at `t`, using `registry`
    pub fn concentration_with(
        &self,
        registry: &FormulationRegistry,
        t: f64,
        options: &SuperpositionOptions,
    ) -> Result<f64, EsterError> {
        let (amounts, times, ids) = self.columns();
        registry.total_concentration(t, &amounts, &times, &ids, options)
    }

    /// Total concentration at each of `times`, using the builtin registry
    pub fn curve(
        &self,
        times: &[f64],
        options: &SuperpositionOptions,
    ) -> Result<Vec<f64>, EsterError> {
        self.curve_with(FormulationRegistry::global(), times, options)
    }

    /// Total concentration at each of `times`, using `registry`
    pub fn curve_with(
        &self,
        registry: &FormulationRegistry,
        times: &[f64],
        options: &SuperpositionOptions,
    ) -> Result<Vec<f64>, EsterError> {
        let (amounts, dose_times, ids) = self.columns();
        registry.concentration_curve(times, &amounts, &dose_times, &ids, options)
    }
}

impl fmt::Display for DoseHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dose history ({} doses)", self.doses.len())?;
        for dose in &self.doses {
            writeln!(f, "  {}", dose)?;
        }
        Ok(())
    }
}

impl From<Vec<Dose>> for DoseHistory {
    fn from(doses: Vec<Dose>) -> Self {
        DoseHistory::new(doses)
    }
}
