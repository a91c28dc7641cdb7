use crate::data::*;

pub struct DoseHistoryBuilder {
    doses: Vec<Dose>,
}

impl DoseHistory {
    pub fn builder() -> DoseHistoryBuilder {
        DoseHistoryBuilder { doses: Vec::new() }
    }
}

impl DoseHistoryBuilder {
    pub fn dose(mut self, time: f64, amount: f64, formulation: impl Into<String>) -> Self {
        self.doses.push(Dose::new(time, amount, formulation));
        self
    }

    /// Repeat the last dose `n` times, `delta` days apart
    ///
    /// Only meaningful for absolute dose times; with interval times use
    /// [`DoseHistoryBuilder::every`].
    pub fn repeat(mut self, n: usize, delta: f64) -> Self {
        let last = match self.doses.last() {
            Some(dose) => dose.clone(),
            None => {
                tracing::warn!("there is no dose to repeat");
                return self;
            }
        };
        for i in 1..=n {
            self = self.dose(
                last.time() + delta * i as f64,
                last.amount(),
                last.formulation(),
            );
        }
        self
    }

    /// Add `n` doses of the same amount, each with time `interval`
    ///
    /// The times are gaps since the previous dose and only make sense with
    /// [`SuperpositionOptions::with_intervals`]. Interval normalization
    /// anchors the first dose of the history at `t = 0` and discards its
    /// gap, so when `every` starts the history the first `interval` is
    /// dropped. Queried with the default absolute options, every dose added
    /// here sits at `t = interval`.
    ///
    /// [`SuperpositionOptions::with_intervals`]: crate::superposition::SuperpositionOptions::with_intervals
    pub fn every(mut self, n: usize, interval: f64, amount: f64, formulation: &str) -> Self {
        for _ in 0..n {
            self = self.dose(interval, amount, formulation);
        }
        self
    }

    pub fn build(self) -> DoseHistory {
        DoseHistory::new(self.doses)
    }
}
