//! Concentration curves for injectable ester formulations.
//!
//! Each formulation is described by four constants of a three-compartment
//! depot model (see [`formulation`]). A single dose is evaluated in closed
//! form by [`curve::evaluate_single_dose`], and a history of doses is
//! combined by superposition in [`superposition::total_concentration`].
//!
//! ```rust
//! use esterpk::prelude::*;
//!
//! let history = DoseHistory::builder()
//!     .dose(0.0, 5.0, "valerate")
//!     .repeat(3, 7.0)
//!     .build();
//!
//! let c = history
//!     .concentration(24.0, &SuperpositionOptions::default())
//!     .unwrap();
//! assert!(c > 0.0);
//! ```

pub mod curve;
pub mod data;
pub mod error;
pub mod formulation;
pub mod superposition;

pub use crate::curve::{evaluate_single_dose, CurveOptions, RateCase};
pub use crate::data::{read_doses, read_doses_from, Dose, DoseHistory, DoseHistoryBuilder};
pub use crate::formulation::{lookup_formulation, Formulation, FormulationRegistry};
pub use crate::superposition::{
    concentration_curve, normalize_intervals, total_concentration, SuperpositionOptions,
};
pub use error::{EsterError, Mode};

pub mod prelude {
    pub use crate::curve::{evaluate_single_dose, CurveOptions};
    pub use crate::data::{read_doses, Dose, DoseHistory};
    pub use crate::error::{EsterError, Mode};
    pub use crate::formulation::{lookup_formulation, Formulation, FormulationRegistry};
    pub use crate::superposition::{
        concentration_curve, total_concentration, SuperpositionOptions,
    };
}
