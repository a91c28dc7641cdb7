//! Formulation registry
//!
//! A [`FormulationRegistry`] maps a formulation identifier to the four
//! constants of the three-compartment depot model. The registry holds data
//! only; every formulation is evaluated by the same closed-form curve in
//! [`crate::curve`].
//!
//! The builtin table covers the intramuscular esters:
//!
//! | id | d | k1 | k2 | k3 |
//! |---|---|---|---|---|
//! | valerate | 478.0 | 0.236 | 4.85 | 1.24 |
//! | enanthate | 191.4 | 0.119 | 0.601 | 0.402 |
//! | cypionate | 246.0 | 0.0825 | 3.57 | 0.669 |
//! | benzoate | 1893.1 | 0.67 | 61.5 | 4.34 |
//! | undecylate | 471.5 | 0.01729 | 6.528 | 2.285 |
//!
//! Subcutaneous and transdermal formulations are not part of the builtin
//! table. Patches follow a different absorption model and are not supported;
//! other formulations that fit the depot model can be registered in an owned
//! registry, either with [`FormulationRegistry::insert`] or from JSON.
//!
//! # Example
//!
//! ```rust
//! use esterpk::formulation::{lookup_formulation, FormulationRegistry};
//!
//! let valerate = lookup_formulation("valerate").unwrap();
//! assert_eq!(valerate.d(), 478.0);
//!
//! let custom = FormulationRegistry::from_json(
//!     r#"{ "slow": { "d": 100.0, "k1": 0.05, "k2": 2.0, "k3": 1.0 } }"#,
//! )
//! .unwrap();
//! assert!(custom.contains("slow"));
//! ```

use std::collections::HashMap;
use std::path::Path;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::EsterError;

/// Constants of the three-compartment depot model for one formulation
///
/// `d` scales the dose to a concentration; `k1`, `k2` and `k3` are first-order
/// rate constants in 1/day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Formulation {
    d: f64,
    k1: f64,
    k2: f64,
    k3: f64,
}

impl Formulation {
    /// Create a new set of formulation constants
    ///
    /// The constants are not checked here; [`FormulationRegistry::insert`]
    /// rejects anything that is not finite and strictly positive.
    pub const fn new(d: f64, k1: f64, k2: f64, k3: f64) -> Self {
        Formulation { d, k1, k2, k3 }
    }

    /// Bioavailable dose scaling factor
    pub fn d(&self) -> f64 {
        self.d
    }

    /// Absorption rate constant out of the injection depot
    pub fn k1(&self) -> f64 {
        self.k1
    }

    /// First downstream rate constant
    pub fn k2(&self) -> f64 {
        self.k2
    }

    /// Second downstream (elimination) rate constant
    pub fn k3(&self) -> f64 {
        self.k3
    }

    /// The rate constants as `(k1, k2, k3)`
    pub fn rates(&self) -> (f64, f64, f64) {
        (self.k1, self.k2, self.k3)
    }

    fn validate(&self, id: &str) -> Result<(), EsterError> {
        let fields = [
            ("d", self.d),
            ("k1", self.k1),
            ("k2", self.k2),
            ("k3", self.k3),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(EsterError::invalid_formulation(
                    id,
                    format!("{} must be finite and > 0, got {}", name, value),
                ));
            }
        }
        Ok(())
    }
}

const BUILTIN_ESTERS: [(&str, Formulation); 5] = [
    ("valerate", Formulation::new(478.0, 0.236, 4.85, 1.24)),
    ("enanthate", Formulation::new(191.4, 0.119, 0.601, 0.402)),
    ("cypionate", Formulation::new(246.0, 0.0825, 3.57, 0.669)),
    ("benzoate", Formulation::new(1893.1, 0.67, 61.5, 4.34)),
    ("undecylate", Formulation::new(471.5, 0.01729, 6.528, 2.285)),
];

lazy_static! {
    static ref GLOBAL: FormulationRegistry = FormulationRegistry::builtin();
}

/// A registry of formulation constants keyed by identifier
///
/// Deserializing goes through [`FormulationRegistry::insert`], so every entry
/// is validated on the way in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "HashMap<String, Formulation>",
    into = "HashMap<String, Formulation>"
)]
pub struct FormulationRegistry {
    formulations: HashMap<String, Formulation>,
}

impl FormulationRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            formulations: HashMap::new(),
        }
    }

    /// Create a registry holding the builtin intramuscular esters
    pub fn builtin() -> Self {
        let formulations = BUILTIN_ESTERS
            .iter()
            .map(|(id, formulation)| (id.to_string(), *formulation))
            .collect();
        Self { formulations }
    }

    /// The process-wide builtin registry
    pub fn global() -> &'static FormulationRegistry {
        &GLOBAL
    }

    /// Parse a registry from a JSON object of `id -> {d, k1, k2, k3}`
    pub fn from_json(json: &str) -> Result<Self, EsterError> {
        let parsed: HashMap<String, Formulation> = serde_json::from_str(json)?;
        let registry = Self::try_from(parsed)?;
        tracing::debug!("loaded {} formulations from JSON", registry.len());
        Ok(registry)
    }

    /// Read a registry from a JSON file, see [`FormulationRegistry::from_json`]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, EsterError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Add a formulation, replacing any previous entry with the same id
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        formulation: Formulation,
    ) -> Result<(), EsterError> {
        let id = id.into();
        formulation.validate(&id)?;
        self.formulations.insert(id, formulation);
        Ok(())
    }

    /// Look up a formulation by id
    pub fn lookup(&self, id: &str) -> Result<&Formulation, EsterError> {
        self.formulations
            .get(id)
            .ok_or_else(|| EsterError::UnknownFormulation(id.to_string()))
    }

    /// Check if a formulation exists
    pub fn contains(&self, id: &str) -> bool {
        self.formulations.contains_key(id)
    }

    /// List all formulation ids, sorted
    pub fn list(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.formulations.keys().map(|s| s.as_str()).collect();
        ids.sort();
        ids
    }

    /// Get the number of formulations
    pub fn len(&self) -> usize {
        self.formulations.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.formulations.is_empty()
    }
}

impl TryFrom<HashMap<String, Formulation>> for FormulationRegistry {
    type Error = EsterError;

    fn try_from(formulations: HashMap<String, Formulation>) -> Result<Self, Self::Error> {
        let mut registry = Self::new();
        for (id, formulation) in formulations {
            if let Err(e) = registry.insert(id.as_str(), formulation) {
                tracing::warn!("rejecting formulation '{}': {}", id, e);
                return Err(e);
            }
        }
        Ok(registry)
    }
}

impl From<FormulationRegistry> for HashMap<String, Formulation> {
    fn from(registry: FormulationRegistry) -> Self {
        registry.formulations
    }
}

/// Look up a formulation in the builtin registry
pub fn lookup_formulation(id: &str) -> Result<&'static Formulation, EsterError> {
    FormulationRegistry::global().lookup(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_contains_all_esters() {
        let registry = FormulationRegistry::global();
        assert_eq!(
            registry.list(),
            vec!["benzoate", "cypionate", "enanthate", "undecylate", "valerate"]
        );
    }

    #[test]
    fn lookup_returns_table_constants() {
        let enanthate = lookup_formulation("enanthate").unwrap();
        assert_eq!(enanthate.d(), 191.4);
        assert_eq!(enanthate.rates(), (0.119, 0.601, 0.402));

        let undecylate = lookup_formulation("undecylate").unwrap();
        assert_eq!(undecylate.rates(), (0.01729, 6.528, 2.285));
    }

    #[test]
    fn unknown_id_is_an_error() {
        match lookup_formulation("patch tw") {
            Err(EsterError::UnknownFormulation(id)) => assert_eq!(id, "patch tw"),
            other => panic!("expected UnknownFormulation, got {:?}", other),
        }
        // ids are case sensitive
        assert!(lookup_formulation("Valerate").is_err());
    }

    #[test]
    fn builtin_constants_are_valid() {
        let registry = FormulationRegistry::builtin();
        for id in registry.list() {
            registry.lookup(id).unwrap().validate(id).unwrap();
        }
    }

    #[test]
    fn insert_rejects_non_positive_constants() {
        let mut registry = FormulationRegistry::new();
        let err = registry
            .insert("bad", Formulation::new(1.0, 0.0, 1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, EsterError::InvalidFormulation { .. }));
        assert!(registry
            .insert("nan", Formulation::new(f64::NAN, 1.0, 1.0, 1.0))
            .is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn insert_replaces_existing_entry() {
        let mut registry = FormulationRegistry::builtin();
        registry
            .insert("valerate", Formulation::new(1.0, 1.0, 2.0, 3.0))
            .unwrap();
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.lookup("valerate").unwrap().d(), 1.0);
        // the global table is untouched
        assert_eq!(lookup_formulation("valerate").unwrap().d(), 478.0);
    }

    #[test]
    fn from_json_parses_and_validates() {
        let registry = FormulationRegistry::from_json(
            r#"{
                "slow": { "d": 100.0, "k1": 0.05, "k2": 2.0, "k3": 1.0 },
                "fast": { "d": 50.0, "k1": 1.5, "k2": 3.0, "k3": 2.0 }
            }"#,
        )
        .unwrap();
        assert_eq!(registry.list(), vec!["fast", "slow"]);
        assert_eq!(registry.lookup("slow").unwrap().k1(), 0.05);

        let err = FormulationRegistry::from_json(
            r#"{ "neg": { "d": -1.0, "k1": 0.05, "k2": 2.0, "k3": 1.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, EsterError::InvalidFormulation { .. }));

        let err = FormulationRegistry::from_json(r#"{ "x": { "d": 1.0 } }"#).unwrap_err();
        assert!(matches!(err, EsterError::Json(_)));
    }

    #[test]
    fn registry_serializes_as_plain_map() {
        let registry = FormulationRegistry::builtin();
        let json = serde_json::to_string(&registry).unwrap();
        let back = FormulationRegistry::from_json(&json).unwrap();
        assert_eq!(back, registry);
        let back: FormulationRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, registry);
    }

    #[test]
    fn serde_deserialize_validates_entries() {
        let json = r#"{ "bad": { "d": -5.0, "k1": 0.0, "k2": 2.0, "k3": 1.0 } }"#;
        let result = serde_json::from_str::<FormulationRegistry>(json);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Invalid formulation 'bad'"), "{}", err);

        let json = r#"{ "ok": { "d": 5.0, "k1": 0.1, "k2": 2.0, "k3": 1.0 } }"#;
        let registry: FormulationRegistry = serde_json::from_str(json).unwrap();
        assert_eq!(registry.lookup("ok").unwrap().d(), 5.0);
    }
}
