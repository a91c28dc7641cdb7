//! Reading dose histories from CSV
//!
//! The file holds one dose per row with the columns `time`, `amount` and
//! `formulation`. Headers are matched case-insensitively, column order is
//! free and lines starting with `#` are skipped.
//!
//! ```text
//! # weekly valerate
//! TIME,AMOUNT,FORMULATION
//! 0,5,valerate
//! 7,5,valerate
//! ```

use std::io::Read;
use std::path::Path;

use crate::data::{Dose, DoseHistory};
use crate::error::EsterError;

/// Read a dose history from a CSV file
///
/// # Example
///
/// ```rust,no_run
/// use esterpk::data::read_doses;
///
/// let history = read_doses("path/to/doses.csv").unwrap();
/// println!("{}", history);
/// ```
pub fn read_doses(path: impl AsRef<Path>) -> Result<DoseHistory, EsterError> {
    let file = std::fs::File::open(path.as_ref())?;
    let history = read_doses_from(file)?;
    tracing::debug!(
        "read {} doses from {}",
        history.len(),
        path.as_ref().display()
    );
    Ok(history)
}

/// Read a dose history from any CSV source, see [`read_doses`]
pub fn read_doses_from<R: Read>(reader: R) -> Result<DoseHistory, EsterError> {
    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.to_lowercase())
        .collect::<Vec<_>>();
    reader.set_headers(csv::StringRecord::from(headers));

    let doses = reader
        .deserialize::<Dose>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DoseHistory::new(doses))
}
