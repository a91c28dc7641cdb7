pub mod builder;
pub mod dose;
pub mod parser;
pub use builder::DoseHistoryBuilder;
pub use dose::{Dose, DoseHistory};
pub use parser::{read_doses, read_doses_from};
