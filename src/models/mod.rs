//! Domain models for neonatal admissions

pub mod admission;
pub mod columns;
pub mod geo;

pub use admission::{Admission, AdmissionBuilder, InvalidAdmission};
pub use columns::DatasetVariant;
pub use geo::Coordinates;
