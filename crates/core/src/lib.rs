//! `caltrack-core` — shared types for the calibration tracker.
//!
//! Record structs for every sheet kind, the identity normalizer that defines
//! equipment equality across sheets, and Excel date-serial conversion.

pub mod dates;
pub mod identity;
pub mod model;

pub use identity::{normalize_id, normalize_text};
pub use model::{
    CalibrationRecord, Dataset, EquipmentRecord, InspectionResult, ServiceOrderRecord,
};
