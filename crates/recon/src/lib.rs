//! `caltrack-recon` — cross-sheet reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded records, returns resolved and
//! filtered views. No CLI or IO dependencies.

pub mod error;
pub mod filter;
pub mod index;
pub mod model;
pub mod orders;
pub mod resolve;
pub mod ronda;

pub use error::FilterError;
pub use filter::{apply_filters, FilterSpec};
pub use index::{build_indices, Indices};
pub use model::{CalibrationStatus, MaintenanceStatus, ResolvedRecord};
pub use resolve::{resolve, resolve_all};
