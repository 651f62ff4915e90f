// File ingestion and export for the calibration tracker

pub mod csv;
pub mod error;
pub mod export;
pub mod headers;
pub mod ingest;

pub use error::ReadError;
pub use ingest::{load_dataset, IngestReport};
