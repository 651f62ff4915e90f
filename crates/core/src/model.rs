use std::collections::BTreeMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Master registry
// ---------------------------------------------------------------------------

/// One row of the master equipment registry.
///
/// `serial_number` and `asset_tag` are kept raw; only their normalized forms
/// (via [`crate::normalize_id`]) are used as join keys. Two records with the
/// same normalized serial are the same physical equipment.
///
/// Immutable for the session: a new master load replaces the whole set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EquipmentRecord {
    pub tag: String,
    pub name: String,
    pub model: String,
    pub manufacturer: String,
    pub sector: String,
    pub serial_number: String,
    pub asset_tag: String,
    /// Raw calibration-status cell, empty when absent.
    pub raw_calibration_status: String,
    /// Calibration due date as an Excel serial, when present.
    pub calibration_due: Option<f64>,
    /// Unrecognized columns, keyed by sanitized header. Never discarded.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Calibration consolidation
// ---------------------------------------------------------------------------

/// One row of a calibration-consolidation source (supplier-performed
/// calibrations). At most one is retained per normalized serial —
/// last-write-wins at index build time.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CalibrationRecord {
    pub serial_number: String,
    pub supplier: String,
    /// Calibration date as an Excel serial, when present.
    pub calibration_date: Option<f64>,
    /// Extra columns some consolidation exports carry (equipment name,
    /// model, asset tag), used when mapping divergences for display.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Service orders
// ---------------------------------------------------------------------------

/// One open work-order row. Joined to the registry by normalized serial OR
/// normalized asset tag; the serial match wins when both resolve.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceOrderRecord {
    pub order_id: String,
    pub tag: String,
    pub serial_number: String,
    pub asset_tag: String,
    pub name: String,
    pub model: String,
    pub manufacturer: String,
}

// ---------------------------------------------------------------------------
// Inspection rounds ("ronda")
// ---------------------------------------------------------------------------

/// One row of a physical-location verification pass.
///
/// `sector` is the registry sector carried at session start;
/// `observed_sector` is where the equipment was actually found. Divergence
/// is flagged only when the observed sector is non-empty and differs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InspectionResult {
    pub tag: String,
    pub name: String,
    pub sector: String,
    pub serial_number: String,
    pub asset_tag: String,
    pub observed_sector: String,
    pub status: String,
    pub notes: String,
    /// Date of the round as recorded, `DD/MM/YYYY`.
    pub date: String,
    /// Time of the round as recorded, `HH:MM:SS`.
    pub time: String,
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// All ingested records for one session. Built fresh on every load and
/// passed by reference into the engine — there is no ambient global state,
/// and nothing here is mutated after assembly.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub equipment: Vec<EquipmentRecord>,
    pub calibrations: Vec<CalibrationRecord>,
    /// Raw serials of equipment currently under external maintenance.
    pub maintenance: Vec<String>,
    pub service_orders: Vec<ServiceOrderRecord>,
    pub inspections: Vec<InspectionResult>,
}

impl Dataset {
    /// Sorted unique non-empty sectors from the master registry.
    pub fn sectors(&self) -> Vec<String> {
        let mut sectors: Vec<String> = self
            .equipment
            .iter()
            .map(|eq| eq.sector.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();
        sectors.sort();
        sectors.dedup();
        sectors
    }
}
