//! Status resolution: one equipment record + the indices → derived view.

use caltrack_core::{normalize_id, normalize_text, Dataset, EquipmentRecord};

use crate::index::Indices;
use crate::model::{CalibrationStatus, MaintenanceStatus, ResolvedRecord};

/// Raw-status markers meaning "not calibrated", matched as case-insensitive
/// substrings of the registry's own calibration-status cell.
const NOT_CALIBRATED_MARKERS: &[&str] = &["não calibrado", "não cadastrado"];

/// Raw-status marker for fully calibrated equipment.
const CALIBRATED_TOTAL_MARKER: &str = "calibrado (total)";

/// Compute the derived view of one equipment record.
///
/// Pure and invoked once per record per pass; nothing is cached between
/// passes, so derived state can never outlive the indices it came from.
pub fn resolve(equipment: &EquipmentRecord, indices: &Indices) -> ResolvedRecord {
    let serial = normalize_id(&equipment.serial_number);

    let calibration = match indices.calibrations.get(&serial) {
        Some(cal) => CalibrationStatus::Calibrated {
            supplier: cal.supplier.clone(),
            date_serial: cal.calibration_date,
        },
        None => status_from_raw(&equipment.raw_calibration_status),
    };

    let maintenance = if indices.maintenance.contains(&serial) {
        MaintenanceStatus::InExternalMaintenance
    } else {
        MaintenanceStatus::Normal
    };

    let location_divergent = match indices.inspections.get(&serial) {
        Some(inspection) => {
            let observed = normalize_text(&inspection.observed_sector);
            !observed.is_empty() && observed != normalize_text(&equipment.sector)
        }
        // No inspection is never a divergence.
        None => false,
    };

    ResolvedRecord {
        equipment: equipment.clone(),
        calibration,
        maintenance,
        location_divergent,
    }
}

/// Resolve every equipment record in registry order.
pub fn resolve_all(dataset: &Dataset, indices: &Indices) -> Vec<ResolvedRecord> {
    dataset
        .equipment
        .iter()
        .map(|eq| resolve(eq, indices))
        .collect()
}

/// Classify the registry's raw calibration-status cell. An empty or
/// unrecognized value is always NotCalibrated, never "unknown".
fn status_from_raw(raw: &str) -> CalibrationStatus {
    let lowered = raw.to_lowercase();
    if NOT_CALIBRATED_MARKERS.iter().any(|m| lowered.contains(m)) {
        return CalibrationStatus::NotCalibrated;
    }
    if lowered.contains(CALIBRATED_TOTAL_MARKER) {
        return CalibrationStatus::CalibratedTotal;
    }
    CalibrationStatus::NotCalibrated
}
