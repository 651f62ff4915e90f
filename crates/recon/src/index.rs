//! Lookup structures joining the master registry to the other sources.
//!
//! Every index is keyed by [`normalize_id`] output. Indices are built
//! independently and never mutate one another. Duplicate normalized keys are
//! a data-quality problem in the source workbooks: the later record wins,
//! and the overwrite count is surfaced to the caller rather than hidden.

use std::collections::{HashMap, HashSet};

use caltrack_core::{
    normalize_id, CalibrationRecord, Dataset, EquipmentRecord, InspectionResult,
};

/// Master-registry lookups: normalized serial → position, normalized asset
/// tag → position (positions into the equipment list, which stays the owner).
#[derive(Debug, Default)]
pub struct EquipmentIndex {
    by_serial: HashMap<String, usize>,
    by_asset_tag: HashMap<String, usize>,
    pub duplicate_serials: usize,
    pub duplicate_asset_tags: usize,
}

impl EquipmentIndex {
    pub fn build(equipment: &[EquipmentRecord]) -> Self {
        let mut index = Self::default();
        for (pos, eq) in equipment.iter().enumerate() {
            let serial = normalize_id(&eq.serial_number);
            if !serial.is_empty() && index.by_serial.insert(serial, pos).is_some() {
                index.duplicate_serials += 1;
            }
            let asset = normalize_id(&eq.asset_tag);
            if !asset.is_empty() && index.by_asset_tag.insert(asset, pos).is_some() {
                index.duplicate_asset_tags += 1;
            }
        }
        index
    }

    pub fn by_serial(&self, normalized: &str) -> Option<usize> {
        self.by_serial.get(normalized).copied()
    }

    pub fn by_asset_tag(&self, normalized: &str) -> Option<usize> {
        self.by_asset_tag.get(normalized).copied()
    }

    pub fn contains_serial(&self, normalized: &str) -> bool {
        self.by_serial.contains_key(normalized)
    }
}

/// Consolidation lookups: normalized serial → calibration record.
/// Last-write-wins; at most one calibration is retained per serial.
#[derive(Debug, Default)]
pub struct CalibrationIndex {
    by_serial: HashMap<String, CalibrationRecord>,
    pub duplicates: usize,
}

impl CalibrationIndex {
    pub fn build(calibrations: &[CalibrationRecord]) -> Self {
        let mut index = Self::default();
        for cal in calibrations {
            let serial = normalize_id(&cal.serial_number);
            if serial.is_empty() {
                continue;
            }
            if index.by_serial.insert(serial, cal.clone()).is_some() {
                index.duplicates += 1;
            }
        }
        index
    }

    pub fn get(&self, normalized: &str) -> Option<&CalibrationRecord> {
        self.by_serial.get(normalized)
    }
}

/// Serials of equipment currently under external maintenance.
#[derive(Debug, Default)]
pub struct MaintenanceSet {
    serials: HashSet<String>,
}

impl MaintenanceSet {
    pub fn build(raw_serials: &[String]) -> Self {
        Self {
            serials: raw_serials
                .iter()
                .map(|s| normalize_id(s))
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, normalized: &str) -> bool {
        self.serials.contains(normalized)
    }

    pub fn len(&self) -> usize {
        self.serials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.serials.is_empty()
    }
}

/// Inspection-round lookups: normalized serial → inspection result.
/// Last-write-wins, like the calibration index.
#[derive(Debug, Default)]
pub struct InspectionIndex {
    by_serial: HashMap<String, InspectionResult>,
    pub duplicates: usize,
}

impl InspectionIndex {
    pub fn build(inspections: &[InspectionResult]) -> Self {
        let mut index = Self::default();
        for insp in inspections {
            let serial = normalize_id(&insp.serial_number);
            if serial.is_empty() {
                continue;
            }
            if index.by_serial.insert(serial, insp.clone()).is_some() {
                index.duplicates += 1;
            }
        }
        index
    }

    pub fn get(&self, normalized: &str) -> Option<&InspectionResult> {
        self.by_serial.get(normalized)
    }
}

/// All indices for one dataset, built together and queried everywhere.
#[derive(Debug, Default)]
pub struct Indices {
    pub equipment: EquipmentIndex,
    pub calibrations: CalibrationIndex,
    pub maintenance: MaintenanceSet,
    pub inspections: InspectionIndex,
}

impl Indices {
    /// Total silently-overwritten duplicate identities across all indices.
    pub fn duplicate_count(&self) -> usize {
        self.equipment.duplicate_serials
            + self.equipment.duplicate_asset_tags
            + self.calibrations.duplicates
            + self.inspections.duplicates
    }
}

pub fn build_indices(dataset: &Dataset) -> Indices {
    Indices {
        equipment: EquipmentIndex::build(&dataset.equipment),
        calibrations: CalibrationIndex::build(&dataset.calibrations),
        maintenance: MaintenanceSet::build(&dataset.maintenance),
        inspections: InspectionIndex::build(&dataset.inspections),
    }
}
