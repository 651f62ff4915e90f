//! Inspection-round ("ronda") session model.
//!
//! A session starts from the master registry (one sector at a time, the way
//! rounds are walked), accumulates results as equipment is located, and can
//! be resumed from a previously exported round sheet. The UI on top of this
//! is out of scope; the session is plain data.

use caltrack_core::{normalize_id, Dataset, EquipmentRecord, InspectionResult};
use serde::Serialize;

use crate::index::Indices;

/// Status recorded when an equipment is found during a round.
pub const STATUS_LOCATED: &str = "Localizado";

#[derive(Debug, Clone, Default)]
pub struct RondaSession {
    pub items: Vec<InspectionResult>,
}

impl RondaSession {
    /// Start a round over one sector: every registered equipment of that
    /// sector, identifiers normalized, observation fields blank.
    pub fn init(equipment: &[EquipmentRecord], sector: &str) -> Self {
        let items = equipment
            .iter()
            .filter(|eq| eq.sector.trim() == sector)
            .map(|eq| InspectionResult {
                tag: eq.tag.clone(),
                name: eq.name.clone(),
                sector: eq.sector.clone(),
                serial_number: normalize_id(&eq.serial_number),
                asset_tag: normalize_id(&eq.asset_tag),
                ..Default::default()
            })
            .collect();
        Self { items }
    }

    /// Resume a session from records loaded out of a prior export.
    pub fn from_records(items: Vec<InspectionResult>) -> Self {
        Self { items }
    }

    /// Record a located equipment. Updates the pending entry for its serial
    /// when the session already tracks it, otherwise appends (ad hoc finds
    /// outside the chosen sector are kept too).
    pub fn record(
        &mut self,
        equipment: &EquipmentRecord,
        location: &str,
        notes: &str,
        date: &str,
        time: &str,
    ) {
        let serial = normalize_id(&equipment.serial_number);
        let filled = InspectionResult {
            tag: equipment.tag.clone(),
            name: equipment.name.clone(),
            sector: equipment.sector.clone(),
            serial_number: serial.clone(),
            asset_tag: normalize_id(&equipment.asset_tag),
            observed_sector: location.trim().to_string(),
            status: STATUS_LOCATED.to_string(),
            notes: notes.trim().to_string(),
            date: date.to_string(),
            time: time.to_string(),
        };
        match self
            .items
            .iter_mut()
            .find(|item| normalize_id(&item.serial_number) == serial)
        {
            Some(existing) => *existing = filled,
            None => self.items.push(filled),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Find an equipment by normalized serial or asset tag, serial first —
/// the lookup behind the round's search box.
pub fn find_equipment<'a>(
    dataset: &'a Dataset,
    indices: &Indices,
    query: &str,
) -> Option<&'a EquipmentRecord> {
    let key = normalize_id(query);
    if key.is_empty() {
        return None;
    }
    indices
        .equipment
        .by_serial(&key)
        .or_else(|| indices.equipment.by_asset_tag(&key))
        .and_then(|pos| dataset.equipment.get(pos))
}

// ---------------------------------------------------------------------------
// Round verification
// ---------------------------------------------------------------------------

/// One equipment whose observed location disagrees with the registry.
#[derive(Debug, Clone, Serialize)]
pub struct RondaDivergence {
    pub tag: String,
    pub serial_number: String,
    pub declared_sector: String,
    pub observed_sector: String,
}

/// Outcome of checking a loaded round against the registry.
#[derive(Debug, Clone, Serialize)]
pub struct RondaCheck {
    /// Registered equipment with an inspection result.
    pub inspected: usize,
    pub divergences: Vec<RondaDivergence>,
}

/// Compare every inspected equipment's observed sector with its registry
/// sector. Equipment without an inspection result is not counted.
pub fn check_round(dataset: &Dataset, indices: &Indices) -> RondaCheck {
    let mut inspected = 0;
    let mut divergences = Vec::new();

    for eq in &dataset.equipment {
        let serial = normalize_id(&eq.serial_number);
        let Some(inspection) = indices.inspections.get(&serial) else {
            continue;
        };
        inspected += 1;
        let resolved = crate::resolve::resolve(eq, indices);
        if resolved.location_divergent {
            divergences.push(RondaDivergence {
                tag: eq.tag.clone(),
                serial_number: eq.serial_number.clone(),
                declared_sector: eq.sector.clone(),
                observed_sector: inspection.observed_sector.clone(),
            });
        }
    }

    RondaCheck {
        inspected,
        divergences,
    }
}
