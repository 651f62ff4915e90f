//! Filter engine: a declarative `FilterSpec` applied over resolved records.
//!
//! Specs are plain data (TOML-loadable for the CLI) so every caller filters
//! through the same path. Predicate categories AND together; multi-select
//! values within one column OR together. Output preserves registry order.

use std::collections::BTreeMap;

use serde::Deserialize;

use caltrack_core::{normalize_id, Dataset, EquipmentRecord};

use crate::error::FilterError;
use crate::index::Indices;
use crate::model::{CalibrationStatus, MaintenanceStatus, ResolvedRecord};
use crate::resolve::resolve;

// ---------------------------------------------------------------------------
// Spec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterSpec {
    /// Exact-match sector.
    #[serde(default)]
    pub sector: Option<String>,
    /// Effective calibration-status label equality.
    #[serde(default)]
    pub status: Option<String>,
    /// Normalized-substring search across serial, asset tag, and TAG.
    #[serde(default)]
    pub search: Option<String>,
    /// Effective maintenance-status label equality.
    #[serde(default)]
    pub maintenance: Option<String>,
    /// Supplier-divergence mode; replaces the registry listing entirely.
    #[serde(default)]
    pub divergence: Option<DivergenceFilter>,
    /// Per-column filters, keyed by canonical column name.
    #[serde(default)]
    pub columns: BTreeMap<String, ColumnFilter>,
}

/// Consolidation rows absent from the master registry: equipment a supplier
/// calibrated that the registry does not know about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DivergenceFilter {
    /// Restrict to suppliers whose name contains this (case-insensitive);
    /// omit for all suppliers.
    #[serde(default)]
    pub supplier: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ColumnFilter {
    /// Row passes when its cell value is in the set. Selecting every
    /// observed value is a no-op; an empty set drops every row.
    Select { select: Vec<String> },
    /// Row passes when its cell value contains the text.
    Text { text: String },
}

impl FilterSpec {
    pub fn from_toml(input: &str) -> Result<Self, FilterError> {
        let spec: FilterSpec =
            toml::from_str(input).map_err(|e| FilterError::Parse(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if self.divergence.is_some() && self.status.is_some() {
            return Err(FilterError::Validation(
                "divergence mode replaces the registry listing; drop `status`".into(),
            ));
        }
        if let Some(DivergenceFilter {
            supplier: Some(supplier),
        }) = &self.divergence
        {
            if supplier.trim().is_empty() {
                return Err(FilterError::Validation(
                    "divergence.supplier must be non-empty; omit it for all suppliers".into(),
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Apply a filter spec. Resolution happens inside the pass — the caller
/// hands over source records and indices, never cached derived state.
pub fn apply_filters(
    dataset: &Dataset,
    indices: &Indices,
    spec: &FilterSpec,
) -> Vec<ResolvedRecord> {
    if let Some(divergence) = &spec.divergence {
        return divergent_calibrations(dataset, indices, divergence);
    }

    let mut rows: Vec<ResolvedRecord> = dataset
        .equipment
        .iter()
        .map(|eq| resolve(eq, indices))
        .filter(|row| matches_global(row, spec))
        .collect();

    for (column, filter) in &spec.columns {
        rows.retain(|row| matches_column(row, column, filter));
    }

    rows
}

fn matches_global(row: &ResolvedRecord, spec: &FilterSpec) -> bool {
    if let Some(sector) = &spec.sector {
        if row.equipment.sector != *sector {
            return false;
        }
    }

    if let Some(maintenance) = &spec.maintenance {
        if row.maintenance.label() != maintenance {
            return false;
        }
    }

    if let Some(search) = &spec.search {
        let needle = normalize_id(search);
        let tag_needle = search.to_lowercase();
        let hit = normalize_id(&row.equipment.serial_number).contains(&needle)
            || normalize_id(&row.equipment.asset_tag).contains(&needle)
            || row.equipment.tag.to_lowercase().contains(&tag_needle);
        if !hit {
            return false;
        }
    }

    if let Some(status) = &spec.status {
        if row.calibration.label() != *status {
            return false;
        }
    }

    true
}

fn matches_column(row: &ResolvedRecord, column: &str, filter: &ColumnFilter) -> bool {
    let value = column_value(row, column);
    match filter {
        ColumnFilter::Select { select } => select.iter().any(|choice| *choice == value),
        ColumnFilter::Text { text } => value.contains(&text.to_lowercase()),
    }
}

/// Comparison value of one column. Statuses use their display labels,
/// identifier columns their normalized form, everything else lower-case.
fn column_value(row: &ResolvedRecord, column: &str) -> String {
    let eq = &row.equipment;
    match column {
        "statuscalibacao" => row.calibration.label().to_lowercase(),
        "statusmanutencao" => row.maintenance.label().to_lowercase(),
        "numeroserie" => normalize_id(&eq.serial_number),
        "patrimonio" => normalize_id(&eq.asset_tag),
        "tag" => eq.tag.to_lowercase(),
        "equipamento" => eq.name.to_lowercase(),
        "modelo" => eq.model.to_lowercase(),
        "fabricante" => eq.manufacturer.to_lowercase(),
        "setor" => eq.sector.to_lowercase(),
        other => eq
            .extra
            .get(other)
            .map(|v| v.to_lowercase())
            .unwrap_or_default(),
    }
}

/// The divergence listing: consolidation rows whose serial the registry does
/// not contain, mapped to orphan view records (the supplier knows equipment
/// we do not).
fn divergent_calibrations(
    dataset: &Dataset,
    indices: &Indices,
    filter: &DivergenceFilter,
) -> Vec<ResolvedRecord> {
    let supplier_needle = filter.supplier.as_ref().map(|s| s.trim().to_lowercase());

    dataset
        .calibrations
        .iter()
        .filter(|cal| {
            let serial = normalize_id(&cal.serial_number);
            if serial.is_empty() || indices.equipment.contains_serial(&serial) {
                return false;
            }
            match &supplier_needle {
                Some(needle) => cal.supplier.trim().to_lowercase().contains(needle),
                None => true,
            }
        })
        .map(|cal| {
            let equipment = EquipmentRecord {
                name: cal.extra.get("equipamento").cloned().unwrap_or_default(),
                model: cal.extra.get("modelo").cloned().unwrap_or_default(),
                manufacturer: cal.supplier.clone(),
                serial_number: cal.serial_number.clone(),
                asset_tag: cal.extra.get("patrimonio").cloned().unwrap_or_default(),
                ..Default::default()
            };
            ResolvedRecord {
                equipment,
                calibration: CalibrationStatus::Calibrated {
                    supplier: cal.supplier.clone(),
                    date_serial: cal.calibration_date,
                },
                maintenance: MaintenanceStatus::Normal,
                location_divergent: false,
            }
        })
        .collect()
}
