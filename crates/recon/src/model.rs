use caltrack_core::{dates, EquipmentRecord};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Derived statuses
// ---------------------------------------------------------------------------

/// Effective calibration state of one equipment record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationStatus {
    /// Present in the consolidation source: calibrated by this supplier.
    Calibrated {
        supplier: String,
        date_serial: Option<f64>,
    },
    /// The registry's own "calibrado (total)" marker.
    CalibratedTotal,
    /// Everything else, including empty/unrecognized raw fields.
    NotCalibrated,
}

impl CalibrationStatus {
    /// User-facing label, matching the source workbooks.
    pub fn label(&self) -> String {
        match self {
            Self::Calibrated { supplier, .. } => format!("Calibrado ({supplier})"),
            Self::CalibratedTotal => "Calibrado (Total)".to_string(),
            Self::NotCalibrated => "Não Calibrado/Não Encontrado (Seu Cadastro)".to_string(),
        }
    }

    /// Calibration date formatted for display, empty when not dated.
    pub fn date_display(&self) -> String {
        match self {
            Self::Calibrated {
                date_serial: Some(serial),
                ..
            } => dates::format_serial(*serial),
            _ => String::new(),
        }
    }
}

impl std::fmt::Display for CalibrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Effective maintenance state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    InExternalMaintenance,
    Normal,
}

impl MaintenanceStatus {
    /// User-facing label. Normal equipment carries an empty status cell in
    /// the source workbooks, so the label is empty too.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InExternalMaintenance => "Em Manutenção Externa",
            Self::Normal => "",
        }
    }
}

impl std::fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Resolved view
// ---------------------------------------------------------------------------

/// One equipment record enriched with its derived statuses.
///
/// Computed per pass and never cached: filters always recompute from the
/// source indices, so derived state cannot go stale.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedRecord {
    #[serde(flatten)]
    pub equipment: EquipmentRecord,
    pub calibration: CalibrationStatus,
    pub maintenance: MaintenanceStatus,
    pub location_divergent: bool,
}
