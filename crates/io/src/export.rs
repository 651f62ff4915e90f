// Excel export (xlsx only)
//
// Exports reproduce the documented column order, and calibration dates go
// out as the same date serials that came in, so an exported sheet can be
// re-ingested without loss.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use caltrack_core::InspectionResult;
use caltrack_recon::ResolvedRecord;

/// Column order of the resolved-view export.
pub const REPORT_HEADERS: &[&str] = &[
    "TAG",
    "Equipamento",
    "Modelo",
    "Fabricante",
    "Setor",
    "Nº Série",
    "Patrimônio",
    "Status Calibração",
    "Data Calibração",
    "Data Vencimento Calibração",
    "Status Manutenção",
];

/// Sheet and column order of the inspection-round export.
pub const RONDA_SHEET: &str = "Ronda_Equipamentos";
pub const RONDA_HEADERS: &[&str] = &[
    "TAG",
    "Equipamento",
    "Setor",
    "Nº de Série",
    "Patrimônio",
    "Localização",
    "Status",
    "Observações",
    "Data da Ronda",
    "Hora da Ronda",
];

fn date_format() -> Format {
    Format::new().set_num_format("dd/mm/yyyy")
}

/// Write the resolved view to an xlsx file.
pub fn write_report(path: &Path, rows: &[ResolvedRecord]) -> Result<(), String> {
    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name("Equipamentos")
        .map_err(|e| format!("Failed to create sheet: {e}"))?;

    for (col, header) in REPORT_HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(|e| format!("Failed to write header: {e}"))?;
    }

    let dates = date_format();
    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        let eq = &row.equipment;
        let texts: [(u16, &str); 7] = [
            (0, &eq.tag),
            (1, &eq.name),
            (2, &eq.model),
            (3, &eq.manufacturer),
            (4, &eq.sector),
            (5, &eq.serial_number),
            (6, &eq.asset_tag),
        ];
        for (col, value) in texts {
            worksheet
                .write_string(r, col, value)
                .map_err(|e| format!("Failed to write cell: {e}"))?;
        }
        worksheet
            .write_string(r, 7, row.calibration.label())
            .map_err(|e| format!("Failed to write cell: {e}"))?;
        if let caltrack_recon::CalibrationStatus::Calibrated {
            date_serial: Some(serial),
            ..
        } = &row.calibration
        {
            worksheet
                .write_number_with_format(r, 8, *serial, &dates)
                .map_err(|e| format!("Failed to write date: {e}"))?;
        }
        if let Some(due) = eq.calibration_due {
            worksheet
                .write_number_with_format(r, 9, due, &dates)
                .map_err(|e| format!("Failed to write date: {e}"))?;
        }
        worksheet
            .write_string(r, 10, row.maintenance.label())
            .map_err(|e| format!("Failed to write cell: {e}"))?;
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {e}"))
}

/// Write an inspection-round session to an xlsx file.
pub fn write_ronda(path: &Path, items: &[InspectionResult]) -> Result<(), String> {
    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(RONDA_SHEET)
        .map_err(|e| format!("Failed to create sheet: {e}"))?;

    for (col, header) in RONDA_HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(|e| format!("Failed to write header: {e}"))?;
    }

    for (i, item) in items.iter().enumerate() {
        let r = (i + 1) as u32;
        let cells: [(u16, &str); 10] = [
            (0, &item.tag),
            (1, &item.name),
            (2, &item.sector),
            (3, &item.serial_number),
            (4, &item.asset_tag),
            (5, &item.observed_sector),
            (6, &item.status),
            (7, &item.notes),
            (8, &item.date),
            (9, &item.time),
        ];
        for (col, value) in cells {
            worksheet
                .write_string(r, col, value)
                .map_err(|e| format!("Failed to write cell: {e}"))?;
        }
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{self, IngestReport};
    use caltrack_core::EquipmentRecord;
    use caltrack_recon::{CalibrationStatus, MaintenanceStatus};
    use tempfile::tempdir;

    fn resolved(tag: &str, serial: &str) -> ResolvedRecord {
        ResolvedRecord {
            equipment: EquipmentRecord {
                tag: tag.into(),
                name: "Monitor".into(),
                sector: "UTI".into(),
                serial_number: serial.into(),
                ..Default::default()
            },
            calibration: CalibrationStatus::Calibrated {
                supplier: "AcmeCal".into(),
                date_serial: Some(45000.0),
            },
            maintenance: MaintenanceStatus::Normal,
            location_divergent: false,
        }
    }

    #[test]
    fn report_round_trips_through_calamine() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        write_report(&path, &[resolved("T1", "007")]).unwrap();

        let tables = ingest::read_workbook(&path).unwrap();
        assert_eq!(tables[0].name, "Equipamentos");
        assert_eq!(tables[0].headers, REPORT_HEADERS);

        let row = &tables[0].rows[0];
        assert_eq!(row[0].as_string(), "T1");
        // Serial survives as text, zeros intact
        assert_eq!(row[5].as_string(), "007");
        assert_eq!(row[7].as_string(), "Calibrado (AcmeCal)");
        // Date survives as its serial
        assert_eq!(row[8].as_serial(), Some(45000.0));
    }

    #[test]
    fn ronda_export_reingests_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ronda.xlsx");

        let items = vec![InspectionResult {
            tag: "T1".into(),
            name: "Monitor".into(),
            sector: "UTI".into(),
            serial_number: "7".into(),
            asset_tag: "p-1".into(),
            observed_sector: "Centro Cirúrgico".into(),
            status: "Localizado".into(),
            notes: "ok".into(),
            date: "05/08/2026".into(),
            time: "10:30:00".into(),
        }];
        write_ronda(&path, &items).unwrap();

        let tables = ingest::read_workbook(&path).unwrap();
        let mut report = IngestReport::default();
        let loaded = ingest::inspection_records(&tables[0], &mut report);

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].serial_number, "7");
        assert_eq!(loaded[0].observed_sector, "Centro Cirúrgico");
        assert_eq!(loaded[0].status, "Localizado");
        assert_eq!(loaded[0].sector, "UTI");
        assert_eq!(loaded[0].date, "05/08/2026");
    }
}
