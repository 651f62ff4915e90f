// End-to-end: workbook file in, resolved view out.

use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

use caltrack_io::ingest::load_dataset;
use caltrack_recon::filter::DivergenceFilter;
use caltrack_recon::{apply_filters, build_indices, CalibrationStatus, FilterSpec};

fn write_fixture(path: &std::path::Path) {
    let mut workbook = Workbook::new();

    let master = workbook.add_worksheet().set_name("Equip_VBA").unwrap();
    let headers = ["TAG", "Equipamento", "Setor", "Nº Série", "Patrimônio"];
    for (col, header) in headers.iter().enumerate() {
        master.write_string(0, col as u16, *header).unwrap();
    }
    master.write_string(1, 0, "T1").unwrap();
    master.write_string(1, 1, "Monitor Multiparâmetro").unwrap();
    master.write_string(1, 2, "UTI").unwrap();
    master.write_string(1, 3, "007").unwrap();
    master.write_string(1, 4, "P-1").unwrap();

    let consolidation = workbook.add_worksheet().set_name("Consolidação").unwrap();
    let headers = ["Número de Série", "Fornecedor", "Data de Calibração"];
    for (col, header) in headers.iter().enumerate() {
        consolidation.write_string(0, col as u16, *header).unwrap();
    }
    // Serial "7" matches master "007" once normalized; "888" matches nothing
    consolidation.write_string(1, 0, "7").unwrap();
    consolidation.write_string(1, 1, "AcmeCal").unwrap();
    consolidation.write_number(1, 2, 45000.0).unwrap();
    consolidation.write_string(2, 0, "888").unwrap();
    consolidation.write_string(2, 1, "MetroLab").unwrap();

    workbook.save(path).unwrap();
}

#[test]
fn master_plus_consolidation_resolves_supplier_calibration() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("parque.xlsx");
    write_fixture(&path);

    let (dataset, report) = load_dataset(&path, None, None, None, None).unwrap();
    assert_eq!(report.equipment_rows, 1);
    assert_eq!(report.calibration_rows, 2);
    assert!(!report.has_warnings());

    let indices = build_indices(&dataset);
    let rows = apply_filters(&dataset, &indices, &FilterSpec::default());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].equipment.tag, "T1");
    assert_eq!(
        rows[0].calibration,
        CalibrationStatus::Calibrated {
            supplier: "AcmeCal".into(),
            date_serial: Some(45000.0),
        }
    );
    assert_eq!(rows[0].calibration.date_display(), "15/03/2023");
}

#[test]
fn divergence_mode_surfaces_unregistered_supplier_calibrations() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("parque.xlsx");
    write_fixture(&path);

    let (dataset, _) = load_dataset(&path, None, None, None, None).unwrap();
    let indices = build_indices(&dataset);
    let spec = FilterSpec {
        divergence: Some(DivergenceFilter::default()),
        ..Default::default()
    };
    let rows = apply_filters(&dataset, &indices, &spec);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].equipment.serial_number, "888");
    assert_eq!(rows[0].equipment.manufacturer, "MetroLab");
}

#[test]
fn missing_master_sheet_falls_back_to_first_with_warning() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("semnome.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet().set_name("Plan1").unwrap();
    sheet.write_string(0, 0, "TAG").unwrap();
    sheet.write_string(0, 1, "Nº Série").unwrap();
    sheet.write_string(1, 0, "T9").unwrap();
    sheet.write_string(1, 1, "99").unwrap();
    workbook.save(&path).unwrap();

    let (dataset, report) = load_dataset(&path, None, None, None, None).unwrap();
    assert_eq!(dataset.equipment.len(), 1);
    assert!(report.has_warnings());
    assert!(report.warning_summary().unwrap().contains("Equip_VBA"));
}
