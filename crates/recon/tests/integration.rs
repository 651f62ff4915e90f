// Engine-level integration: records in, filtered views out, specs from TOML.

use caltrack_core::{CalibrationRecord, Dataset, EquipmentRecord, InspectionResult};
use caltrack_recon::ronda::check_round;
use caltrack_recon::{apply_filters, build_indices, CalibrationStatus, FilterSpec};

fn equipment(tag: &str, serial: &str, sector: &str, raw_status: &str) -> EquipmentRecord {
    EquipmentRecord {
        tag: tag.into(),
        name: format!("Equip {tag}"),
        serial_number: serial.into(),
        sector: sector.into(),
        raw_calibration_status: raw_status.into(),
        ..Default::default()
    }
}

fn hospital_dataset() -> Dataset {
    Dataset {
        equipment: vec![
            equipment("T1", "007", "UTI", ""),
            equipment("T2", "0042", "UTI", "Calibrado (Total)"),
            equipment("T3", "99", "Centro Cirúrgico", "Não Calibrado"),
            equipment("T4", "100", "Centro Cirúrgico", ""),
        ],
        calibrations: vec![
            CalibrationRecord {
                serial_number: "7".into(),
                supplier: "AcmeCal".into(),
                calibration_date: Some(45000.0),
                ..Default::default()
            },
            CalibrationRecord {
                serial_number: "555".into(),
                supplier: "MetroLab".into(),
                calibration_date: Some(45100.0),
                ..Default::default()
            },
        ],
        maintenance: vec!["100".into()],
        inspections: vec![
            InspectionResult {
                serial_number: "7".into(),
                observed_sector: "Centro Cirúrgico".into(),
                status: "Localizado".into(),
                ..Default::default()
            },
            InspectionResult {
                serial_number: "42".into(),
                observed_sector: "UTI".into(),
                status: "Localizado".into(),
                ..Default::default()
            },
        ],
        ..Default::default()
    }
}

#[test]
fn full_resolution_pass() {
    let dataset = hospital_dataset();
    let indices = build_indices(&dataset);
    let rows = apply_filters(&dataset, &indices, &FilterSpec::default());

    assert_eq!(rows.len(), 4);
    // T1: supplier calibration joined across leading-zero difference
    assert_eq!(rows[0].calibration.label(), "Calibrado (AcmeCal)");
    assert!(rows[0].location_divergent);
    // T2: registry's own total marker; matching inspection, no divergence
    assert_eq!(rows[1].calibration, CalibrationStatus::CalibratedTotal);
    assert!(!rows[1].location_divergent);
    // T3: explicit not-calibrated marker; never inspected
    assert_eq!(rows[2].calibration, CalibrationStatus::NotCalibrated);
    assert!(!rows[2].location_divergent);
    // T4: empty raw status falls back to not-calibrated; flagged maintenance
    assert_eq!(rows[3].calibration, CalibrationStatus::NotCalibrated);
    assert_eq!(rows[3].maintenance.label(), "Em Manutenção Externa");
}

#[test]
fn toml_spec_drives_the_same_path_as_flags() {
    let dataset = hospital_dataset();
    let indices = build_indices(&dataset);

    let spec = FilterSpec::from_toml(
        r#"
sector = "UTI"
status = "Calibrado (AcmeCal)"
"#,
    )
    .unwrap();
    let rows = apply_filters(&dataset, &indices, &spec);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].equipment.tag, "T1");
}

#[test]
fn toml_divergence_spec() {
    let dataset = hospital_dataset();
    let indices = build_indices(&dataset);

    let spec = FilterSpec::from_toml("[divergence]\n").unwrap();
    let rows = apply_filters(&dataset, &indices, &spec);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].equipment.serial_number, "555");

    let spec = FilterSpec::from_toml("[divergence]\nsupplier = \"metro\"\n").unwrap();
    assert_eq!(apply_filters(&dataset, &indices, &spec).len(), 1);
}

#[test]
fn repeated_application_is_stable() {
    let dataset = hospital_dataset();
    let indices = build_indices(&dataset);
    let spec = FilterSpec::from_toml(
        r#"
search = "4"

[columns.setor]
select = ["uti", "centro cirúrgico"]
"#,
    )
    .unwrap();

    let tags = |rows: &[caltrack_recon::ResolvedRecord]| -> Vec<String> {
        rows.iter().map(|r| r.equipment.tag.clone()).collect()
    };
    let first = tags(&apply_filters(&dataset, &indices, &spec));
    let second = tags(&apply_filters(&dataset, &indices, &spec));
    assert_eq!(first, second);
    // select-all on setor changed nothing beyond the search predicate
    let no_columns = FilterSpec {
        search: Some("4".into()),
        ..Default::default()
    };
    assert_eq!(first, tags(&apply_filters(&dataset, &indices, &no_columns)));
}

#[test]
fn round_check_counts_only_inspected_equipment() {
    let dataset = hospital_dataset();
    let indices = build_indices(&dataset);
    let check = check_round(&dataset, &indices);

    assert_eq!(check.inspected, 2);
    assert_eq!(check.divergences.len(), 1);
    assert_eq!(check.divergences[0].tag, "T1");
    assert_eq!(check.divergences[0].declared_sector, "UTI");
}
