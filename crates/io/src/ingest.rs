// Workbook ingestion (xlsx, xls, xlsb, ods, csv)
//
// One-way conversion: files become typed records; derived state is computed
// by the engine crate. A load replaces the whole dataset — there is no
// incremental merge.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use caltrack_core::{
    normalize_text, CalibrationRecord, Dataset, EquipmentRecord, InspectionResult,
    ServiceOrderRecord,
};

use crate::error::ReadError;
use crate::headers::{
    header_key, resolve, Field, CONSOLIDATION_ALIASES, MASTER_ALIASES, ORDER_ALIASES,
    RONDA_ALIASES,
};

// ---------------------------------------------------------------------------
// Raw sheet model
// ---------------------------------------------------------------------------

/// One cell, decoupled from the parser's own type.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Display form. Integer-valued numbers print without decimals, so a
    /// numeric serial cell `123.0` compares equal to the text `"123"` once
    /// normalized.
    pub fn as_string(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Cell::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }

    /// Numeric value, for date-serial columns. Text that parses as a number
    /// counts (CSV sources carry serials as text).
    pub fn as_serial(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// One sheet as a header row plus data rows.
#[derive(Debug, Clone, Default)]
pub struct SheetTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetTable {
    fn cell(&self, row: &[Cell], col: usize) -> Cell {
        row.get(col).cloned().unwrap_or(Cell::Empty)
    }
}

// ---------------------------------------------------------------------------
// Ingest report
// ---------------------------------------------------------------------------

/// Per-load statistics, shown on the status line after every load.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub equipment_rows: usize,
    pub calibration_rows: usize,
    pub order_rows: usize,
    pub inspection_rows: usize,
    pub maintenance_flags: usize,
    pub empty_rows_skipped: usize,
    /// Actionable warnings (sheet fallbacks, odd cells) — not boilerplate.
    pub warnings: Vec<String>,
}

impl IngestReport {
    /// One-line summary suitable for display.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} equipment", self.equipment_rows)];
        if self.calibration_rows > 0 {
            parts.push(format!("{} consolidated calibrations", self.calibration_rows));
        }
        if self.maintenance_flags > 0 {
            parts.push(format!("{} in external maintenance", self.maintenance_flags));
        }
        if self.order_rows > 0 {
            parts.push(format!("{} open orders", self.order_rows));
        }
        if self.inspection_rows > 0 {
            parts.push(format!("{} inspection results", self.inspection_rows));
        }
        parts.join(" · ")
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Single-line warning summary, when there is anything to say.
    pub fn warning_summary(&self) -> Option<String> {
        if self.warnings.is_empty() {
            None
        } else {
            Some(format!("Load issues: {}", self.warnings.join("; ")))
        }
    }
}

// ---------------------------------------------------------------------------
// File reading
// ---------------------------------------------------------------------------

/// Read every sheet of a workbook file. CSV/TSV files read as a single
/// sheet named after the file stem.
pub fn read_workbook(path: &Path) -> Result<Vec<SheetTable>, ReadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();
    if matches!(extension.as_str(), "csv" | "tsv" | "txt") {
        return crate::csv::read_table(path).map(|table| vec![table]);
    }

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ReadError::FileRead(format!("{}: {e}", path.display())))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(ReadError::FileRead(format!(
            "{}: workbook contains no sheets",
            path.display()
        )));
    }

    let mut tables = Vec::with_capacity(sheet_names.len());
    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| ReadError::FileRead(format!("sheet '{sheet_name}': {e}")))?;

        let mut rows = range.rows().map(|row| {
            row.iter()
                .map(|data| match data {
                    Data::Empty => Cell::Empty,
                    Data::String(s) => Cell::Text(s.clone()),
                    Data::Float(n) => Cell::Number(*n),
                    Data::Int(n) => Cell::Number(*n as f64),
                    Data::Bool(b) => Cell::Bool(*b),
                    Data::DateTime(dt) => Cell::Number(dt.as_f64()),
                    Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
                    Data::Error(e) => Cell::Text(format!("#{e:?}")),
                })
                .collect::<Vec<Cell>>()
        });

        let headers: Vec<String> = rows
            .next()
            .unwrap_or_default()
            .iter()
            .map(Cell::as_string)
            .collect();

        tables.push(SheetTable {
            name: sheet_name.clone(),
            headers,
            rows: rows.collect(),
        });
    }

    Ok(tables)
}

/// Find a sheet by any of the wanted names (case/diacritic-insensitive).
pub fn find_sheet<'a>(
    tables: &'a [SheetTable],
    wanted: &[&str],
) -> Result<&'a SheetTable, ReadError> {
    for name in wanted {
        let target = normalize_text(name);
        if let Some(table) = tables.iter().find(|t| normalize_text(&t.name) == target) {
            return Ok(table);
        }
    }
    Err(ReadError::SheetNotFound {
        name: wanted.first().copied().unwrap_or_default().to_string(),
    })
}

/// Find a wanted sheet, falling back to the first one with a warning —
/// a missing sheet name is recoverable, never fatal.
fn sheet_or_first<'a>(
    tables: &'a [SheetTable],
    wanted: &[&str],
    report: &mut IngestReport,
) -> Option<&'a SheetTable> {
    match find_sheet(tables, wanted) {
        Ok(table) => Some(table),
        Err(_) => {
            let first = tables.first()?;
            report.warnings.push(format!(
                "sheet '{}' not found; using first sheet '{}'",
                wanted.first().copied().unwrap_or_default(),
                first.name
            ));
            Some(first)
        }
    }
}

// ---------------------------------------------------------------------------
// Typed extraction
// ---------------------------------------------------------------------------

/// Resolved meaning of each column of a sheet: a canonical field, or the
/// sanitized fallback key for unrecognized headers.
enum Column {
    Known(Field),
    Fallback(String),
}

fn map_columns(
    headers: &[String],
    aliases: &'static [(Field, &'static [&'static str])],
) -> Vec<Column> {
    headers
        .iter()
        .map(|raw| match resolve(aliases, raw) {
            Some(field) => Column::Known(field),
            None => Column::Fallback(header_key(raw)),
        })
        .collect()
}

fn row_is_empty(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_empty)
}

/// Extract master-registry records. Rows flagged "Manutenção Externa" also
/// contribute their serial to the maintenance list.
pub fn equipment_records(
    table: &SheetTable,
    report: &mut IngestReport,
) -> (Vec<EquipmentRecord>, Vec<String>) {
    let columns = map_columns(&table.headers, MASTER_ALIASES);
    let mut records = Vec::new();
    let mut maintenance = Vec::new();

    for row in &table.rows {
        if row_is_empty(row) {
            report.empty_rows_skipped += 1;
            continue;
        }

        let mut record = EquipmentRecord::default();
        let mut flagged = false;
        for (col, column) in columns.iter().enumerate() {
            let cell = table.cell(row, col);
            match column {
                Column::Known(Field::Tag) => record.tag = cell.as_string(),
                Column::Known(Field::Name) => record.name = cell.as_string(),
                Column::Known(Field::Model) => record.model = cell.as_string(),
                Column::Known(Field::Manufacturer) => record.manufacturer = cell.as_string(),
                Column::Known(Field::Sector) => record.sector = cell.as_string(),
                Column::Known(Field::SerialNumber) => record.serial_number = cell.as_string(),
                Column::Known(Field::AssetTag) => record.asset_tag = cell.as_string(),
                Column::Known(Field::CalibrationStatus) => {
                    record.raw_calibration_status = cell.as_string()
                }
                Column::Known(Field::CalibrationDue) => record.calibration_due = cell.as_serial(),
                Column::Known(Field::ExternalMaintenance) => flagged = !cell.is_empty(),
                Column::Known(_) => {} // field of another sheet kind
                Column::Fallback(key) => {
                    if !cell.is_empty() && !key.is_empty() {
                        record.extra.insert(key.clone(), cell.as_string());
                    }
                }
            }
        }

        if flagged && !record.serial_number.trim().is_empty() {
            maintenance.push(record.serial_number.clone());
        }
        records.push(record);
    }

    report.equipment_rows += records.len();
    report.maintenance_flags += maintenance.len();
    (records, maintenance)
}

/// Extract consolidation records (supplier calibrations).
pub fn calibration_records(
    table: &SheetTable,
    report: &mut IngestReport,
) -> Vec<CalibrationRecord> {
    let columns = map_columns(&table.headers, CONSOLIDATION_ALIASES);
    let mut records = Vec::new();

    for row in &table.rows {
        if row_is_empty(row) {
            report.empty_rows_skipped += 1;
            continue;
        }

        let mut record = CalibrationRecord::default();
        for (col, column) in columns.iter().enumerate() {
            let cell = table.cell(row, col);
            match column {
                Column::Known(Field::SerialNumber) => record.serial_number = cell.as_string(),
                Column::Known(Field::Supplier) => record.supplier = cell.as_string(),
                Column::Known(Field::CalibrationDate) => {
                    record.calibration_date = cell.as_serial()
                }
                Column::Known(_) => {}
                Column::Fallback(key) => {
                    if !cell.is_empty() && !key.is_empty() {
                        record.extra.insert(key.clone(), cell.as_string());
                    }
                }
            }
        }
        records.push(record);
    }

    report.calibration_rows += records.len();
    records
}

/// Extract open service orders.
pub fn order_records(table: &SheetTable, report: &mut IngestReport) -> Vec<ServiceOrderRecord> {
    let columns = map_columns(&table.headers, ORDER_ALIASES);
    let mut records = Vec::new();

    for row in &table.rows {
        if row_is_empty(row) {
            report.empty_rows_skipped += 1;
            continue;
        }

        let mut record = ServiceOrderRecord::default();
        for (col, column) in columns.iter().enumerate() {
            let cell = table.cell(row, col);
            match column {
                Column::Known(Field::OrderId) => record.order_id = cell.as_string(),
                Column::Known(Field::Tag) => record.tag = cell.as_string(),
                Column::Known(Field::SerialNumber) => record.serial_number = cell.as_string(),
                Column::Known(Field::AssetTag) => record.asset_tag = cell.as_string(),
                Column::Known(Field::Name) => record.name = cell.as_string(),
                Column::Known(Field::Model) => record.model = cell.as_string(),
                Column::Known(Field::Manufacturer) => record.manufacturer = cell.as_string(),
                _ => {}
            }
        }
        records.push(record);
    }

    report.order_rows += records.len();
    records
}

/// Extract inspection-round results.
pub fn inspection_records(
    table: &SheetTable,
    report: &mut IngestReport,
) -> Vec<InspectionResult> {
    let columns = map_columns(&table.headers, RONDA_ALIASES);
    // Older round exports carry a single "Setor" column: it is the observed
    // location, not the registry sector.
    let has_location = columns
        .iter()
        .any(|c| matches!(c, Column::Known(Field::Location)));
    let mut records = Vec::new();

    for row in &table.rows {
        if row_is_empty(row) {
            report.empty_rows_skipped += 1;
            continue;
        }

        let mut record = InspectionResult::default();
        let mut sector_seen = String::new();
        for (col, column) in columns.iter().enumerate() {
            let cell = table.cell(row, col);
            match column {
                Column::Known(Field::Tag) => record.tag = cell.as_string(),
                Column::Known(Field::Name) => record.name = cell.as_string(),
                Column::Known(Field::Sector) => sector_seen = cell.as_string(),
                Column::Known(Field::SerialNumber) => record.serial_number = cell.as_string(),
                Column::Known(Field::AssetTag) => record.asset_tag = cell.as_string(),
                Column::Known(Field::Location) => record.observed_sector = cell.as_string(),
                Column::Known(Field::Status) => record.status = cell.as_string(),
                Column::Known(Field::Notes) => record.notes = cell.as_string(),
                Column::Known(Field::RoundDate) => record.date = cell.as_string(),
                Column::Known(Field::RoundTime) => record.time = cell.as_string(),
                _ => {}
            }
        }
        if has_location {
            record.sector = sector_seen;
        } else {
            record.observed_sector = sector_seen;
        }
        records.push(record);
    }

    report.inspection_rows += records.len();
    records
}

// ---------------------------------------------------------------------------
// Dataset assembly
// ---------------------------------------------------------------------------

/// Recognized sheet names per kind. The master falls back to the first
/// sheet; the others are picked up from the master workbook only when a
/// recognized name is present.
const MASTER_SHEETS: &[&str] = &["Equip_VBA", "Equipamentos"];
const CONSOLIDATION_SHEETS: &[&str] = &["Consolidação", "Consolidacao"];
const ORDER_SHEETS: &[&str] = &["OS", "OS Abertas"];
const RONDA_SHEETS: &[&str] = &["Ronda", "Ronda_Equipamentos"];

/// Load a full dataset: the master workbook plus optional companion files.
///
/// The master workbook may itself carry consolidation / order / ronda sheets
/// under their recognized names; a companion file replaces the homonymous
/// sheet kind. Returns the dataset and the load report.
pub fn load_dataset(
    master: &Path,
    consolidation: Option<&Path>,
    orders: Option<&Path>,
    ronda: Option<&Path>,
    maintenance: Option<&Path>,
) -> Result<(Dataset, IngestReport), ReadError> {
    let mut report = IngestReport::default();
    let mut dataset = Dataset::default();

    let tables = read_workbook(master)?;
    let Some(master_table) = sheet_or_first(&tables, MASTER_SHEETS, &mut report) else {
        return Err(ReadError::FileRead(format!(
            "{}: no readable sheets",
            master.display()
        )));
    };
    let (equipment, master_maintenance) = equipment_records(master_table, &mut report);
    dataset.equipment = equipment;
    dataset.maintenance = master_maintenance;

    // Companion sheet kinds inside the master workbook (quiet when absent)
    if let Ok(table) = find_sheet(&tables, CONSOLIDATION_SHEETS) {
        dataset.calibrations = calibration_records(table, &mut report);
    }
    if let Ok(table) = find_sheet(&tables, ORDER_SHEETS) {
        dataset.service_orders = order_records(table, &mut report);
    }
    if let Ok(table) = find_sheet(&tables, RONDA_SHEETS) {
        dataset.inspections = inspection_records(table, &mut report);
    }

    if let Some(path) = consolidation {
        let tables = read_workbook(path)?;
        if let Some(table) = sheet_or_first(&tables, CONSOLIDATION_SHEETS, &mut report) {
            dataset.calibrations = calibration_records(table, &mut report);
        }
    }
    if let Some(path) = orders {
        let tables = read_workbook(path)?;
        if let Some(table) = sheet_or_first(&tables, ORDER_SHEETS, &mut report) {
            dataset.service_orders = order_records(table, &mut report);
        }
    }
    if let Some(path) = ronda {
        let tables = read_workbook(path)?;
        if let Some(table) = sheet_or_first(&tables, RONDA_SHEETS, &mut report) {
            dataset.inspections = inspection_records(table, &mut report);
        }
    }
    if let Some(path) = maintenance {
        let tables = read_workbook(path)?;
        if let Some(table) = tables.first() {
            dataset
                .maintenance
                .extend(maintenance_serials(table, &mut report));
        }
    }

    Ok((dataset, report))
}

/// Read serials from a dedicated external-maintenance file: the serial
/// column when one is recognized, the first column otherwise.
pub fn maintenance_serials(table: &SheetTable, report: &mut IngestReport) -> Vec<String> {
    let serial_col = table
        .headers
        .iter()
        .position(|h| resolve(MASTER_ALIASES, h) == Some(Field::SerialNumber))
        .unwrap_or(0);

    let mut serials = Vec::new();
    for row in &table.rows {
        if row_is_empty(row) {
            report.empty_rows_skipped += 1;
            continue;
        }
        let value = table.cell(row, serial_col).as_string();
        if !value.is_empty() {
            serials.push(value);
        }
    }
    report.maintenance_flags += serials.len();
    serials
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, headers: &[&str], rows: Vec<Vec<Cell>>) -> SheetTable {
        SheetTable {
            name: name.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.into())
    }

    #[test]
    fn cell_string_coercion() {
        assert_eq!(Cell::Number(123.0).as_string(), "123");
        assert_eq!(Cell::Number(1.5).as_string(), "1.5");
        assert_eq!(Cell::Text("  x ".into()).as_string(), "x");
        assert_eq!(Cell::Empty.as_string(), "");
    }

    #[test]
    fn equipment_extraction_with_fallback_columns() {
        let sheet = table(
            "Equip_VBA",
            &["TAG", "Equipamento", "Setor", "Nº Série", "Patrimônio", "Centro de Custo"],
            vec![
                vec![
                    text("T1"),
                    text("Monitor"),
                    text("UTI"),
                    Cell::Number(7.0),
                    text("P-1"),
                    text("CC-55"),
                ],
                vec![Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty],
            ],
        );
        let mut report = IngestReport::default();
        let (records, maintenance) = equipment_records(&sheet, &mut report);
        assert_eq!(records.len(), 1);
        assert_eq!(report.empty_rows_skipped, 1);
        assert!(maintenance.is_empty());

        let eq = &records[0];
        assert_eq!(eq.serial_number, "7");
        assert_eq!(eq.extra.get("centrodecusto").map(String::as_str), Some("CC-55"));
    }

    #[test]
    fn maintenance_column_flags_serial() {
        let sheet = table(
            "Equip_VBA",
            &["Nº Série", "Manutenção Externa"],
            vec![
                vec![text("007"), text("Sim")],
                vec![text("008"), Cell::Empty],
            ],
        );
        let mut report = IngestReport::default();
        let (records, maintenance) = equipment_records(&sheet, &mut report);
        assert_eq!(records.len(), 2);
        assert_eq!(maintenance, vec!["007".to_string()]);
        assert_eq!(report.maintenance_flags, 1);
    }

    #[test]
    fn consolidation_extraction() {
        let sheet = table(
            "Consolidação",
            &["Número de Série", "Fornecedor", "Data de Calibração"],
            vec![vec![text("42"), text("AcmeCal"), Cell::Number(45000.0)]],
        );
        let mut report = IngestReport::default();
        let records = calibration_records(&sheet, &mut report);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].supplier, "AcmeCal");
        assert_eq!(records[0].calibration_date, Some(45000.0));
    }

    #[test]
    fn header_only_sheet_yields_empty_list() {
        let sheet = table("Consolidação", &["Número de Série", "Fornecedor"], vec![]);
        let mut report = IngestReport::default();
        assert!(calibration_records(&sheet, &mut report).is_empty());
        assert_eq!(report.calibration_rows, 0);
    }

    #[test]
    fn find_sheet_diacritic_insensitive() {
        let tables = vec![
            table("Plan1", &[], vec![]),
            table("CONSOLIDACAO", &[], vec![]),
        ];
        assert!(find_sheet(&tables, &["Consolidação"]).is_ok());
        assert!(matches!(
            find_sheet(&tables, &["Ronda"]),
            Err(ReadError::SheetNotFound { .. })
        ));
    }

    #[test]
    fn ronda_extraction_prefers_location_column() {
        let sheet = table(
            "Ronda",
            &["TAG", "Setor", "Nº de Série", "Localização", "Status"],
            vec![vec![
                text("T1"),
                text("UTI"),
                text("7"),
                text("Centro Cirúrgico"),
                text("Localizado"),
            ]],
        );
        let mut report = IngestReport::default();
        let records = inspection_records(&sheet, &mut report);
        assert_eq!(records[0].sector, "UTI");
        assert_eq!(records[0].observed_sector, "Centro Cirúrgico");
        assert_eq!(records[0].status, "Localizado");
    }

    #[test]
    fn ronda_without_location_column_treats_sector_as_observed() {
        let sheet = table(
            "Ronda",
            &["Nº de Série", "Setor", "Status"],
            vec![vec![text("7"), text("Centro Cirúrgico"), text("Localizado")]],
        );
        let mut report = IngestReport::default();
        let records = inspection_records(&sheet, &mut report);
        assert_eq!(records[0].observed_sector, "Centro Cirúrgico");
        assert_eq!(records[0].sector, "");
    }

    #[test]
    fn order_extraction() {
        let sheet = table(
            "OS",
            &["OS", "Patrimônio", "Nº Série", "Equipamento", "Modelo", "Fabricante"],
            vec![vec![
                Cell::Number(1234.0),
                text("P-1"),
                text("42"),
                text("Bomba"),
                text("X1"),
                text("Acme"),
            ]],
        );
        let mut report = IngestReport::default();
        let records = order_records(&sheet, &mut report);
        assert_eq!(records[0].order_id, "1234");
        assert_eq!(records[0].name, "Bomba");
    }
}
