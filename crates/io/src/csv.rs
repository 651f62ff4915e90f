// CSV/TSV ingestion
//
// Some sites export the registry or consolidation list as CSV. Files are
// decoded with a Windows-1252 fallback (common for Excel-exported CSVs) and
// the delimiter is sniffed before parsing.

use std::io::Read;
use std::path::Path;

use crate::error::ReadError;
use crate::ingest::{Cell, SheetTable};

/// Read a delimited file as a single sheet named after the file stem.
pub fn read_table(path: &Path) -> Result<SheetTable, ReadError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Plan1")
        .to_string();
    table_from_string(&content, delimiter, name)
}

/// Read file bytes and convert to UTF-8, falling back to Windows-1252.
fn read_file_as_utf8(path: &Path) -> Result<String, ReadError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| ReadError::FileRead(format!("{}: {e}", path.display())))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| ReadError::FileRead(format!("{}: {e}", path.display())))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Detect the most likely field delimiter by checking field-count
/// consistency across the first few lines. The candidate producing the most
/// consistent count (>1 field) wins; higher field counts break ties.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample: Vec<&str> = content.lines().take(10).collect();
    if sample.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;
    for &delimiter in candidates {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delimiter)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        let target = counts.first().copied().unwrap_or(0);
        if target <= 1 {
            continue;
        }
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;
        if score > best_score {
            best_score = score;
            best = delimiter;
        }
    }
    best
}

fn table_from_string(content: &str, delimiter: u8, name: String) -> Result<SheetTable, ReadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ReadError::FileRead(e.to_string()))?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    let mut rows = rows.into_iter();
    let headers: Vec<String> = rows
        .next()
        .unwrap_or_default()
        .iter()
        .map(Cell::as_string)
        .collect();

    Ok(SheetTable {
        name,
        headers,
        rows: rows.collect(),
    })
}
