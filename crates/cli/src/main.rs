// CalTrack CLI - headless calibration tracking over Excel workbooks

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use caltrack_io::{export, ingest, ReadError};
use caltrack_recon::orders::join_orders;
use caltrack_recon::ronda::{check_round, RondaSession};
use caltrack_recon::{apply_filters, build_indices, FilterSpec};
use caltrack_recon::filter::DivergenceFilter;

use exit_codes::{
    EXIT_ERROR, EXIT_FINDINGS, EXIT_INVALID_FILTER, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE,
};

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  caltrack-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

#[derive(Parser)]
#[command(name = "caltrack")]
#[command(about = "Equipment calibration tracking over Excel workbooks (headless)")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and list equipment with effective statuses
    #[command(after_help = "\
Examples:
  caltrack report parque.xlsx
  caltrack report parque.xlsx --consolidation consolidado.xlsx --sector UTI
  caltrack report parque.xlsx --search 42 --json
  caltrack report parque.xlsx --filter filtro.toml -o relatorio.xlsx")]
    Report {
        /// Master registry workbook
        master: PathBuf,

        /// Calibration-consolidation workbook
        #[arg(long)]
        consolidation: Option<PathBuf>,

        /// Open service-orders workbook
        #[arg(long)]
        os: Option<PathBuf>,

        /// Inspection-round workbook (enables location-divergence flags)
        #[arg(long)]
        ronda: Option<PathBuf>,

        /// Dedicated external-maintenance list
        #[arg(long)]
        maintenance_file: Option<PathBuf>,

        /// Exact-match sector filter
        #[arg(long)]
        sector: Option<String>,

        /// Calibration-status label filter (e.g. "Calibrado (Total)")
        #[arg(long)]
        status: Option<String>,

        /// Free-text search across serial, asset tag, and TAG
        #[arg(long)]
        search: Option<String>,

        /// Maintenance-status label filter
        #[arg(long)]
        maintenance: Option<String>,

        /// Filter spec TOML file (flags override its fields)
        #[arg(long)]
        filter: Option<PathBuf>,

        /// Output JSON to stdout instead of a table
        #[arg(long)]
        json: bool,

        /// Export the filtered view to an xlsx file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List supplier calibrations absent from the registry
    #[command(after_help = "\
Examples:
  caltrack divergence parque.xlsx --consolidation consolidado.xlsx
  caltrack divergence parque.xlsx --consolidation consolidado.xlsx --supplier AcmeCal")]
    Divergence {
        /// Master registry workbook
        master: PathBuf,

        /// Calibration-consolidation workbook
        #[arg(long)]
        consolidation: Option<PathBuf>,

        /// Restrict to one supplier (substring, case-insensitive)
        #[arg(long)]
        supplier: Option<String>,

        /// Output JSON to stdout instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List open service orders joined to the registry
    Os {
        /// Master registry workbook
        master: PathBuf,

        /// Open service-orders workbook
        #[arg(long)]
        orders: PathBuf,

        /// Output JSON to stdout instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Inspection-round session operations
    #[command(subcommand)]
    Ronda(RondaCommands),

    /// List sectors present in the master registry
    Sectors {
        /// Master registry workbook
        master: PathBuf,
    },
}

#[derive(Subcommand)]
enum RondaCommands {
    /// Start a round sheet for one sector
    #[command(after_help = "\
Examples:
  caltrack ronda init parque.xlsx --sector UTI
  caltrack ronda init parque.xlsx --sector UTI -o ronda_uti.xlsx")]
    Init {
        /// Master registry workbook
        master: PathBuf,

        /// Sector to walk
        #[arg(long)]
        sector: String,

        /// Output file (default: Ronda_Equipamentos_<date>.xlsx)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Check a filled round against the registry
    #[command(after_help = "\
Examples:
  caltrack ronda check parque.xlsx --ronda ronda_uti.xlsx")]
    Check {
        /// Master registry workbook
        master: PathBuf,

        /// Filled round workbook
        #[arg(long)]
        ronda: PathBuf,

        /// Output JSON to stdout instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    fn runtime(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    fn invalid_filter(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INVALID_FILTER, message: msg.into(), hint: None }
    }

    fn findings(msg: impl Into<String>) -> Self {
        Self { code: EXIT_FINDINGS, message: msg.into(), hint: None }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReadError> for CliError {
    fn from(err: ReadError) -> Self {
        CliError::io(err.to_string())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(err.code)
        }
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Report {
            master,
            consolidation,
            os,
            ronda,
            maintenance_file,
            sector,
            status,
            search,
            maintenance,
            filter,
            json,
            output,
        } => cmd_report(
            &master,
            consolidation.as_deref(),
            os.as_deref(),
            ronda.as_deref(),
            maintenance_file.as_deref(),
            ReportFilters { sector, status, search, maintenance, filter },
            json,
            output.as_deref(),
        ),
        Commands::Divergence { master, consolidation, supplier, json } => {
            cmd_divergence(&master, consolidation.as_deref(), supplier, json)
        }
        Commands::Os { master, orders, json } => cmd_os(&master, &orders, json),
        Commands::Ronda(RondaCommands::Init { master, sector, output }) => {
            cmd_ronda_init(&master, &sector, output.as_deref())
        }
        Commands::Ronda(RondaCommands::Check { master, ronda, json }) => {
            cmd_ronda_check(&master, &ronda, json)
        }
        Commands::Sectors { master } => cmd_sectors(&master),
    }
}

// ---------------------------------------------------------------------------
// report
// ---------------------------------------------------------------------------

struct ReportFilters {
    sector: Option<String>,
    status: Option<String>,
    search: Option<String>,
    maintenance: Option<String>,
    filter: Option<PathBuf>,
}

/// Build the effective filter spec: the TOML file first, command-line flags
/// overriding field by field.
fn effective_spec(filters: ReportFilters) -> Result<FilterSpec, CliError> {
    let mut spec = match &filters.filter {
        Some(path) => {
            let input = std::fs::read_to_string(path)
                .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))?;
            FilterSpec::from_toml(&input).map_err(|e| CliError::invalid_filter(e.to_string()))?
        }
        None => FilterSpec::default(),
    };

    if filters.sector.is_some() {
        spec.sector = filters.sector;
    }
    if filters.status.is_some() {
        spec.status = filters.status;
    }
    if filters.search.is_some() {
        spec.search = filters.search;
    }
    if filters.maintenance.is_some() {
        spec.maintenance = filters.maintenance;
    }
    Ok(spec)
}

#[allow(clippy::too_many_arguments)]
fn cmd_report(
    master: &Path,
    consolidation: Option<&Path>,
    os: Option<&Path>,
    ronda: Option<&Path>,
    maintenance_file: Option<&Path>,
    filters: ReportFilters,
    json: bool,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let (dataset, report) =
        ingest::load_dataset(master, consolidation, os, ronda, maintenance_file)?;
    eprintln!("loaded {}", report.summary());
    if let Some(warning) = report.warning_summary() {
        eprintln!("{warning}");
    }

    let indices = build_indices(&dataset);
    if indices.duplicate_count() > 0 {
        eprintln!(
            "warning: {} duplicate identities overwritten (last occurrence wins)",
            indices.duplicate_count()
        );
    }

    let spec = effective_spec(filters)?;
    let rows = apply_filters(&dataset, &indices, &spec);

    if json {
        let out = serde_json::to_string_pretty(&rows)
            .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;
        println!("{out}");
    } else {
        print_resolved(&rows);
    }
    eprintln!("Total: {} equipamentos", rows.len());

    if let Some(path) = output {
        export::write_report(path, &rows).map_err(CliError::io)?;
        eprintln!("wrote {}", path.display());
    }

    Ok(())
}

fn print_resolved(rows: &[caltrack_recon::ResolvedRecord]) {
    let headers = [
        "TAG",
        "Equipamento",
        "Setor",
        "Nº Série",
        "Patrimônio",
        "Status Calibração",
        "Data Calibração",
        "Status Manutenção",
    ];
    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.equipment.tag.clone(),
                row.equipment.name.clone(),
                row.equipment.sector.clone(),
                row.equipment.serial_number.clone(),
                row.equipment.asset_tag.clone(),
                row.calibration.label(),
                row.calibration.date_display(),
                row.maintenance.label().to_string(),
            ]
        })
        .collect();
    print_table(&headers, &table);
}

// ---------------------------------------------------------------------------
// divergence
// ---------------------------------------------------------------------------

fn cmd_divergence(
    master: &Path,
    consolidation: Option<&Path>,
    supplier: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let (dataset, report) = ingest::load_dataset(master, consolidation, None, None, None)?;
    eprintln!("loaded {}", report.summary());
    if dataset.calibrations.is_empty() {
        return Err(CliError::args("no consolidation data loaded")
            .with_hint("pass --consolidation or use a workbook with a 'Consolidação' sheet"));
    }

    let indices = build_indices(&dataset);
    let spec = FilterSpec {
        divergence: Some(DivergenceFilter { supplier }),
        ..Default::default()
    };
    let rows = apply_filters(&dataset, &indices, &spec);

    if json {
        let out = serde_json::to_string_pretty(&rows)
            .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;
        println!("{out}");
    } else {
        let table: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                vec![
                    row.equipment.serial_number.clone(),
                    row.equipment.manufacturer.clone(),
                    row.calibration.date_display(),
                ]
            })
            .collect();
        print_table(&["Número de Série", "Fornecedor", "Data de Calibração"], &table);
    }
    eprintln!("Total: {} divergências", rows.len());

    if rows.is_empty() {
        Ok(())
    } else {
        Err(CliError::findings(format!(
            "{} supplier divergence(s) found",
            rows.len()
        )))
    }
}

// ---------------------------------------------------------------------------
// os
// ---------------------------------------------------------------------------

fn cmd_os(master: &Path, orders: &Path, json: bool) -> Result<(), CliError> {
    let (dataset, report) = ingest::load_dataset(master, None, Some(orders), None, None)?;
    eprintln!("loaded {}", report.summary());

    let indices = build_indices(&dataset);
    let rows = join_orders(&dataset, &indices);

    if json {
        let out = serde_json::to_string_pretty(&rows)
            .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;
        println!("{out}");
    } else {
        let table: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                let mut flags = Vec::new();
                if row.calibrated {
                    flags.push("calibrado");
                }
                if row.in_external_maintenance {
                    flags.push("manutenção externa");
                }
                vec![
                    row.order_id.clone(),
                    row.asset_tag.clone(),
                    row.serial_number.clone(),
                    row.name.clone(),
                    row.model.clone(),
                    row.manufacturer.clone(),
                    row.sector.clone(),
                    flags.join(", "),
                ]
            })
            .collect();
        print_table(
            &["OS", "Patrimônio", "Nº Série", "Equipamento", "Modelo", "Fabricante", "Setor", ""],
            &table,
        );
    }
    eprintln!("Total: {} OS", rows.len());
    Ok(())
}

// ---------------------------------------------------------------------------
// ronda
// ---------------------------------------------------------------------------

fn cmd_ronda_init(master: &Path, sector: &str, output: Option<&Path>) -> Result<(), CliError> {
    let (dataset, report) = ingest::load_dataset(master, None, None, None, None)?;
    eprintln!("loaded {}", report.summary());

    let sectors = dataset.sectors();
    if !sectors.iter().any(|s| s == sector) {
        return Err(
            CliError::args(format!("sector '{sector}' not found in the registry"))
                .with_hint(format!("known sectors: {}", sectors.join(", "))),
        );
    }

    let session = RondaSession::init(&dataset.equipment, sector);
    let default_name = format!(
        "Ronda_Equipamentos_{}.xlsx",
        chrono::Local::now().format("%Y-%m-%d")
    );
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(default_name));

    export::write_ronda(&path, &session.items).map_err(CliError::io)?;
    eprintln!(
        "wrote {} equipamentos na ronda to {}",
        session.len(),
        path.display()
    );
    Ok(())
}

fn cmd_ronda_check(master: &Path, ronda: &Path, json: bool) -> Result<(), CliError> {
    let (dataset, report) = ingest::load_dataset(master, None, None, Some(ronda), None)?;
    eprintln!("loaded {}", report.summary());

    let indices = build_indices(&dataset);
    let check = check_round(&dataset, &indices);

    if json {
        let out = serde_json::to_string_pretty(&check)
            .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;
        println!("{out}");
    } else {
        let table: Vec<Vec<String>> = check
            .divergences
            .iter()
            .map(|d| {
                vec![
                    d.tag.clone(),
                    d.serial_number.clone(),
                    d.declared_sector.clone(),
                    d.observed_sector.clone(),
                ]
            })
            .collect();
        print_table(&["TAG", "Nº Série", "Setor Cadastro", "Setor Observado"], &table);
    }
    eprintln!(
        "{} inspecionados, {} divergências de localização",
        check.inspected,
        check.divergences.len()
    );

    if check.divergences.is_empty() {
        Ok(())
    } else {
        Err(CliError::findings(format!(
            "{} location divergence(s) found",
            check.divergences.len()
        )))
    }
}

// ---------------------------------------------------------------------------
// sectors
// ---------------------------------------------------------------------------

fn cmd_sectors(master: &Path) -> Result<(), CliError> {
    let (dataset, report) = ingest::load_dataset(master, None, None, None, None)?;
    eprintln!("loaded {}", report.summary());
    for sector in dataset.sectors() {
        println!("{sector}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// plain-table output
// ---------------------------------------------------------------------------

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let render = |cells: Vec<String>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{cell:<width$}", width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!(
        "{}",
        render(headers.iter().map(|h| h.to_string()).collect())
    );
    for row in rows {
        println!("{}", render(row.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_filter_file_fields() {
        let filters = ReportFilters {
            sector: Some("UTI".into()),
            status: None,
            search: Some("42".into()),
            maintenance: None,
            filter: None,
        };
        let spec = effective_spec(filters).unwrap();
        assert_eq!(spec.sector.as_deref(), Some("UTI"));
        assert_eq!(spec.search.as_deref(), Some("42"));
        assert!(spec.status.is_none());
    }

    #[test]
    fn missing_filter_file_is_io_error() {
        let filters = ReportFilters {
            sector: None,
            status: None,
            search: None,
            maintenance: None,
            filter: Some(PathBuf::from("/nonexistent/filtro.toml")),
        };
        let err = effective_spec(filters).unwrap_err();
        assert_eq!(err.code, EXIT_IO);
    }
}
