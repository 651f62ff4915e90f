//! Declarative header-alias tables.
//!
//! The source workbooks spell the same column a dozen ways ("Nº Série",
//! "NÚMERO DE SÉRIE", "Nº de Série"). Each sheet kind gets one table of
//! canonical field → accepted spellings, matched on a sanitized key, so
//! every spelling is declared in exactly one place.

use caltrack_core::normalize_text;

/// Canonical logical fields across all sheet kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Tag,
    Name,
    Model,
    Manufacturer,
    Sector,
    SerialNumber,
    AssetTag,
    CalibrationStatus,
    CalibrationDue,
    ExternalMaintenance,
    Supplier,
    CalibrationDate,
    OrderId,
    Location,
    Status,
    Notes,
    RoundDate,
    RoundTime,
}

/// Sanitized lookup key for a header cell: diacritics folded, everything but
/// ASCII letters and digits dropped, lower-cased. `"Nº Série"` → `"nserie"`.
///
/// Doubles as the fallback key under which unrecognized headers are retained
/// — a column is never silently discarded.
pub fn header_key(raw: &str) -> String {
    normalize_text(raw)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

type AliasTable = &'static [(Field, &'static [&'static str])];

/// Master equipment registry ("Equip_VBA").
pub const MASTER_ALIASES: AliasTable = &[
    (Field::Tag, &["tag"]),
    (Field::Name, &["equipamento", "equipmento", "descricao"]),
    (Field::Model, &["modelo"]),
    (Field::Manufacturer, &["fabricante"]),
    (Field::Sector, &["setor"]),
    (
        Field::SerialNumber,
        &["nserie", "ndeserie", "numerodeserie", "numeroserie", "serie"],
    ),
    (Field::AssetTag, &["patrimonio", "npatrimonio"]),
    (
        Field::CalibrationStatus,
        &["statuscalibacao", "statuscalibracao"],
    ),
    (
        Field::CalibrationDue,
        &["datavencimentocalibracao", "vencimentocalibracao"],
    ),
    (Field::ExternalMaintenance, &["manutencaoexterna"]),
];

/// Calibration consolidation sheet.
pub const CONSOLIDATION_ALIASES: AliasTable = &[
    (
        Field::SerialNumber,
        &[
            "numerodeserie",
            "nserie",
            "ndeserie",
            "numeroserie",
            "numerodeserieconsolidacao",
        ],
    ),
    (Field::Supplier, &["fornecedor", "fornecedorconsolidacao"]),
    (
        Field::CalibrationDate,
        &[
            "datadecalibracao",
            "datacalibracao",
            "datacalibracaoconsolidada",
        ],
    ),
];

/// Open service orders.
pub const ORDER_ALIASES: AliasTable = &[
    (Field::OrderId, &["os", "ordemdeservico", "nos"]),
    (Field::AssetTag, &["patrimonio"]),
    (
        Field::SerialNumber,
        &["nserie", "ndeserie", "numerodeserie", "numeroserie"],
    ),
    (Field::Name, &["equipamento", "equipmento"]),
    (Field::Model, &["modelo"]),
    (Field::Manufacturer, &["fabricante"]),
];

/// Inspection-round ("ronda") sheet.
pub const RONDA_ALIASES: AliasTable = &[
    (Field::Tag, &["tag"]),
    (Field::Name, &["equipamento", "equipmento"]),
    (Field::Sector, &["setor"]),
    (
        Field::SerialNumber,
        &["nserie", "ndeserie", "numerodeserie", "numeroserie"],
    ),
    (Field::AssetTag, &["patrimonio"]),
    (Field::Location, &["localizacao", "local"]),
    (Field::Status, &["status", "disponibilidade"]),
    (Field::Notes, &["observacoes", "obs"]),
    (Field::RoundDate, &["datadaronda", "data"]),
    (Field::RoundTime, &["horadaronda", "hora"]),
];

/// Resolve a raw header against an alias table.
pub fn resolve(aliases: AliasTable, raw: &str) -> Option<Field> {
    let key = header_key(raw);
    for (field, spellings) in aliases {
        if spellings.contains(&key.as_str()) {
            return Some(*field);
        }
    }
    None
}
