//! Identifier and text normalization.
//!
//! `normalize_id` is the sole identity-equality definition for equipment
//! across the entire system: every join, filter, and divergence check routes
//! through it.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalize a raw serial number or asset tag into a comparison key.
///
/// - Empty/whitespace input → empty string.
/// - All decimal digits → leading zeros stripped (`"00123"` → `"123"`),
///   which also erases the `.0` artifacts numeric spreadsheet cells pick up
///   once they are printed as integers.
/// - Anything else → trimmed and lowercased.
///
/// Pure and idempotent.
pub fn normalize_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let stripped = trimmed.trim_start_matches('0');
        if stripped.is_empty() {
            return "0".to_string();
        }
        return stripped.to_string();
    }
    trimmed.to_lowercase()
}

/// Normalize free text for comparison: trim, NFD-decompose, drop combining
/// marks, collapse whitespace runs, uppercase.
///
/// Used for sector comparison (`"Centro Cirúrgico "` → `"CENTRO CIRURGICO"`)
/// and sheet-name/header matching.
pub fn normalize_text(raw: &str) -> String {
    let folded: String = raw.nfd().filter(|c| !is_combining_mark(*c)).collect();
    folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace() {
        assert_eq!(normalize_id(""), "");
        assert_eq!(normalize_id("   "), "");
    }

    #[test]
    fn leading_zeros_stripped() {
        assert_eq!(normalize_id("00123"), "123");
        assert_eq!(normalize_id("123"), "123");
        assert_eq!(normalize_id(" 0042 "), "42");
        assert_eq!(normalize_id("000"), "0");
    }

    #[test]
    fn non_numeric_lowercased() {
        assert_eq!(normalize_id("AB-123"), "ab-123");
        assert_eq!(normalize_id("  SN77x "), "sn77x");
    }

    #[test]
    fn idempotent() {
        for raw in ["00123", "AB-123", "", "  42 ", "X09"] {
            let once = normalize_id(raw);
            assert_eq!(normalize_id(&once), once);
        }
    }

    #[test]
    fn long_numeric_ids_keep_all_digits() {
        // Beyond u64 range; must not be truncated or rounded
        assert_eq!(
            normalize_id("0099999999999999999999991"),
            "99999999999999999999991"
        );
    }

    #[test]
    fn text_fold_strips_accents_and_case() {
        assert_eq!(normalize_text("Centro Cirúrgico "), "CENTRO CIRURGICO");
        assert_eq!(normalize_text("  uti   neonatal"), "UTI NEONATAL");
        assert_eq!(normalize_text("Manutenção"), "MANUTENCAO");
    }

    #[test]
    fn text_fold_idempotent() {
        let once = normalize_text("Pós-Operatório");
        assert_eq!(normalize_text(&once), once);
    }
}
