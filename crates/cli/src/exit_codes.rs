// Exit code registry - single source of truth for scripted callers

pub const EXIT_SUCCESS: u8 = 0;
/// Unspecified runtime failure.
pub const EXIT_ERROR: u8 = 1;
/// Bad arguments (unknown sector, contradictory flags).
pub const EXIT_USAGE: u8 = 2;
/// File could not be read or written.
pub const EXIT_IO: u8 = 3;
/// Filter spec failed to parse or validate.
pub const EXIT_INVALID_FILTER: u8 = 4;
/// The requested check found anomalies (supplier divergences, location
/// mismatches). Distinct from failure so CI can tell them apart.
pub const EXIT_FINDINGS: u8 = 10;
