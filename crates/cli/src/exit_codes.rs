//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `tally` exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                             |
//! |------|-----------------------------------------------------|
//! | 0    | Both files reconcile (no unmatched records)         |
//! | 1    | Reconciliation ran and found unmatched records      |
//! | 2    | Usage error, missing or empty input file            |
//! | 3    | Config could not be parsed or failed validation     |
//! | 4    | A CSV source could not be read into records         |
//! | 5    | IO failure, including exhausted retries             |

use tally_recon::ErrorKind;

/// Success - every record on both sides matched.
pub const EXIT_SUCCESS: u8 = 0;

/// Unmatched records found. Like `diff(1)`, exit 1 means "files differ."
pub const EXIT_UNMATCHED: u8 = 1;

/// Usage error - bad arguments, missing/empty input file, unreadable config path.
pub const EXIT_USAGE: u8 = 2;

/// Invalid config (TOML syntax, unknown key, failed validation).
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// CSV processing error or a record that cannot be keyed.
pub const EXIT_CSV: u8 = 4;

/// IO error, or every retry attempt failed.
pub const EXIT_RUNTIME: u8 = 5;

/// Map an engine error kind to its exit code.
pub fn error_exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::InvalidInput => EXIT_USAGE,
        ErrorKind::ConfigParse | ErrorKind::ConfigValidation => EXIT_INVALID_CONFIG,
        ErrorKind::CsvProcessing | ErrorKind::MalformedRecord => EXIT_CSV,
        ErrorKind::RetryExhausted | ErrorKind::Io => EXIT_RUNTIME,
    }
}
