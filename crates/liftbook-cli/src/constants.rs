//! Constants used throughout the CLI.

/// Page size used by list commands when neither `--limit` nor the config sets one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// SQLite busy timeout written to new config files.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (storage failures, unexpected errors)
/// - 2: Misuse of shell command (reserved by shells, used by clap)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Unexpected or storage-level failure.
    pub const INTERNAL: i32 = 1;

    /// Resource not found (config, workout, session, set, exercise).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or payload.
    pub const INVALID_INPUT: i32 = 4;

    /// Payload refers to rows that belong to another workout or session.
    pub const CONFLICT: i32 = 5;

    /// Integrity check failed.
    pub const INTEGRITY_FAILED: i32 = 6;
}
