//! Stable exit codes for manuscript CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed (missing chapter, invalid order, I/O error, ...).
pub const INVALID: i32 = 1;
/// A batch bump finished but some chapters failed.
pub const PARTIAL: i32 = 2;
/// `manuscript check` found invariant violations.
pub const UNHEALTHY: i32 = 3;
