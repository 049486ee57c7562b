//! Stable exit codes for task-runner CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// The task definition, resources or config are invalid.
pub const INVALID: i32 = 1;
/// The task loaded but the command could not finish (e.g. writing the result).
pub const FAILED: i32 = 2;
