//! Stable exit codes for recruiter CLI commands.

/// Command succeeded, or the session ended with an enlistment.
pub const OK: i32 = 0;
/// Invalid config/catalog, bootstrap failure, or other errors.
pub const INVALID: i32 = 1;
/// The session ended in a refusal (timeout, rejection, bad reply).
pub const REFUSED: i32 = 2;
