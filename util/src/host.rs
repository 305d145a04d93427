//! Host platform utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Environment variable pointing at the software root directory.
pub const SW_ROOT_ENV_VAR: &str = "PATHFINDER_SW_ROOT";

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the software root directory.
///
/// If the `PATHFINDER_SW_ROOT` environment variable is set its value is
/// used, otherwise the current working directory is assumed to be the root.
pub fn get_sw_root() -> PathBuf {
    match std::env::var(SW_ROOT_ENV_VAR) {
        Ok(root) => PathBuf::from(root),
        Err(_) => PathBuf::from("."),
    }
}
