//! Session management
//!
//! A session is a timestamped directory under the software root which
//! collects everything produced by one execution: the log file and any JSON
//! artefacts (telemetry traces, solved profiles) saved during the run.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

// Internal imports
use crate::host;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// A chrono format string which diplays a timestamp. See
/// https://docs.rs/chrono/0.4.11/chrono/format/strftime/index.html for more
/// information.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A struct storing information about the current session
#[derive(Clone, Debug)]
pub struct Session {
    /// The root directory for this session
    pub session_root: PathBuf,

    /// The path to the session's log file
    pub log_file_path: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors associated with the session module.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Cannot create the session directory: {0}")]
    CannotCreateDir(std::io::Error),

    #[error("Cannot serialise the data to be saved: {0}")]
    SerialiseError(serde_json::Error),

    #[error("Cannot write the archive file: {0}")]
    WriteError(std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Create a new session for the given executable.
    ///
    /// The session directory is created under `<sw_root>/<sessions_dir>`
    /// and is named with the executable name and a timestamp, for example
    /// `sessions/traj_exec_20240101_120000`.
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        // Timestamp for this session
        let timestamp = Utc::now().format(TIMESTAMP_FORMAT);

        // Build the session root path
        let mut session_root = host::get_sw_root();
        session_root.push(sessions_dir);
        session_root.push(format!("{}_{}", exec_name, timestamp));

        // Create the directory tree
        fs::create_dir_all(&session_root).map_err(SessionError::CannotCreateDir)?;

        // Log file lives at the top of the session directory
        let mut log_file_path = session_root.clone();
        log_file_path.push(format!("{}.log", exec_name));

        Ok(Self {
            session_root,
            log_file_path,
        })
    }

    /// Save a serialisable item as a pretty-printed JSON artefact in the
    /// session directory.
    pub fn save<T: Serialize>(&self, file_name: &str, data: &T) -> Result<(), SessionError> {
        let mut path = self.session_root.clone();
        path.push(file_name);

        let json = serde_json::to_string_pretty(data).map_err(SessionError::SerialiseError)?;

        fs::write(path, json).map_err(SessionError::WriteError)
    }
}
