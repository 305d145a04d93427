//! # Path store module
//!
//! Saving and loading of [`PathFile`] documents as pretty-printed JSON.
//!
//! Loading upgrades legacy (pre-1.2) documents in place: when the
//! `motion_profile` section is absent the profile is regenerated from the
//! metadata limits, using the deceleration and jerk values the original
//! editor assumed before those limits were persisted.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;

// Internal
use crate::motion_profile::{self, ProfileError, DEFAULT_NUM_SAMPLES};
use plan_if::doc::{MotionProfileDoc, PathFile};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Deceleration limit assumed for legacy documents, which only persisted an
/// acceleration limit.
const LEGACY_MAX_DECEL: f64 = 100.0;

/// Jerk limit assumed for legacy documents.
const LEGACY_MAX_JERK: f64 = 500.0;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors raised when saving or loading a path document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Cannot read the path file: {0}")]
    FileReadError(std::io::Error),

    #[error("Cannot write the path file: {0}")]
    FileWriteError(std::io::Error),

    #[error("Cannot parse the path file: {0}")]
    ParseError(serde_json::Error),

    #[error("Cannot serialise the path document: {0}")]
    SerialiseError(serde_json::Error),

    #[error("Cannot regenerate the motion profile of a legacy document: {0}")]
    UpgradeError(#[from] ProfileError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Save a path document as pretty-printed JSON.
pub fn save(path: &std::path::Path, doc: &PathFile) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(doc).map_err(StoreError::SerialiseError)?;

    std::fs::write(path, json).map_err(StoreError::FileWriteError)
}

/// Load a path document, upgrading legacy documents in place.
///
/// Documents without a `motion_profile` section get one regenerated from
/// the metadata limits, so callers always see a v1.2-shaped document.
pub fn load(path: &std::path::Path) -> Result<PathFile, StoreError> {
    let json = std::fs::read_to_string(path).map_err(StoreError::FileReadError)?;

    let mut doc: PathFile = serde_json::from_str(&json).map_err(StoreError::ParseError)?;

    if doc.motion_profile.is_none() {
        info!(
            "Path file {:?} is a legacy (v{}) document, regenerating its motion profile",
            path, doc.metadata.version
        );

        doc.motion_profile = Some(upgrade_profile(&doc)?);
    }

    Ok(doc)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the motion profile section of a legacy document from its metadata.
fn upgrade_profile(doc: &PathFile) -> Result<MotionProfileDoc, StoreError> {
    let profile_points = motion_profile::generate(
        doc.metadata.profile_type,
        doc.metadata.path_length,
        doc.metadata.max_velocity,
        doc.metadata.max_acceleration,
        LEGACY_MAX_DECEL,
        LEGACY_MAX_JERK,
        DEFAULT_NUM_SAMPLES,
    )?;

    Ok(MotionProfileDoc {
        profile_type: doc.metadata.profile_type,
        max_speed: doc.metadata.max_velocity,
        max_acceleration: doc.metadata.max_acceleration,
        max_deceleration: LEGACY_MAX_DECEL,
        max_jerk: LEGACY_MAX_JERK,
        profile_points,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use plan_if::doc::{ActionPoint, Metadata, CURRENT_VERSION};
    use plan_if::traj::{ControlPoint, ProfileType};
    use std::collections::BTreeMap;

    fn temp_file(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(name)
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut action_points = BTreeMap::new();
        action_points.insert(
            0,
            ActionPoint {
                intake: Some("intakeToBackpack".to_string()),
                tongue: None,
                aligner: Some(false),
            },
        );

        let doc = PathFile {
            metadata: Metadata {
                version: CURRENT_VERSION.to_string(),
                path_length: 50.0,
                total_time: 1.43,
                max_velocity: 60.0,
                max_acceleration: 100.0,
                max_angular_velocity: 3.0,
                profile_type: ProfileType::SCurve,
            },
            control_points: vec![
                ControlPoint { x: 0.0, y: 0.0 },
                ControlPoint { x: 0.0, y: 50.0 },
            ],
            action_points,
            trajectory: vec![],
            motion_profile: Some(MotionProfileDoc {
                profile_type: ProfileType::SCurve,
                max_speed: 60.0,
                max_acceleration: 100.0,
                max_deceleration: 100.0,
                max_jerk: 500.0,
                profile_points: vec![],
            }),
        };

        let path = temp_file("traj_store_round_trip.json");
        save(&path, &doc).unwrap();

        let loaded = load(&path).unwrap();

        assert_eq!(loaded.metadata.version, CURRENT_VERSION);
        assert_eq!(loaded.control_points, doc.control_points);
        assert_eq!(loaded.action_points, doc.action_points);
        assert_eq!(
            loaded.motion_profile.as_ref().unwrap().profile_type,
            ProfileType::SCurve
        );

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_legacy_load_regenerates_profile() {
        let json = r#"{
            "metadata": {"version": "1.0", "path_length": 50.0},
            "control_points": [
                {"x": 0.0, "y": 0.0},
                {"x": 0.0, "y": 50.0}
            ]
        }"#;

        let path = temp_file("traj_store_legacy.json");
        std::fs::write(&path, json).unwrap();

        let loaded = load(&path).unwrap();

        let profile = loaded.motion_profile.expect("profile not regenerated");
        assert_eq!(profile.profile_type, ProfileType::Trapezoidal);
        assert_eq!(profile.max_speed, 60.0);
        assert_eq!(profile.max_deceleration, LEGACY_MAX_DECEL);
        assert_eq!(profile.max_jerk, LEGACY_MAX_JERK);
        assert_eq!(profile.profile_points.len(), DEFAULT_NUM_SAMPLES);

        // The regenerated profile actually moves
        assert!(profile.profile_points.iter().any(|s| s.velocity > 0.0));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load(std::path::Path::new("/nonexistent/path.json"));
        assert!(matches!(result, Err(StoreError::FileReadError(_))));
    }
}
