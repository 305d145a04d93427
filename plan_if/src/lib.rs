//! # Planning interface crate.
//!
//! Provides the plain data types exchanged between the trajectory core and
//! its external callers: control points, trajectory points, motion profile
//! samples, robot state snapshots, and the persisted path document.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Core wire types shared by all operations
pub mod traj;

/// Request and response definitions for the planning operations
pub mod msg;

/// The persisted path document (save/load interchange format)
pub mod doc;
