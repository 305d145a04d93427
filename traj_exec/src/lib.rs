//! # Trajectory library.
//!
//! This library holds the four core stages of the trajectory software:
//! path generation, motion profile synthesis, the tracking controller and
//! the closed-loop simulator, plus the path document store.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Path generation module - converts control points into a sampled trajectory
pub mod path_gen;

/// Motion profile module - synthesises distance-parameterised velocity profiles
pub mod motion_profile;

/// Trajectory control module - keeps the robot on the given trajectory
pub mod traj_ctrl;

/// Simulation module - closes the tracking loop over a kinematic robot model
pub mod sim;

/// Path document store - save/load of planned paths with schema upgrade
pub mod store;
