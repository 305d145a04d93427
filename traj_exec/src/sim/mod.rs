//! # Simulation module
//!
//! Closes the tracking loop over a kinematic unicycle model. Each call to
//! [`Simulation::step`] performs one fixed time step:
//!
//! 1. Look up the target velocity for the distance travelled so far.
//! 2. Find the trajectory point closest to the current pose.
//! 3. Walk forward from it by the lookahead distance to pick a reference.
//! 4. Derive the reference angular velocity from the local heading change.
//! 5. Evaluate the tracking controller.
//! 6. Apply acceleration-limited velocity dynamics.
//! 7. Integrate the unicycle kinematics (field heading convention).
//! 8. Clamp the position to the field boundary.
//! 9. Update finite-difference acceleration/jerk and the completion test.
//!
//! The simulation is an explicit session object owned by the caller; there
//! is no process-wide instance. Each step returns an immutable state
//! snapshot, so a display layer never aliases the simulator's own pose.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use state::Simulation;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default step period used by external drivers.
pub const DEFAULT_STEP_DT_S: f64 = 0.01;

/// Fraction of the path length that must be travelled before the
/// completion test can fire.
pub(crate) const COMPLETION_PATH_FRACTION: f64 = 0.95;

/// Maximum distance to the final trajectory point for completion, in field
/// units.
pub(crate) const COMPLETION_END_DISTANCE: f64 = 8.0;

/// Maximum speed at which the run may be declared complete.
pub(crate) const COMPLETION_MAX_SPEED: f64 = 2.0;

/// Travelled-distance overrun at which the run is stopped regardless of
/// pose, as a fraction of the path length.
pub(crate) const OVERRUN_PATH_FRACTION: f64 = 1.1;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during a simulation step.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The integrated state stopped being finite, e.g. because a caller
    /// supplied non-finite parameters. The run is stopped rather than
    /// continuing with corrupted state.
    #[error("Simulation state became non-finite at t = {0} s; run stopped")]
    NonFiniteState(f64),
}
