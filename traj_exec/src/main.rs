//! Trajectory executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session and logging
//!     - Load parameters
//!     - Load a path document (CLI argument) or use the built-in demo path
//!     - Generate the trajectory and motion profile
//!     - Main loop: step the closed-loop simulation at a fixed period
//!     - Save the telemetry trace into the session
//!
//! Running with no arguments drives the demo path; passing a path to a
//! saved path document (JSON) drives that path instead.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use traj_lib::{motion_profile, path_gen, sim::Simulation, store};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use serde::Deserialize;
use std::env;

// Internal
use plan_if::msg::{SimStartRequest, StartParams};
use plan_if::traj::{ControlPoint, ControllerGains, ProfileType, RobotState, SimulationParameters};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Period of one simulation step.
const STEP_PERIOD_S: f64 = 0.01;

/// Upper bound on the number of steps in one run, so a misconfigured run
/// cannot loop forever.
const MAX_STEPS: usize = 60_000;

/// Number of steps between progress log records.
const LOG_DECIMATION: usize = 100;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the executable, usually loaded from `traj_exec.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ExecParams {
    profile: ProfileParams,
    sim: SimulationParameters,
    gains: ControllerGains,
}

/// Kinematic limits for motion profile synthesis.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ProfileParams {
    #[serde(rename = "type")]
    profile_type: ProfileType,
    max_vel: f64,
    max_accel: f64,
    max_decel: f64,
    max_jerk: f64,
    num_samples: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ProfileParams {
    fn default() -> Self {
        Self {
            profile_type: ProfileType::default(),
            max_vel: 60.0,
            max_accel: 100.0,
            max_decel: 100.0,
            max_jerk: 500.0,
            num_samples: motion_profile::DEFAULT_NUM_SAMPLES,
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("traj_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Trajectory Planner Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: ExecParams = match util::params::load("traj_exec.toml") {
        Ok(p) => p,
        Err(e) => {
            warn!("Could not load exec params, using defaults: {}", e);
            ExecParams::default()
        }
    };

    debug!("Exec parameters: {:?}", params);

    // ---- LOAD PATH ----

    let args: Vec<String> = env::args().collect();

    let control_points = if args.len() == 2 {
        info!("Loading path document from \"{}\"", &args[1]);

        let doc = store::load(std::path::Path::new(&args[1]))
            .wrap_err("Failed to load the path document")?;

        info!(
            "Path document loaded: schema v{}, {} control points",
            doc.metadata.version,
            doc.control_points.len()
        );

        doc.control_points
    } else {
        info!("No path document given, using the demo path");
        demo_path()
    };

    if control_points.len() < 2 {
        return Err(eyre!(
            "The path has {} control points, at least 2 are needed",
            control_points.len()
        ));
    }

    // ---- GENERATE TRAJECTORY AND PROFILE ----

    let path = path_gen::generate(&control_points);

    info!(
        "Trajectory generated: {} points over {:.2} units",
        path.trajectory.len(),
        path.length
    );

    let profile = motion_profile::generate(
        params.profile.profile_type,
        path.length,
        params.profile.max_vel,
        params.profile.max_accel,
        params.profile.max_decel,
        params.profile.max_jerk,
        params.profile.num_samples,
    )
    .wrap_err("Failed to generate the motion profile")?;

    info!(
        "Motion profile generated: {:?}, {} samples",
        params.profile.profile_type,
        profile.len()
    );

    session
        .save("trajectory.json", &path)
        .wrap_err("Failed to save the trajectory")?;
    session
        .save("profile.json", &profile)
        .wrap_err("Failed to save the profile")?;

    // ---- RUN SIMULATION ----

    // Start at the first trajectory point, facing along it. The start pose
    // heading is given in degrees on the wire.
    let start = &path.trajectory[0];
    let start_pose = [start.x, start.y, start.theta.to_degrees()];

    let mut simulation = Simulation::new();
    simulation.start(SimStartRequest {
        trajectory: path.trajectory,
        profile,
        path_length: path.length,
        params: StartParams {
            sim: params.sim,
            gains: params.gains,
        },
        start_pose,
    });

    let mut telemetry: Vec<RobotState> = Vec::new();
    let mut steps = 0;

    while simulation.is_running() && steps < MAX_STEPS {
        let response = simulation
            .step(STEP_PERIOD_S)
            .wrap_err("Simulation step failed")?;

        if let Some(state) = response.state {
            if steps % LOG_DECIMATION == 0 {
                debug!(
                    "t = {:6.2} s: pos ({:7.2}, {:7.2}), v = {:6.2}, d = {:7.2}",
                    state.time, state.x, state.y, state.velocity, state.distance_traveled
                );
            }

            telemetry.push(state);
        }

        steps += 1;
    }

    if simulation.is_running() {
        warn!("Run stopped after hitting the {} step limit", MAX_STEPS);
    }

    // ---- SAVE TELEMETRY ----

    match telemetry.last() {
        Some(state) => info!(
            "Run over after {:.2} s, {:.2} units travelled",
            state.time, state.distance_traveled
        ),
        None => warn!("Run produced no telemetry"),
    }

    session
        .save("telemetry.json", &telemetry)
        .wrap_err("Failed to save the telemetry")?;

    info!("Telemetry saved, exiting");

    Ok(())
}

/// A demo path: one Bezier sweep followed by a straight run-out.
fn demo_path() -> Vec<ControlPoint> {
    vec![
        ControlPoint { x: -48.0, y: -48.0 },
        ControlPoint { x: -48.0, y: 0.0 },
        ControlPoint { x: 0.0, y: 0.0 },
        ControlPoint { x: 0.0, y: 48.0 },
        ControlPoint { x: 24.0, y: 48.0 },
    ]
}
