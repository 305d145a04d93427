//! Simulation session state and the fixed-step update.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use nalgebra::Vector2;

// Internal
use crate::motion_profile;
use crate::traj_ctrl::{LtvUnicycleController, Pose};
use plan_if::msg::{SimStartRequest, StepResponse};
use plan_if::traj::{ProfileSample, RobotState, SimulationParameters, TrajectoryPoint};
use util::maths::clamp;

use super::{
    SimError, COMPLETION_END_DISTANCE, COMPLETION_MAX_SPEED, COMPLETION_PATH_FRACTION,
    OVERRUN_PATH_FRACTION,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single closed-loop simulation run.
///
/// Created once and reused across runs; [`Simulation::start`] resets all
/// state before loading the new trajectory.
#[derive(Debug, Clone)]
pub struct Simulation {
    // Inputs, fixed for the duration of a run
    trajectory: Vec<TrajectoryPoint>,
    profile: Vec<ProfileSample>,
    path_length: f64,
    params: SimulationParameters,
    controller: LtvUnicycleController,

    // Integrated state
    pose: Pose,
    velocity: f64,
    acceleration: f64,
    jerk: f64,
    prev_velocity: f64,
    prev_acceleration: f64,
    time: f64,
    distance_traveled: f64,
    running: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    /// Create an idle simulation with no trajectory loaded.
    pub fn new() -> Self {
        Self {
            trajectory: Vec::new(),
            profile: Vec::new(),
            path_length: 0.0,
            params: SimulationParameters::default(),
            controller: LtvUnicycleController::new(Default::default()),
            pose: Pose::new(0.0, 0.0, 0.0),
            velocity: 0.0,
            acceleration: 0.0,
            jerk: 0.0,
            prev_velocity: 0.0,
            prev_acceleration: 0.0,
            time: 0.0,
            distance_traveled: 0.0,
            running: false,
        }
    }

    /// True while a run is in progress.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin a new run from the given request.
    ///
    /// Any in-progress run is discarded. The start pose heading arrives in
    /// degrees on the wire and is converted to radians here.
    pub fn start(&mut self, req: SimStartRequest) {
        self.reset();

        if req.trajectory.is_empty() {
            warn!("Simulation started with an empty trajectory, not running");
            return;
        }

        self.pose = Pose::new(
            req.start_pose[0],
            req.start_pose[1],
            req.start_pose[2].to_radians(),
        );

        self.trajectory = req.trajectory;
        self.profile = req.profile;
        self.path_length = req.path_length;
        self.params = req.params.sim;
        self.controller = LtvUnicycleController::new(req.params.gains);
        self.running = true;
    }

    /// Return the simulation to its idle post-construction state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Advance the simulation by one time step of `dt` seconds.
    ///
    /// When no run is in progress this is a no-op returning
    /// `running: false` with no state. On a numeric fault the run is
    /// stopped and the error returned; subsequent steps are no-ops.
    pub fn step(&mut self, dt: f64) -> Result<StepResponse, SimError> {
        if !self.running {
            return Ok(StepResponse {
                running: false,
                state: None,
            });
        }

        // 1. Target velocity from the motion profile at the distance
        //    travelled so far
        let target_velocity =
            motion_profile::velocity_at_distance(self.distance_traveled, self.path_length, &self.profile);

        // 2. Closest trajectory point to the current pose (strict <, so
        //    ties keep the lowest index)
        let closest_idx = self.closest_point_index();

        // 3. Reference point: walk forward from the closest point by the
        //    speed-scaled lookahead distance
        let lookahead =
            self.params.min_lookahead + self.params.lookahead_gain * target_velocity;
        let ref_idx = self.lookahead_index(closest_idx, lookahead);
        let ref_point = &self.trajectory[ref_idx];

        // 4. Reference angular velocity from the heading change across the
        //    reference point's local segment
        let ref_turn_rate = self.reference_turn_rate(ref_idx, target_velocity);

        // 5. Tracking controller
        let ref_pose = Pose::new(ref_point.x, ref_point.y, ref_point.theta);
        let cmd = self
            .controller
            .get_cmd(&self.pose, &ref_pose, target_velocity, ref_turn_rate);

        // 6. Acceleration-limited velocity dynamics, clamped to [0, v_max]
        let velocity_error = cmd.speed - self.velocity;
        let dv = clamp(
            &velocity_error,
            &(-self.params.max_accel * dt),
            &(self.params.max_accel * dt),
        );
        self.velocity = clamp(&(self.velocity + dv), &0.0, &self.params.max_vel);

        // 7. Unicycle kinematics in the field heading convention, with the
        //    turn rate clamped to the angular limit
        let turn_rate = clamp(
            &cmd.turn_rate_rads,
            &(-self.params.max_angular_vel),
            &(self.params.max_angular_vel),
        );

        let (sin_theta, cos_theta) = self.pose.heading_rad.sin_cos();
        self.pose.position[0] += self.velocity * sin_theta * dt;
        self.pose.position[1] += self.velocity * cos_theta * dt;
        self.pose.heading_rad =
            (self.pose.heading_rad + turn_rate * dt).rem_euclid(std::f64::consts::TAU);

        // 8. Keep the robot body inside the field boundary
        let min_pos = self.params.field_min + self.params.robot_radius;
        let max_pos = self.params.field_max - self.params.robot_radius;
        self.pose.position[0] = clamp(&self.pose.position[0], &min_pos, &max_pos);
        self.pose.position[1] = clamp(&self.pose.position[1], &min_pos, &max_pos);

        // 9. Finite-difference acceleration and jerk, clock and odometry
        self.acceleration = (self.velocity - self.prev_velocity) / dt;
        self.jerk = (self.acceleration - self.prev_acceleration) / dt;
        self.prev_velocity = self.velocity;
        self.prev_acceleration = self.acceleration;

        self.time += dt;
        self.distance_traveled += self.velocity * dt;

        if !self.state_is_finite() {
            self.running = false;
            return Err(SimError::NonFiniteState(self.time));
        }

        // 10. Completion test
        if self.run_complete() {
            self.running = false;
        }

        Ok(StepResponse {
            running: self.running,
            state: Some(self.snapshot()),
        })
    }

    /// Immutable snapshot of the current state.
    pub fn snapshot(&self) -> RobotState {
        RobotState {
            x: self.pose.position[0],
            y: self.pose.position[1],
            theta: self.pose.heading_rad,
            velocity: self.velocity,
            acceleration: self.acceleration,
            jerk: self.jerk,
            distance_traveled: self.distance_traveled,
            time: self.time,
            finished: !self.running,
        }
    }

    // -----------------------------------------------------------------------
    // PRIVATE
    // -----------------------------------------------------------------------

    /// Index of the trajectory point closest to the current position.
    fn closest_point_index(&self) -> usize {
        let mut closest_idx = 0;
        let mut closest_dist_sq = f64::INFINITY;

        for (i, point) in self.trajectory.iter().enumerate() {
            let delta = Vector2::new(point.x, point.y) - self.pose.position;
            let dist_sq = delta.norm_squared();

            if dist_sq < closest_dist_sq {
                closest_dist_sq = dist_sq;
                closest_idx = i;
            }
        }

        closest_idx
    }

    /// Walk forward from `start_idx` until the arc length covered reaches
    /// the lookahead distance, saturating at the final point.
    fn lookahead_index(&self, start_idx: usize, lookahead: f64) -> usize {
        let start_dist = self.trajectory[start_idx].distance;
        let mut idx = start_idx;

        while idx + 1 < self.trajectory.len()
            && self.trajectory[idx].distance - start_dist < lookahead
        {
            idx += 1;
        }

        idx
    }

    /// Feedforward turn rate at the reference point: heading change over
    /// the local segment, travelled at the reference speed, clamped to the
    /// angular velocity limit.
    fn reference_turn_rate(&self, ref_idx: usize, ref_speed: f64) -> f64 {
        if ref_idx + 1 >= self.trajectory.len() {
            return 0.0;
        }

        let curr = &self.trajectory[ref_idx];
        let next = &self.trajectory[ref_idx + 1];

        let segment_dist = next.distance - curr.distance;
        if segment_dist <= f64::EPSILON {
            return 0.0;
        }

        let heading_change = util::maths::wrap_pi(next.theta - curr.theta);
        let turn_rate = heading_change * ref_speed / segment_dist;

        clamp(
            &turn_rate,
            &(-self.params.max_angular_vel),
            &(self.params.max_angular_vel),
        )
    }

    /// True if all integrated quantities are finite.
    fn state_is_finite(&self) -> bool {
        self.pose.position[0].is_finite()
            && self.pose.position[1].is_finite()
            && self.pose.heading_rad.is_finite()
            && self.velocity.is_finite()
            && self.acceleration.is_finite()
            && self.jerk.is_finite()
            && self.distance_traveled.is_finite()
    }

    /// Completion test.
    ///
    /// The run ends when most of the path has been covered, the robot is
    /// near the final point and nearly stationary, or when the odometer has
    /// clearly overrun the path (a tracking failure, stopped to avoid
    /// spinning forever).
    fn run_complete(&self) -> bool {
        if self.path_length <= 0.0 {
            return true;
        }

        let path_fraction = self.distance_traveled / self.path_length;

        // start() rejects empty trajectories, so last() always holds here
        let near_end = match self.trajectory.last() {
            Some(end) => {
                let delta = Vector2::new(end.x, end.y) - self.pose.position;
                delta.norm() < COMPLETION_END_DISTANCE
            }
            None => true,
        };

        let settled = path_fraction >= COMPLETION_PATH_FRACTION
            && near_end
            && self.velocity.abs() < COMPLETION_MAX_SPEED;

        settled || path_fraction > OVERRUN_PATH_FRACTION
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path_gen;
    use plan_if::msg::StartParams;
    use plan_if::traj::{ControlPoint, ControllerGains, ProfileType};
    use std::f64::consts::PI;

    fn straight_path(length: f64) -> (Vec<TrajectoryPoint>, f64) {
        let points = vec![
            ControlPoint { x: 0.0, y: 0.0 },
            ControlPoint { x: 0.0, y: length },
        ];
        let resp = path_gen::generate(&points);
        (resp.trajectory, resp.length)
    }

    fn start_request(
        trajectory: Vec<TrajectoryPoint>,
        path_length: f64,
        params: SimulationParameters,
        start_pose: [f64; 3],
    ) -> SimStartRequest {
        let profile = motion_profile::generate(
            ProfileType::Trapezoidal,
            path_length,
            params.max_vel,
            params.max_accel,
            params.max_accel,
            500.0,
            motion_profile::DEFAULT_NUM_SAMPLES,
        )
        .unwrap();

        SimStartRequest {
            trajectory,
            profile,
            path_length,
            params: StartParams {
                sim: params,
                gains: ControllerGains::default(),
            },
            start_pose,
        }
    }

    #[test]
    fn test_straight_run_terminates() {
        let (trajectory, length) = straight_path(50.0);
        let mut sim = Simulation::new();
        sim.start(start_request(
            trajectory,
            length,
            SimulationParameters::default(),
            [0.0, 0.0, 0.0],
        ));

        let mut steps = 0;
        while sim.is_running() {
            let resp = sim.step(0.01).unwrap();
            steps += 1;

            assert!(steps < 2000, "run did not terminate");

            if !resp.running {
                let state = resp.state.unwrap();
                assert!(state.finished);
                // Either the settled or the overrun condition bounds the
                // odometer
                assert!(state.distance_traveled <= 1.1 * length + 1.0);
                assert!(state.velocity.abs() < 2.0 || state.distance_traveled > length);
            }
        }

        assert!(steps > 10, "terminated implausibly fast");
    }

    #[test]
    fn test_start_pose_heading_in_degrees() {
        let (trajectory, length) = straight_path(50.0);
        let mut sim = Simulation::new();
        sim.start(start_request(
            trajectory,
            length,
            SimulationParameters::default(),
            [0.0, 0.0, 90.0],
        ));

        let resp = sim.step(0.01).unwrap();
        let state = resp.state.unwrap();

        // One 10 ms step barely moves the heading off pi/2
        assert!((state.theta - PI / 2.0).abs() < 0.1);
    }

    #[test]
    fn test_field_boundary_clamps_position() {
        // Path runs well past the field edge; the robot must stop at the
        // boundary minus its radius and the overrun test must end the run
        let (trajectory, length) = straight_path(200.0);
        let mut sim = Simulation::new();
        sim.start(start_request(
            trajectory,
            length,
            SimulationParameters::default(),
            [0.0, 0.0, 0.0],
        ));

        let mut steps = 0;
        while sim.is_running() {
            let resp = sim.step(0.01).unwrap();
            steps += 1;
            assert!(steps < 20_000, "run did not terminate");

            if let Some(state) = resp.state {
                assert!(state.x >= -64.0 - 1e-9 && state.x <= 64.0 + 1e-9);
                assert!(state.y >= -64.0 - 1e-9 && state.y <= 64.0 + 1e-9);
            }
        }
    }

    #[test]
    fn test_step_when_idle_is_noop() {
        let mut sim = Simulation::new();
        let resp = sim.step(0.01).unwrap();

        assert!(!resp.running);
        assert!(resp.state.is_none());
    }

    #[test]
    fn test_empty_trajectory_does_not_run() {
        let mut sim = Simulation::new();
        sim.start(start_request(
            Vec::new(),
            0.0,
            SimulationParameters::default(),
            [0.0, 0.0, 0.0],
        ));

        assert!(!sim.is_running());
    }

    #[test]
    fn test_non_finite_state_stops_run() {
        let (trajectory, length) = straight_path(50.0);

        let mut sim = Simulation::new();
        sim.start(start_request(
            trajectory,
            length,
            SimulationParameters::default(),
            [f64::NAN, 0.0, 0.0],
        ));

        // The NaN start position poisons the whole state on the first step
        assert!(sim.step(0.01).is_err());
        assert!(!sim.is_running());

        // Subsequent steps are clean no-ops
        let resp = sim.step(0.01).unwrap();
        assert!(!resp.running);
    }
}
