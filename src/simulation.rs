//! Simulation state and the per-frame tick driver.
//!
//! Each tick runs, in this order: settling physics of the free cube, the
//! keyframe animator (or manual jogging when the animator is stopped), and the
//! picking state machine. The order guarantees each stage sees a consistent
//! snapshot of the joints and the cube for the frame.

use std::fmt;
use std::time::Instant;

use nalgebra::{Isometry3, Point3, Rotation3, Translation3, UnitQuaternion, Vector3};
use tracing::info;

use crate::animator::{Animator, AnimatorEvent};
use crate::config::{FrameConfig, SimulationConfig};
use crate::keyframes::Direction;
use crate::kinematic_traits::{Joints, Kinematics, Pose, HOME, J_GRIPPER};
use crate::kinematics_impl::ArmKinematics;
use crate::picking::{is_gripper_closed, update_picking, PickState, PickTransition};
use crate::settling::{FreeBody, StepOutcome};

/// Human-readable status shown next to the controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Reset,
    RunningSequence,
    RunningCycle1,
    ReturningCycle2,
    Returning,
    Stopped,
    SequenceComplete,
    /// Joints moved by sliders, jog keys or the gripper toggle.
    Manual,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            Status::Reset => "Reset",
            Status::RunningSequence => "Running Sequence...",
            Status::RunningCycle1 => "Running Sequence (Cycle 1)...",
            Status::ReturningCycle2 => "Returning (Cycle 2)...",
            Status::Returning => "Returning...",
            Status::Stopped => "Stopped",
            Status::SequenceComplete => "Sequence Complete",
            Status::Manual => "Manual",
        };
        write!(f, "{}", text)
    }
}

/// Button and slider commands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Loop the pick-and-place cycle, alternating directions.
    Start,
    /// Single pass, A to B.
    StartForward,
    /// Single pass, B to A.
    StartBackward,
    Stop,
    Reset,
    /// Set one joint to an angle in degrees. Out of range values are clamped.
    SetJoint { joint: usize, degrees: f64 },
    /// Open a closed gripper, close an open one.
    ToggleGripper,
}

/// Manual jogging per joint: -1.0 to 1.0 of the jog speed, 0.0 when idle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JogInput {
    pub directions: Joints,
}

impl JogInput {
    pub fn joint(joint: usize, direction: f64) -> Self {
        let mut directions = [0.0; 5];
        directions[joint] = direction;
        JogInput { directions }
    }

    pub fn is_idle(&self) -> bool {
        self.directions.iter().all(|d| *d == 0.0)
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Delta time actually simulated, after sanitizing.
    pub dt: f64,
    pub physics: StepOutcome,
    pub animation: AnimatorEvent,
    pub picking: PickTransition,
}

/// Orientation of the cube on reset.
pub fn initial_rotation() -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), -90.0_f64.to_radians())
        * Rotation3::from_axis_angle(&Vector3::x_axis(), -90.0_f64.to_radians())
}

/// Replace stalled or invalid frame deltas so a single frame cannot destabilize
/// the integration: deltas above `max_delta` become `fallback_delta`, negative
/// and non-finite deltas become 0.
pub fn sanitize_delta(dt: f64, frame: &FrameConfig) -> f64 {
    if !dt.is_finite() || dt < 0.0 {
        0.0
    } else if dt > frame.max_delta {
        frame.fallback_delta
    } else {
        dt
    }
}

/// Converts wall clock instants into sanitized frame deltas.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    frame: FrameConfig,
}

impl FrameClock {
    pub fn new(frame: FrameConfig) -> Self {
        FrameClock { last: None, frame }
    }

    /// Seconds since the previous call. The first call returns the fallback delta.
    pub fn tick(&mut self, now: Instant) -> f64 {
        let dt = match self.last {
            Some(last) => now.saturating_duration_since(last).as_secs_f64(),
            None => self.frame.fallback_delta,
        };
        self.last = Some(now);
        sanitize_delta(dt, &self.frame)
    }
}

/// Complete state of the arm and the cube.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    robot: ArmKinematics,
    joints: Joints,
    body: FreeBody,
    pick: PickState,
    animator: Animator,
    status: Status,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        let robot = ArmKinematics::new(config.geometry);
        let animator = Animator::new(config.animation, config.forward, config.backward);
        let body = FreeBody::new(config.object_start, initial_rotation());
        Simulation {
            config,
            robot,
            joints: HOME,
            body,
            pick: PickState::Free,
            animator,
            status: Status::Reset,
        }
    }

    /// Arm to the home pose, cube back to its start pose, animation stopped.
    pub fn reset(&mut self) {
        self.animator.reset();
        self.joints = HOME;
        self.config.limits.clamp_all(&mut self.joints);
        self.pick = PickState::Free;
        self.body = FreeBody::new(self.config.object_start, initial_rotation());
        self.set_status(Status::Reset);
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Start => {
                if self.animator.start() {
                    self.set_status(Status::RunningSequence);
                }
            }
            Command::StartForward => {
                if self.animator.start_forward() {
                    self.set_status(Status::RunningSequence);
                }
            }
            Command::StartBackward => {
                if self.animator.start_backward() {
                    self.set_status(Status::Returning);
                }
            }
            Command::Stop => {
                self.animator.stop();
                self.set_status(Status::Stopped);
            }
            Command::Reset => self.reset(),
            Command::SetJoint { joint, degrees } => {
                self.set_joint(joint, degrees);
                self.mark_manual();
            }
            Command::ToggleGripper => {
                let picking = &self.config.picking;
                let angle = if is_gripper_closed(&self.joints, picking) {
                    picking.gripper_open
                } else {
                    picking.gripper_closed
                };
                self.set_joint(J_GRIPPER, angle);
                self.mark_manual();
            }
        }
    }

    fn mark_manual(&mut self) {
        if !self.animator.is_running() {
            self.set_status(Status::Manual);
        }
    }

    fn set_joint(&mut self, joint: usize, degrees: f64) {
        if joint >= self.joints.len() {
            return;
        }
        if let Some(value) = self.config.limits.clamp(joint, degrees) {
            self.joints[joint] = value;
        }
    }

    fn set_status(&mut self, status: Status) {
        if self.status != status {
            info!("Status: {}", status);
        }
        self.status = status;
    }

    /// Advance the simulation by one frame.
    pub fn tick(&mut self, dt: f64, jog: &JogInput) -> TickReport {
        let dt = sanitize_delta(dt, &self.config.frame);

        let physics = self.body.step(self.pick == PickState::Held, dt, &self.config.physics);

        let animation = if self.animator.is_running() {
            let event = self.animator.tick(&mut self.joints);
            match event {
                AnimatorEvent::CycleFlipped(Direction::Backward) => self.set_status(Status::ReturningCycle2),
                AnimatorEvent::CycleFlipped(Direction::Forward) => self.set_status(Status::RunningCycle1),
                AnimatorEvent::Completed => self.set_status(Status::SequenceComplete),
                _ => {}
            }
            event
        } else {
            self.jog(jog, dt);
            AnimatorEvent::Idle
        };

        let picking = update_picking(
            &self.robot,
            &mut self.joints,
            &mut self.pick,
            &mut self.body,
            &self.config.picking,
        );

        TickReport { dt, physics, animation, picking }
    }

    fn jog(&mut self, jog: &JogInput, dt: f64) {
        if jog.is_idle() {
            return;
        }
        self.set_status(Status::Manual);
        let step = self.config.frame.jog_speed * dt;
        for joint in 0..self.joints.len() {
            let direction = jog.directions[joint];
            if direction != 0.0 && direction.is_finite() {
                self.set_joint(joint, self.joints[joint] + direction.clamp(-1.0, 1.0) * step);
            }
        }
    }

    pub fn joints(&self) -> &Joints {
        &self.joints
    }

    /// Joint angles rounded to whole degrees, for display.
    pub fn display_joints(&self) -> [i32; 5] {
        self.joints.map(|angle| angle.round() as i32)
    }

    /// "Closed" when the gripper is closed enough to hold the cube, "Open" otherwise.
    pub fn gripper_label(&self) -> &'static str {
        if is_gripper_closed(&self.joints, &self.config.picking) {
            "Closed"
        } else {
            "Open"
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn pick_state(&self) -> PickState {
        self.pick
    }

    pub fn free_body(&self) -> &FreeBody {
        &self.body
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn robot(&self) -> &ArmKinematics {
        &self.robot
    }

    /// Pose of the gripper grasp point.
    pub fn gripper_pose(&self) -> Pose {
        self.robot.forward(&self.joints)
    }

    /// World pose of the cube: attached to the gripper while held, the free
    /// body pose otherwise.
    pub fn object_pose(&self) -> Pose {
        match self.pick {
            PickState::Held => self.gripper_pose(),
            PickState::Free => Isometry3::from_parts(
                Translation3::from(self.body.position.coords),
                UnitQuaternion::from_rotation_matrix(&self.body.rotation),
            ),
        }
    }

    pub fn object_position(&self) -> Point3<f64> {
        Point3::from(self.object_pose().translation.vector)
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Simulation::new(SimulationConfig::default())
    }
}
