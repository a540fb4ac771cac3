//! Attaching the cube to the gripper and releasing it.
//!
//! The decision is level-triggered: it is derived every tick from the current
//! gripper angle and the distance between the grasp point and the cube, never
//! from a remembered "just closed" event.

use nalgebra::{distance, Point3};
use tracing::{debug, info};

use crate::config::PickingConfig;
use crate::kinematic_traits::{Joints, Kinematics, J_GRIPPER};
use crate::settling::FreeBody;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickState {
    /// The cube is simulated by the settling physics.
    Free,
    /// The cube moves rigidly with the gripper.
    Held,
}

/// What happens when the gripper opens while holding the cube high above the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleasePolicy {
    /// Release anywhere; the cube falls and settles.
    AllowMidAir,
    /// Refuse to open while the grasp point is above the given height: the
    /// gripper is forced back closed and the cube stays held.
    VetoAboveHeight { height: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickTransition {
    None,
    Picked,
    Released,
    ReleaseVetoed,
}

/// The gripper is closed enough to hold an object.
pub fn is_gripper_closed(joints: &Joints, config: &PickingConfig) -> bool {
    joints[J_GRIPPER] <= config.grasp_threshold
}

/// Re-evaluate whether the cube is held. May move the cube (on release) or
/// force the gripper closed (on vetoed release).
pub fn update_picking(
    robot: &impl Kinematics,
    joints: &mut Joints,
    state: &mut PickState,
    body: &mut FreeBody,
    config: &PickingConfig,
) -> PickTransition {
    let gripper = robot.forward(joints);
    let grasp_point = Point3::from(gripper.translation.vector);
    let closed = is_gripper_closed(joints, config);

    match *state {
        PickState::Free => {
            if closed && distance(&grasp_point, &body.position) < config.pick_radius {
                *state = PickState::Held;
                body.freeze();
                info!(x = grasp_point.x, y = grasp_point.y, z = grasp_point.z, "Picked");
                PickTransition::Picked
            } else {
                PickTransition::None
            }
        }
        PickState::Held if closed => {
            body.freeze();
            PickTransition::None
        }
        PickState::Held => {
            if let ReleasePolicy::VetoAboveHeight { height } = config.release_policy {
                if grasp_point.y > height {
                    joints[J_GRIPPER] = config.gripper_closed;
                    debug!(height = grasp_point.y, limit = height, "Release refused above ground");
                    return PickTransition::ReleaseVetoed;
                }
            }
            *state = PickState::Free;
            body.position = grasp_point;
            body.rotation = gripper.rotation.to_rotation_matrix();
            body.freeze();
            info!(x = grasp_point.x, y = grasp_point.y, z = grasp_point.z, "Released");
            PickTransition::Released
        }
    }
}
