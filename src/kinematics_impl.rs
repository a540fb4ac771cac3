//! Forward kinematics of the 5-joint arm.
//!
//! The base rotates about the vertical (Y) axis; the lower arm, upper arm and
//! gripper base rotate about the local horizontal (X) axis. Every link extends
//! along the local +Y axis of its joint. The gripper joint only opens and closes
//! the fingers and does not move the grasp point.

use crate::kinematic_traits::{Joints, Kinematics, Pose, J_BASE, J_GRIPPER_BASE, J_LOWER_ARM, J_UPPER_ARM};
use crate::parameters::arm_geometry::Parameters;
use nalgebra::{Isometry3, Point3, Vector3};

#[derive(Debug, Clone, Copy)]
pub struct ArmKinematics {
    pub parameters: Parameters,
}

impl ArmKinematics {
    /// Creates a new `ArmKinematics` instance with the given parameters.
    pub fn new(parameters: Parameters) -> Self {
        ArmKinematics { parameters }
    }

    /// World position of the grasp point.
    pub fn grasp_point(&self, qs: &Joints) -> Point3<f64> {
        Point3::from(self.forward(qs).translation.vector)
    }
}

impl Default for ArmKinematics {
    fn default() -> Self {
        ArmKinematics::new(Parameters::new())
    }
}

fn rotate_y(degrees: f64) -> Isometry3<f64> {
    Isometry3::rotation(Vector3::y() * degrees.to_radians())
}

fn rotate_x(degrees: f64) -> Isometry3<f64> {
    Isometry3::rotation(Vector3::x() * degrees.to_radians())
}

fn lift(distance: f64) -> Isometry3<f64> {
    Isometry3::translation(0.0, distance, 0.0)
}

impl Kinematics for ArmKinematics {
    fn forward(&self, qs: &Joints) -> Pose {
        self.forward_with_joint_poses(qs)[4]
    }

    fn forward_with_joint_poses(&self, qs: &Joints) -> [Pose; 5] {
        let p = &self.parameters;

        // Proximal to distal, each joint rotation is applied after moving to its pivot.
        let lower_arm = rotate_y(qs[J_BASE]) * lift(p.base_height) * rotate_x(qs[J_LOWER_ARM]);
        let upper_arm = lower_arm * lift(p.lower_arm) * rotate_x(qs[J_UPPER_ARM]);
        let gripper_base = upper_arm * lift(p.upper_arm) * rotate_x(qs[J_GRIPPER_BASE]);
        let fingers = gripper_base * lift(p.gripper_base);
        let grasp = fingers * lift(p.grasp_offset);

        [lower_arm, upper_arm, gripper_base, fingers, grasp]
    }
}
