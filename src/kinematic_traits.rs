extern crate nalgebra as na;

use na::Isometry3;

/// Pose is used for the gripper grasp point and the intermediate pivots of the arm.
/// It contains both Cartesian position and rotation quaternion
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion, Vector3};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(10.0, 0.5, 0.0);
/// let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -90.0_f64.to_radians());
/// let transform = Pose::from_parts(translation, rotation);
/// ```
pub type Pose = Isometry3<f64>;

/// Five joint angles of the arm, in degrees. Use the J_ constants to address
/// individual joints.
pub type Joints = [f64; 5];

/// Rotation of the whole arm about the vertical axis.
pub const J_BASE: usize = 0;
pub const J_LOWER_ARM: usize = 1;
pub const J_UPPER_ARM: usize = 2;
pub const J_GRIPPER_BASE: usize = 3;
/// Opening of the gripper fingers. Not part of the kinematic chain.
pub const J_GRIPPER: usize = 4;

/// Human-readable joint names, indexed by the J_ constants.
pub const JOINT_NAMES: [&str; 5] = ["Base", "Lower Arm", "Upper Arm", "Gripper Base", "Gripper"];

/// Home pose the arm returns to on reset. The gripper is open.
pub const HOME: Joints = [0.0, 30.0, -60.0, -60.0, 90.0];

/// All joints at zero: the arm stands straight up.
pub const JOINTS_AT_ZERO: Joints = [0.0; 5];

pub trait Kinematics {
    /// Pose of the grasp point for the given joint angles.
    fn forward(&self, qs: &Joints) -> Pose;

    /// Poses of the lower arm pivot, upper arm pivot, gripper base pivot,
    /// gripper fingers base and the grasp point, in this order.
    fn forward_with_joint_poses(&self, qs: &Joints) -> [Pose; 5];
}
