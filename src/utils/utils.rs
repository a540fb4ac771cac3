//! Helper functions

use crate::kinematic_traits::{Joints, Pose, JOINT_NAMES};
use nalgebra::Rotation3;
use rand::Rng;

/// Joint angles as a compact string like `[0.00 30.00 -60.00 -60.00 90.00]`.
pub fn joints_to_string(qs: &Joints) -> String {
    let mut row_str = String::new();
    for q in qs {
        row_str.push_str(&format!("{:5.2} ", q));
    }
    format!("[{}]", row_str.trim_end())
}

/// Print joint values with joint names.
#[allow(dead_code)]
pub fn dump_joints(qs: &Joints) {
    for (name, q) in JOINT_NAMES.iter().zip(qs) {
        println!("{:>13}: {:7.2}°", name, q);
    }
}

/// Pose as translation and roll/pitch/yaw in degrees.
pub fn pose_to_string(pose: &Pose) -> String {
    let t = pose.translation.vector;
    let (roll, pitch, yaw) = pose.rotation.euler_angles();
    format!(
        "({:.3}, {:.3}, {:.3}) rpy ({:.1}°, {:.1}°, {:.1}°)",
        t.x,
        t.y,
        t.z,
        roll.to_degrees(),
        pitch.to_degrees(),
        yaw.to_degrees()
    )
}

/// Print the pose of the object or the gripper.
#[allow(dead_code)]
pub fn dump_pose(label: &str, pose: &Pose) {
    println!("{}: {}", label, pose_to_string(pose));
}

/// Random orientation from uniformly drawn Euler angles. Not uniform over
/// SO(3), which is fine for drop tests.
pub fn random_rotation<R: Rng>(rng: &mut R) -> Rotation3<f64> {
    let roll: f64 = rng.gen_range(-180.0..180.0);
    let pitch: f64 = rng.gen_range(-180.0..180.0);
    let yaw: f64 = rng.gen_range(-180.0..180.0);
    Rotation3::from_euler_angles(roll.to_radians(), pitch.to_radians(), yaw.to_radians())
}
