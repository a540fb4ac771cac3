//! Hand-authored keyframe tables of the pick-and-place cycle.

use crate::kinematic_traits::Joints;

/// Number of poses in every keyframe table.
pub const KEYFRAME_COUNT: usize = 9;

/// Ordered sequence of target poses the animator moves the arm through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeTable(pub [Joints; KEYFRAME_COUNT]);

impl KeyframeTable {
    pub fn rows(&self) -> &[Joints] {
        &self.0
    }

    pub fn last(&self) -> &Joints {
        &self.0[KEYFRAME_COUNT - 1]
    }
}

/// Pick the cube at zone A and drop it at zone B.
pub const FORWARD: KeyframeTable = KeyframeTable([
    [0.0, 30.0, -60.0, -60.0, 80.0],     // Home
    [-90.0, 30.0, -60.0, -60.0, 80.0],   // Align with A
    [-90.0, -40.0, -110.0, 60.0, 80.0],  // Reach down A
    [-90.0, -40.0, -110.0, 60.0, 60.0],  // Grasp
    [-90.0, -10.0, -120.0, 40.0, 60.0],  // Lift
    [90.0, -10.0, -120.0, 40.0, 60.0],   // Carry to B
    [90.0, -40.0, -110.0, 60.0, 60.0],   // Lower B
    [90.0, -40.0, -110.0, 60.0, 80.0],   // Release
    [90.0, 30.0, -60.0, -60.0, 80.0],    // Home above B
]);

/// Pick the cube at zone B and bring it back to zone A.
pub const BACKWARD: KeyframeTable = KeyframeTable([
    [90.0, 30.0, -60.0, -60.0, 80.0],    // Home above B
    [90.0, -40.0, -110.0, 60.0, 80.0],   // Reach down B
    [90.0, -40.0, -110.0, 60.0, 60.0],   // Grasp
    [90.0, -10.0, -120.0, 40.0, 60.0],   // Lift
    [-90.0, -10.0, -120.0, 40.0, 60.0],  // Carry to A
    [-90.0, -40.0, -110.0, 60.0, 60.0],  // Lower A
    [-90.0, -40.0, -110.0, 60.0, 80.0],  // Release
    [-90.0, -10.0, -120.0, 40.0, 80.0],  // Lift empty
    [0.0, 30.0, -60.0, -60.0, 80.0],     // Home
]);

/// Which table the animator plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}
