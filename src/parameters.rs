//! Defines the link geometry of the arm

pub mod arm_geometry {

    /// Fixed distances between the pivots of the arm. All joints rotate
    /// the following link that extends along the local +Y axis.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Parameters {
        /// Height of the rotating base, from the ground to the lower arm pivot.
        pub base_height: f64,

        /// Length of the lower arm, from its pivot to the upper arm pivot.
        pub lower_arm: f64,

        /// Length of the upper arm, from its pivot to the gripper base pivot.
        pub upper_arm: f64,

        /// Height of the gripper base, from its pivot to the base of the fingers.
        pub gripper_base: f64,

        /// Distance from the base of the fingers to the point where the
        /// object is held (grasp point).
        pub grasp_offset: f64,
    }

    impl Parameters {
        pub fn new() -> Self {
            Parameters {
                base_height: 1.5,
                lower_arm: 8.0,
                upper_arm: 8.0,
                gripper_base: 0.5,
                grasp_offset: 0.5,
            }
        }

        /// Total reach of the arm when standing straight up.
        pub fn reach(&self) -> f64 {
            self.base_height + self.lower_arm + self.upper_arm + self.gripper_base + self.grasp_offset
        }

        /// Convert to string yaml representation (quick viewing, etc).
        pub fn to_yaml(&self) -> String {
            format!(
                "geometry:\n  \
              base_height: {}\n  \
              lower_arm: {}\n  \
              upper_arm: {}\n  \
              gripper_base: {}\n  \
              grasp_offset: {}\n",
                self.base_height,
                self.lower_arm,
                self.upper_arm,
                self.gripper_base,
                self.grasp_offset
            )
        }
    }

    impl Default for Parameters {
        fn default() -> Self {
            Parameters::new()
        }
    }
}
