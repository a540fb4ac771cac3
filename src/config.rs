//! Configuration of the simulation.
//!
//! Every threshold used by the settling physics, the picking logic, the
//! animator and the tick driver is a named field here. Defaults reproduce the
//! behavior of the reference scene; see `parameters_from_file` for loading
//! overrides from YAML.

use nalgebra::Point3;

use crate::constraints::Constraints;
use crate::keyframes::{KeyframeTable, BACKWARD, FORWARD};
use crate::parameters::arm_geometry::Parameters;
use crate::picking::ReleasePolicy;

/// Rigid-body settling of the free cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    /// Downward acceleration, units/s².
    pub gravity: f64,
    /// Height of the ground plane.
    pub ground_level: f64,
    /// Half of the cube side. The cube is drawn with side 2h.
    pub half_extent: f64,
    /// Tip-over speed while settling, degrees/s.
    pub angular_speed: f64,
    /// A face whose normal has a dot product with world-up above this value is
    /// considered already resting; no tipping is computed for it on landing.
    pub stable_dot: f64,
    /// Settling completes once the target face normal dot world-up exceeds this.
    pub snap_dot: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            ground_level: 0.0,
            half_extent: 0.4,
            angular_speed: 150.0,
            stable_dot: 0.99,
            snap_dot: 0.995,
        }
    }
}

/// Gripper angles and the attach/detach rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickingConfig {
    /// Maximal distance between the grasp point and the object center to pick it.
    pub pick_radius: f64,
    /// Gripper is closed enough to hold the object at or below this angle.
    pub grasp_threshold: f64,
    /// Angle the gripper takes when closed (also forced on vetoed release).
    pub gripper_closed: f64,
    /// Angle the gripper takes when opened.
    pub gripper_open: f64,
    pub release_policy: ReleasePolicy,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            pick_radius: 5.0,
            grasp_threshold: 70.0,
            gripper_closed: 60.0,
            gripper_open: 90.0,
            release_policy: ReleasePolicy::AllowMidAir,
        }
    }
}

/// Keyframe animator easing and dwell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationConfig {
    /// Fraction of the remaining difference covered per tick.
    pub ease_factor: f64,
    /// Joints closer than this to their target (degrees) snap onto it.
    pub snap_tolerance: f64,
    /// The animator advances to the next keyframe once the dwell counter exceeds this.
    pub dwell_ticks: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            ease_factor: 0.05,
            snap_tolerance: 0.5,
            dwell_ticks: 20,
        }
    }
}

/// Frame timing of the tick driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameConfig {
    /// Deltas above this are treated as a stall (seconds).
    pub max_delta: f64,
    /// Delta used instead of a stalled one (seconds).
    pub fallback_delta: f64,
    /// Manual jog speed, degrees/s.
    pub jog_speed: f64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_delta: 0.1,
            fallback_delta: 0.016,
            jog_speed: 100.0,
        }
    }
}

/// Main configuration for a simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub physics: PhysicsConfig,
    pub picking: PickingConfig,
    pub animation: AnimationConfig,
    pub frame: FrameConfig,
    pub geometry: Parameters,
    pub limits: Constraints,
    /// Where the cube is placed on reset (before it settles).
    pub object_start: Point3<f64>,
    /// Pick at A, drop at B.
    pub forward: KeyframeTable,
    /// Pick at B, drop at A.
    pub backward: KeyframeTable,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            picking: PickingConfig::default(),
            animation: AnimationConfig::default(),
            frame: FrameConfig::default(),
            geometry: Parameters::new(),
            limits: Constraints::default(),
            object_start: Point3::new(10.0, 0.0, 0.0),
            forward: FORWARD,
            backward: BACKWARD,
        }
    }
}

impl SimulationConfig {
    /// Default configuration with the given release policy.
    #[must_use]
    pub fn with_release_policy(policy: ReleasePolicy) -> Self {
        let mut config = Self::default();
        config.picking.release_policy = policy;
        config
    }

    /// Releasing the gripper is refused while the grasp point is higher than 2.0.
    #[must_use]
    pub fn no_mid_air_release() -> Self {
        Self::with_release_policy(ReleasePolicy::VetoAboveHeight { height: 2.0 })
    }
}
