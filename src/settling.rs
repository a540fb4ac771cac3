//! Settling physics of the free cube.
//!
//! A cube that is not held falls under gravity. When its lowest corner reaches
//! the ground, that corner becomes a pivot and the cube tips about it until a
//! chosen face points up, then snaps flat at resting height. There is no
//! friction, bounce or angular momentum: contact simply zeroes the velocity.

use std::fmt;

use nalgebra::{Point3, Rotation3, Unit, Vector3};
use tracing::{debug, trace};

use crate::config::PhysicsConfig;

/// Cross products shorter than this are treated as parallel vectors when tipping.
const TIP_AXIS_EPSILON: f64 = 1e-3;

/// Cross products shorter than this skip the final snap rotation.
const SNAP_AXIS_EPSILON: f64 = 1e-4;

/// Pivot to center vectors shorter than this cannot be normalized.
const COM_EPSILON: f64 = 1e-3;

/// A cube face in object-local space: the local axis (0 = X, 1 = Y, 2 = Z)
/// and the side of the cube (+1 or -1) it lies on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub axis: usize,
    pub sign: f64,
}

impl Face {
    pub const fn new(axis: usize, sign: f64) -> Self {
        Face { axis, sign }
    }

    pub fn opposite(self) -> Self {
        Face { axis: self.axis, sign: -self.sign }
    }

    /// Outward normal of this face in world space for the given orientation.
    pub fn normal(&self, rotation: &Rotation3<f64>) -> Vector3<f64> {
        rotation.matrix().column(self.axis).into_owned() * self.sign
    }
}

/// Local name of the face, such as `+Y` or `-X`.
impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign = if self.sign < 0.0 { "-" } else { "+" };
        let axis = match self.axis {
            0 => "X",
            1 => "Y",
            _ => "Z",
        };
        write!(f, "{}{}", sign, axis)
    }
}

/// World space normal of a face, tagged with the face.
#[derive(Debug, Clone, Copy)]
pub struct FaceCandidate {
    pub normal: Vector3<f64>,
    pub face: Face,
}

/// All six faces, in the order +Y, -Y, +X, -X, +Z, -Z. Ties in face selection
/// are resolved towards the earlier candidate.
pub fn face_candidates(rotation: &Rotation3<f64>) -> [FaceCandidate; 6] {
    const ORDER: [Face; 6] = [
        Face::new(1, 1.0),
        Face::new(1, -1.0),
        Face::new(0, 1.0),
        Face::new(0, -1.0),
        Face::new(2, 1.0),
        Face::new(2, -1.0),
    ];
    ORDER.map(|face| FaceCandidate { normal: face.normal(rotation), face })
}

/// Candidate whose normal is most aligned with the direction, and the dot product.
fn most_aligned(candidates: &[FaceCandidate; 6], direction: &Vector3<f64>) -> (Face, f64) {
    let mut best = candidates[0].face;
    let mut best_dot = -2.0;
    for candidate in candidates {
        let dot = candidate.normal.dot(direction);
        if dot > best_dot {
            best_dot = dot;
            best = candidate.face;
        }
    }
    (best, best_dot)
}

/// Eight local corners of a cube with the given half extent.
pub fn cube_corners(h: f64) -> [Vector3<f64>; 8] {
    [
        Vector3::new(h, h, h),
        Vector3::new(-h, h, h),
        Vector3::new(h, -h, h),
        Vector3::new(-h, -h, h),
        Vector3::new(h, h, -h),
        Vector3::new(-h, h, -h),
        Vector3::new(h, -h, -h),
        Vector3::new(-h, -h, -h),
    ]
}

/// Lifecycle of the free cube with respect to the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettleState {
    /// Falling freely, or just released.
    Airborne,
    /// Tipping over the pivot corner until the target face points up.
    Settling { pivot: usize, target: Face },
    /// Flat on the ground with the given face up.
    AtRest { up: Face },
}

/// What a physics step did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// The object is held by the gripper, nothing was simulated.
    Held,
    Falling,
    /// First ground contact: the pivot and target face were chosen.
    /// `already_flat` is set when no tipping is needed.
    Landed { pivot: usize, target: Face, already_flat: bool },
    /// Still tipping, with the remaining angle in degrees.
    Tipping { remaining: f64 },
    Settled { up: Face },
}

/// Pose and motion of the cube when it is not held.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeBody {
    pub position: Point3<f64>,
    pub rotation: Rotation3<f64>,
    pub velocity: Vector3<f64>,
    pub state: SettleState,
}

impl FreeBody {
    pub fn new(position: Point3<f64>, rotation: Rotation3<f64>) -> Self {
        FreeBody {
            position,
            rotation,
            velocity: Vector3::zeros(),
            state: SettleState::Airborne,
        }
    }

    pub fn is_settling(&self) -> bool {
        matches!(self.state, SettleState::Settling { .. })
    }

    pub fn is_at_rest(&self) -> bool {
        matches!(self.state, SettleState::AtRest { .. })
    }

    /// Stop all motion, used while the gripper holds the object.
    pub fn freeze(&mut self) {
        self.velocity = Vector3::zeros();
        self.state = SettleState::Airborne;
    }

    /// World position of the given local corner for the body centered at `center`.
    pub fn corner(&self, corner: &Vector3<f64>, center: &Point3<f64>) -> Point3<f64> {
        center + self.rotation * corner
    }

    /// Advance the body by `dt` seconds.
    pub fn step(&mut self, held: bool, dt: f64, physics: &PhysicsConfig) -> StepOutcome {
        if held {
            self.freeze();
            return StepOutcome::Held;
        }

        let settling = self.is_settling();
        if settling {
            self.velocity = Vector3::zeros();
        } else {
            self.velocity.y -= physics.gravity * dt;
        }

        let predicted = self.position + self.velocity * dt;
        let corners = cube_corners(physics.half_extent);

        let mut lowest = f64::INFINITY;
        let mut lowest_idx = 0;
        for (i, corner) in corners.iter().enumerate() {
            let y = self.corner(corner, &predicted).y;
            if y < lowest {
                lowest = y;
                lowest_idx = i;
            }
        }

        if lowest > physics.ground_level && !settling {
            self.position = predicted;
            self.state = SettleState::Airborne;
            return StepOutcome::Falling;
        }

        self.velocity = Vector3::zeros();
        match self.state {
            SettleState::Settling { pivot, target } => self.settle(pivot, target, dt, physics),
            SettleState::Airborne | SettleState::AtRest { .. } => {
                let (target, already_flat) = self.choose_target(&corners[lowest_idx], physics);
                if already_flat {
                    trace!(pivot = lowest_idx, axis = target.axis, sign = target.sign, "Landed flat");
                } else {
                    debug!(pivot = lowest_idx, axis = target.axis, sign = target.sign, "Landed, tipping");
                }
                self.state = SettleState::Settling { pivot: lowest_idx, target };
                match self.settle(lowest_idx, target, dt, physics) {
                    settled @ StepOutcome::Settled { .. } => settled,
                    _ => StepOutcome::Landed { pivot: lowest_idx, target, already_flat },
                }
            }
        }
    }

    /// Pick the face that should end up facing world-up when tipping over
    /// the given pivot corner.
    fn choose_target(&self, pivot_corner: &Vector3<f64>, physics: &PhysicsConfig) -> (Face, bool) {
        let world_up = Vector3::y();
        let candidates = face_candidates(&self.rotation);

        // A face that is already nearly horizontal stays up. Running the tipping
        // analysis on a flat landing would pick an arbitrary neighbour face.
        let (stable, stability) = most_aligned(&candidates, &world_up);
        if stability > physics.stable_dot {
            return (stable, true);
        }

        let pivot = self.corner(pivot_corner, &self.position);
        let mut com = self.position - pivot;
        if com.norm() < COM_EPSILON {
            com = world_up;
        }
        let com = com.normalize();

        let (falling, _) = most_aligned(&candidates, &com);
        (falling.opposite(), false)
    }

    fn settle(&mut self, pivot_idx: usize, target: Face, dt: f64, physics: &PhysicsConfig) -> StepOutcome {
        let world_up = Vector3::y();
        let corners = cube_corners(physics.half_extent);

        // Anchor the pivot on the ground, not the whole body.
        let mut pivot = self.corner(&corners[pivot_idx], &self.position);
        let lift = physics.ground_level - pivot.y;
        self.position.y += lift;
        pivot.y += lift;

        let current = target.normal(&self.rotation);
        let d = current.dot(&world_up);

        if d > physics.snap_dot {
            let current = current.normalize();
            let snap_axis = current.cross(&world_up);
            if snap_axis.norm() > SNAP_AXIS_EPSILON {
                let angle = current.dot(&world_up).min(1.0).acos();
                let snap = Rotation3::from_axis_angle(&Unit::new_normalize(snap_axis), angle);
                self.rotation = snap * self.rotation;
            }
            self.position.y = physics.ground_level + physics.half_extent;
            self.state = SettleState::AtRest { up: target };
            trace!(axis = target.axis, sign = target.sign, "Settled");
            return StepOutcome::Settled { up: target };
        }

        let angle_to_go = d.clamp(-1.0, 1.0).acos().to_degrees();
        let mut tip_axis = current.cross(&world_up);
        if tip_axis.norm() <= TIP_AXIS_EPSILON {
            if d > 0.0 {
                // Already aligned, the snap above takes it on the next tick.
                return StepOutcome::Tipping { remaining: angle_to_go };
            }
            // Upside down: any horizontal axis works, take a neighbouring body axis.
            tip_axis = self.rotation.matrix().column((target.axis + 1) % 3).into_owned();
        }

        let step = (physics.angular_speed * dt).min(angle_to_go);
        let increment = Rotation3::from_axis_angle(&Unit::new_normalize(tip_axis), step.to_radians());
        self.rotation = increment * self.rotation;

        let pivot_to_center = self.position - pivot;
        self.position = pivot + increment * pivot_to_center;

        StepOutcome::Tipping { remaining: angle_to_go - step }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    fn physics() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    fn run_until_rest(body: &mut FreeBody, max_ticks: usize) -> usize {
        let physics = physics();
        for tick in 0..max_ticks {
            if let StepOutcome::Settled { .. } = body.step(false, DT, &physics) {
                return tick;
            }
        }
        panic!("Body did not settle within {max_ticks} ticks: {body:?}");
    }

    fn up_face(body: &FreeBody) -> Face {
        match body.state {
            SettleState::AtRest { up } => up,
            other => panic!("Not at rest: {other:?}"),
        }
    }

    #[test]
    fn test_free_fall() {
        let physics = physics();
        let mut body = FreeBody::new(Point3::new(0.0, 10.0, 0.0), Rotation3::identity());
        let mut previous = body.position.y;
        for _ in 0..30 {
            assert_eq!(body.step(false, DT, &physics), StepOutcome::Falling);
            assert!(body.position.y < previous);
            previous = body.position.y;
        }
        assert!(body.velocity.y < 0.0);
        assert_eq!(body.velocity.x, 0.0);
    }

    #[test]
    fn test_held_body_is_frozen() {
        let physics = physics();
        let mut body = FreeBody::new(Point3::new(0.0, 10.0, 0.0), Rotation3::identity());
        body.step(false, DT, &physics);
        body.state = SettleState::Settling { pivot: 3, target: Face::new(1, 1.0) };
        assert_eq!(body.step(true, DT, &physics), StepOutcome::Held);
        assert_eq!(body.velocity, Vector3::zeros());
        assert_eq!(body.state, SettleState::Airborne);
    }

    #[test]
    fn test_flat_landing_keeps_top_face() {
        let mut body = FreeBody::new(Point3::new(2.0, 3.0, 1.0), Rotation3::identity());
        run_until_rest(&mut body, 1000);
        assert_eq!(up_face(&body), Face::new(1, 1.0));
        assert_eq!(body.position.y, 0.4);
        assert_eq!(body.position.x, 2.0);
        assert_eq!(body.position.z, 1.0);
        assert_eq!(body.velocity, Vector3::zeros());
    }

    #[test]
    fn test_flat_landing_of_rotated_cube() {
        // Rotated by whole quarter turns: the -X face ends up on top
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), -90.0_f64.to_radians());
        let mut body = FreeBody::new(Point3::new(0.0, 1.0, 0.0), rotation);
        run_until_rest(&mut body, 1000);
        let up = up_face(&body);
        assert!(up.normal(&body.rotation).dot(&Vector3::y()) > 1.0 - 1e-12);
        assert_eq!(up, Face::new(0, -1.0));
    }

    #[test]
    fn test_tilted_landing_tips_over() {
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), 30.0_f64.to_radians());
        let mut body = FreeBody::new(Point3::new(0.0, 2.0, 0.0), rotation);
        let physics = physics();

        let mut landed = None;
        for _ in 0..1000 {
            match body.step(false, DT, &physics) {
                StepOutcome::Landed { pivot, target, already_flat } => {
                    assert!(!already_flat);
                    landed = Some((pivot, target));
                    break;
                }
                StepOutcome::Falling => {}
                other => panic!("Unexpected {other:?}"),
            }
        }
        let (pivot, target) = landed.expect("Never landed");

        // While tipping, the pivot stays on the ground and the body does not move
        let corners = cube_corners(physics.half_extent);
        loop {
            match body.step(false, DT, &physics) {
                StepOutcome::Tipping { remaining } => {
                    assert!(remaining >= 0.0);
                    assert_eq!(body.velocity, Vector3::zeros());
                    assert_eq!(body.state, SettleState::Settling { pivot, target });
                    let pivot_y = body.corner(&corners[pivot], &body.position).y;
                    assert!(pivot_y.abs() < 1e-9, "pivot at {pivot_y}");
                }
                StepOutcome::Settled { up } => {
                    assert_eq!(up, target);
                    break;
                }
                other => panic!("Unexpected {other:?}"),
            }
        }
        assert!(target.normal(&body.rotation).dot(&Vector3::y()) > 1.0 - 1e-9);
        assert_eq!(body.position.y, 0.4);
    }

    #[test]
    fn test_resting_body_stays_on_same_face() {
        let rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), 25.0_f64.to_radians());
        let mut body = FreeBody::new(Point3::new(0.0, 2.0, 0.0), rotation);
        run_until_rest(&mut body, 1000);
        let up = up_face(&body);
        let resting = body.rotation;

        // Gravity keeps pushing it into the ground; every tick re-lands on the same face
        let physics = physics();
        for _ in 0..100 {
            assert_eq!(body.step(false, DT, &physics), StepOutcome::Settled { up });
            assert_eq!(body.position.y, 0.4);
        }
        assert!((body.rotation.matrix() - resting.matrix()).norm() < 1e-12);
    }

    #[test]
    fn test_upside_down_target_still_progresses() {
        // Force a target face pointing straight down: the tip axis degenerates.
        let physics = physics();
        let mut body = FreeBody::new(Point3::new(0.0, 0.4, 0.0), Rotation3::identity());
        body.state = SettleState::Settling { pivot: 3, target: Face::new(1, -1.0) };
        match body.step(false, DT, &physics) {
            StepOutcome::Tipping { remaining } => assert!(remaining < 180.0),
            other => panic!("Unexpected {other:?}"),
        }
        run_until_rest(&mut body, 1000);
        assert_eq!(up_face(&body), Face::new(1, -1.0));
    }

    #[test]
    fn test_face_display() {
        assert_eq!(Face::new(1, 1.0).to_string(), "+Y");
        assert_eq!(Face::new(0, -1.0).to_string(), "-X");
        assert_eq!(Face::new(2, 1.0).opposite().to_string(), "-Z");
    }

    #[test]
    fn test_face_candidates_order() {
        let candidates = face_candidates(&Rotation3::identity());
        assert_eq!(candidates[0].normal, Vector3::y());
        assert_eq!(candidates[1].normal, -Vector3::y());
        assert_eq!(candidates[2].normal, Vector3::x());
        assert_eq!(candidates[5].face, Face::new(2, -1.0));
    }
}
