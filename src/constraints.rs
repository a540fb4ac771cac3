use std::ops::RangeInclusive;
use crate::kinematic_traits::Joints;

/// Range limits of the joints, in degrees. Unlike industrial robot constraints,
/// these ranges never wrap around: every joint of the arm has a hard stop.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraints {
    /// Lower limit, inclusive
    pub from: Joints,

    /// Upper limit, inclusive
    pub to: Joints,
}

impl Constraints {
    /// Limits are swapped per joint if given in reverse order.
    pub fn new(from: Joints, to: Joints) -> Self {
        let mut lower = from;
        let mut upper = to;
        for i in 0..5 {
            if lower[i] > upper[i] {
                std::mem::swap(&mut lower[i], &mut upper[i]);
            }
        }
        Constraints { from: lower, to: upper }
    }

    /// Build constraints from ranges like -60.0..=60.0, one per joint.
    pub fn from_degrees(ranges: [RangeInclusive<f64>; 5]) -> Self {
        let from = std::array::from_fn(|i| *ranges[i].start());
        let to = std::array::from_fn(|i| *ranges[i].end());
        Constraints::new(from, to)
    }

    pub fn compliant(&self, angles: &Joints) -> bool {
        (0..5).all(|i| angles[i] >= self.from[i] && angles[i] <= self.to[i])
    }

    /// Clamp the value for the given joint into its limits. Non-finite values
    /// cannot be clamped meaningfully and return None.
    pub fn clamp(&self, joint: usize, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        Some(value.clamp(self.from[joint], self.to[joint]))
    }

    /// Clamp all joints in place. Non-finite values are replaced by the
    /// closest limit to zero.
    pub fn clamp_all(&self, angles: &mut Joints) {
        for i in 0..5 {
            angles[i] = match self.clamp(i, angles[i]) {
                Some(value) => value,
                None => 0.0_f64.clamp(self.from[i], self.to[i]),
            };
        }
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Constraints::from_degrees([
            -180.0..=180.0,
            -60.0..=60.0,
            -120.0..=120.0,
            -60.0..=60.0,
            0.0..=90.0,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematic_traits::{HOME, J_BASE, J_GRIPPER, J_LOWER_ARM, J_UPPER_ARM};

    #[test]
    fn test_home_is_compliant() {
        assert!(Constraints::default().compliant(&HOME));
    }

    #[test]
    fn test_clamp_to_limits() {
        let limits = Constraints::default();
        assert_eq!(limits.clamp(J_BASE, 500.0), Some(180.0));
        assert_eq!(limits.clamp(J_LOWER_ARM, -75.0), Some(-60.0));
        assert_eq!(limits.clamp(J_UPPER_ARM, 45.5), Some(45.5));
        assert_eq!(limits.clamp(J_GRIPPER, -3.0), Some(0.0));
    }

    #[test]
    fn test_non_finite_is_not_clamped() {
        let limits = Constraints::default();
        assert_eq!(limits.clamp(J_BASE, f64::NAN), None);
        assert_eq!(limits.clamp(J_BASE, f64::INFINITY), None);
    }

    #[test]
    fn test_clamp_all() {
        let limits = Constraints::default();
        let mut angles = [-1000.0, 1000.0, f64::NAN, 10.0, 95.0];
        limits.clamp_all(&mut angles);
        assert_eq!(angles, [-180.0, 60.0, 0.0, 10.0, 90.0]);
        assert!(limits.compliant(&angles));
    }

    #[test]
    fn test_reversed_ranges_are_swapped() {
        let limits = Constraints::new([10.0; 5], [-10.0; 5]);
        assert_eq!(limits.from, [-10.0; 5]);
        assert_eq!(limits.to, [10.0; 5]);
    }
}
