use crate::config::SimulationConfig;
use crate::keyframes::{BACKWARD, FORWARD};
use crate::parameter_error::ParameterError;
use crate::picking::ReleasePolicy;
use crate::simulation::{JogInput, Simulation};

const READ_ERROR: &str = "Failed to load configuration from file";

#[test]
fn test_config_from_yaml() {
    let loaded = SimulationConfig::from_yaml_file("src/tests/data/pickplace_veto.yaml").expect(READ_ERROR);
    let defaults = SimulationConfig::default();

    assert_eq!(loaded.physics.gravity, 12.0);
    assert_eq!(loaded.physics.angular_speed, 300.0);
    assert_eq!(loaded.physics.half_extent, defaults.physics.half_extent);

    assert_eq!(loaded.picking.pick_radius, 2.5);
    assert_eq!(loaded.picking.grasp_threshold, 65.0);
    assert_eq!(loaded.picking.gripper_closed, defaults.picking.gripper_closed);
    assert_eq!(loaded.picking.release_policy, ReleasePolicy::VetoAboveHeight { height: 1.5 });

    assert_eq!(loaded.animation.ease_factor, 0.1);
    assert_eq!(loaded.animation.dwell_ticks, 5);
    assert_eq!(loaded.frame.jog_speed, 45.0);
    assert_eq!(loaded.frame.max_delta, 0.05);
    assert_eq!(loaded.frame.fallback_delta, 0.02);
    assert_eq!(loaded.object_start, nalgebra::Point3::new(10.0, 0.0, 0.5));

    assert_eq!(loaded.forward, FORWARD);
    assert_eq!(loaded.backward, BACKWARD);
}

#[test]
fn test_geometry_limits_and_tables_from_yaml() {
    let loaded = SimulationConfig::from_yaml_file("src/tests/data/pickplace_tables.yaml").expect(READ_ERROR);
    assert_eq!(loaded.geometry.base_height, 2.0);
    assert_eq!(loaded.geometry.lower_arm, 7.5);
    assert_eq!(loaded.geometry.upper_arm, 8.0);
    assert_eq!(loaded.limits.from[0], -170.0);
    assert_eq!(loaded.limits.to[0], 170.0);
    assert_eq!(loaded.forward, FORWARD);
}

#[test]
fn test_empty_yaml_gives_defaults() {
    let loaded = SimulationConfig::from_yaml_str("").expect(READ_ERROR);
    assert_eq!(loaded, SimulationConfig::default());
}

#[test]
fn test_table_must_have_nine_rows() {
    match SimulationConfig::from_yaml_file("src/tests/data/pickplace_short_table.yaml") {
        Err(ParameterError::InvalidLength { expected, found }) => {
            assert_eq!(expected, 9);
            assert_eq!(found, 3);
        }
        other => panic!("Unexpected {:?}", other),
    }
}

#[test]
fn test_keyframes_must_respect_limits() {
    let result = SimulationConfig::from_yaml_file("src/tests/data/pickplace_out_of_limits.yaml");
    assert!(matches!(result, Err(ParameterError::OutOfRange(_))), "{:?}", result);
}

#[test]
fn test_row_must_have_five_angles() {
    let yaml = "keyframes_forward:\n".to_string() + &"  - [0, 30, -60, -60]\n".repeat(9);
    let result = SimulationConfig::from_yaml_str(&yaml);
    assert!(
        matches!(result, Err(ParameterError::InvalidLength { expected: 5, found: 4 })),
        "{:?}",
        result
    );
}

#[test]
fn test_non_numeric_value() {
    let result = SimulationConfig::from_yaml_str("physics:\n  gravity: strong\n");
    assert!(matches!(result, Err(ParameterError::ParseError(_))), "{:?}", result);
}

#[test]
fn test_unknown_release_policy() {
    let result = SimulationConfig::from_yaml_str("picking:\n  release_policy: sometimes\n");
    assert!(matches!(result, Err(ParameterError::ParseError(_))), "{:?}", result);
}

#[test]
fn test_missing_file() {
    let result = SimulationConfig::from_yaml_file("src/tests/data/no_such_file.yaml");
    assert!(matches!(result, Err(ParameterError::IoError(_))), "{:?}", result);
}

#[test]
fn test_yaml_round_trip_of_geometry() {
    let defaults = SimulationConfig::default();
    let loaded = SimulationConfig::from_yaml_str(&defaults.geometry.to_yaml()).expect(READ_ERROR);
    assert_eq!(loaded.geometry, defaults.geometry);
}

fn assert_out_of_range(yaml: &str) {
    let result = SimulationConfig::from_yaml_str(yaml);
    assert!(matches!(result, Err(ParameterError::OutOfRange(_))), "{:?} for\n{}", result, yaml);
}

#[test]
fn test_settling_thresholds_are_validated() {
    assert_out_of_range("physics:\n  snap_dot: 1.5\n");
    assert_out_of_range("physics:\n  snap_dot: 1.0\n");
    assert_out_of_range("physics:\n  snap_dot: -0.2\n");
    assert_out_of_range("physics:\n  stable_dot: 0\n");
    assert_out_of_range("physics:\n  stable_dot: 1.2\n");
    // Already flat faces must also pass the snap check
    assert_out_of_range("physics:\n  stable_dot: 0.999\n  snap_dot: 0.99\n");

    let loaded = SimulationConfig::from_yaml_str("physics:\n  stable_dot: 0.95\n  snap_dot: 0.98\n")
        .expect(READ_ERROR);
    assert_eq!(loaded.physics.stable_dot, 0.95);
    assert_eq!(loaded.physics.snap_dot, 0.98);
}

#[test]
fn test_gravity_must_pull_down() {
    assert_out_of_range("physics:\n  gravity: -9.8\n");
    assert_out_of_range("physics:\n  gravity: 0\n");
}

#[test]
fn test_fallback_delta_is_validated() {
    assert_out_of_range("frame:\n  fallback_delta: -0.5\n");
    assert_out_of_range("frame:\n  fallback_delta: 0\n");
    assert_out_of_range("frame:\n  max_delta: 0.05\n  fallback_delta: 0.08\n");
}

#[test]
fn test_loaded_config_keeps_stalled_frames_positive() {
    let config = SimulationConfig::from_yaml_file("src/tests/data/pickplace_veto.yaml").expect(READ_ERROR);
    let mut sim = Simulation::new(config);
    let report = sim.tick(5.0, &JogInput::default());
    assert_eq!(report.dt, 0.02);
}
