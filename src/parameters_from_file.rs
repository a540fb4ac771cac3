//! Supports reading the simulation configuration from YAML file (optional)

use std::path::Path;
use yaml_rust2::{Yaml, YamlLoader};

use crate::config::SimulationConfig;
use crate::constraints::Constraints;
use crate::keyframes::{KeyframeTable, KEYFRAME_COUNT};
use crate::kinematic_traits::Joints;
use crate::parameter_error::ParameterError;
use crate::picking::ReleasePolicy;

impl SimulationConfig {
    /// Read the simulation configuration from YAML file. Every section and every
    /// field is optional, missing values keep their defaults:
    /// ```yaml
    /// physics:
    ///   gravity: 9.8
    ///   half_extent: 0.4
    ///   angular_speed: 150
    /// picking:
    ///   pick_radius: 5.0
    ///   grasp_threshold: 70
    ///   release_policy: veto   # or allow
    ///   veto_height: 2.0
    /// animation:
    ///   ease_factor: 0.05
    ///   dwell_ticks: 20
    /// input:
    ///   jog_speed: 100
    /// frame:
    ///   max_delta: 0.1
    ///   fallback_delta: 0.016
    /// geometry:
    ///   base_height: 1.5
    ///   lower_arm: 8
    /// limits: [[-180, 180], [-60, 60], [-120, 120], [-60, 60], [0, 90]]
    /// object_start: [10, 0, 0]
    /// keyframes_forward:
    ///   - [0, 30, -60, -60, 80]
    ///   # ... exactly 9 rows
    /// ```
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ParameterError> {
        let docs = YamlLoader::load_from_str(contents)
            .map_err(|e| ParameterError::ParseError(e.to_string()))?;
        let doc = match docs.first() {
            Some(doc) => doc,
            None => return Ok(SimulationConfig::default()),
        };

        let mut config = SimulationConfig::default();

        let physics = &doc["physics"];
        let p = &mut config.physics;
        read_field(physics, "physics", "gravity", &mut p.gravity)?;
        read_field(physics, "physics", "ground_level", &mut p.ground_level)?;
        read_field(physics, "physics", "half_extent", &mut p.half_extent)?;
        read_field(physics, "physics", "angular_speed", &mut p.angular_speed)?;
        read_field(physics, "physics", "stable_dot", &mut p.stable_dot)?;
        read_field(physics, "physics", "snap_dot", &mut p.snap_dot)?;
        positive("physics.half_extent", p.half_extent)?;
        positive("physics.angular_speed", p.angular_speed)?;
        positive("physics.gravity", p.gravity)?;
        unit_interval("physics.stable_dot", p.stable_dot)?;
        unit_interval("physics.snap_dot", p.snap_dot)?;
        if p.stable_dot > p.snap_dot {
            return Err(ParameterError::OutOfRange(format!(
                "physics.stable_dot ({}) must not exceed physics.snap_dot ({})",
                p.stable_dot, p.snap_dot
            )));
        }

        let picking = &doc["picking"];
        let k = &mut config.picking;
        read_field(picking, "picking", "pick_radius", &mut k.pick_radius)?;
        read_field(picking, "picking", "grasp_threshold", &mut k.grasp_threshold)?;
        read_field(picking, "picking", "gripper_closed", &mut k.gripper_closed)?;
        read_field(picking, "picking", "gripper_open", &mut k.gripper_open)?;
        let mut veto_height = 2.0;
        read_field(picking, "picking", "veto_height", &mut veto_height)?;
        k.release_policy = match &picking["release_policy"] {
            Yaml::BadValue => match k.release_policy {
                ReleasePolicy::VetoAboveHeight { .. } => ReleasePolicy::VetoAboveHeight { height: veto_height },
                policy => policy,
            },
            Yaml::String(s) if s == "allow" => ReleasePolicy::AllowMidAir,
            Yaml::String(s) if s == "veto" => ReleasePolicy::VetoAboveHeight { height: veto_height },
            other => {
                return Err(ParameterError::ParseError(format!(
                    "picking.release_policy must be 'allow' or 'veto', found {:?}",
                    other
                )));
            }
        };
        if k.gripper_closed > k.grasp_threshold {
            return Err(ParameterError::OutOfRange(format!(
                "picking.gripper_closed ({}) would not hold the object (grasp_threshold {})",
                k.gripper_closed, k.grasp_threshold
            )));
        }

        let animation = &doc["animation"];
        let a = &mut config.animation;
        read_field(animation, "animation", "ease_factor", &mut a.ease_factor)?;
        read_field(animation, "animation", "snap_tolerance", &mut a.snap_tolerance)?;
        let mut dwell = a.dwell_ticks as f64;
        read_field(animation, "animation", "dwell_ticks", &mut dwell)?;
        if dwell < 0.0 || dwell.fract() != 0.0 || dwell > u32::MAX as f64 {
            return Err(ParameterError::OutOfRange(format!(
                "animation.dwell_ticks must be a non-negative integer, found {}",
                dwell
            )));
        }
        a.dwell_ticks = dwell as u32;
        if !(a.ease_factor > 0.0 && a.ease_factor <= 1.0) {
            return Err(ParameterError::OutOfRange(format!(
                "animation.ease_factor must be in (0, 1], found {}",
                a.ease_factor
            )));
        }

        let f = &mut config.frame;
        read_field(&doc["input"], "input", "jog_speed", &mut f.jog_speed)?;
        read_field(&doc["frame"], "frame", "max_delta", &mut f.max_delta)?;
        read_field(&doc["frame"], "frame", "fallback_delta", &mut f.fallback_delta)?;
        positive("frame.max_delta", f.max_delta)?;
        positive("frame.fallback_delta", f.fallback_delta)?;
        if f.fallback_delta > f.max_delta {
            return Err(ParameterError::OutOfRange(format!(
                "frame.fallback_delta ({}) must not exceed frame.max_delta ({})",
                f.fallback_delta, f.max_delta
            )));
        }

        let geometry = &doc["geometry"];
        let g = &mut config.geometry;
        read_field(geometry, "geometry", "base_height", &mut g.base_height)?;
        read_field(geometry, "geometry", "lower_arm", &mut g.lower_arm)?;
        read_field(geometry, "geometry", "upper_arm", &mut g.upper_arm)?;
        read_field(geometry, "geometry", "gripper_base", &mut g.gripper_base)?;
        read_field(geometry, "geometry", "grasp_offset", &mut g.grasp_offset)?;

        if !doc["limits"].is_badvalue() {
            config.limits = read_limits(&doc["limits"])?;
        }

        if !doc["object_start"].is_badvalue() {
            let xyz = read_row::<3>(&doc["object_start"], "object_start")?;
            config.object_start = nalgebra::Point3::new(xyz[0], xyz[1], xyz[2]);
        }

        if !doc["keyframes_forward"].is_badvalue() {
            config.forward = read_table(&doc["keyframes_forward"], "keyframes_forward")?;
        }
        if !doc["keyframes_backward"].is_badvalue() {
            config.backward = read_table(&doc["keyframes_backward"], "keyframes_backward")?;
        }

        for (name, table) in [("keyframes_forward", &config.forward), ("keyframes_backward", &config.backward)] {
            for (i, row) in table.rows().iter().enumerate() {
                if !config.limits.compliant(row) {
                    return Err(ParameterError::OutOfRange(format!(
                        "{}[{}] = {:?} is outside the joint limits",
                        name, i, row
                    )));
                }
            }
        }

        Ok(config)
    }
}

/// Overwrite the target with the field of the section if present.
fn read_field(section: &Yaml, section_name: &str, key: &str, target: &mut f64) -> Result<(), ParameterError> {
    match &section[key] {
        Yaml::BadValue => Ok(()),
        value => {
            *target = as_number(value, &format!("{}.{}", section_name, key))?;
            Ok(())
        }
    }
}

fn as_number(value: &Yaml, field: &str) -> Result<f64, ParameterError> {
    let number = match value {
        Yaml::Integer(i) => *i as f64,
        Yaml::Real(_) => value
            .as_f64()
            .ok_or_else(|| ParameterError::ParseError(format!("{} is not a number", field)))?,
        Yaml::Null => return Err(ParameterError::MissingField(field.to_string())),
        _ => return Err(ParameterError::ParseError(format!("{} is not a number: {:?}", field, value))),
    };
    if !number.is_finite() {
        return Err(ParameterError::OutOfRange(format!("{} must be finite", field)));
    }
    Ok(number)
}

fn positive(field: &str, value: f64) -> Result<(), ParameterError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ParameterError::OutOfRange(format!("{} must be positive, found {}", field, value)))
    }
}

/// Dot product thresholds against world-up. A threshold of 1 is never exceeded.
fn unit_interval(field: &str, value: f64) -> Result<(), ParameterError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ParameterError::OutOfRange(format!("{} must be in (0, 1), found {}", field, value)))
    }
}

fn read_row<const N: usize>(value: &Yaml, field: &str) -> Result<[f64; N], ParameterError> {
    let items = value
        .as_vec()
        .ok_or_else(|| ParameterError::ParseError(format!("{} must be a list", field)))?;
    if items.len() != N {
        return Err(ParameterError::InvalidLength { expected: N, found: items.len() });
    }
    let mut row = [0.0; N];
    for (i, item) in items.iter().enumerate() {
        row[i] = as_number(item, &format!("{}[{}]", field, i))?;
    }
    Ok(row)
}

fn read_table(value: &Yaml, field: &str) -> Result<KeyframeTable, ParameterError> {
    let rows = value
        .as_vec()
        .ok_or_else(|| ParameterError::ParseError(format!("{} must be a list of rows", field)))?;
    if rows.len() != KEYFRAME_COUNT {
        return Err(ParameterError::InvalidLength { expected: KEYFRAME_COUNT, found: rows.len() });
    }
    let mut table = [[0.0; 5]; KEYFRAME_COUNT];
    for (i, row) in rows.iter().enumerate() {
        table[i] = read_row::<5>(row, &format!("{}[{}]", field, i))?;
    }
    Ok(KeyframeTable(table))
}

fn read_limits(value: &Yaml) -> Result<Constraints, ParameterError> {
    let rows = value
        .as_vec()
        .ok_or_else(|| ParameterError::ParseError("limits must be a list of [min, max] pairs".to_string()))?;
    if rows.len() != 5 {
        return Err(ParameterError::InvalidLength { expected: 5, found: rows.len() });
    }
    let mut from: Joints = [0.0; 5];
    let mut to: Joints = [0.0; 5];
    for (i, row) in rows.iter().enumerate() {
        let [min, max] = read_row::<2>(row, &format!("limits[{}]", i))?;
        from[i] = min;
        to[i] = max;
    }
    Ok(Constraints::new(from, to))
}
