//! Simulation core of a 5-joint robotic arm that picks up a cube at one drop zone
//! and places it at another.
//!
//! The arm has a rotating base, lower arm, upper arm, gripper base and a two
//! finger gripper. Each frame the simulation
//!
//! 1. lets the free cube fall and tip over onto a face ([settling]),
//! 2. moves the joints, either eased through hand-authored keyframes
//!    ([animator], [keyframes]) or jogged manually,
//! 3. decides whether the gripper holds the cube ([picking]), using the forward
//!    kinematics of the arm ([kinematics_impl]).
//!
//! [simulation::Simulation] ties these together and is the entry point for
//! front ends. Rendering, input devices and windowing are not part of this crate.
//!
//! # Frames and units
//!
//! The world is Y-up, ground at Y = 0. Joint angles are in degrees, distances
//! in scene units. At all joints zero the arm stands straight up. The base
//! rotates about the world Y axis, the three arm joints about their local X axis.
//!
//! # Features
//!
//! - `allow_filesystem` (default): YAML configuration loading and the
//!   `pickplace` headless runner.
//!
//! ## Examples
//!
//! - **pick_and_place.rs**: runs one forward pass and prints where the cube ended up.

pub mod parameters;

#[cfg(feature = "allow_filesystem")]
pub mod parameters_from_file;

#[path = "utils/utils.rs"]
pub mod utils;
pub mod kinematic_traits;
pub mod kinematics_impl;

pub mod constraints;

pub mod config;

pub mod keyframes;

pub mod settling;

pub mod picking;

pub mod animator;

pub mod simulation;

#[cfg(feature = "allow_filesystem")]
pub mod parameter_error;

#[cfg(test)]
#[cfg(feature = "allow_filesystem")]
mod tests;
