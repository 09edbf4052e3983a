#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

extern crate nalgebra as na;

/// Tuning constants for the integrator.
///
/// A [`PhysicsConfig`] is embedded in every physical object; validate it once when it comes from
/// an external source.
pub mod config;
/// Force, torque and velocity integration for physical objects.
///
/// This module provides the [`PhysicalObject`](dynamics::PhysicalObject) type, the forces and
/// torques driving it, and the swept hit test used by projectile systems.
pub mod dynamics;
/// Homogeneous transform helpers.
///
/// Type aliases over `nalgebra` and the handful of matrix operations the integrator relies on
/// (axis-angle rotations, inverses of pure transforms, drift cleanup).
pub mod math;
/// Box-shaped hit volumes.
pub mod shapes;

pub use config::{ConfigError, PhysicsConfig};
pub use dynamics::{Force, GpuTransform, PhysicalObject, PhysicalObjectDesc, Torque};
pub use shapes::Body;
