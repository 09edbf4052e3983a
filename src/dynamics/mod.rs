//! Rigid-body dynamics (forces, torques, velocities, integration).

pub use force::{Force, Torque, DURATION_EPSILON_MS};
pub use object::{GpuTransform, PhysicalObject, PhysicalObjectDesc};

/// Timed and continuous forces and torques.
pub mod force;
/// Physics integration routines (position, velocity and orientation updates).
pub mod integrate;
/// Physical object definition and hit testing.
pub mod object;
