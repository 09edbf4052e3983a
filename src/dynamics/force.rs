//! Timed and continuous linear forces and torques.

use crate::math::Vec3;

/// Remaining durations at or below this many milliseconds count as exhausted.
pub const DURATION_EPSILON_MS: f32 = 1.0e-3;

/// Time accounting shared by forces and torques.
///
/// `None` marks a continuous influence: it is valid for exactly one [`Exertion::exert`] call and
/// then behaves like an exhausted timed one until renewed.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Exertion {
    remaining_ms: Option<f32>,
}

impl Exertion {
    fn exert(&mut self, dt: f32) -> f32 {
        match self.remaining_ms {
            None => {
                self.remaining_ms = Some(0.0);
                dt
            }
            Some(remaining) if remaining > DURATION_EPSILON_MS => {
                self.remaining_ms = Some((remaining - dt).max(0.0));
                remaining.min(dt)
            }
            Some(_) => 0.0,
        }
    }

    fn is_exhausted(&self) -> bool {
        matches!(self.remaining_ms, Some(remaining) if remaining <= DURATION_EPSILON_MS)
    }
}

/// A linear force applied to the center of a physical object.
#[derive(Clone, Debug, PartialEq)]
pub struct Force {
    id: String,
    strength: f32,
    direction: Vec3,
    exertion: Exertion,
}

impl Force {
    /// Create a force of `strength` newtons along `direction`.
    ///
    /// The direction is normalized. Without a `duration_ms` the force is continuous.
    pub fn new(
        id: impl Into<String>,
        strength: f32,
        direction: Vec3,
        duration_ms: Option<f32>,
    ) -> Self {
        Self {
            id: id.into(),
            strength,
            direction: direction.normalize(),
            exertion: Exertion {
                remaining_ms: duration_ms,
            },
        }
    }

    /// Identifier used by [`PhysicalObject::add_or_renew_force`](super::PhysicalObject::add_or_renew_force).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Magnitude in newtons.
    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Unit direction.
    pub fn direction(&self) -> &Vec3 {
        &self.direction
    }

    /// Milliseconds left, or `None` for a continuous force not exerted yet.
    pub fn remaining_duration(&self) -> Option<f32> {
        self.exertion.remaining_ms
    }

    /// Is this force continuous (no fixed duration)?
    pub fn is_continuous(&self) -> bool {
        self.exertion.remaining_ms.is_none()
    }

    /// Has this force run out of time?
    pub fn is_exhausted(&self) -> bool {
        self.exertion.is_exhausted()
    }

    /// Consumes up to `dt` milliseconds and returns how many were actually used.
    pub fn exert(&mut self, dt: f32) -> f32 {
        self.exertion.exert(dt)
    }

    /// Acceleration this force imparts on a body of `mass` kilograms, in m/s².
    pub fn acceleration(&self, mass: f32) -> Vec3 {
        self.direction * (self.strength / mass)
    }

    /// Overwrites every parameter in place, keeping the id.
    pub fn renew(&mut self, strength: f32, direction: Vec3, duration_ms: Option<f32>) {
        self.strength = strength;
        self.direction = direction.normalize();
        self.exertion.remaining_ms = duration_ms;
    }
}

/// A torque rotating a physical object around an axis through its origin.
///
/// The strength is normalized by mass (kg·rad/s²): dividing it by the object's mass yields the
/// angular acceleration. There is no inertia tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct Torque {
    id: String,
    strength: f32,
    axis: Vec3,
    exertion: Exertion,
}

impl Torque {
    /// Create a torque around `axis`. Without a `duration_ms` the torque is continuous.
    pub fn new(
        id: impl Into<String>,
        strength: f32,
        axis: Vec3,
        duration_ms: Option<f32>,
    ) -> Self {
        Self {
            id: id.into(),
            strength,
            axis: axis.normalize(),
            exertion: Exertion {
                remaining_ms: duration_ms,
            },
        }
    }

    /// Identifier used by [`PhysicalObject::add_or_renew_torque`](super::PhysicalObject::add_or_renew_torque).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Mass-normalized magnitude.
    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Unit rotation axis.
    pub fn axis(&self) -> &Vec3 {
        &self.axis
    }

    /// Milliseconds left, or `None` for a continuous torque not exerted yet.
    pub fn remaining_duration(&self) -> Option<f32> {
        self.exertion.remaining_ms
    }

    /// Is this torque continuous (no fixed duration)?
    pub fn is_continuous(&self) -> bool {
        self.exertion.remaining_ms.is_none()
    }

    /// Has this torque run out of time?
    pub fn is_exhausted(&self) -> bool {
        self.exertion.is_exhausted()
    }

    /// Consumes up to `dt` milliseconds and returns how many were actually used.
    pub fn exert(&mut self, dt: f32) -> f32 {
        self.exertion.exert(dt)
    }

    /// Angular acceleration vector (axis scaled by rad/s²) on a body of `mass` kilograms.
    pub fn acceleration(&self, mass: f32) -> Vec3 {
        self.axis * (self.strength / mass)
    }

    /// Overwrites every parameter in place, keeping the id.
    pub fn renew(&mut self, strength: f32, axis: Vec3, duration_ms: Option<f32>) {
        self.strength = strength;
        self.axis = axis.normalize();
        self.exertion.remaining_ms = duration_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn timed_force_runs_out() {
        let mut force = Force::new("", 1.0, Vec3::x(), Some(10.0));
        assert_eq!(force.exert(6.0), 6.0);
        assert_eq!(force.exert(6.0), 4.0);
        assert_eq!(force.exert(6.0), 0.0);
        assert!(force.is_exhausted());
    }

    #[test]
    fn continuous_force_lasts_one_call() {
        let mut force = Force::new("thrust", 1.0, Vec3::x(), None);
        assert!(force.is_continuous());
        assert_eq!(force.exert(16.0), 16.0);
        assert!(!force.is_continuous());
        assert!(force.is_exhausted());
        assert_eq!(force.exert(16.0), 0.0);

        force.renew(2.0, Vec3::y(), None);
        assert_eq!(force.exert(8.0), 8.0);
        assert_eq!(force.exert(8.0), 0.0);
    }

    #[test]
    fn renew_overwrites_in_place() {
        let mut force = Force::new("thrust", 1.0, Vec3::x(), None);
        force.renew(5.0, Vec3::new(0.0, 0.0, 3.0), Some(20.0));
        assert_eq!(force.id(), "thrust");
        assert_eq!(force.strength(), 5.0);
        assert_eq!(force.direction(), &Vec3::z());
        assert_eq!(force.remaining_duration(), Some(20.0));
        assert!(!force.is_continuous());
    }

    #[test]
    fn directions_are_normalized() {
        let force = Force::new("", 1.0, Vec3::new(3.0, 4.0, 0.0), None);
        assert_relative_eq!(force.direction().norm(), 1.0, epsilon = 1.0e-6);
        let torque = Torque::new("", 1.0, Vec3::new(0.0, 0.0, -2.0), None);
        assert_eq!(torque.axis(), &-Vec3::z());
    }

    #[test]
    fn acceleration_divides_by_mass() {
        let force = Force::new("", 100.0, Vec3::x(), None);
        assert_relative_eq!(force.acceleration(10.0), Vec3::new(10.0, 0.0, 0.0));
        let torque = Torque::new("", 3.0, Vec3::y(), Some(1.0));
        assert_relative_eq!(torque.acceleration(2.0), Vec3::new(0.0, 1.5, 0.0));
    }

    #[test]
    fn torque_shares_time_accounting() {
        let mut torque = Torque::new("spin", 1.0, Vec3::z(), Some(10.0));
        assert_eq!(torque.exert(6.0), 6.0);
        assert_eq!(torque.exert(6.0), 4.0);
        assert_eq!(torque.exert(6.0), 0.0);
        torque.renew(1.0, Vec3::z(), None);
        assert!(torque.is_continuous());
    }

    proptest! {
        #[test]
        fn exertion_never_exceeds_duration(
            duration in 0.0f32..100.0,
            slices in proptest::collection::vec(0.0f32..10.0, 1..16),
        ) {
            let mut force = Force::new("", 1.0, Vec3::x(), Some(duration));
            let mut used = 0.0;
            for slice in &slices {
                used += force.exert(*slice);
            }
            prop_assert!(used <= duration + 1.0e-3);
            let total: f32 = slices.iter().sum();
            if total >= duration {
                prop_assert_eq!(force.exert(10.0), 0.0);
            }
        }
    }
}
