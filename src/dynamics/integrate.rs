//! Force and velocity integration.

use super::PhysicalObject;
use crate::math::{
    correct_orthogonal4, rotation4, straighten, translate_by_vector, translation_vector3, Vec3,
};

impl PhysicalObject {
    /// Advances the object by `dt` milliseconds.
    ///
    /// Position moves by the velocity sampled at the start of the step, then every force adds its
    /// own displacement and velocity change for the time it was active within `dt`. Unless the
    /// orientation is fixed, the angular velocity matrix is applied once per whole window that
    /// fits in `dt`, and torques update orientation and angular velocity the same way forces do.
    ///
    /// Forces and torques exhausted by a previous step and not renewed since are dropped first.
    /// A negative `dt` does nothing. A zero `dt` still consumes continuous forces and torques.
    pub fn simulate(&mut self, dt: f32) {
        if dt < 0.0 {
            return;
        }
        self.forces.retain(|f| !f.is_exhausted());
        self.torques.retain(|t| !t.is_exhausted());

        let velocity = translation_vector3(&self.velocity_matrix);
        translate_by_vector(&mut self.position_matrix, &(velocity * (dt / 1000.0)));

        let mut delta_position = Vec3::zeros();
        let mut delta_velocity = Vec3::zeros();
        for force in &mut self.forces {
            let t = force.exert(dt) / 1000.0;
            let a = force.acceleration(self.mass);
            delta_position += a * (0.5 * t * t);
            delta_velocity += a * t;
        }
        translate_by_vector(&mut self.position_matrix, &delta_position);
        translate_by_vector(&mut self.velocity_matrix, &delta_velocity);
        straighten(
            &mut self.velocity_matrix,
            self.config.velocity_straighten_threshold,
        );

        if !self.fixed_orientation {
            self.integrate_rotation(dt);
        }

        self.invalidate_caches();
        tracing::trace!(
            dt,
            forces = self.forces.len(),
            torques = self.torques.len(),
            "simulated"
        );
    }

    fn integrate_rotation(&mut self, dt: f32) {
        // Rotation matrices cannot be scaled by time the way translations are, so the angular
        // velocity is replayed in whole windows.
        let windows = (dt / self.config.angular_velocity_window_ms).floor() as u32;
        for _ in 0..windows {
            self.orientation_matrix = self.angular_velocity_matrix * self.orientation_matrix;
        }

        let window_s = self.config.angular_velocity_window_s();
        for torque in &mut self.torques {
            let t = torque.exert(dt) / 1000.0;
            let axis = *torque.axis();
            let alpha = torque.acceleration(self.mass).dot(&axis);
            self.orientation_matrix =
                rotation4(&axis, 0.5 * alpha * t * t) * self.orientation_matrix;
            self.angular_velocity_matrix =
                rotation4(&axis, alpha * t * window_s) * self.angular_velocity_matrix;
        }

        straighten(
            &mut self.angular_velocity_matrix,
            self.config.angular_velocity_straighten_threshold,
        );
        correct_orthogonal4(&mut self.orientation_matrix);
        correct_orthogonal4(&mut self.angular_velocity_matrix);
    }
}
