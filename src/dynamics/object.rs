//! Physical object definition: kinematic state, forces and hit volumes.

use std::cell::Cell;

use super::force::{Force, Torque};
use crate::config::PhysicsConfig;
use crate::math::{
    inverse_of_rotation4, inverse_of_scaling4, inverse_of_translation4, matrix3_from4, rotation4,
    translate_by_vector, translation_vector3, Mat4, Vec3, Vec4,
};
use crate::shapes::Body;

#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
/// World transforms of a physical object, with a layout suitable for a uniform buffer.
pub struct GpuTransform {
    /// `position * orientation * scaling`.
    pub model: Mat4,
    /// The orientation alone, for transforming normals.
    pub orientation: Mat4,
}

#[derive(Clone, Debug)]
/// Helper struct for defining a [`PhysicalObject`] or re-initializing a pooled one.
pub struct PhysicalObjectDesc {
    /// Mass in kilograms.
    pub mass: f32,
    /// World-space translation.
    pub position_matrix: Mat4,
    /// World-space rotation.
    pub orientation_matrix: Mat4,
    /// World-space scaling. Hit testing assumes it is uniform.
    pub scaling_matrix: Mat4,
    /// Translation covered in one second.
    pub velocity_matrix: Mat4,
    /// Rotation covered in one angular velocity window.
    pub angular_velocity_matrix: Mat4,
    /// Hit volumes, in the object's local (unscaled) frame.
    pub bodies: Vec<Body>,
    /// Ignore torques and angular velocity entirely.
    pub fixed_orientation: bool,
    /// Integration constants.
    pub config: PhysicsConfig,
}

impl Default for PhysicalObjectDesc {
    fn default() -> Self {
        Self {
            mass: 1.0,
            position_matrix: Mat4::identity(),
            orientation_matrix: Mat4::identity(),
            scaling_matrix: Mat4::identity(),
            velocity_matrix: Mat4::identity(),
            angular_velocity_matrix: Mat4::identity(),
            bodies: Vec::new(),
            fixed_orientation: false,
            config: PhysicsConfig::default(),
        }
    }
}

/// A simulated object: a point mass with an orientation, driven by forces and torques, and
/// hit-tested through a fixed set of [`Body`] boxes.
#[derive(Clone, Debug)]
pub struct PhysicalObject {
    pub(crate) mass: f32,
    pub(crate) position_matrix: Mat4,
    pub(crate) orientation_matrix: Mat4,
    pub(crate) scaling_matrix: Mat4,
    pub(crate) velocity_matrix: Mat4,
    pub(crate) angular_velocity_matrix: Mat4,
    pub(crate) forces: Vec<Force>,
    pub(crate) torques: Vec<Torque>,
    bodies: Vec<Body>,
    body_size: f32,
    pub(crate) fixed_orientation: bool,
    pub(crate) config: PhysicsConfig,
    // Lazily recomputed; cleared whenever position, orientation or scaling changes.
    rotation_matrix_inverse: Cell<Option<Mat4>>,
    model_matrix_inverse: Cell<Option<Mat4>>,
}

impl Default for PhysicalObject {
    fn default() -> Self {
        Self::new(PhysicalObjectDesc::default())
    }
}

impl PhysicalObject {
    /// Create an object from `desc`, with no forces or torques.
    pub fn new(desc: PhysicalObjectDesc) -> Self {
        let body_size = bounding_radius(&desc.bodies);
        tracing::debug!(
            mass = desc.mass,
            bodies = desc.bodies.len(),
            body_size,
            "physical object created"
        );
        Self {
            mass: desc.mass,
            position_matrix: desc.position_matrix,
            orientation_matrix: desc.orientation_matrix,
            scaling_matrix: desc.scaling_matrix,
            velocity_matrix: desc.velocity_matrix,
            angular_velocity_matrix: desc.angular_velocity_matrix,
            forces: Vec::new(),
            torques: Vec::new(),
            bodies: desc.bodies,
            body_size,
            fixed_orientation: desc.fixed_orientation,
            config: desc.config,
            rotation_matrix_inverse: Cell::new(None),
            model_matrix_inverse: Cell::new(None),
        }
    }

    /// Re-initializes this object in place, so pooled instances can be reused.
    ///
    /// Every force and torque is dropped; the force and torque buffers keep their capacity.
    pub fn reset(&mut self, desc: PhysicalObjectDesc) {
        let mut forces = std::mem::take(&mut self.forces);
        let mut torques = std::mem::take(&mut self.torques);
        forces.clear();
        torques.clear();
        *self = Self {
            forces,
            torques,
            ..Self::new(desc)
        };
    }

    /// Mass in kilograms.
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// World-space translation.
    pub fn position_matrix(&self) -> &Mat4 {
        &self.position_matrix
    }

    /// World-space rotation.
    pub fn orientation_matrix(&self) -> &Mat4 {
        &self.orientation_matrix
    }

    /// World-space scaling.
    pub fn scaling_matrix(&self) -> &Mat4 {
        &self.scaling_matrix
    }

    /// Translation covered in one second.
    pub fn velocity_matrix(&self) -> &Mat4 {
        &self.velocity_matrix
    }

    /// The velocity in m/s.
    pub fn velocity_vector(&self) -> Vec3 {
        translation_vector3(&self.velocity_matrix)
    }

    /// Rotation covered in one angular velocity window.
    pub fn angular_velocity_matrix(&self) -> &Mat4 {
        &self.angular_velocity_matrix
    }

    /// Hit volumes, in the object's local frame.
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Distance from the local origin to the farthest corner of any body.
    pub fn body_size(&self) -> f32 {
        self.body_size
    }

    /// Active (and not yet pruned) forces, in insertion order.
    pub fn forces(&self) -> &[Force] {
        &self.forces
    }

    /// Active (and not yet pruned) torques, in insertion order.
    pub fn torques(&self) -> &[Torque] {
        &self.torques
    }

    /// Are torques and angular velocity ignored?
    pub fn fixed_orientation(&self) -> bool {
        self.fixed_orientation
    }

    /// Integration constants used by this object.
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Sets the world-space translation.
    pub fn set_position_matrix(&mut self, position_matrix: Mat4) {
        self.position_matrix = position_matrix;
        self.invalidate_caches();
    }

    /// Sets the world-space rotation.
    pub fn set_orientation_matrix(&mut self, orientation_matrix: Mat4) {
        self.orientation_matrix = orientation_matrix;
        self.invalidate_caches();
    }

    /// Sets the world-space scaling.
    pub fn set_scaling_matrix(&mut self, scaling_matrix: Mat4) {
        self.scaling_matrix = scaling_matrix;
        self.invalidate_caches();
    }

    /// Sets the translation covered in one second.
    pub fn set_velocity_matrix(&mut self, velocity_matrix: Mat4) {
        self.velocity_matrix = velocity_matrix;
        self.invalidate_caches();
    }

    /// Sets the rotation covered in one angular velocity window.
    pub fn set_angular_velocity_matrix(&mut self, angular_velocity_matrix: Mat4) {
        self.angular_velocity_matrix = angular_velocity_matrix;
    }

    /// The angular velocity matrix describing a spin of `radians_per_second` around `axis`.
    pub fn angular_velocity_matrix_for(&self, axis: &Vec3, radians_per_second: f32) -> Mat4 {
        rotation4(
            axis,
            radians_per_second * self.config.angular_velocity_window_s(),
        )
    }

    /// Translates the object by `v` in world space.
    pub fn move_by_vector(&mut self, v: &Vec3) {
        translate_by_vector(&mut self.position_matrix, v);
        self.invalidate_caches();
    }

    /// `position * orientation * scaling`.
    pub fn model_matrix(&self) -> Mat4 {
        self.position_matrix * self.orientation_matrix * self.scaling_matrix
    }

    /// Inverse of the orientation matrix.
    pub fn rotation_matrix_inverse(&self) -> Mat4 {
        if let Some(m) = self.rotation_matrix_inverse.get() {
            return m;
        }
        let m = inverse_of_rotation4(&self.orientation_matrix);
        self.rotation_matrix_inverse.set(Some(m));
        m
    }

    /// Inverse of the model matrix, mapping world space into the object's local frame.
    pub fn model_matrix_inverse(&self) -> Mat4 {
        if let Some(m) = self.model_matrix_inverse.get() {
            return m;
        }
        let m = inverse_of_scaling4(&self.scaling_matrix)
            * self.rotation_matrix_inverse()
            * inverse_of_translation4(&self.position_matrix);
        self.model_matrix_inverse.set(Some(m));
        m
    }

    /// Transforms to hand to the rendering layer.
    pub fn render_transform(&self) -> GpuTransform {
        GpuTransform {
            model: self.model_matrix(),
            orientation: self.orientation_matrix,
        }
    }

    pub(crate) fn invalidate_caches(&self) {
        self.rotation_matrix_inverse.set(None);
        self.model_matrix_inverse.set(None);
    }

    /// Renews the force named `id`, or appends a new one if there is none.
    ///
    /// Ids are compared verbatim, the empty id included. Without a `duration_ms` the force is
    /// continuous and must be renewed before every [`simulate`](Self::simulate) to keep acting.
    pub fn add_or_renew_force(
        &mut self,
        id: &str,
        strength: f32,
        direction: Vec3,
        duration_ms: Option<f32>,
    ) {
        match self.forces.iter_mut().find(|f| f.id() == id) {
            Some(force) => force.renew(strength, direction, duration_ms),
            None => self
                .forces
                .push(Force::new(id, strength, direction, duration_ms)),
        }
    }

    /// Renews the torque named `id`, or appends a new one if there is none.
    pub fn add_or_renew_torque(
        &mut self,
        id: &str,
        strength: f32,
        axis: Vec3,
        duration_ms: Option<f32>,
    ) {
        match self.torques.iter_mut().find(|t| t.id() == id) {
            Some(torque) => torque.renew(strength, axis, duration_ms),
            None => self
                .torques
                .push(Torque::new(id, strength, axis, duration_ms)),
        }
    }

    /// Applies a force at the local point `position`, off the object's center.
    ///
    /// The full force is applied linearly, and the part of it perpendicular to the lever arm
    /// additionally turns the object. Both are appended anonymously.
    ///
    /// A `position` at the local origin has no lever direction: the torque gets a NaN strength
    /// and axis, and the next [`simulate`](Self::simulate) fills the orientation with NaN.
    pub fn add_force_and_torque(
        &mut self,
        position: &Vec3,
        direction: &Vec3,
        strength: f32,
        duration_ms: Option<f32>,
    ) {
        let direction = direction.normalize();
        self.forces
            .push(Force::new("", strength, direction, duration_ms));

        let lever = position.normalize();
        let parallel = lever * direction.dot(&lever);
        let perpendicular = direction - parallel;
        self.torques.push(Torque::new(
            "",
            strength * perpendicular.norm() * position.norm(),
            perpendicular.cross(&lever),
            duration_ms,
        ));
    }

    /// Swept hit test of a moving point against this object's bodies.
    ///
    /// # Arguments
    /// * `position` - World-space position of the point (`w = 1`) at the start of the interval.
    /// * `velocity` - World-space velocity of the point, in m/s.
    /// * `dt` - Length of the interval in milliseconds.
    /// * `offset` - Extra padding around every body, in world units. Pass `0.0` for none.
    ///
    /// Returns the contact point in the object's local (unscaled) frame, from the first body in
    /// order that reports a hit.
    pub fn check_hit(
        &self,
        position: &Vec4,
        velocity: &Vec3,
        dt: f32,
        offset: f32,
    ) -> Option<Vec4> {
        let relative_velocity = velocity - self.velocity_vector();
        let scale = self.scaling_matrix[(0, 0)];
        let range = relative_velocity.norm() * dt / 1000.0 / scale;
        let offset = offset / scale;
        let relative_position = self.model_matrix_inverse() * position;

        let reach = self.body_size + range + offset;
        if relative_position.xyz().iter().any(|c| c.abs() > reach) {
            return None;
        }

        let direction =
            (matrix3_from4(&self.rotation_matrix_inverse()) * relative_velocity).normalize();
        let hit = self
            .bodies
            .iter()
            .find_map(|body| body.check_hit(&relative_position, &direction, range, offset));
        if let Some(contact) = &hit {
            tracing::trace!(?contact, range, "hit");
        }
        hit
    }
}

fn bounding_radius(bodies: &[Body]) -> f32 {
    bodies
        .iter()
        .flat_map(|body| body.corners())
        .map(|corner| corner.norm())
        .fold(0.0, f32::max)
}
