//! Box-shaped hit volumes attached to a physical object.
//!
//! A [`Body`] is a cuboid placed inside its owner's local frame by a fixed translation and
//! rotation. An object can carry several of them to approximate its silhouette. Bodies never move
//! relative to their owner; all the motion lives in the owning
//! [`PhysicalObject`](crate::dynamics::PhysicalObject).

use crate::math::{
    equal4, inverse_of_rotation4, matrix3_from4, translation_vector3, Mat3, Mat4, Vec3, Vec4,
};

/// An oriented box, offset from the local origin of the object owning it.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    position_matrix: Mat4,
    orientation_matrix: Mat4,
    half_dimensions: Vec3,
    // Lets the hit test skip the rotation entirely for axis-aligned boxes.
    rotated: bool,
}

impl Body {
    /// Create a body from its offset transforms and full dimensions.
    ///
    /// # Arguments
    /// * `position_matrix` - Translation of the box center within the owner's local frame.
    /// * `orientation_matrix` - Rotation of the box within the owner's local frame.
    /// * `dimensions` - Full width, height and depth of the box along its own X, Y, Z axes.
    pub fn new(position_matrix: Mat4, orientation_matrix: Mat4, dimensions: Vec3) -> Self {
        Self {
            position_matrix,
            orientation_matrix,
            half_dimensions: dimensions * 0.5,
            rotated: !equal4(&orientation_matrix, &Mat4::identity()),
        }
    }

    /// Create an axis-aligned body centered on `center` with the given half extents.
    pub fn cuboid(center: Vec3, half_dimensions: Vec3) -> Self {
        Self::new(
            Mat4::new_translation(&center),
            Mat4::identity(),
            half_dimensions * 2.0,
        )
    }

    /// Translation of the box within the owner's local frame.
    pub fn position_matrix(&self) -> &Mat4 {
        &self.position_matrix
    }

    /// Rotation of the box within the owner's local frame.
    pub fn orientation_matrix(&self) -> &Mat4 {
        &self.orientation_matrix
    }

    /// Half of the box extents along its own axes.
    pub fn half_dimensions(&self) -> &Vec3 {
        &self.half_dimensions
    }

    /// Full extent along the body's X axis.
    pub fn width(&self) -> f32 {
        self.half_dimensions.x * 2.0
    }

    /// Full extent along the body's Y axis.
    pub fn height(&self) -> f32 {
        self.half_dimensions.y * 2.0
    }

    /// Full extent along the body's Z axis.
    pub fn depth(&self) -> f32 {
        self.half_dimensions.z * 2.0
    }

    /// Does this body carry a non-identity orientation offset?
    pub fn is_rotated(&self) -> bool {
        self.rotated
    }

    /// Transform from body space to the owner's local frame.
    pub fn model_matrix(&self) -> Mat4 {
        self.position_matrix * self.orientation_matrix
    }

    /// The 8 corners of the box, expressed in the owner's local frame.
    pub fn corners(&self) -> [Vec3; 8] {
        let center = translation_vector3(&self.position_matrix);
        let rotation = matrix3_from4(&self.orientation_matrix);
        let h = self.half_dimensions;
        let mut corners = [Vec3::zeros(); 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let sign = |bit: usize| if i & bit == 0 { -1.0 } else { 1.0 };
            let local = Vec3::new(sign(1) * h.x, sign(2) * h.y, sign(4) * h.z);
            *corner = center + rotation * local;
        }
        corners
    }

    /// Swept intersection between a ray and this box, padded by `offset` on every side.
    ///
    /// `relative_position` and `relative_direction` are given in the owner's local frame, and
    /// `relative_direction` must be unit length so that parametric distances share the unit of
    /// `range`. The ray hits when one of the box faces lies ahead of the point, within `range`.
    ///
    /// Axes are examined in X, Y, Z order and the first one whose entry face contains the
    /// projected point decides the outcome, even if another face would be entered earlier.
    ///
    /// Returns the contact point in the owner's local frame.
    pub fn check_hit(
        &self,
        relative_position: &Vec4,
        relative_direction: &Vec3,
        range: f32,
        offset: f32,
    ) -> Option<Vec4> {
        let center = translation_vector3(&self.position_matrix);
        let mut position = relative_position.xyz() - center;
        let mut direction = *relative_direction;
        if self.rotated {
            let inverse: Mat3 = matrix3_from4(&inverse_of_rotation4(&self.orientation_matrix));
            position = inverse * position;
            direction = inverse * direction;
        }
        let half = self.half_dimensions.add_scalar(offset);

        for axis in 0..3 {
            if direction[axis] == 0.0 {
                continue;
            }
            let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
            // A ray travelling towards +axis can only enter through the -axis face.
            let face = if direction[axis] > 0.0 {
                -half[axis]
            } else {
                half[axis]
            };
            let d = (position[axis] - face) / direction[axis];
            let contact_u = position[u] - direction[u] * d;
            let contact_v = position[v] - direction[v] * d;
            if contact_u.abs() <= half[u] && contact_v.abs() <= half[v] {
                if d < -range || d > 0.0 {
                    return None;
                }
                let mut contact = Vec4::new(0.0, 0.0, 0.0, 1.0);
                contact[axis] = face;
                contact[u] = contact_u;
                contact[v] = contact_v;
                return Some(self.model_matrix() * contact);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::rotation4;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn unit_box() -> Body {
        Body::cuboid(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }

    fn point(x: f32, y: f32, z: f32) -> Vec4 {
        Vec4::new(x, y, z, 1.0)
    }

    #[test]
    fn dimensions_are_halved() {
        let body = Body::new(Mat4::identity(), Mat4::identity(), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(body.half_dimensions(), &Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(body.width(), 2.0);
        assert_eq!(body.height(), 4.0);
        assert_eq!(body.depth(), 6.0);
        assert!(!body.is_rotated());
    }

    #[test]
    fn rotated_flag_tracks_orientation() {
        let body = Body::new(
            Mat4::identity(),
            rotation4(&Vec3::z(), 0.1),
            Vec3::new(1.0, 1.0, 1.0),
        );
        assert!(body.is_rotated());
    }

    #[test]
    fn head_on_hit_lands_on_entry_face() {
        let hit = unit_box().check_hit(&point(-5.0, 0.0, 0.0), &Vec3::x(), 10.0, 0.0);
        assert_relative_eq!(hit.unwrap(), point(-1.0, 0.0, 0.0), epsilon = 1.0e-6);
    }

    #[test]
    fn hit_from_negative_direction_uses_positive_face() {
        let hit = unit_box().check_hit(&point(0.5, 3.0, 0.25), &-Vec3::y(), 5.0, 0.0);
        assert_relative_eq!(hit.unwrap(), point(0.5, 1.0, 0.25), epsilon = 1.0e-6);
    }

    #[test]
    fn out_of_range_is_a_miss() {
        assert_eq!(
            unit_box().check_hit(&point(-5.0, 0.0, 0.0), &Vec3::x(), 3.0, 0.0),
            None
        );
    }

    #[test]
    fn moving_away_is_a_miss() {
        assert_eq!(
            unit_box().check_hit(&point(-5.0, 0.0, 0.0), &-Vec3::x(), 10.0, 0.0),
            None
        );
    }

    #[test]
    fn passing_beside_is_a_miss() {
        assert_eq!(
            unit_box().check_hit(&point(-5.0, 2.0, 0.0), &Vec3::x(), 10.0, 0.0),
            None
        );
    }

    #[test]
    fn offset_pads_the_box() {
        let body = unit_box();
        let from = point(-5.0, 1.2, 0.0);
        assert_eq!(body.check_hit(&from, &Vec3::x(), 10.0, 0.0), None);
        let hit = body.check_hit(&from, &Vec3::x(), 10.0, 0.5).unwrap();
        assert_relative_eq!(hit, point(-1.5, 1.2, 0.0), epsilon = 1.0e-6);
    }

    #[test]
    fn contact_is_reported_in_owner_space() {
        let body = Body::new(
            Mat4::new_translation(&Vec3::new(0.0, 0.0, 10.0)),
            rotation4(&Vec3::z(), FRAC_PI_2),
            Vec3::new(4.0, 2.0, 2.0),
        );
        // Rotated a quarter turn around Z, the long side now spans the owner's Y axis.
        let hit = body
            .check_hit(&point(-5.0, 1.5, 10.0), &Vec3::x(), 10.0, 0.0)
            .unwrap();
        assert_relative_eq!(hit, point(-1.0, 1.5, 10.0), epsilon = 1.0e-5);
    }

    #[test]
    fn corners_are_oriented_and_offset() {
        let body = Body::new(
            Mat4::new_translation(&Vec3::new(1.0, 0.0, 0.0)),
            rotation4(&Vec3::z(), FRAC_PI_2),
            Vec3::new(4.0, 2.0, 2.0),
        );
        let corners = body.corners();
        let max_y = corners.iter().map(|c| c.y).fold(f32::MIN, f32::max);
        let max_x = corners.iter().map(|c| c.x).fold(f32::MIN, f32::max);
        assert_relative_eq!(max_y, 2.0, epsilon = 1.0e-5);
        assert_relative_eq!(max_x, 2.0, epsilon = 1.0e-5);
    }
}
