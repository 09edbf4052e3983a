//! Homogeneous transform helpers on top of `nalgebra`.
//!
//! Every 4x4 matrix here follows the column-vector convention: a point `p` is transformed as
//! `m * p`, translations live in the last column, and `a * b` applies `b` first. A model matrix is
//! therefore `position * orientation * scaling`.

use na::{Matrix3, Matrix4, Rotation3, Unit, Vector3, Vector4};

/// A 4x4 homogeneous transform.
pub type Mat4 = Matrix4<f32>;
/// A 3x3 linear transform (the rotation part of a [`Mat4`]).
pub type Mat3 = Matrix3<f32>;
/// A 3D vector.
pub type Vec3 = Vector3<f32>;
/// A homogeneous 3D point or direction.
pub type Vec4 = Vector4<f32>;

/// Translation matrix moving points by `v`.
pub fn translation4(v: &Vec3) -> Mat4 {
    Mat4::new_translation(v)
}

/// Scaling matrix with per-axis factors `s`.
pub fn scaling4(s: &Vec3) -> Mat4 {
    Mat4::new_nonuniform_scaling(s)
}

/// Rotation by `angle` radians around `axis`, counter-clockwise when looking down the axis.
///
/// The axis is normalized first. A zero-length axis yields a matrix full of NaN.
pub fn rotation4(axis: &Vec3, angle: f32) -> Mat4 {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle).to_homogeneous()
}

/// The translation stored in the last column of `m`.
pub fn translation_vector3(m: &Mat4) -> Vec3 {
    m.fixed_view::<3, 1>(0, 3).into_owned()
}

/// The upper-left 3x3 block of `m`.
pub fn matrix3_from4(m: &Mat4) -> Mat3 {
    m.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Inverse of a pure translation matrix.
pub fn inverse_of_translation4(m: &Mat4) -> Mat4 {
    Mat4::new_translation(&-translation_vector3(m))
}

/// Inverse of a pure rotation matrix, i.e. the transpose of its rotation block.
pub fn inverse_of_rotation4(m: &Mat4) -> Mat4 {
    let mut result = Mat4::identity();
    result
        .fixed_view_mut::<3, 3>(0, 0)
        .copy_from(&m.fixed_view::<3, 3>(0, 0).transpose());
    result
}

/// Inverse of a pure (possibly non-uniform) scaling matrix.
pub fn inverse_of_scaling4(m: &Mat4) -> Mat4 {
    scaling4(&Vec3::new(1.0 / m[(0, 0)], 1.0 / m[(1, 1)], 1.0 / m[(2, 2)]))
}

/// Adds `v` to the translation part of `m` in place.
pub fn translate_by_vector(m: &mut Mat4, v: &Vec3) {
    let mut t = m.fixed_view_mut::<3, 1>(0, 3);
    t += v;
}

/// Adds the translation of `other` to the translation part of `m` in place.
pub fn translate_by_matrix(m: &mut Mat4, other: &Mat4) {
    translate_by_vector(m, &translation_vector3(other));
}

/// Re-orthonormalizes the rotation block of `m` in place.
///
/// The X basis vector keeps its direction, Z is rebuilt from X and the old Y, and Y from Z and X.
/// Repeated multiplication of rotation matrices drifts away from orthogonality; calling this after
/// each step keeps the drift bounded.
pub fn correct_orthogonal4(m: &mut Mat4) {
    let x = m.fixed_view::<3, 1>(0, 0).normalize();
    let old_y = m.fixed_view::<3, 1>(0, 1).into_owned();
    let z = x.cross(&old_y).normalize();
    let y = z.cross(&x);
    m.fixed_view_mut::<3, 1>(0, 0).copy_from(&x);
    m.fixed_view_mut::<3, 1>(0, 1).copy_from(&y);
    m.fixed_view_mut::<3, 1>(0, 2).copy_from(&z);
}

/// Snaps every component of `m` lying within `threshold` of `0`, `1` or `-1` to that value.
pub fn straighten(m: &mut Mat4, threshold: f32) {
    for e in m.iter_mut() {
        if e.abs() < threshold {
            *e = 0.0;
        } else if (*e - 1.0).abs() < threshold {
            *e = 1.0;
        } else if (*e + 1.0).abs() < threshold {
            *e = -1.0;
        }
    }
}

/// Exact component-wise equality.
pub fn equal4(a: &Mat4, b: &Mat4) -> bool {
    a == b
}

/// Is the rotation block of `m` orthonormal within `epsilon`?
pub fn is_orthogonal4(m: &Mat4, epsilon: f32) -> bool {
    let r = matrix3_from4(m);
    (r.transpose() * r - Mat3::identity())
        .iter()
        .all(|e| e.abs() <= epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn rotation_is_counter_clockwise() {
        let m = rotation4(&Vec3::z(), FRAC_PI_2);
        let p = m * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(p, Vec4::new(0.0, 1.0, 0.0, 1.0), epsilon = 1.0e-6);
    }

    #[test]
    fn inverses_undo_their_transform() {
        let t = translation4(&Vec3::new(1.0, -2.0, 3.0));
        let r = rotation4(&Vec3::new(1.0, 1.0, 0.0), 0.7);
        let s = scaling4(&Vec3::new(2.0, 4.0, 0.5));
        assert_relative_eq!(t * inverse_of_translation4(&t), Mat4::identity(), epsilon = 1.0e-6);
        assert_relative_eq!(r * inverse_of_rotation4(&r), Mat4::identity(), epsilon = 1.0e-6);
        assert_relative_eq!(s * inverse_of_scaling4(&s), Mat4::identity(), epsilon = 1.0e-6);
    }

    #[test]
    fn translate_only_touches_last_column() {
        let mut m = rotation4(&Vec3::y(), 0.3);
        let rot = matrix3_from4(&m);
        translate_by_vector(&mut m, &Vec3::new(1.0, 2.0, 3.0));
        translate_by_matrix(&mut m, &translation4(&Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(translation_vector3(&m), Vec3::new(2.0, 2.0, 3.0));
        assert_eq!(matrix3_from4(&m), rot);
    }

    #[test]
    fn straighten_snaps_near_units() {
        let mut m = Mat4::identity();
        m[(0, 0)] = 0.99999;
        m[(0, 1)] = 0.00001;
        m[(1, 2)] = -0.99999;
        m[(2, 3)] = 0.5;
        straighten(&mut m, 1.0e-4);
        assert_eq!(m[(0, 0)], 1.0);
        assert_eq!(m[(0, 1)], 0.0);
        assert_eq!(m[(1, 2)], -1.0);
        assert_eq!(m[(2, 3)], 0.5);
    }

    #[test]
    fn correct_orthogonal_repairs_drift() {
        let mut m = rotation4(&Vec3::new(0.2, 1.0, -0.4), 1.1);
        m[(0, 0)] += 0.01;
        m[(2, 1)] -= 0.02;
        assert!(!is_orthogonal4(&m, 1.0e-3));
        correct_orthogonal4(&mut m);
        assert!(is_orthogonal4(&m, 1.0e-6));
    }

    #[test]
    fn correct_orthogonal_keeps_identity_exact() {
        let mut m = Mat4::identity();
        correct_orthogonal4(&mut m);
        assert!(equal4(&m, &Mat4::identity()));
    }
}
