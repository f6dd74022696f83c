//! SE(3) helpers for the product-of-exponentials formulation.
//!
//! Twists are 6-vectors ordered `(ω, v)`: three rotational components
//! followed by three translational ones.

use nalgebra::{Matrix3, Matrix4, Matrix6, Rotation3, UnitQuaternion, Vector3, Vector6};

/// Below this magnitude a rotation is treated as pure translation.
const NEAR_ZERO: f64 = 1e-9;

/// Skew-symmetric matrix `[w]` such that `[w] x = w × x`.
pub fn skew(w: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -w.z, w.y,
        w.z, 0.0, -w.x,
        -w.y, w.x, 0.0,
    )
}

/// Screw axis of a revolute joint in the space frame.
///
/// `axis` need not be unit length; `point` is any point on the joint axis.
pub fn revolute_screw(axis: Vector3<f64>, point: Vector3<f64>) -> Vector6<f64> {
    let w = axis.normalize();
    let v = -w.cross(&point);
    Vector6::new(w.x, w.y, w.z, v.x, v.y, v.z)
}

pub fn from_parts(rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> Matrix4<f64> {
    let mut t = Matrix4::identity();
    t.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
    t.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
    t
}

pub fn rotation_of(t: &Matrix4<f64>) -> Matrix3<f64> {
    t.fixed_view::<3, 3>(0, 0).into_owned()
}

pub fn translation_of(t: &Matrix4<f64>) -> Vector3<f64> {
    t.fixed_view::<3, 1>(0, 3).into_owned()
}

/// Inverse of a rigid transform, using `R^T` instead of a general inverse.
pub fn inverse(t: &Matrix4<f64>) -> Matrix4<f64> {
    let rt = rotation_of(t).transpose();
    let p = translation_of(t);
    from_parts(&rt, &(-(rt * p)))
}

/// 6×6 adjoint representation `[Ad_T]` acting on `(ω, v)` twists.
pub fn adjoint(t: &Matrix4<f64>) -> Matrix6<f64> {
    let r = rotation_of(t);
    let p = translation_of(t);
    let mut ad = Matrix6::zeros();
    ad.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);
    ad.fixed_view_mut::<3, 3>(3, 0).copy_from(&(skew(&p) * r));
    ad.fixed_view_mut::<3, 3>(3, 3).copy_from(&r);
    ad
}

/// Matrix exponential of the twist `screw * theta`.
pub fn exp6(screw: &Vector6<f64>, theta: f64) -> Matrix4<f64> {
    let omega = Vector3::new(screw[0], screw[1], screw[2]) * theta;
    let v = Vector3::new(screw[3], screw[4], screw[5]) * theta;
    let angle = omega.norm();
    if angle < NEAR_ZERO {
        return from_parts(&Matrix3::identity(), &v);
    }

    let w = skew(&(omega / angle));
    let rotation = Rotation3::new(omega).into_inner();
    let g = Matrix3::identity() * angle
        + w * (1.0 - angle.cos())
        + w * w * (angle - angle.sin());
    from_parts(&rotation, &(g * (v / angle)))
}

/// Matrix logarithm of a rigid transform, returned as the twist `(ωθ, vθ)`.
pub fn log6(t: &Matrix4<f64>) -> Vector6<f64> {
    let rotation = Rotation3::from_matrix_unchecked(rotation_of(t));
    let p = translation_of(t);
    // Quaternion angle is an atan2, so this holds near 0 and π.
    let omega = UnitQuaternion::from_rotation_matrix(&rotation).scaled_axis();
    let angle = omega.norm();
    if angle < NEAR_ZERO {
        return Vector6::new(0.0, 0.0, 0.0, p.x, p.y, p.z);
    }

    let w = skew(&omega);
    let g_inv = Matrix3::identity() - w * 0.5
        + w * w * ((1.0 / angle - 0.5 / (angle * 0.5).tan()) / angle);
    let v = g_inv * p;
    Vector6::new(omega.x, omega.y, omega.z, v.x, v.y, v.z)
}

/// Wraps an angle into `(-π, π]`.
pub fn wrap_angle(angle: f64) -> f64 {
    use std::f64::consts::PI;
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_matrix_close(a: &Matrix4<f64>, b: &Matrix4<f64>, tol: f64) {
        let diff = (a - b).abs().max();
        assert!(diff < tol, "matrices differ by {}\n{}\n{}", diff, a, b);
    }

    #[test]
    fn test_exp6_pure_rotation_about_z() {
        let screw = revolute_screw(Vector3::z(), Vector3::zeros());
        let t = exp6(&screw, FRAC_PI_2);
        let expected = from_parts(
            &Rotation3::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2).into_inner(),
            &Vector3::zeros(),
        );
        assert_matrix_close(&t, &expected, 1e-12);
    }

    #[test]
    fn test_exp6_rotation_about_offset_axis_moves_origin() {
        // Rotating the origin by π about a z axis through (1, 0, 0) lands on (2, 0, 0).
        let screw = revolute_screw(Vector3::z(), Vector3::new(1.0, 0.0, 0.0));
        let t = exp6(&screw, PI);
        let p = translation_of(&t);
        assert!((p - Vector3::new(2.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_log6_inverts_exp6() {
        let screw = revolute_screw(Vector3::new(0.0, 1.0, 1.0), Vector3::new(0.1, -0.2, 0.3));
        let theta = 1.1;
        let twist = log6(&exp6(&screw, theta));
        assert!((twist - screw * theta).norm() < 1e-9);
    }

    #[test]
    fn test_log6_of_translation() {
        let t = from_parts(&Matrix3::identity(), &Vector3::new(0.1, 0.2, 0.3));
        let twist = log6(&t);
        assert!((twist - Vector6::new(0.0, 0.0, 0.0, 0.1, 0.2, 0.3)).norm() < 1e-12);
    }

    #[test]
    fn test_inverse_composes_to_identity() {
        let screw = revolute_screw(Vector3::x(), Vector3::new(0.0, 0.5, 0.2));
        let t = exp6(&screw, 0.7);
        assert_matrix_close(&(t * inverse(&t)), &Matrix4::identity(), 1e-12);
    }

    #[test]
    fn test_adjoint_maps_twists_like_conjugation() {
        let t = exp6(&revolute_screw(Vector3::y(), Vector3::new(0.3, 0.0, 0.1)), 0.4);
        let screw = revolute_screw(Vector3::z(), Vector3::new(0.2, 0.0, 0.0));
        // T exp([S]θ) T⁻¹ = exp([Ad_T S]θ)
        let lhs = t * exp6(&screw, 0.9) * inverse(&t);
        let rhs = exp6(&(adjoint(&t) * screw), 0.9);
        assert_matrix_close(&lhs, &rhs, 1e-12);
    }

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-12);
        assert!((wrap_angle(2.0 * PI + 0.5) - 0.5).abs() < 1e-12);
        assert!((wrap_angle(-0.25) + 0.25).abs() < 1e-12);
    }
}
