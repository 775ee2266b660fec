use std::f64::consts::PI;

pub type Vector3 = nalgebra::Vector3<f64>;

#[inline]
pub fn world_up() -> Vector3 {
    Vector3::z()
}

/// Unit vector from the cosine of its polar angle and its azimuth.
#[inline]
pub fn unit_from_spherical(cos_theta: f64, phi: f64) -> Vector3 {
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    Vector3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

/// Point of an axis-aligned ellipsoid surface at parametric angles `(theta, phi)`,
/// together with the two parametric tangents `dr/dtheta` and `dr/dphi`.
pub fn ellipsoid_point_and_tangents(
    semi_axes: &Vector3,
    theta: f64,
    phi: f64,
) -> (Vector3, Vector3, Vector3) {
    let (sin_t, cos_t) = theta.sin_cos();
    let (sin_p, cos_p) = phi.sin_cos();
    let (a, b, c) = (semi_axes.x, semi_axes.y, semi_axes.z);

    let point = Vector3::new(a * sin_t * cos_p, b * sin_t * sin_p, c * cos_t);
    let d_theta = Vector3::new(a * cos_t * cos_p, b * cos_t * sin_p, -c * sin_t);
    let d_phi = Vector3::new(-a * sin_t * sin_p, b * sin_t * cos_p, 0.0);
    (point, d_theta, d_phi)
}

pub fn angle_between(u: &Vector3, v: &Vector3) -> f64 {
    let denom = u.norm() * v.norm();
    if denom < f64::EPSILON {
        return 0.0;
    }
    (u.dot(v) / denom).clamp(-1.0, 1.0).acos()
}

pub fn max_component(v: &Vector3) -> f64 {
    v.x.max(v.y).max(v.z)
}

pub fn degrees_to_radians(degrees: f64) -> f64 {
    PI * degrees / 180.0
}

pub fn radians_to_degrees(radians: f64) -> f64 {
    180.0 * radians / PI
}
