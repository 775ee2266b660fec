use crate::core::math::Vector3;
use std::f64::consts::PI;

/// Area of the ellipse cut from an axis-aligned ellipsoid by a plane.
///
/// `k` is the signed distance of the plane from the ellipsoid center, `normal` the unit
/// normal of the plane and `semi_axes` the ellipsoid semi-axes, all in the body frame.
/// Uses Klein's closed form `pi * (1 - k^2/kt^2) * abc / kt` with
/// `kt^2 = sum(n_i^2 l_i^2)`. Planes that miss or only touch the ellipsoid give zero.
pub fn plane_ellipsoid_area(k: f64, normal: &Vector3, semi_axes: &Vector3) -> f64 {
    let kt = semi_axes.component_mul(normal).norm();
    if kt <= 0.0 {
        return 0.0;
    }
    let volume_factor = semi_axes.x * semi_axes.y * semi_axes.z;
    let area = PI * (1.0 - k * k / (kt * kt)) * volume_factor / kt;
    if area > 0.0 { area } else { 0.0 }
}
