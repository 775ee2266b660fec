use super::vector::Vector3;
use std::fmt;
use std::ops::Mul;

const RENORMALIZE_EPSILON: f64 = 1e-8;

/// Rotation operator with scalar part `re` and vector part `im`.
///
/// A rotation by `angle` about the unit `axis` is `re = cos(angle/2)`,
/// `im = sin(angle/2) * axis`. Unit norm is not enforced on construction; only
/// [`Quaternion::renormalize`] touches the norm, and it does so partially.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub re: f64,
    pub im: Vector3,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    pub const fn new(re: f64, im: Vector3) -> Self {
        Self { re, im }
    }

    pub fn identity() -> Self {
        Self::new(1.0, Vector3::zeros())
    }

    pub fn from_axis_angle(axis: &Vector3, angle: f64) -> Self {
        let (sin_half, cos_half) = (0.5 * angle).sin_cos();
        Self::new(cos_half, axis * sin_half)
    }

    /// Hamilton product `q1 * q2`. Applying an incremental world-frame rotation
    /// `delta` on top of an orientation `r` is `compose(&delta, &r)`.
    #[inline]
    pub fn compose(q1: &Quaternion, q2: &Quaternion) -> Quaternion {
        let (a, b) = (&q1.im, &q2.im);
        Quaternion {
            re: q1.re * q2.re - a.x * b.x - a.y * b.y - a.z * b.z,
            im: Vector3::new(
                q1.re * b.x + a.x * q2.re + a.y * b.z - a.z * b.y,
                q1.re * b.y - a.x * b.z + a.y * q2.re + a.z * b.x,
                q1.re * b.z + a.x * b.y - a.y * b.x + a.z * q2.re,
            ),
        }
    }

    /// Conjugate. Equals the inverse only for unit quaternions.
    #[inline]
    pub fn inverse(&self) -> Quaternion {
        Quaternion::new(self.re, -self.im)
    }

    /// Closed-form `q v q^-1` for a unit quaternion.
    #[inline]
    pub fn rotate(&self, v: &Vector3) -> Vector3 {
        let t = self.im.cross(v) * 2.0;
        v + t * self.re + self.im.cross(&t)
    }

    /// `q v q^-1` evaluated as two Hamilton products.
    pub fn rotate_by_product(&self, v: &Vector3) -> Vector3 {
        let pure = Quaternion::new(0.0, *v);
        Quaternion::compose(self, &Quaternion::compose(&pure, &self.inverse())).im
    }

    pub fn norm_squared(&self) -> f64 {
        self.re * self.re + self.im.norm_squared()
    }

    /// Rescales `im` to length `sqrt(1 - re^2)` keeping its direction. `re` is never
    /// touched, so drift in the scalar part survives. Skipped when `|im| < 1e-8`.
    pub fn renormalize(&mut self) {
        let norm_im = self.im.norm();
        if norm_im > RENORMALIZE_EPSILON {
            let sin_half = (1.0 - self.re * self.re).max(0.0).sqrt();
            self.im *= sin_half / norm_im;
        }
    }

    /// Rotation angle in `[0, 2*pi]`.
    pub fn angle(&self) -> f64 {
        2.0 * self.re.clamp(-1.0, 1.0).acos()
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: Quaternion) -> Quaternion {
        Quaternion::compose(&self, &rhs)
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, [{}, {}, {}])",
            self.re, self.im.x, self.im.y, self.im.z
        )
    }
}
