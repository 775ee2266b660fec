use crate::core::math::Vector3;
use crate::core::math::vector::{ellipsoid_point_and_tangents, max_component};
use std::f64::consts::PI;
use thiserror::Error;
use tracing::{debug, instrument};

pub const DEFAULT_GRID_RESOLUTION: usize = 100;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("Semi-axis '{axis}' must be strictly positive and finite, got {value}")]
    NonPositiveSemiAxis { axis: char, value: f64 },
    #[error("Grid resolution must be at least 1")]
    ZeroResolution,
    #[error("Patch angle must be finite, got {0}")]
    NonFinitePatchAngle(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Apolar,
    Polar,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub position: Vector3,
    pub area: f64,
    pub polarity: Polarity,
}

/// Shape of the particle: semi-axes, apolar patch angle and grid resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleGeometry {
    pub semi_axes: Vector3,
    pub patch_angle: f64,
    pub resolution: usize,
}

impl ParticleGeometry {
    pub fn new(semi_axes: Vector3, patch_angle: f64, resolution: usize) -> Result<Self, GridError> {
        let geometry = Self {
            semi_axes,
            patch_angle,
            resolution,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn validate(&self) -> Result<(), GridError> {
        for (axis, value) in ['a', 'b', 'c'].into_iter().zip(self.semi_axes.iter().copied()) {
            if !(value > 0.0 && value.is_finite()) {
                return Err(GridError::NonPositiveSemiAxis { axis, value });
            }
        }
        if self.resolution == 0 {
            return Err(GridError::ZeroResolution);
        }
        if !self.patch_angle.is_finite() {
            return Err(GridError::NonFinitePatchAngle(self.patch_angle));
        }
        Ok(())
    }

    /// Twice the largest semi-axis.
    pub fn max_diameter(&self) -> f64 {
        2.0 * max_component(&self.semi_axes)
    }
}

/// Body-frame quadrature of the ellipsoid surface.
///
/// Point `k = i * n + j` sits at parametric polar angle `pi * (i + 0.5) / n` and azimuth
/// `2 * pi * j / n`. Its weight is `|dr/dtheta x dr/dphi|` times the cell measure
/// `2 * pi^2 / n^2`. Points with polar angle below the patch angle are apolar.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGrid {
    geometry: ParticleGeometry,
    points: Vec<SurfacePoint>,
}

impl SurfaceGrid {
    #[instrument(level = "debug", skip_all, fields(resolution = geometry.resolution))]
    pub fn build(geometry: ParticleGeometry) -> Result<Self, GridError> {
        geometry.validate()?;

        let n = geometry.resolution;
        let cell_measure = 2.0 * PI * PI / (n * n) as f64;
        let points: Vec<SurfacePoint> = (0..n * n)
            .map(|k| {
                let (i, j) = (k / n, k % n);
                let theta = PI * (i as f64 + 0.5) / n as f64;
                let phi = 2.0 * PI * j as f64 / n as f64;
                let (position, d_theta, d_phi) =
                    ellipsoid_point_and_tangents(&geometry.semi_axes, theta, phi);
                let polarity = if theta < geometry.patch_angle {
                    Polarity::Apolar
                } else {
                    Polarity::Polar
                };
                SurfacePoint {
                    position,
                    area: d_theta.cross(&d_phi).norm() * cell_measure,
                    polarity,
                }
            })
            .collect();

        debug!(points = points.len(), "Surface grid built.");
        Ok(Self { geometry, points })
    }

    pub fn geometry(&self) -> &ParticleGeometry {
        &self.geometry
    }

    pub fn points(&self) -> &[SurfacePoint] {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn total_area(&self) -> f64 {
        self.points.iter().map(|p| p.area).sum()
    }

    pub fn area_of(&self, polarity: Polarity) -> f64 {
        self.points
            .iter()
            .filter(|p| p.polarity == polarity)
            .map(|p| p.area)
            .sum()
    }
}
