use super::grid::{Polarity, SurfaceGrid};
use crate::core::geometry::intersection::plane_ellipsoid_area;
use crate::core::math::vector::world_up;
use crate::core::math::{Quaternion, Vector3};

/// Height of the flat oil-water interface. Oil occupies `z > INTERFACE_Z`.
pub const INTERFACE_Z: f64 = 0.0;

/// Particle surface split by wetting side and polarity, plus the interface area the
/// particle occludes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WettedAreas {
    pub apolar_oil: f64,
    pub polar_oil: f64,
    pub apolar_water: f64,
    pub polar_water: f64,
    pub occluded: f64,
}

impl WettedAreas {
    /// Accumulates every grid point, rotated by `orientation` and lifted by the center
    /// height, into its bucket, then cuts the ellipsoid with the interface plane.
    pub fn compute(grid: &SurfaceGrid, center: &Vector3, orientation: &Quaternion) -> Self {
        let mut areas = WettedAreas::default();
        for point in grid.points() {
            let z = orientation.rotate(&point.position).z + center.z;
            let bucket = match (z > INTERFACE_Z, point.polarity) {
                (true, Polarity::Apolar) => &mut areas.apolar_oil,
                (true, Polarity::Polar) => &mut areas.polar_oil,
                (false, Polarity::Apolar) => &mut areas.apolar_water,
                (false, Polarity::Polar) => &mut areas.polar_water,
            };
            *bucket += point.area;
        }

        let body_normal = orientation.inverse().rotate(&world_up());
        areas.occluded = plane_ellipsoid_area(
            center.z - INTERFACE_Z,
            &body_normal,
            &grid.geometry().semi_axes,
        );
        areas
    }

    pub fn oil(&self) -> f64 {
        self.apolar_oil + self.polar_oil
    }

    pub fn water(&self) -> f64 {
        self.apolar_water + self.polar_water
    }

    /// Area of the apolar cap, whichever side it wets.
    pub fn cap(&self) -> f64 {
        self.apolar_oil + self.apolar_water
    }

    pub fn non_cap(&self) -> f64 {
        self.polar_oil + self.polar_water
    }

    pub fn total(&self) -> f64 {
        self.oil() + self.water()
    }
}
