use crate::core::math::vector::{angle_between, world_up};
use crate::core::math::{Quaternion, Vector3};
use crate::core::models::areas::WettedAreas;

/// Copied-out pose of the particle, safe to hand across threads.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RigidBodyState {
    pub center: Vector3,
    pub orientation: Quaternion,
}

impl RigidBodyState {
    pub fn new(center: Vector3, orientation: Quaternion) -> Self {
        Self {
            center,
            orientation,
        }
    }

    /// Angle between the particle's symmetry axis and the interface normal.
    pub fn tilt_angle(&self) -> f64 {
        angle_between(&self.orientation.rotate(&world_up()), &world_up())
    }
}

/// Everything a report line needs, read in one critical section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observables {
    pub step: u64,
    pub state: RigidBodyState,
    pub energy: f64,
    pub areas: WettedAreas,
}

impl Observables {
    pub fn height(&self) -> f64 {
        self.state.center.z
    }

    pub fn tilt_angle(&self) -> f64 {
        self.state.tilt_angle()
    }
}
