use super::config::{ModelConfig, StepConfig};
use super::error::EngineError;
use super::random::RandomSource;
use super::state::{Observables, RigidBodyState};
use crate::core::math::vector::unit_from_spherical;
use crate::core::math::{Quaternion, Vector3};
use crate::core::models::areas::WettedAreas;
use crate::core::models::grid::{ParticleGeometry, SurfaceGrid};
use crate::core::models::interaction::InteractionParams;
use std::f64::consts::PI;
use tracing::{debug, info, trace};

/// Trial move: a vertical displacement and a world-frame incremental rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proposal {
    pub dz: f64,
    pub rotation: Quaternion,
}

impl Proposal {
    /// Draws `dz ~ N(0, sigma_z)`, an angle `dphi ~ N(0, sigma_phi)` and an axis uniform on
    /// the unit sphere, in that order.
    pub fn draw(config: &StepConfig, rng: &mut RandomSource) -> Self {
        let dz = rng.normal(config.sigma_z);
        let dphi = rng.normal(config.sigma_phi);
        let cos_theta = 2.0 * rng.uniform() - 1.0;
        let azimuth = 2.0 * PI * rng.uniform();
        let axis = unit_from_spherical(cos_theta, azimuth);
        Self {
            dz,
            rotation: Quaternion::from_axis_angle(&axis, dphi),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub accepted: bool,
    pub delta_energy: f64,
}

impl StepOutcome {
    pub fn is_uphill(&self) -> bool {
        self.delta_energy > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AcceptanceStats {
    pub proposed: u64,
    pub accepted: u64,
    pub uphill_proposed: u64,
    pub uphill_accepted: u64,
}

impl AcceptanceStats {
    pub fn record(&mut self, outcome: &StepOutcome) {
        self.proposed += 1;
        self.accepted += u64::from(outcome.accepted);
        if outcome.is_uphill() {
            self.uphill_proposed += 1;
            self.uphill_accepted += u64::from(outcome.accepted);
        }
    }

    pub fn merge(&mut self, other: &AcceptanceStats) {
        self.proposed += other.proposed;
        self.accepted += other.accepted;
        self.uphill_proposed += other.uphill_proposed;
        self.uphill_accepted += other.uphill_accepted;
    }

    pub fn acceptance_rate(&self) -> f64 {
        if self.proposed == 0 {
            0.0
        } else {
            self.accepted as f64 / self.proposed as f64
        }
    }
}

/// Metropolis criterion at unit thermal energy. Downhill and level moves are always
/// accepted without consuming a deviate.
#[inline]
pub fn metropolis_accept(delta_energy: f64, rng: &mut RandomSource) -> bool {
    delta_energy <= 0.0 || rng.uniform() < (-delta_energy).exp()
}

#[derive(Debug, Clone)]
pub struct EllipsoidModel {
    grid: SurfaceGrid,
    center: Vector3,
    orientation: Quaternion,
    interaction: InteractionParams,
    step: u64,
    areas: WettedAreas,
    areas_current: bool,
}

impl EllipsoidModel {
    pub fn new(config: &ModelConfig) -> Result<Self, EngineError> {
        let geometry = ParticleGeometry::new(
            config.semi_axes,
            config.patch_angle,
            config.grid_resolution,
        )?;
        let mut model = Self {
            grid: SurfaceGrid::build(geometry)?,
            center: config.initial_state.center,
            orientation: config.initial_state.orientation,
            interaction: config.interaction,
            step: 0,
            areas: WettedAreas::default(),
            areas_current: false,
        };
        model.recompute_areas();
        info!(
            points = model.grid.point_count(),
            total_area = model.grid.total_area(),
            "Ellipsoid model constructed."
        );
        Ok(model)
    }

    /// Rebuilds the surface grid from scratch. The model is left untouched on error.
    pub fn reset_geometry(
        &mut self,
        semi_axes: Vector3,
        patch_angle: f64,
        resolution: usize,
    ) -> Result<(), EngineError> {
        let geometry = ParticleGeometry::new(semi_axes, patch_angle, resolution)?;
        self.grid = SurfaceGrid::build(geometry)?;
        self.areas_current = false;
        debug!(?semi_axes, patch_angle, resolution, "Geometry reset.");
        Ok(())
    }

    pub fn geometry(&self) -> &ParticleGeometry {
        self.grid.geometry()
    }

    pub fn grid(&self) -> &SurfaceGrid {
        &self.grid
    }

    pub fn max_diameter(&self) -> f64 {
        self.geometry().max_diameter()
    }

    pub fn interaction(&self) -> &InteractionParams {
        &self.interaction
    }

    pub fn set_interaction(&mut self, params: InteractionParams) {
        self.interaction = params;
    }

    pub fn state(&self) -> RigidBodyState {
        RigidBodyState::new(self.center, self.orientation)
    }

    pub fn set_state(&mut self, state: RigidBodyState) {
        self.center = state.center;
        self.orientation = state.orientation;
        self.areas_current = false;
    }

    pub fn set_center(&mut self, center: Vector3) {
        self.center = center;
        self.areas_current = false;
    }

    pub fn set_orientation(&mut self, orientation: Quaternion) {
        self.orientation = orientation;
        self.areas_current = false;
    }

    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn recompute_areas(&mut self) -> WettedAreas {
        self.areas = WettedAreas::compute(&self.grid, &self.center, &self.orientation);
        self.areas_current = true;
        self.areas
    }

    /// Cached areas, or `None` if the pose or geometry changed since the last recompute.
    pub fn cached_areas(&self) -> Option<&WettedAreas> {
        self.areas_current.then_some(&self.areas)
    }

    pub fn areas(&mut self) -> WettedAreas {
        if self.areas_current {
            self.areas
        } else {
            self.recompute_areas()
        }
    }

    pub fn energy(&mut self) -> f64 {
        let areas = self.areas();
        self.interaction.free_energy(&areas)
    }

    pub fn observables(&mut self) -> Observables {
        let areas = self.areas();
        Observables {
            step: self.step,
            state: self.state(),
            energy: self.interaction.free_energy(&areas),
            areas,
        }
    }

    /// One Metropolis step for an already drawn proposal.
    ///
    /// The trial pose and its areas are evaluated in full and committed only on
    /// acceptance. Either way the orientation is renormalized and the step counter
    /// advances by one.
    pub fn apply(&mut self, proposal: &Proposal, rng: &mut RandomSource) -> StepOutcome {
        let current_energy = self.energy();

        let trial_center = Vector3::new(self.center.x, self.center.y, self.center.z + proposal.dz);
        let trial_orientation = Quaternion::compose(&proposal.rotation, &self.orientation);
        let trial_areas = WettedAreas::compute(&self.grid, &trial_center, &trial_orientation);
        let delta_energy = self.interaction.free_energy(&trial_areas) - current_energy;

        let accepted = metropolis_accept(delta_energy, rng);
        if accepted {
            self.center = trial_center;
            self.orientation = trial_orientation;
            self.areas = trial_areas;
        }
        self.orientation.renormalize();
        self.step += 1;

        trace!(step = self.step, delta_energy, accepted, "Metropolis step.");
        StepOutcome {
            accepted,
            delta_energy,
        }
    }

    pub fn step(&mut self, config: &StepConfig, rng: &mut RandomSource) -> StepOutcome {
        let proposal = Proposal::draw(config, rng);
        self.apply(&proposal, rng)
    }

    /// Runs `config.batch_size` elementary steps, starting from freshly computed areas.
    pub fn run_batch(&mut self, config: &StepConfig, rng: &mut RandomSource) -> AcceptanceStats {
        self.recompute_areas();
        let mut stats = AcceptanceStats::default();
        for _ in 0..config.batch_size {
            let outcome = self.step(config, rng);
            stats.record(&outcome);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::ModelConfigBuilder;

    const TOLERANCE: f64 = 1e-12;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn bsla_model(resolution: usize) -> EllipsoidModel {
        let config = ModelConfigBuilder::new()
            .semi_axes(Vector3::new(1.4, 1.4, 2.6))
            .patch_angle(50.4f64.to_radians())
            .grid_resolution(resolution)
            .interaction(InteractionParams::new(12.0, -0.2, 0.5))
            .build()
            .unwrap();
        EllipsoidModel::new(&config).unwrap()
    }

    fn unit_sphere(gamma: f64) -> EllipsoidModel {
        let config = ModelConfigBuilder::new()
            .semi_axes(Vector3::new(1.0, 1.0, 1.0))
            .patch_angle(PI / 2.0)
            .interaction(InteractionParams::new(gamma, 0.0, 0.0))
            .build()
            .unwrap();
        EllipsoidModel::new(&config).unwrap()
    }

    #[test]
    fn construction_rejects_invalid_geometry() {
        let config = ModelConfigBuilder::new()
            .semi_axes(Vector3::new(1.0, -1.0, 1.0))
            .patch_angle(0.5)
            .build()
            .unwrap();
        assert!(matches!(
            EllipsoidModel::new(&config),
            Err(EngineError::InvalidGeometry { .. })
        ));

        let config = ModelConfigBuilder::new()
            .semi_axes(Vector3::new(1.0, 1.0, 1.0))
            .patch_angle(0.5)
            .grid_resolution(0)
            .build()
            .unwrap();
        assert!(matches!(
            EllipsoidModel::new(&config),
            Err(EngineError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn centered_sphere_energy_is_minus_gamma_times_equatorial_area() {
        let mut model = unit_sphere(2.0);
        assert!(f64_approx_equal(model.energy(), -2.0 * PI));
    }

    #[test]
    fn max_diameter_reports_largest_axis() {
        assert!(f64_approx_equal(bsla_model(10).max_diameter(), 5.2));
    }

    #[test]
    fn pose_setters_invalidate_cached_areas() {
        let mut model = unit_sphere(1.0);
        assert!(model.cached_areas().is_some());

        model.set_center(Vector3::new(0.0, 0.0, 5.0));
        assert!(model.cached_areas().is_none());

        let areas = model.areas();
        assert_eq!(areas.occluded, 0.0);
        assert_eq!(areas.water(), 0.0);
        assert!(model.cached_areas().is_some());
    }

    #[test]
    fn reset_geometry_rebuilds_grid_and_keeps_model_on_error() {
        let mut model = bsla_model(10);
        model
            .reset_geometry(Vector3::new(1.0, 1.0, 1.0), 0.3, 12)
            .unwrap();
        assert_eq!(model.grid().point_count(), 144);
        assert!(model.cached_areas().is_none());

        let before = model.grid().clone();
        assert!(model.reset_geometry(Vector3::new(1.0, 1.0, 0.0), 0.3, 12).is_err());
        assert!(model.reset_geometry(Vector3::new(1.0, 1.0, 1.0), 0.3, 0).is_err());
        assert_eq!(model.grid(), &before);
    }

    #[test]
    fn zero_width_proposals_leave_pose_unchanged_and_count_one_step() {
        let mut model = bsla_model(30);
        let tilted = Quaternion::from_axis_angle(&Vector3::new(1.0, 0.0, 1.0).normalize(), 0.4);
        model.set_state(RigidBodyState::new(Vector3::new(0.0, 0.0, 0.3), tilted));
        let before = model.state();
        let mut rng = RandomSource::seeded(1234);
        let config = StepConfig::new(1, 0.0, 0.0).unwrap();

        let outcome = model.step(&config, &mut rng);

        assert!(outcome.accepted);
        assert_eq!(outcome.delta_energy, 0.0);
        assert_eq!(model.step_count(), 1);
        let after = model.state();
        assert_eq!(after.center, before.center);
        assert!(f64_approx_equal(after.orientation.re, before.orientation.re));
        assert!((after.orientation.im - before.orientation.im).norm() < TOLERANCE);
    }

    #[test]
    fn rejected_step_restores_pose_and_areas_exactly() {
        let mut model = unit_sphere(1000.0);
        let before = model.state();
        let areas_before = model.areas();
        let proposal = Proposal {
            dz: 0.8,
            rotation: Quaternion::identity(),
        };
        let mut rng = RandomSource::seeded(5);

        let outcome = model.apply(&proposal, &mut rng);

        assert!(!outcome.accepted);
        assert!(outcome.delta_energy > 100.0);
        assert_eq!(model.state(), before);
        assert_eq!(model.cached_areas(), Some(&areas_before));
        assert_eq!(model.step_count(), 1);
    }

    #[test]
    fn downhill_step_is_always_accepted() {
        let mut model = unit_sphere(1.0);
        model.set_center(Vector3::new(0.0, 0.0, 0.5));
        let proposal = Proposal {
            dz: -0.5,
            rotation: Quaternion::identity(),
        };
        let mut rng = RandomSource::seeded(0);

        let outcome = model.apply(&proposal, &mut rng);

        assert!(outcome.accepted);
        assert!(outcome.delta_energy < 0.0);
        assert_eq!(model.state().center.z, 0.0);
    }

    #[test]
    fn metropolis_acceptance_frequency_matches_boltzmann_factor() {
        let mut rng = RandomSource::seeded(99);
        for delta in [0.1, 0.7, 2.0] {
            let n = 40_000;
            let accepted = (0..n).filter(|_| metropolis_accept(delta, &mut rng)).count();
            let p = (-delta).exp();
            let sd = (p * (1.0 - p) / n as f64).sqrt();
            let freq = accepted as f64 / n as f64;
            assert!((freq - p).abs() < 5.0 * sd, "dE = {delta}: {freq} vs {p}");
        }
    }

    #[test]
    fn uphill_acceptances_over_a_run_match_expected_count() {
        let mut model = bsla_model(24);
        model.set_center(Vector3::new(0.0, 0.0, 0.2));
        let mut rng = RandomSource::seeded(2024);
        let config = StepConfig::new(1, 0.05, 0.05).unwrap();

        let mut expected = 0.0;
        let mut variance = 0.0;
        let mut accepted = 0u64;
        let mut uphill = 0u64;
        for _ in 0..4_000 {
            let outcome = model.step(&config, &mut rng);
            if outcome.is_uphill() {
                let p = (-outcome.delta_energy).exp();
                expected += p;
                variance += p * (1.0 - p);
                accepted += u64::from(outcome.accepted);
                uphill += 1;
            }
        }

        assert!(uphill > 100, "too few uphill proposals: {uphill}");
        let deviation = (accepted as f64 - expected).abs();
        assert!(
            deviation < 5.0 * variance.sqrt() + 1.0,
            "accepted {accepted}, expected {expected:.1} +- {:.1}",
            variance.sqrt()
        );
    }

    #[test]
    fn run_batch_records_every_step() {
        let mut model = bsla_model(16);
        let mut rng = RandomSource::seeded(8);
        let config = StepConfig::new(250, 0.02, 0.02).unwrap();

        let stats = model.run_batch(&config, &mut rng);

        assert_eq!(stats.proposed, 250);
        assert_eq!(model.step_count(), 250);
        assert!(stats.accepted <= stats.proposed);
        assert!(stats.uphill_accepted <= stats.uphill_proposed);
        assert!((model.state().orientation.norm_squared() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let config = StepConfig::new(200, 0.02, 0.02).unwrap();
        let mut a = bsla_model(16);
        let mut b = bsla_model(16);
        a.run_batch(&config, &mut RandomSource::seeded(77));
        b.run_batch(&config, &mut RandomSource::seeded(77));
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn relaxation_pulls_a_barely_wetted_particle_into_the_interface() {
        let mut model = bsla_model(30);
        model.set_center(Vector3::new(0.0, 0.0, 2.5));
        let start = model.energy();
        let mut rng = RandomSource::seeded(31);
        let config = StepConfig::new(2_000, 0.05, 0.05).unwrap();

        model.run_batch(&config, &mut rng);

        assert!(model.energy() < start - 10.0);
        assert!(model.state().center.z.abs() < 2.6);
    }
}
