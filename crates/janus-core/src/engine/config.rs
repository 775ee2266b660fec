use crate::core::math::Vector3;
use crate::core::models::grid::DEFAULT_GRID_RESOLUTION;
use crate::core::models::interaction::InteractionParams;
use crate::engine::state::RigidBodyState;
use thiserror::Error;

pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub semi_axes: Vector3,
    pub patch_angle: f64,
    pub grid_resolution: usize,
    pub interaction: InteractionParams,
    pub initial_state: RigidBodyState,
}

#[derive(Default)]
pub struct ModelConfigBuilder {
    semi_axes: Option<Vector3>,
    patch_angle: Option<f64>,
    grid_resolution: Option<usize>,
    interaction: Option<InteractionParams>,
    initial_state: Option<RigidBodyState>,
}

impl ModelConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn semi_axes(mut self, axes: Vector3) -> Self {
        self.semi_axes = Some(axes);
        self
    }
    pub fn patch_angle(mut self, radians: f64) -> Self {
        self.patch_angle = Some(radians);
        self
    }
    pub fn grid_resolution(mut self, resolution: usize) -> Self {
        self.grid_resolution = Some(resolution);
        self
    }
    pub fn interaction(mut self, params: InteractionParams) -> Self {
        self.interaction = Some(params);
        self
    }
    pub fn initial_state(mut self, state: RigidBodyState) -> Self {
        self.initial_state = Some(state);
        self
    }

    pub fn build(self) -> Result<ModelConfig, ConfigError> {
        Ok(ModelConfig {
            semi_axes: self
                .semi_axes
                .ok_or(ConfigError::MissingParameter("semi_axes"))?,
            patch_angle: self
                .patch_angle
                .ok_or(ConfigError::MissingParameter("patch_angle"))?,
            grid_resolution: self.grid_resolution.unwrap_or(DEFAULT_GRID_RESOLUTION),
            interaction: self.interaction.unwrap_or_default(),
            initial_state: self.initial_state.unwrap_or_default(),
        })
    }
}

/// Proposal widths and the number of elementary steps per batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepConfig {
    pub batch_size: usize,
    pub sigma_z: f64,
    pub sigma_phi: f64,
}

impl StepConfig {
    pub fn new(batch_size: usize, sigma_z: f64, sigma_phi: f64) -> Result<Self, ConfigError> {
        let config = Self {
            batch_size,
            sigma_z,
            sigma_phi,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "batch_size",
                reason: "must be at least 1".to_string(),
            });
        }
        for (name, sigma) in [("sigma_z", self.sigma_z), ("sigma_phi", self.sigma_phi)] {
            if !(sigma >= 0.0 && sigma.is_finite()) {
                return Err(ConfigError::InvalidValue {
                    name,
                    reason: format!("must be finite and non-negative, got {sigma}"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelaxationConfig {
    pub sample_count: usize,
    pub step: StepConfig,
    pub seed: Option<u64>,
}

impl RelaxationConfig {
    pub fn steps_per_sample(&self) -> usize {
        self.step.batch_size
    }

    pub fn total_steps(&self) -> u64 {
        self.sample_count as u64 * self.step.batch_size as u64
    }
}

#[derive(Default)]
pub struct RelaxationConfigBuilder {
    sample_count: Option<usize>,
    steps_per_sample: Option<usize>,
    sigma_z: Option<f64>,
    sigma_phi: Option<f64>,
    seed: Option<u64>,
}

impl RelaxationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_count(mut self, n: usize) -> Self {
        self.sample_count = Some(n);
        self
    }
    pub fn steps_per_sample(mut self, n: usize) -> Self {
        self.steps_per_sample = Some(n);
        self
    }
    pub fn sigma_z(mut self, sigma: f64) -> Self {
        self.sigma_z = Some(sigma);
        self
    }
    pub fn sigma_phi(mut self, sigma: f64) -> Self {
        self.sigma_phi = Some(sigma);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<RelaxationConfig, ConfigError> {
        let step = StepConfig::new(
            self.steps_per_sample.unwrap_or(DEFAULT_BATCH_SIZE),
            self.sigma_z
                .ok_or(ConfigError::MissingParameter("sigma_z"))?,
            self.sigma_phi
                .ok_or(ConfigError::MissingParameter("sigma_phi"))?,
        )?;
        Ok(RelaxationConfig {
            sample_count: self
                .sample_count
                .ok_or(ConfigError::MissingParameter("sample_count"))?,
            step,
            seed: self.seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_builder_applies_defaults() {
        let config = ModelConfigBuilder::new()
            .semi_axes(Vector3::new(1.4, 1.4, 2.6))
            .patch_angle(0.88)
            .build()
            .unwrap();
        assert_eq!(config.grid_resolution, DEFAULT_GRID_RESOLUTION);
        assert_eq!(config.interaction, InteractionParams::default());
        assert_eq!(config.initial_state, RigidBodyState::default());
    }

    #[test]
    fn model_builder_reports_missing_parameters() {
        let result = ModelConfigBuilder::new().patch_angle(0.5).build();
        assert_eq!(result, Err(ConfigError::MissingParameter("semi_axes")));

        let result = ModelConfigBuilder::new()
            .semi_axes(Vector3::new(1.0, 1.0, 1.0))
            .build();
        assert_eq!(result, Err(ConfigError::MissingParameter("patch_angle")));
    }

    #[test]
    fn step_config_rejects_negative_or_non_finite_sigmas() {
        assert!(StepConfig::new(10, 0.0, 0.0).is_ok());
        assert!(matches!(
            StepConfig::new(10, -0.1, 0.0),
            Err(ConfigError::InvalidValue { name: "sigma_z", .. })
        ));
        assert!(matches!(
            StepConfig::new(10, 0.1, f64::NAN),
            Err(ConfigError::InvalidValue { name: "sigma_phi", .. })
        ));
    }

    #[test]
    fn step_config_rejects_empty_batches() {
        assert!(matches!(
            StepConfig::new(0, 0.1, 0.1),
            Err(ConfigError::InvalidValue { name: "batch_size", .. })
        ));
    }

    #[test]
    fn relaxation_builder_derives_total_steps() {
        let config = RelaxationConfigBuilder::new()
            .sample_count(50)
            .steps_per_sample(20)
            .sigma_z(0.01)
            .sigma_phi(0.02)
            .seed(9)
            .build()
            .unwrap();
        assert_eq!(config.total_steps(), 1000);
        assert_eq!(config.steps_per_sample(), 20);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn relaxation_builder_requires_sample_count() {
        let result = RelaxationConfigBuilder::new()
            .sigma_z(0.01)
            .sigma_phi(0.01)
            .build();
        assert_eq!(result, Err(ConfigError::MissingParameter("sample_count")));
    }
}
