mod defaults;

use crate::cli::{ModelArgs, SamplingArgs};
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use janusmc::core::math::vector::degrees_to_radians;
use janusmc::core::math::{Quaternion, Vector3};
use janusmc::core::models::interaction::InteractionParams;
use janusmc::engine::config as core_config;
use janusmc::engine::error::EngineError;
use janusmc::engine::state::RigidBodyState;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialParticleConfig {
    lxly: Option<f64>,
    lz: Option<f64>,
    alpha: Option<f64>,
    grid_resolution: Option<usize>,
    initial_height: Option<f64>,
    initial_tilt: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialInteractionConfig {
    gamma: Option<f64>,
    cos_theta_a: Option<f64>,
    cos_theta_p: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialSamplingConfig {
    dz: Option<f64>,
    dphi: Option<f64>,
    dt: Option<usize>,
    seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialRunConfig {
    nsteps: Option<usize>,
    duration_secs: Option<f64>,
    interval_ms: Option<u64>,
}

/// Contents of a TOML configuration file, every key optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialJanusConfig {
    particle: Option<PartialParticleConfig>,
    interaction: Option<PartialInteractionConfig>,
    sampling: Option<PartialSamplingConfig>,
    run: Option<PartialRunConfig>,
}

/// Run-length overrides that only some subcommands expose.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOverrides {
    pub nsteps: Option<usize>,
    pub duration_secs: Option<f64>,
    pub interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchSettings {
    pub duration: Duration,
    pub interval: Duration,
}

/// Fully resolved parameters of one invocation.
#[derive(Debug, Clone)]
pub struct JanusConfig {
    pub model: core_config::ModelConfig,
    pub relaxation: core_config::RelaxationConfig,
    pub watch: WatchSettings,
}

impl PartialJanusConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration file from: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads the file named by `--config` (if any) and applies the `--set` overrides.
    pub fn load(args: &ModelArgs) -> Result<Self> {
        let mut partial = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        partial.apply_set_values(&args.set_values)?;
        Ok(partial)
    }

    /// Precedence: command-line flag, then `--set`/file value, then built-in default.
    pub fn merge_with_cli(
        self,
        model: &ModelArgs,
        sampling: &SamplingArgs,
        run: RunOverrides,
    ) -> Result<JanusConfig> {
        let defaults = DefaultsConfig::default();
        let particle = self.particle.unwrap_or_default();
        let interaction = self.interaction.unwrap_or_default();
        let file_sampling = self.sampling.unwrap_or_default();
        let file_run = self.run.unwrap_or_default();

        let lxly = model.lxly.or(particle.lxly).unwrap_or(defaults.lxly);
        let lz = model.lz.or(particle.lz).unwrap_or(defaults.lz);
        let alpha = model
            .alpha
            .or(particle.alpha)
            .unwrap_or(defaults.alpha_degrees);
        let tilt = model
            .tilt0
            .or(particle.initial_tilt)
            .unwrap_or(defaults.initial_tilt_degrees);
        let height = model
            .z0
            .or(particle.initial_height)
            .unwrap_or(defaults.initial_height);

        let initial_state = RigidBodyState::new(
            Vector3::new(0.0, 0.0, height),
            Quaternion::from_axis_angle(&Vector3::x(), degrees_to_radians(tilt)),
        );
        let params = InteractionParams::new(
            model
                .gamma
                .or(interaction.gamma)
                .unwrap_or(defaults.gamma),
            model
                .cos_theta_a
                .or(interaction.cos_theta_a)
                .unwrap_or(defaults.cos_theta_apolar),
            model
                .cos_theta_p
                .or(interaction.cos_theta_p)
                .unwrap_or(defaults.cos_theta_polar),
        );

        let model_config = core_config::ModelConfigBuilder::new()
            .semi_axes(Vector3::new(lxly, lxly, lz))
            .patch_angle(degrees_to_radians(alpha))
            .grid_resolution(
                model
                    .ngrid
                    .or(particle.grid_resolution)
                    .unwrap_or(defaults.grid_resolution),
            )
            .interaction(params)
            .initial_state(initial_state)
            .build()
            .map_err(EngineError::from)?;

        let mut relaxation = core_config::RelaxationConfigBuilder::new()
            .sample_count(run.nsteps.or(file_run.nsteps).unwrap_or(defaults.nsteps))
            .steps_per_sample(sampling.dt.or(file_sampling.dt).unwrap_or(defaults.dt))
            .sigma_z(sampling.dz.or(file_sampling.dz).unwrap_or(defaults.dz))
            .sigma_phi(
                sampling
                    .dphi
                    .or(file_sampling.dphi)
                    .unwrap_or(defaults.dphi),
            );
        if let Some(seed) = sampling.seed.or(file_sampling.seed) {
            relaxation = relaxation.seed(seed);
        }
        let relaxation = relaxation.build().map_err(EngineError::from)?;

        let watch = Self::merge_watch(&defaults, run, &file_run)?;

        Ok(JanusConfig {
            model: model_config,
            relaxation,
            watch,
        })
    }

    fn merge_watch(
        defaults: &DefaultsConfig,
        cli: RunOverrides,
        file: &PartialRunConfig,
    ) -> Result<WatchSettings> {
        let duration_secs = cli
            .duration_secs
            .or(file.duration_secs)
            .unwrap_or(defaults.duration_secs);
        if !(duration_secs > 0.0 && duration_secs.is_finite()) {
            return Err(CliError::Argument(format!(
                "Run duration must be a positive number of seconds, got {}",
                duration_secs
            )));
        }
        let interval_ms = cli
            .interval_ms
            .or(file.interval_ms)
            .unwrap_or(defaults.interval_ms);
        if interval_ms == 0 {
            return Err(CliError::Argument(
                "Snapshot interval must be at least 1 ms".to_string(),
            ));
        }
        let duration = Duration::try_from_secs_f64(duration_secs).map_err(|e| {
            CliError::Argument(format!(
                "Run duration of {} seconds is out of range: {}",
                duration_secs, e
            ))
        })?;
        Ok(WatchSettings {
            duration,
            interval: Duration::from_millis(interval_ms),
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "particle.lxly" => {
                    self.particle.get_or_insert_with(Default::default).lxly =
                        Some(parse_value(key, value_str)?);
                }
                "particle.lz" => {
                    self.particle.get_or_insert_with(Default::default).lz =
                        Some(parse_value(key, value_str)?);
                }
                "particle.alpha" => {
                    self.particle.get_or_insert_with(Default::default).alpha =
                        Some(parse_value(key, value_str)?);
                }
                "particle.grid-resolution" => {
                    self.particle
                        .get_or_insert_with(Default::default)
                        .grid_resolution = Some(parse_value(key, value_str)?);
                }
                "particle.initial-height" => {
                    self.particle
                        .get_or_insert_with(Default::default)
                        .initial_height = Some(parse_value(key, value_str)?);
                }
                "particle.initial-tilt" => {
                    self.particle
                        .get_or_insert_with(Default::default)
                        .initial_tilt = Some(parse_value(key, value_str)?);
                }
                "interaction.gamma" => {
                    self.interaction.get_or_insert_with(Default::default).gamma =
                        Some(parse_value(key, value_str)?);
                }
                "interaction.cos-theta-a" => {
                    self.interaction
                        .get_or_insert_with(Default::default)
                        .cos_theta_a = Some(parse_value(key, value_str)?);
                }
                "interaction.cos-theta-p" => {
                    self.interaction
                        .get_or_insert_with(Default::default)
                        .cos_theta_p = Some(parse_value(key, value_str)?);
                }
                "sampling.dz" => {
                    self.sampling.get_or_insert_with(Default::default).dz =
                        Some(parse_value(key, value_str)?);
                }
                "sampling.dphi" => {
                    self.sampling.get_or_insert_with(Default::default).dphi =
                        Some(parse_value(key, value_str)?);
                }
                "sampling.dt" => {
                    self.sampling.get_or_insert_with(Default::default).dt =
                        Some(parse_value(key, value_str)?);
                }
                "sampling.seed" => {
                    self.sampling.get_or_insert_with(Default::default).seed =
                        Some(parse_value(key, value_str)?);
                }
                "run.nsteps" => {
                    self.run.get_or_insert_with(Default::default).nsteps =
                        Some(parse_value(key, value_str)?);
                }
                "run.duration-secs" => {
                    self.run.get_or_insert_with(Default::default).duration_secs =
                        Some(parse_value(key, value_str)?);
                }
                "run.interval-ms" => {
                    self.run.get_or_insert_with(Default::default).interval_ms =
                        Some(parse_value(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str) -> Result<T> {
    value_str.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value_str))
    })
}
