use super::cancel::CancellationToken;
use super::config::StepConfig;
use super::error::EngineError;
use super::model::{AcceptanceStats, EllipsoidModel};
use super::random::RandomSource;
use super::shared::SharedModel;
use super::state::{Observables, RigidBodyState};
use crate::core::math::{Quaternion, Vector3};
use crate::core::models::interaction::InteractionParams;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunSummary {
    pub batches: u64,
    pub steps: u64,
    pub stats: AcceptanceStats,
}

/// Steps `model` in batches until `cancel` is set. Cancellation latency is one batch.
#[instrument(level = "debug", skip_all, fields(batch_size = config.batch_size))]
pub fn run_until_cancelled(
    model: &SharedModel,
    config: &StepConfig,
    rng: &mut RandomSource,
    cancel: &CancellationToken,
) -> Result<RunSummary, EngineError> {
    config.validate()?;
    let mut summary = RunSummary::default();
    while !cancel.is_cancelled() {
        let stats = model.run_batch(config, rng)?;
        summary.batches += 1;
        summary.steps += stats.proposed;
        summary.stats.merge(&stats);
    }
    debug!(batches = summary.batches, "Run loop observed cancellation.");
    Ok(summary)
}

struct ActiveRun {
    model: SharedModel,
    cancel: CancellationToken,
    handle: JoinHandle<Result<RunSummary, EngineError>>,
}

/// Start/stop front for a background relaxation.
///
/// While idle, edits go to a staged model. `start` copies the staged model into a live
/// shared one stepped on a worker thread; `stop` joins the worker and takes the live
/// model back as the new staged model. Edits are refused while a run is active.
pub struct RunController {
    staged: EllipsoidModel,
    active: Option<ActiveRun>,
}

impl RunController {
    pub fn new(model: EllipsoidModel) -> Self {
        Self {
            staged: model,
            active: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn staged(&self) -> &EllipsoidModel {
        &self.staged
    }

    pub fn start(&mut self, config: StepConfig, seed: Option<u64>) -> Result<(), EngineError> {
        if self.active.is_some() {
            return Err(EngineError::RunActive);
        }
        config.validate()?;

        let model = SharedModel::new(self.staged.clone());
        let cancel = CancellationToken::new();
        let handle = {
            let model = model.clone();
            let cancel = cancel.clone();
            thread::Builder::new()
                .name("janus-relax".to_string())
                .spawn(move || {
                    let mut rng = RandomSource::from_optional_seed(seed);
                    run_until_cancelled(&model, &config, &mut rng, &cancel)
                })
                .map_err(|e| EngineError::Worker(e.to_string()))?
        };

        info!(
            batch_size = config.batch_size,
            sigma_z = config.sigma_z,
            sigma_phi = config.sigma_phi,
            "Relaxation run started."
        );
        self.active = Some(ActiveRun {
            model,
            cancel,
            handle,
        });
        Ok(())
    }

    /// Cancels and joins the worker, then takes the live model back as the staged one.
    ///
    /// A worker error still hands back whatever the live model reached. If the live
    /// model cannot be read, its progress is dropped and the staged model keeps its
    /// pre-run pose.
    pub fn stop(&mut self) -> Result<RunSummary, EngineError> {
        let run = self.active.take().ok_or(EngineError::NotRunning)?;
        run.cancel.cancel();
        let outcome = run
            .handle
            .join()
            .map_err(|_| EngineError::Worker("relaxation worker panicked".to_string()))
            .and_then(|result| result);

        match run.model.clone_model() {
            Ok(model) => self.staged = model,
            Err(e) => {
                warn!(
                    "Discarding the progress of the relaxation run, live model unreadable: {}",
                    e
                );
                outcome?;
                return Err(e);
            }
        }

        let summary = match outcome {
            Ok(summary) => summary,
            Err(e) => {
                warn!(
                    step = self.staged.step_count(),
                    "Relaxation worker failed, kept the pose it reached: {}", e
                );
                return Err(e);
            }
        };
        info!(
            steps = summary.steps,
            acceptance = summary.stats.acceptance_rate(),
            "Relaxation run stopped."
        );
        Ok(summary)
    }

    /// Pose of the live model while running, of the staged model otherwise.
    pub fn snapshot(&self) -> Result<RigidBodyState, EngineError> {
        match &self.active {
            Some(run) => run.model.snapshot(),
            None => Ok(self.staged.state()),
        }
    }

    pub fn observables(&mut self) -> Result<Observables, EngineError> {
        match &self.active {
            Some(run) => run.model.observables(),
            None => Ok(self.staged.observables()),
        }
    }

    fn staged_mut(&mut self) -> Result<&mut EllipsoidModel, EngineError> {
        if self.active.is_some() {
            return Err(EngineError::RunActive);
        }
        Ok(&mut self.staged)
    }

    pub fn set_state(&mut self, state: RigidBodyState) -> Result<(), EngineError> {
        self.staged_mut()?.set_state(state);
        Ok(())
    }

    pub fn set_center(&mut self, center: Vector3) -> Result<(), EngineError> {
        self.staged_mut()?.set_center(center);
        Ok(())
    }

    pub fn set_orientation(&mut self, orientation: Quaternion) -> Result<(), EngineError> {
        self.staged_mut()?.set_orientation(orientation);
        Ok(())
    }

    pub fn set_interaction(&mut self, params: InteractionParams) -> Result<(), EngineError> {
        self.staged_mut()?.set_interaction(params);
        Ok(())
    }

    pub fn reset_geometry(
        &mut self,
        semi_axes: Vector3,
        patch_angle: f64,
        resolution: usize,
    ) -> Result<(), EngineError> {
        self.staged_mut()?
            .reset_geometry(semi_axes, patch_angle, resolution)
    }
}

impl Drop for RunController {
    fn drop(&mut self) {
        if self.active.is_some() {
            if let Err(e) = self.stop() {
                warn!("Relaxation worker did not shut down cleanly: {}", e);
            }
        }
    }
}
