use super::config::StepConfig;
use super::error::EngineError;
use super::model::{AcceptanceStats, EllipsoidModel, Proposal};
use super::random::RandomSource;
use super::state::{Observables, RigidBodyState};
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable handle to a model stepped by one writer and sampled by any number of readers.
///
/// The writer holds the lock for exactly one elementary step at a time; readers copy
/// values out under the same lock and never keep references to the live pose.
#[derive(Debug, Clone)]
pub struct SharedModel {
    inner: Arc<Mutex<EllipsoidModel>>,
}

impl SharedModel {
    pub fn new(model: EllipsoidModel) -> Self {
        Self {
            inner: Arc::new(Mutex::new(model)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, EllipsoidModel>, EngineError> {
        self.inner.lock().map_err(|_| EngineError::LockPoisoned)
    }

    pub fn snapshot(&self) -> Result<RigidBodyState, EngineError> {
        Ok(self.lock()?.state())
    }

    pub fn observables(&self) -> Result<Observables, EngineError> {
        Ok(self.lock()?.observables())
    }

    pub fn step_count(&self) -> Result<u64, EngineError> {
        Ok(self.lock()?.step_count())
    }

    /// Runs `f` with exclusive access to the model.
    pub fn with_model<R>(&self, f: impl FnOnce(&mut EllipsoidModel) -> R) -> Result<R, EngineError> {
        Ok(f(&mut *self.lock()?))
    }

    pub fn clone_model(&self) -> Result<EllipsoidModel, EngineError> {
        Ok(self.lock()?.clone())
    }

    /// Runs one batch of elementary steps. Proposals are drawn outside the lock; each
    /// evaluation and commit happens inside its own critical section.
    pub fn run_batch(
        &self,
        config: &StepConfig,
        rng: &mut RandomSource,
    ) -> Result<AcceptanceStats, EngineError> {
        self.lock()?.recompute_areas();
        let mut stats = AcceptanceStats::default();
        for _ in 0..config.batch_size {
            let proposal = Proposal::draw(config, rng);
            let outcome = self.lock()?.apply(&proposal, rng);
            stats.record(&outcome);
        }
        Ok(stats)
    }
}
