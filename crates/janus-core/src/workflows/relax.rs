use crate::core::models::areas::WettedAreas;
use crate::engine::cancel::CancellationToken;
use crate::engine::config::RelaxationConfig;
use crate::engine::error::EngineError;
use crate::engine::model::AcceptanceStats;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::random::RandomSource;
use crate::engine::shared::SharedModel;
use crate::engine::state::Observables;
use tracing::{info, instrument};

/// One report line: the observables at the start of a sampling interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub step: u64,
    pub height: f64,
    pub tilt: f64,
    pub energy: f64,
    pub areas: WettedAreas,
}

impl From<&Observables> for Sample {
    fn from(obs: &Observables) -> Self {
        Self {
            step: obs.step,
            height: obs.height(),
            tilt: obs.tilt_angle(),
            energy: obs.energy,
            areas: obs.areas,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelaxationReport {
    pub samples_emitted: usize,
    pub steps_executed: u64,
    pub stats: AcceptanceStats,
    pub final_observables: Observables,
    pub cancelled: bool,
}

/// Alternates between emitting a [`Sample`] and running one batch of
/// `config.steps_per_sample()` elementary steps, `config.sample_count` times.
/// `cancel` is polled between batches.
#[instrument(skip_all, name = "relaxation_workflow", fields(samples = config.sample_count))]
pub fn run(
    model: &SharedModel,
    config: &RelaxationConfig,
    cancel: &CancellationToken,
    reporter: &ProgressReporter,
    mut on_sample: impl FnMut(&Sample),
) -> Result<RelaxationReport, EngineError> {
    config.step.validate()?;
    let mut rng = RandomSource::from_optional_seed(config.seed);

    reporter.report(Progress::PhaseStart { name: "Relaxation" });
    reporter.report(Progress::TaskStart {
        total: config.sample_count as u64,
    });
    info!(
        total_steps = config.total_steps(),
        seed = ?config.seed,
        "Starting Metropolis relaxation."
    );

    let mut stats = AcceptanceStats::default();
    let mut samples_emitted = 0;
    let mut cancelled = false;

    for _ in 0..config.sample_count {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }
        let observables = model.observables()?;
        on_sample(&Sample::from(&observables));
        samples_emitted += 1;

        let batch = model.run_batch(&config.step, &mut rng)?;
        stats.merge(&batch);

        reporter.report(Progress::TaskIncrement { amount: 1 });
        reporter.report(Progress::StatusUpdate {
            text: format!(
                "E = {:.3} kT, acceptance {:.1}%",
                observables.energy,
                100.0 * stats.acceptance_rate()
            ),
        });
    }

    reporter.report(Progress::TaskFinish);
    if cancelled {
        reporter.report(Progress::Message(format!(
            "Cancelled after {} of {} intervals.",
            samples_emitted, config.sample_count
        )));
    }
    reporter.report(Progress::PhaseFinish);

    let final_observables = model.observables()?;
    info!(
        steps = stats.proposed,
        acceptance = stats.acceptance_rate(),
        energy = final_observables.energy,
        cancelled,
        "Relaxation finished."
    );

    Ok(RelaxationReport {
        samples_emitted,
        steps_executed: stats.proposed,
        stats,
        final_observables,
        cancelled,
    })
}
