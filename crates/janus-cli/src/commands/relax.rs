use crate::cli::RelaxArgs;
use crate::config::{PartialJanusConfig, RunOverrides};
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use crate::utils::report::{self, RunHeader};
use crate::utils::signal;
use janusmc::engine::cancel::CancellationToken;
use janusmc::engine::model::EllipsoidModel;
use janusmc::engine::progress::ProgressReporter;
use janusmc::engine::shared::SharedModel;
use janusmc::workflows;
use janusmc::workflows::relax::RelaxationReport;
use std::io::{self, BufWriter, Write};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn run(args: RelaxArgs, ui_sender: mpsc::Sender<UiEvent>) -> Result<()> {
    let partial_config = PartialJanusConfig::load(&args.model)?;
    info!("Merging configuration from file and CLI arguments...");
    let run_overrides = RunOverrides {
        nsteps: args.nsteps,
        ..Default::default()
    };
    let config = partial_config.merge_with_cli(&args.model, &args.sampling, run_overrides)?;

    info!(
        resolution = config.model.grid_resolution,
        "Building the particle surface grid..."
    );
    let mut model = EllipsoidModel::new(&config.model)?;
    let initial_areas = model.recompute_areas();
    let geometry = *model.geometry();
    let interaction = *model.interaction();
    let shared = SharedModel::new(model);

    let cancel = CancellationToken::new();
    let signal_task = signal::cancel_on_ctrl_c(cancel.clone());
    let progress_handler = CliProgressHandler::new(ui_sender);
    let relaxation = config.relaxation.clone();
    let command_line = report::command_line();

    info!("Invoking the core relaxation workflow...");
    let worker_cancel = cancel.clone();
    let outcome = tokio::task::spawn_blocking(move || -> Result<RelaxationReport> {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        report::write_header(
            &mut out,
            &RunHeader {
                command_line: &command_line,
                geometry: &geometry,
                interaction: &interaction,
                areas: &initial_areas,
                step: Some(&relaxation.step),
            },
        )?;
        writeln!(out, "{}", report::SAMPLE_COLUMNS)?;

        let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
        let mut index = 0usize;
        let mut write_error: Option<io::Error> = None;
        let summary = workflows::relax::run(
            &shared,
            &relaxation,
            &worker_cancel,
            &reporter,
            |sample| {
                if write_error.is_some() {
                    return;
                }
                if let Err(e) = writeln!(out, "{}", report::format_sample(index, sample)) {
                    write_error = Some(e);
                    worker_cancel.cancel();
                }
                index += 1;
            },
        )?;

        if let Some(e) = write_error {
            return Err(CliError::Io(e));
        }
        out.flush()?;
        Ok(summary)
    })
    .await
    .map_err(|e| CliError::Other(anyhow::anyhow!("Relaxation task failed: {}", e)));
    signal_task.abort();
    let summary = outcome??;

    info!(
        samples = summary.samples_emitted,
        steps = summary.steps_executed,
        "Workflow finished."
    );
    if summary.cancelled {
        warn!(
            "Relaxation cancelled after {} sample(s).",
            summary.samples_emitted
        );
    }
    eprintln!(
        "Relaxation finished: {} steps, acceptance {:.1}% (uphill {}/{}), final energy {:.4} kT.",
        summary.steps_executed,
        100.0 * summary.stats.acceptance_rate(),
        summary.stats.uphill_accepted,
        summary.stats.uphill_proposed,
        summary.final_observables.energy
    );

    Ok(())
}
