use crate::cli::WatchArgs;
use crate::config::{PartialJanusConfig, RunOverrides};
use crate::error::Result;
use crate::utils::report;
use janusmc::engine::model::EllipsoidModel;
use janusmc::engine::runner::RunController;
use std::io::{self, Write};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

pub async fn run(args: WatchArgs) -> Result<()> {
    let partial_config = PartialJanusConfig::load(&args.model)?;
    let run_overrides = RunOverrides {
        duration_secs: args.duration,
        interval_ms: args.interval,
        ..Default::default()
    };
    let config = partial_config.merge_with_cli(&args.model, &args.sampling, run_overrides)?;
    let settings = config.watch;

    let model = EllipsoidModel::new(&config.model)?;
    let mut controller = RunController::new(model);
    controller.start(config.relaxation.step, config.relaxation.seed)?;
    info!(
        duration = ?settings.duration,
        interval = ?settings.interval,
        "Watching background relaxation."
    );

    println!("# step z(nm) theta(rad) energy(kT)");
    let deadline = time::sleep(settings.duration);
    tokio::pin!(deadline);
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);
    let mut ticker = time::interval(settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = &mut deadline => {
                debug!("Watch duration elapsed.");
                break;
            }
            _ = &mut interrupt => {
                info!("Interrupt received, stopping the background run.");
                break;
            }
            _ = ticker.tick() => {
                let observables = controller.observables()?;
                println!("{}", report::format_snapshot(&observables));
            }
        }
    }

    let summary = tokio::task::block_in_place(|| controller.stop())?;
    let final_observables = controller.observables()?;
    println!("{}", report::format_snapshot(&final_observables));
    io::stdout().flush()?;

    eprintln!(
        "Background run stopped: {} steps in {} batches, acceptance {:.1}%.",
        summary.steps,
        summary.batches,
        100.0 * summary.stats.acceptance_rate()
    );
    Ok(())
}
