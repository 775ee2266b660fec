use crate::cli::{InspectArgs, SamplingArgs};
use crate::config::{PartialJanusConfig, RunOverrides};
use crate::error::Result;
use crate::utils::report::{self, RunHeader};
use janusmc::engine::model::EllipsoidModel;
use std::io::{self, Write};
use tracing::info;

pub async fn run(args: InspectArgs) -> Result<()> {
    let partial_config = PartialJanusConfig::load(&args.model)?;
    let config = partial_config.merge_with_cli(
        &args.model,
        &SamplingArgs::default(),
        RunOverrides::default(),
    )?;

    info!(
        resolution = config.model.grid_resolution,
        "Building the particle surface grid..."
    );
    let mut model = EllipsoidModel::new(&config.model)?;
    let observables = model.observables();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_header(
        &mut out,
        &RunHeader {
            command_line: &report::command_line(),
            geometry: model.geometry(),
            interaction: model.interaction(),
            areas: &observables.areas,
            step: None,
        },
    )?;
    writeln!(out, "# grid points = {}", model.grid().point_count())?;
    writeln!(out, "# max diameter = {}", model.max_diameter())?;
    writeln!(out, "# z = {:.6}", observables.height())?;
    writeln!(out, "# theta = {:.6}", observables.tilt_angle())?;
    writeln!(
        out,
        "# rotation angle = {:.6}",
        observables.state.orientation.angle()
    )?;
    report::write_areas(&mut out, &observables.areas)?;
    writeln!(out, "# energy = {:.6}", observables.energy)?;
    out.flush()?;

    Ok(())
}
