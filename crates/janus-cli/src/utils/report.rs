use janusmc::core::math::vector::radians_to_degrees;
use janusmc::core::models::areas::WettedAreas;
use janusmc::core::models::grid::ParticleGeometry;
use janusmc::core::models::interaction::InteractionParams;
use janusmc::engine::config::StepConfig;
use janusmc::engine::state::Observables;
use janusmc::workflows::relax::Sample;
use std::io::{self, Write};

pub const SAMPLE_COLUMNS: &str =
    "# time z(nm) theta(rad) energy(kT) Sao(nm^2) Spo(nm^2) Si(nm^2)";

/// The invocation as typed, echoed as the first header line.
pub fn command_line() -> String {
    std::env::args().collect::<Vec<_>>().join(" ")
}

/// Everything echoed in the `#` preamble of a data file.
pub struct RunHeader<'a> {
    pub command_line: &'a str,
    pub geometry: &'a ParticleGeometry,
    pub interaction: &'a InteractionParams,
    pub areas: &'a WettedAreas,
    pub step: Option<&'a StepConfig>,
}

pub fn write_header(w: &mut impl Write, header: &RunHeader) -> io::Result<()> {
    let axes = &header.geometry.semi_axes;
    writeln!(w, "# Generated by: {}", header.command_line)?;
    writeln!(w, "# Lx = {}", axes.x)?;
    writeln!(w, "# Ly = {}", axes.y)?;
    writeln!(w, "# Lz = {}", axes.z)?;
    writeln!(
        w,
        "# alpha = {}",
        radians_to_degrees(header.geometry.patch_angle)
    )?;
    writeln!(w, "# ngrid = {}", header.geometry.resolution)?;
    writeln!(w, "# gamma = {}", header.interaction.gamma)?;
    writeln!(w, "# cos(thetaA) = {}", header.interaction.cos_theta_apolar)?;
    writeln!(w, "# cos(thetaP) = {}", header.interaction.cos_theta_polar)?;
    writeln!(w, "# Area(cap) = {}", header.areas.cap())?;
    writeln!(w, "# Area(nocap) = {}", header.areas.non_cap())?;
    if let Some(step) = header.step {
        writeln!(w, "# dz = {}", step.sigma_z)?;
        writeln!(w, "# dphi = {}", step.sigma_phi)?;
        writeln!(w, "# dt = {}", step.batch_size)?;
    }
    Ok(())
}

/// One data row: sample index, height, tilt, energy, apolar-oil, polar-oil and occluded area.
pub fn format_sample(index: usize, sample: &Sample) -> String {
    format!(
        "{}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}",
        index,
        sample.height,
        sample.tilt,
        sample.energy,
        sample.areas.apolar_oil,
        sample.areas.polar_oil,
        sample.areas.occluded
    )
}

/// One snapshot row of a background run: step count, height, tilt and energy.
pub fn format_snapshot(observables: &Observables) -> String {
    format!(
        "{}\t{:.6}\t{:.6}\t{:.6}",
        observables.step,
        observables.height(),
        observables.tilt_angle(),
        observables.energy
    )
}

pub fn write_areas(w: &mut impl Write, areas: &WettedAreas) -> io::Result<()> {
    writeln!(w, "# Sao = {:.6}", areas.apolar_oil)?;
    writeln!(w, "# Saw = {:.6}", areas.apolar_water)?;
    writeln!(w, "# Spo = {:.6}", areas.polar_oil)?;
    writeln!(w, "# Spw = {:.6}", areas.polar_water)?;
    writeln!(w, "# Si = {:.6}", areas.occluded)?;
    writeln!(w, "# Area(oil) = {:.6}", areas.oil())?;
    writeln!(w, "# Area(water) = {:.6}", areas.water())?;
    writeln!(w, "# Area(total) = {:.6}", areas.total())
}

#[cfg(test)]
mod tests {
    use super::*;
    use janusmc::core::math::Vector3;

    fn areas() -> WettedAreas {
        WettedAreas {
            apolar_oil: 1.5,
            polar_oil: 0.25,
            apolar_water: 0.5,
            polar_water: 2.0,
            occluded: 0.75,
        }
    }

    #[test]
    fn sample_row_has_seven_tab_separated_fixed_point_columns() {
        let sample = Sample {
            step: 300,
            height: -0.125,
            tilt: 0.5,
            energy: -12.0,
            areas: areas(),
        };
        let row = format_sample(3, &sample);
        assert_eq!(
            row,
            "3\t-0.125000\t0.500000\t-12.000000\t1.500000\t0.250000\t0.750000"
        );
    }

    #[test]
    fn header_echoes_parameters_and_cap_split() {
        let geometry = ParticleGeometry::new(Vector3::new(1.4, 1.4, 2.6), 0.5, 10).unwrap();
        let interaction = InteractionParams::new(12.0, -0.2, 0.5);
        let areas = areas();
        let step = StepConfig::new(100, 0.01, 0.02).unwrap();
        let header = RunHeader {
            command_line: "janus relax",
            geometry: &geometry,
            interaction: &interaction,
            areas: &areas,
            step: Some(&step),
        };

        let mut buffer = Vec::new();
        write_header(&mut buffer, &header).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.starts_with("# Generated by: janus relax\n"));
        assert!(text.contains("# Lz = 2.6\n"));
        assert!(text.contains("# Area(cap) = 2\n"));
        assert!(text.contains("# Area(nocap) = 2.25\n"));
        assert!(text.contains("# dphi = 0.02\n"));
        assert!(text.lines().all(|line| line.starts_with('#')));
    }

    #[test]
    fn header_without_step_config_omits_move_widths() {
        let geometry = ParticleGeometry::new(Vector3::new(1.0, 1.0, 1.0), 0.5, 10).unwrap();
        let interaction = InteractionParams::default();
        let areas = WettedAreas::default();
        let header = RunHeader {
            command_line: "janus inspect",
            geometry: &geometry,
            interaction: &interaction,
            areas: &areas,
            step: None,
        };

        let mut buffer = Vec::new();
        write_header(&mut buffer, &header).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(!text.contains("# dz"));
        assert!(!text.contains("# dt"));
    }

    #[test]
    fn area_block_lists_oil_and_water_sums_before_total() {
        let mut buffer = Vec::new();
        write_areas(&mut buffer, &areas()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[5], "# Area(oil) = 1.750000");
        assert_eq!(lines[6], "# Area(water) = 2.500000");
        assert_eq!(lines[7], "# Area(total) = 4.250000");
    }
}
