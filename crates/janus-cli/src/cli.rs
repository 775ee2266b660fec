use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Janus MC Developers",
    version,
    about = "JanusMC CLI - Metropolis relaxation of a Janus ellipsoid at a flat oil-water interface.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Relax the particle and print one tab-separated line of observables per interval.
    Relax(RelaxArgs),
    /// Build the particle and print its geometry, wetted areas and energy without relaxing.
    Inspect(InspectArgs),
    /// Relax on a background worker for a fixed wall-clock time, sampling snapshots periodically.
    Watch(WatchArgs),
}

/// Particle shape, wetting parameters and initial pose shared by all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Particle Overrides ---
    /// Override both in-plane semi-axes (Lx = Ly).
    #[arg(long = "lxly", value_name = "FLOAT")]
    pub lxly: Option<f64>,

    /// Override the semi-axis along the body z-axis.
    #[arg(long = "lz", value_name = "FLOAT")]
    pub lz: Option<f64>,

    /// Override the apolar patch angle, in degrees.
    #[arg(short, long, value_name = "DEGREES")]
    pub alpha: Option<f64>,

    /// Override the surface grid resolution (n x n points).
    #[arg(short = 'n', long = "ngrid", value_name = "INT")]
    pub ngrid: Option<usize>,

    /// Override the initial height of the particle center above the interface.
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub z0: Option<f64>,

    /// Override the initial tilt of the body z-axis, in degrees.
    #[arg(long, value_name = "DEGREES", allow_hyphen_values = true)]
    pub tilt0: Option<f64>,

    // --- Interaction Overrides ---
    /// Override the oil-water surface tension, in kT per unit area.
    #[arg(short, long, value_name = "FLOAT")]
    pub gamma: Option<f64>,

    /// Override the cosine of the contact angle on the apolar side.
    #[arg(long = "cos-theta-a", value_name = "FLOAT", allow_hyphen_values = true)]
    pub cos_theta_a: Option<f64>,

    /// Override the cosine of the contact angle on the polar side.
    #[arg(long = "cos-theta-p", value_name = "FLOAT", allow_hyphen_values = true)]
    pub cos_theta_p: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S sampling.dz=0.05
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Trial move widths and random seed.
#[derive(Args, Debug, Clone, Default)]
pub struct SamplingArgs {
    /// Override the standard deviation of vertical trial displacements.
    #[arg(long, value_name = "FLOAT")]
    pub dz: Option<f64>,

    /// Override the standard deviation of trial rotation angles, in radians.
    #[arg(long, value_name = "FLOAT")]
    pub dphi: Option<f64>,

    /// Override the number of elementary steps between two reported samples.
    #[arg(long, value_name = "INT")]
    pub dt: Option<usize>,

    /// Seed the random number generator for a reproducible run.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,
}

/// Arguments for the `relax` subcommand.
#[derive(Args, Debug)]
pub struct RelaxArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub sampling: SamplingArgs,

    /// Override the number of reported samples.
    #[arg(long, value_name = "INT")]
    pub nsteps: Option<usize>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub model: ModelArgs,
}

/// Arguments for the `watch` subcommand.
#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub sampling: SamplingArgs,

    /// Override how long the background run lasts, in seconds.
    #[arg(short, long, value_name = "SECONDS")]
    pub duration: Option<f64>,

    /// Override the interval between two snapshots, in milliseconds.
    #[arg(short, long, value_name = "MILLIS")]
    pub interval: Option<u64>,
}
