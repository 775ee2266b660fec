/// Built-in parameter set, the BslA hydrophobin preset.
pub struct DefaultsConfig {
    pub lxly: f64,
    pub lz: f64,
    pub alpha_degrees: f64,
    pub grid_resolution: usize,
    pub initial_height: f64,
    pub initial_tilt_degrees: f64,
    pub gamma: f64,
    pub cos_theta_apolar: f64,
    pub cos_theta_polar: f64,
    pub dz: f64,
    pub dphi: f64,
    pub dt: usize,
    pub nsteps: usize,
    pub duration_secs: f64,
    pub interval_ms: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            lxly: 1.4,
            lz: 2.6,
            alpha_degrees: 50.4,
            grid_resolution: 100,
            initial_height: 0.0,
            initial_tilt_degrees: 0.0,
            gamma: 12.0,
            cos_theta_apolar: -0.2,
            cos_theta_polar: 0.5,
            dz: 0.01,
            dphi: 0.01,
            dt: 100,
            nsteps: 10_000,
            duration_secs: 10.0,
            interval_ms: 100,
        }
    }
}
