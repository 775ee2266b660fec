use super::areas::WettedAreas;

/// Interfacial tension `gamma` (oil-water, in kT per unit area) and the wetting cosines
/// of the apolar and polar surface regions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionParams {
    pub gamma: f64,
    pub cos_theta_apolar: f64,
    pub cos_theta_polar: f64,
}

impl InteractionParams {
    pub fn new(gamma: f64, cos_theta_apolar: f64, cos_theta_polar: f64) -> Self {
        Self {
            gamma,
            cos_theta_apolar,
            cos_theta_polar,
        }
    }

    /// `gamma * (S_AO cos(theta_A) + S_PO cos(theta_P) - S_I)`
    #[inline]
    pub fn free_energy(&self, areas: &WettedAreas) -> f64 {
        self.gamma
            * (areas.apolar_oil * self.cos_theta_apolar + areas.polar_oil * self.cos_theta_polar
                - areas.occluded)
    }
}
