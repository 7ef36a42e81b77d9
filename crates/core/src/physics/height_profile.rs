//! Sublimation rate of suspended snow as a function of height
//!
//! Particles shrink with height: the mean radius follows a power law and the
//! size distribution is a two-parameter gamma whose shape parameter grows
//! linearly with height. Each particle sublimates at the rate set by the
//! ventilated heat and vapor exchange with undersaturated air (Thorpe & Mason).
//! The concentration of suspended snow decays from the top of the saltation
//! layer following Kind's profile.
//!
//! # Scientific References
//!
//! - Thorpe, A.D., Mason, B.J. (1966). "The evaporation of ice spheres and ice crystals"
//!   British Journal of Applied Physics, 17, 541-548
//! - Schmidt, R.A. (1982). "Vertical profiles of wind speed, snow concentration,
//!   and humidity in blowing snow". Boundary-Layer Meteorology, 23, 223-246
//! - Pomeroy, J.W., Male, D.H. (1986). "Physical modelling of blowing snow for
//!   agricultural production in western Canada"
//! - Lee, L.W. (1975). "Sublimation of snow in a turbulent atmosphere", Ph.D. thesis
//! - Kind, R.J. (1992). "One-dimensional aeolian suspension above beds of loose particles"
//!   Atmospheric Environment, 26A(5), 927-931

use std::f64::consts::PI;

/// Quantity returned by [`ProfileParameters::evaluate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileMode {
    /// Sublimation loss-rate coefficient ψ (1/s)
    RateOnly,
    /// Loss-rate coefficient times suspended mass concentration, ψ·φ (kg/(m³·s))
    RateTimesConcentration,
}

/// Height-independent parameters of the sublimation profile for one realization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileParameters {
    /// Actual vapor pressure of air (Pa)
    pub vapor_pressure: f64,
    /// Saturation vapor pressure at air temperature (Pa)
    pub saturation_vapor_pressure: f64,
    /// Reference height of the humidity measurement (m)
    pub humidity_reference_height: f64,
    /// Representative 10 m wind speed (m/s)
    pub wind_speed: f64,
    /// Combined heat and vapor transfer resistance F (m·s/kg)
    pub resistance: f64,
    /// Saltation layer height (m)
    pub saltation_height: f64,
    /// Mass concentration at the top of the saltation layer (kg/m³)
    pub saltation_concentration: f64,
    /// Shear velocity (m/s)
    pub shear_velocity: f64,
    /// Ice density (kg/m³)
    pub ice_density: f64,
    /// von Kármán constant
    pub von_karman: f64,
    /// Particle settling velocity (m/s)
    pub settling_velocity: f64,
    /// Kinematic viscosity of air (m²/s)
    pub kinematic_viscosity: f64,
}

impl ProfileParameters {
    /// Mean particle mass (kg) and radius (m) at height `z`
    pub fn particle(&self, z: f64) -> (f64, f64) {
        let radius = 4.6e-5 * z.powf(-0.258);
        let alpha = 4.08 + 12.6 * z;
        let mass = (4.0 / 3.0)
            * PI
            * self.ice_density
            * radius.powi(3)
            * (1.0 + 3.0 / alpha + 2.0 / (alpha * alpha));
        let mean_radius = ((3.0 * mass) / (4.0 * PI * self.ice_density)).cbrt();
        (mass, mean_radius)
    }

    /// Sublimation loss-rate coefficient ψ (1/s) at height `z`
    pub fn loss_rate(&self, z: f64) -> f64 {
        let (mass, mean_radius) = self.particle(z);

        // Pomeroy & Male (1986) terminal and Pomeroy (1988) fluctuating velocity
        let terminal = 1.1e7 * mean_radius.powf(1.8);
        let fluctuating = 0.005 * self.wind_speed.powf(1.36);
        let ventilation = terminal + 3.0 * fluctuating * (PI / 4.0).cos();

        let reynolds = 2.0 * mean_radius * ventilation / self.kinematic_viscosity;
        let nusselt = 1.79 + 0.606 * reynolds.sqrt();

        let undersaturation = (1.0 - self.vapor_pressure / self.saturation_vapor_pressure)
            * (1.0 - 0.027 * (z / self.humidity_reference_height).ln());
        let mass_rate = 2.0 * PI * mean_radius * undersaturation * nusselt / self.resistance;

        mass_rate / mass
    }

    /// Suspended snow mass concentration φ (kg/m³) at height `z`
    pub fn concentration(&self, z: f64) -> f64 {
        let u = self.shear_velocity;
        let ws = self.settling_velocity;
        let t = 0.5 * u * u / (self.wind_speed * ws);
        let exponent = -ws / (self.von_karman * u);
        self.saltation_concentration * ((t + 1.0) * (z / self.saltation_height).powf(exponent) - t)
    }

    /// Evaluate the profile at height `z` (m)
    pub fn evaluate(&self, z: f64, mode: ProfileMode) -> f64 {
        let rate = self.loss_rate(z);
        match mode {
            ProfileMode::RateOnly => rate,
            ProfileMode::RateTimesConcentration => rate * self.concentration(z),
        }
    }

    /// Height at which the suspended concentration falls to zero (m)
    pub fn suspension_top(&self) -> f64 {
        let u = self.shear_velocity;
        let ws = self.settling_velocity;
        let t = 0.5 * u * u / (self.wind_speed * ws);
        self.saltation_height * (t / (t + 1.0)).powf(self.von_karman * u / -ws)
    }
}
