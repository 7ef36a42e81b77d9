//! Sublimation flux from blowing snow for a single wind realization
//!
//! The full model treats the saltation layer as a well-mixed slab with the
//! Liston & Sturm transport rate and integrates the suspended layer above it
//! up to the height where Kind's concentration profile vanishes. The
//! simplified model replaces both layers with the Essery et al. power law in
//! the 10 m wind speed.
//!
//! # Scientific References
//!
//! - Liston, G.E., Sturm, M. (1998). "A snow-transport model for complex terrain"
//!   Journal of Glaciology, 44(148), 498-516
//! - Essery, R., Li, L., Pomeroy, J. (1999). "A distributed model of blowing snow
//!   over complex terrain". Hydrological Processes, 13, 2423-2438
//! - Pomeroy, J.W., Gray, D.M. (1990). "Saltation of snow"
//!   Water Resources Research, 26(7), 1583-1594

use super::height_profile::{ProfileMode, ProfileParameters};
use crate::config::{BlowingSnowConfig, FluxModel};
use crate::error::Result;
use crate::solver::RombergIntegrator;
use tracing::trace;

/// Essery et al. (1999) scaling coefficient of the simplified model
const SIMPLIFIED_SCALE: f64 = 0.25;

/// Ratio of saltation layer height to `u*²/2g`
const SALTATION_HEIGHT_COEFFICIENT: f64 = 1.6;

/// Fetch length scale of the saltation development correction (m)
const FETCH_SCALE: f64 = 500.0;

/// Inputs of one realization's flux computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluxInputs {
    /// Actual vapor pressure of air (Pa)
    pub vapor_pressure: f64,
    /// Saturation vapor pressure at air temperature (Pa)
    pub saturation_vapor_pressure: f64,
    /// Reference height of the humidity measurement (m)
    pub humidity_reference_height: f64,
    /// Density of air (kg/m³)
    pub air_density: f64,
    /// Threshold shear velocity (m/s)
    pub threshold_shear: f64,
    /// Shear velocity (m/s)
    pub shear_velocity: f64,
    /// Upwind fetch (m)
    pub fetch: f64,
    /// Representative 10 m wind speed (m/s)
    pub wind_10m: f64,
    /// Combined heat and vapor transfer resistance F (m·s/kg)
    pub resistance: f64,
}

impl FluxInputs {
    /// Subsaturation of air relative to ice, positive when sub-saturated
    #[inline]
    pub fn undersaturation(&self) -> f64 {
        1.0 - self.vapor_pressure / self.saturation_vapor_pressure
    }
}

/// Fraction of fully developed saltation transport reached over `fetch` (m)
///
/// Tends to one for long fetches and to zero as the fetch vanishes.
pub fn fetch_factor(fetch: f64) -> f64 {
    let x = 3.0 * fetch / FETCH_SCALE;
    1.0 + ((-x).exp() - 1.0) / x
}

/// Sublimation flux (kg/(m²·s)) for one wind realization, floored at
/// `config.transport.flux_floor`
///
/// # Errors
///
/// Propagates [`crate::BlowingSnowError::IntegrationNotConverged`] from the
/// suspension-layer integral.
pub fn sublimation_flux(inputs: &FluxInputs, config: &BlowingSnowConfig) -> Result<f64> {
    let flux = match config.flux_model {
        FluxModel::Simplified => simplified_flux(inputs),
        FluxModel::Full => full_flux(inputs, config)?,
    };
    Ok(flux.max(config.transport.flux_floor))
}

fn simplified_flux(inputs: &FluxInputs) -> f64 {
    let height_correction =
        1.0 - 0.027 * inputs.humidity_reference_height.ln() + 0.027 * 2.0_f64.ln();
    let undersaturation = inputs.undersaturation() * height_correction;
    SIMPLIFIED_SCALE * undersaturation * inputs.wind_10m.powi(5) / inputs.resistance
}

fn full_flux(inputs: &FluxInputs, config: &BlowingSnowConfig) -> Result<f64> {
    let constants = &config.constants;
    let transport = &config.transport;
    let u = inputs.shear_velocity;
    let ut = inputs.threshold_shear;

    // Liston & Sturm (1998) eq. 6, maximum saltation transport (kg/(m·s))
    let mut transport_rate =
        (transport.saltation_constant * inputs.air_density / constants.gravity)
            * (ut / u)
            * (u * u - ut * ut);
    if config.fetch_correction {
        transport_rate *= fetch_factor(inputs.fetch);
    }

    let saltation_height = SALTATION_HEIGHT_COEFFICIENT * u * u / (2.0 * constants.gravity);
    let particle_velocity = transport.particle_velocity_ratio * ut;
    let saltation_concentration = transport_rate / (saltation_height * particle_velocity);

    let profile = ProfileParameters {
        vapor_pressure: inputs.vapor_pressure,
        saturation_vapor_pressure: inputs.saturation_vapor_pressure,
        humidity_reference_height: inputs.humidity_reference_height,
        wind_speed: inputs.wind_10m,
        resistance: inputs.resistance,
        saltation_height,
        saltation_concentration,
        shear_velocity: u,
        ice_density: constants.ice_density,
        von_karman: constants.von_karman,
        settling_velocity: transport.settling_velocity,
        kinematic_viscosity: transport.kinematic_viscosity,
    };

    let saltation_rate = profile.evaluate(0.5 * saltation_height, ProfileMode::RateOnly);
    let saltation = saltation_concentration * saltation_rate * saltation_height;

    let integrator = RombergIntegrator::from(config.integrator);
    let suspension = integrator
        .integrate(
            |z| profile.evaluate(z, ProfileMode::RateTimesConcentration),
            saltation_height,
            profile.suspension_top(),
        )?
        .value;

    trace!(
        transport_rate,
        saltation_height,
        saltation,
        suspension,
        "Two-layer sublimation flux"
    );

    Ok(saltation + suspension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn inputs() -> FluxInputs {
        FluxInputs {
            vapor_pressure: 180.0,
            saturation_vapor_pressure: 260.0,
            humidity_reference_height: 2.0,
            air_density: 1.3,
            threshold_shear: 0.25,
            shear_velocity: 0.6,
            fetch: 1000.0,
            wind_10m: 15.0,
            resistance: 3.4e7,
        }
    }

    #[test]
    fn test_fetch_factor_limits() {
        assert!(fetch_factor(1.0) < 0.01);
        assert_relative_eq!(fetch_factor(1.0e6), 1.0, max_relative = 1e-3);
        assert!(fetch_factor(500.0) < fetch_factor(1500.0));
    }

    #[test]
    fn test_fetch_factor_matches_closed_form() {
        let fe: f64 = 1000.0;
        let expected = 1.0 + (500.0 / (3.0 * fe)) * ((-3.0 * fe / 500.0).exp() - 1.0);
        assert_relative_eq!(fetch_factor(fe), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_full_model_positive_when_undersaturated() {
        let flux = sublimation_flux(&inputs(), &BlowingSnowConfig::default()).unwrap();
        assert!(flux > 0.0, "flux = {flux}");
        assert!(flux < 1.0e-3, "flux = {flux}");
    }

    #[test]
    fn test_fetch_correction_reduces_flux() {
        let corrected = sublimation_flux(&inputs(), &BlowingSnowConfig::default()).unwrap();
        let uncorrected = sublimation_flux(
            &inputs(),
            &BlowingSnowConfig {
                fetch_correction: false,
                ..BlowingSnowConfig::default()
            },
        )
        .unwrap();
        assert!(uncorrected > corrected);
        assert_relative_eq!(corrected / uncorrected, fetch_factor(1000.0), max_relative = 1e-9);
    }

    #[test]
    fn test_simplified_model_closed_form() {
        let config = BlowingSnowConfig {
            flux_model: FluxModel::Simplified,
            ..BlowingSnowConfig::default()
        };
        let i = inputs();
        let expected = 0.25 * (1.0 - 180.0 / 260.0) * 15.0_f64.powi(5) / 3.4e7;
        let flux = sublimation_flux(&i, &config).unwrap();
        // Zrh = 2 m: the height correction is exactly one
        assert_relative_eq!(flux, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_supersaturated_flux_is_floored() {
        let config = BlowingSnowConfig {
            flux_model: FluxModel::Simplified,
            ..BlowingSnowConfig::default()
        };
        let wet = FluxInputs {
            vapor_pressure: 520.0,
            wind_10m: 25.0,
            ..inputs()
        };
        let flux = sublimation_flux(&wet, &config).unwrap();
        assert_eq!(flux, config.transport.flux_floor);
    }
}
