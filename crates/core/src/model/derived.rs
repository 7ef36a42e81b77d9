//! Quantities derived once per flux computation
//!
//! Everything here depends on the meteorological state but not on the wind
//! realization: saturation conditions, the combined transfer resistance of
//! Essery et al. (1999, eq. 6), the 10 m wind, the Laplace wind spread, and
//! the vegetation and bare-soil parameters.
//!
//! # Scientific References
//!
//! - Liston, G.E., Sturm, M. (1998). "A snow-transport model for complex terrain"
//!   Journal of Glaciology, 44(148), 498-516, Appendix A
//! - Essery, R., Li, L., Pomeroy, J. (1999). "A distributed model of blowing snow
//!   over complex terrain". Hydrological Processes, 13, 2423-2438
//! - Raupach, M.R. (1992). "Drag and drag partition on rough surfaces"
//!   Boundary-Layer Meteorology, 60, 375-395

use crate::config::{BlowingSnowConfig, FluxModel};
use crate::core_types::{MeteorologicalState, WIND_REFERENCE_HEIGHT};
use crate::error::{BlowingSnowError, Result};
use crate::physics::SaturationVaporPressure;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Fetch assumed over bare soil (m)
pub const BARE_SOIL_FETCH: f64 = 1500.0;

/// Terrain slope standard deviation assumed over bare soil
pub const BARE_SOIL_SIGMA_SLOPE: f64 = 0.0002;

/// Wind spread substituted when the computed one is implausible (m/s)
pub const FALLBACK_WIND_SPREAD: f64 = 0.22;

/// Largest plausible magnitude of the wind spread (m/s)
const MAX_WIND_SPREAD: f64 = 10.0;

/// Specific gas constant of dry air (J/(kg·K))
const DRY_AIR_GAS_CONSTANT: f64 = 287.0;

/// Ratio of molecular weights of water vapor and dry air
const MOLECULAR_WEIGHT_RATIO: f64 = 0.622;

/// Drag coefficient ratio of vegetation elements to the surface (Raupach 1992)
const VEGETATION_DRAG_RATIO: f64 = 680.0;

/// Realization-independent quantities for one flux computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedQuantities {
    /// Saturation vapor pressure at air temperature (Pa)
    pub saturation_vapor_pressure: f64,
    /// Air temperature (K)
    pub air_temperature_kelvin: f64,
    /// Saturation density of water vapor (kg/m³)
    pub saturation_vapor_density: f64,
    /// Diffusivity of water vapor in air (m²/s)
    pub diffusivity: f64,
    /// Combined heat and vapor transfer resistance F (m·s/kg)
    pub resistance: f64,
    /// Cell-mean 10 m wind speed (m/s)
    pub wind_10m: f64,
    /// Ratio of wind spread to mean wind
    pub spread_ratio: f64,
    /// Laplace scale of the sub-grid wind distribution σw (m/s)
    pub wind_spread: f64,
    /// Vegetation height (m)
    pub vegetation_height: f64,
    /// Vegetation element density factor
    pub vegetation_density: f64,
    /// Effective upwind fetch (m)
    pub fetch: f64,
    /// Effective terrain slope standard deviation
    pub sigma_slope: f64,
    /// Age of the snow surface (hours)
    pub snow_age_hours: f64,
}

impl DerivedQuantities {
    /// Derive the realization-independent quantities of `state`
    ///
    /// # Errors
    ///
    /// Returns [`BlowingSnowError::InvalidInput`] when the saturation vapor
    /// pressure is not finite and positive, or when the fetch correction of
    /// the full model applies to a non-positive fetch.
    pub fn compute<V>(
        state: &MeteorologicalState,
        config: &BlowingSnowConfig,
        vapor_pressure: &V,
    ) -> Result<Self>
    where
        V: SaturationVaporPressure + ?Sized,
    {
        let constants = &config.constants;
        let transport = &config.transport;

        let es = vapor_pressure.saturation_vapor_pressure(state.air_temperature);
        if !es.is_finite() || es <= 0.0 {
            return Err(BlowingSnowError::InvalidInput(format!(
                "saturation vapor pressure must be finite and positive, got {es} at {} °C",
                state.air_temperature
            )));
        }

        let tk = state.air_temperature + constants.kelvin_offset;
        let saturation_vapor_density = MOLECULAR_WEIGHT_RATIO * es / (DRY_AIR_GAS_CONSTANT * tk);

        // Liston & Sturm (1998) eq. A-7
        let diffusivity = 2.06e-5 * (tk / 273.0).powf(1.75);

        // Essery et al. (1999) eq. 6
        let ls = state.latent_heat_sublimation;
        let resistance = (ls / (transport.air_thermal_conductivity * tk))
            * (ls * constants.water_molecular_weight / (constants.gas_constant * tk) - 1.0)
            + 1.0 / (diffusivity * saturation_vapor_density);

        let z0 = state.snow_roughness();
        let wind_10m = state.wind_speed * (10.0 / z0).ln()
            / ((WIND_REFERENCE_HEIGHT + z0) / z0).ln();

        let (fetch, sigma_slope) = if state.is_bare_soil() {
            (BARE_SOIL_FETCH, BARE_SOIL_SIGMA_SLOPE)
        } else {
            (state.fetch, state.sigma_slope)
        };

        if config.flux_model == FluxModel::Full && config.fetch_correction && fetch <= 0.0 {
            return Err(BlowingSnowError::InvalidInput(format!(
                "fetch must be positive when the fetch correction is enabled, got {fetch}"
            )));
        }

        let spread_ratio = (2.4 - (0.4 / 0.9) * state.lag_one) * sigma_slope;
        let mut wind_spread = wind_10m * spread_ratio;
        if wind_spread.abs() > MAX_WIND_SPREAD {
            warn!(
                "Implausible wind spread σw = {} (U10 = {}, U2 = {}, lag-one = {}, σslope = {}); using {}",
                wind_spread,
                wind_10m,
                state.wind_speed,
                state.lag_one,
                sigma_slope,
                FALLBACK_WIND_SPREAD
            );
            wind_spread = FALLBACK_WIND_SPREAD;
        }

        let vegetation_height = 1.5 * state.displacement_height;
        let vegetation_density = if state.displacement_height == 0.0 {
            0.0
        } else {
            (4.0 / 3.0) * (state.vegetation_roughness / state.displacement_height)
        };

        Ok(Self {
            saturation_vapor_pressure: es,
            air_temperature_kelvin: tk,
            saturation_vapor_density,
            diffusivity,
            resistance,
            wind_10m,
            spread_ratio,
            wind_spread,
            vegetation_height,
            vegetation_density,
            fetch,
            sigma_slope,
            snow_age_hours: state.snow_age_hours(),
        })
    }

    /// Wind felt by the snow surface once vegetation sticks out of the pack
    ///
    /// See [`vegetation_adjusted_wind`].
    pub fn vegetation_adjusted_wind(&self, wind_speed: f64, snow_depth: f64) -> f64 {
        vegetation_adjusted_wind(
            wind_speed,
            snow_depth,
            self.vegetation_height,
            self.vegetation_density,
        )
    }
}

/// Reduce `wind_speed` for vegetation protruding above the snow
///
/// Raupach (1992) drag partition: exposed stems of height `hv - depth`
/// absorb part of the momentum flux.
///
/// # Arguments
/// * `wind_speed` - 10 m wind speed (m/s)
/// * `snow_depth` - Snow depth (m)
/// * `vegetation_height` - Vegetation height hv (m)
/// * `vegetation_density` - Element density factor Nd
///
/// # Returns
/// Wind speed acting on the snow surface (m/s)
pub fn vegetation_adjusted_wind(
    wind_speed: f64,
    snow_depth: f64,
    vegetation_height: f64,
    vegetation_density: f64,
) -> f64 {
    if snow_depth < vegetation_height {
        let exposed = vegetation_height - snow_depth;
        wind_speed / (1.0 + VEGETATION_DRAG_RATIO * vegetation_density * exposed).sqrt()
    } else {
        wind_speed
    }
}
