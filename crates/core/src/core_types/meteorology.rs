//! Per-invocation meteorological and snowpack state
//!
//! One [`MeteorologicalState`] carries everything the host energy-balance model
//! knows about a grid cell for a single sub-step. It is read-only for the
//! duration of a flux computation.

use crate::error::{BlowingSnowError, Result};
use serde::{Deserialize, Serialize};

/// Position of the snow surface in the per-band roughness array
pub const SNOW_ROUGHNESS_INDEX: usize = 2;

/// Height above the snow surface at which `wind_speed` is measured (m)
pub const WIND_REFERENCE_HEIGHT: f64 = 2.0;

/// Meteorological forcing and snowpack state for one flux computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeteorologicalState {
    /// Model time step (hours)
    pub time_step_hours: f64,
    /// Air temperature (°C)
    pub air_temperature: f64,
    /// Number of time steps since the last snowfall
    pub steps_since_snowfall: u32,
    /// Liquid water in the surface snow layer (m)
    pub surface_liquid_water: f64,
    /// Wind speed 2 m above the snow surface (m/s)
    pub wind_speed: f64,
    /// Latent heat of sublimation (J/kg)
    pub latent_heat_sublimation: f64,
    /// Density of air (kg/m³)
    pub air_density: f64,
    /// Air pressure (Pa). Carried for the host model; the flux does not depend on it.
    pub air_pressure: f64,
    /// Actual vapor pressure of air (Pa)
    pub vapor_pressure: f64,
    /// Roughness heights per surface band (m); the snow band sits at [`SNOW_ROUGHNESS_INDEX`]
    pub roughness_heights: [f64; 3],
    /// Reference height of the humidity measurement (m)
    pub humidity_reference_height: f64,
    /// Snow depth (m)
    pub snow_depth: f64,
    /// Lag-one autocorrelation of terrain slope
    pub lag_one: f64,
    /// Standard deviation of terrain slope
    pub sigma_slope: f64,
    /// Snow surface temperature (°C). Carried for the host model.
    pub snow_surface_temperature: f64,
    /// Vegetation class of this tile
    pub vegetation_class: usize,
    /// Number of vegetated classes; `vegetation_class == vegetation_class_count` marks bare soil
    pub vegetation_class_count: usize,
    /// Upwind fetch distance (m)
    pub fetch: f64,
    /// Vegetation displacement height (m)
    pub displacement_height: f64,
    /// Vegetation roughness length (m)
    pub vegetation_roughness: f64,
}

impl Default for MeteorologicalState {
    /// Cold, dry, sub-saturated conditions over a low-vegetation snowfield.
    fn default() -> Self {
        Self {
            time_step_hours: 1.0,
            air_temperature: -10.0,
            steps_since_snowfall: 24,
            surface_liquid_water: 0.0,
            wind_speed: 8.0,
            latent_heat_sublimation: 2.838e6,
            air_density: 1.3,
            air_pressure: 101_325.0,
            vapor_pressure: 180.0,
            roughness_heights: [0.001, 0.001, 0.0001],
            humidity_reference_height: 2.0,
            snow_depth: 0.5,
            lag_one: 0.9,
            sigma_slope: 0.01,
            snow_surface_temperature: -12.0,
            vegetation_class: 0,
            vegetation_class_count: 1,
            fetch: 1000.0,
            displacement_height: 0.1,
            vegetation_roughness: 0.01,
        }
    }
}

impl MeteorologicalState {
    /// Roughness height of the snow surface (m)
    #[inline]
    pub fn snow_roughness(&self) -> f64 {
        self.roughness_heights[SNOW_ROUGHNESS_INDEX]
    }

    /// Whether this tile is the bare-soil class
    #[inline]
    pub fn is_bare_soil(&self) -> bool {
        self.vegetation_class == self.vegetation_class_count
    }

    /// Age of the snow surface (hours)
    #[inline]
    pub fn snow_age_hours(&self) -> f64 {
        f64::from(self.steps_since_snowfall) * self.time_step_hours
    }

    /// Reject states the kernel cannot evaluate.
    ///
    /// # Errors
    ///
    /// Returns [`BlowingSnowError::InvalidInput`] for non-finite fields, a
    /// non-positive snow roughness or humidity reference height, or a negative
    /// time step.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("time_step_hours", self.time_step_hours),
            ("air_temperature", self.air_temperature),
            ("surface_liquid_water", self.surface_liquid_water),
            ("wind_speed", self.wind_speed),
            ("latent_heat_sublimation", self.latent_heat_sublimation),
            ("air_density", self.air_density),
            ("air_pressure", self.air_pressure),
            ("vapor_pressure", self.vapor_pressure),
            ("humidity_reference_height", self.humidity_reference_height),
            ("snow_depth", self.snow_depth),
            ("lag_one", self.lag_one),
            ("sigma_slope", self.sigma_slope),
            ("snow_surface_temperature", self.snow_surface_temperature),
            ("fetch", self.fetch),
            ("displacement_height", self.displacement_height),
            ("vegetation_roughness", self.vegetation_roughness),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(BlowingSnowError::InvalidInput(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        for (band, value) in self.roughness_heights.iter().enumerate() {
            if !value.is_finite() {
                return Err(BlowingSnowError::InvalidInput(format!(
                    "roughness_heights[{band}] must be finite, got {value}"
                )));
            }
        }

        if self.snow_roughness() <= 0.0 {
            return Err(BlowingSnowError::InvalidInput(format!(
                "snow roughness must be positive, got {}",
                self.snow_roughness()
            )));
        }
        if self.humidity_reference_height <= 0.0 {
            return Err(BlowingSnowError::InvalidInput(format!(
                "humidity_reference_height must be positive, got {}",
                self.humidity_reference_height
            )));
        }
        if self.time_step_hours < 0.0 {
            return Err(BlowingSnowError::InvalidInput(format!(
                "time_step_hours must be non-negative, got {}",
                self.time_step_hours
            )));
        }
        Ok(())
    }
}
