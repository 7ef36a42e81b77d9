//! C ABI for the blowing-snow sublimation kernel
//!
//! A host land-surface model fills a [`BlowingSnowInputs`] per grid cell and
//! calls [`blowing_snow_flux`] once per time step. Every call returns a
//! [`BlowingSnowErrorCode`]; on failure the message is available from
//! [`blowing_snow_last_error`] on the same thread.
//!
//! ```c
//! BlowingSnowInputs cell = { /* ... */ };
//! BlowingSnowOptions options = blowing_snow_default_options();
//! options.wind_bins = 20;
//!
//! double flux = 0.0;
//! if (blowing_snow_flux(&cell, &options, &flux) != Ok) {
//!     fprintf(stderr, "%s\n", blowing_snow_last_error());
//! }
//! ```

mod error;
mod helpers;

pub use error::{blowing_snow_last_error, blowing_snow_last_error_code, BlowingSnowErrorCode};

use blowing_snow_core::{
    calc_blowing_snow, BlowingSnowConfig, FluxModel, MeteorologicalState, OccurrenceModel,
    ThresholdModel, WindDistribution,
};
use error::BoundaryError;
use helpers::{clear_last_error, track_error};

// ============================================================================
// C-COMPATIBLE INPUT TYPES
// ============================================================================

/// Meteorological and snowpack state of one grid cell for one time step.
///
/// Field meanings and units match `MeteorologicalState` in the core crate.
/// Integer fields are signed for C convenience and must be non-negative.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlowingSnowInputs {
    /// Time step length (hours)
    pub time_step_hours: f64,
    /// Air temperature (°C)
    pub air_temperature: f64,
    /// Number of time steps since the last snowfall
    pub steps_since_snowfall: i32,
    /// Liquid water in the snow surface layer (m)
    pub surface_liquid_water: f64,
    /// Wind speed 2 m above the snow surface (m/s)
    pub wind_speed: f64,
    /// Latent heat of sublimation (J/kg)
    pub latent_heat_sublimation: f64,
    /// Air density (kg/m³)
    pub air_density: f64,
    /// Air pressure (Pa)
    pub air_pressure: f64,
    /// Actual vapor pressure (Pa)
    pub vapor_pressure: f64,
    /// Roughness heights per surface band (m); index 2 is the snow surface
    pub roughness_heights: [f64; 3],
    /// Height of the humidity measurement (m)
    pub humidity_reference_height: f64,
    /// Snow depth (m)
    pub snow_depth: f64,
    /// Lag-one autocorrelation of the wind
    pub lag_one: f64,
    /// Standard deviation of terrain slope
    pub sigma_slope: f64,
    /// Snow surface temperature (°C)
    pub snow_surface_temperature: f64,
    /// Vegetation class of this tile; equal to the count for bare soil
    pub vegetation_class: i32,
    /// Number of vegetated classes in the cell
    pub vegetation_class_count: i32,
    /// Upwind fetch distance (m)
    pub fetch: f64,
    /// Vegetation displacement height (m)
    pub displacement_height: f64,
    /// Vegetation roughness length (m)
    pub vegetation_roughness: f64,
}

/// Model switches. Pass `NULL` to `blowing_snow_flux` for the defaults.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlowingSnowOptions {
    /// Two-layer saltation and suspension model; `false` selects the power law
    pub full_model: bool,
    /// Partition the wind into equiprobable bins; `false` uses the mean wind
    pub spatial_wind: bool,
    /// Temperature-dependent threshold; `false` uses a constant 0.25 m/s
    pub variable_threshold: bool,
    /// Reduce saltation transport over short fetch distances
    pub fetch_correction: bool,
    /// Compute the occurrence probability; `false` assumes blowing snow always occurs
    pub computed_occurrence: bool,
    /// Number of wind bins (at least 2)
    pub wind_bins: i32,
}

impl Default for BlowingSnowOptions {
    fn default() -> Self {
        Self::from(&BlowingSnowConfig::default())
    }
}

impl From<&BlowingSnowConfig> for BlowingSnowOptions {
    fn from(config: &BlowingSnowConfig) -> Self {
        Self {
            full_model: config.flux_model == FluxModel::Full,
            spatial_wind: config.wind_distribution == WindDistribution::Spatial,
            variable_threshold: config.threshold_model == ThresholdModel::Variable,
            fetch_correction: config.fetch_correction,
            computed_occurrence: config.occurrence_model == OccurrenceModel::Computed,
            wind_bins: i32::try_from(config.wind_bins).unwrap_or(i32::MAX),
        }
    }
}

impl BlowingSnowOptions {
    fn config(&self) -> Result<BlowingSnowConfig, BoundaryError> {
        let wind_bins = usize::try_from(self.wind_bins)
            .map_err(|_| BoundaryError::out_of_range("wind_bins", self.wind_bins))?;

        Ok(BlowingSnowConfig {
            flux_model: if self.full_model {
                FluxModel::Full
            } else {
                FluxModel::Simplified
            },
            wind_distribution: if self.spatial_wind {
                WindDistribution::Spatial
            } else {
                WindDistribution::Constant
            },
            threshold_model: if self.variable_threshold {
                ThresholdModel::Variable
            } else {
                ThresholdModel::Constant
            },
            fetch_correction: self.fetch_correction,
            occurrence_model: if self.computed_occurrence {
                OccurrenceModel::Computed
            } else {
                OccurrenceModel::AlwaysOne
            },
            wind_bins,
            ..BlowingSnowConfig::default()
        })
    }
}

impl BlowingSnowInputs {
    fn state(&self) -> Result<MeteorologicalState, BoundaryError> {
        let count = |field: &str, value: i32| {
            usize::try_from(value).map_err(|_| BoundaryError::out_of_range(field, value))
        };

        Ok(MeteorologicalState {
            time_step_hours: self.time_step_hours,
            air_temperature: self.air_temperature,
            steps_since_snowfall: u32::try_from(self.steps_since_snowfall).map_err(|_| {
                BoundaryError::out_of_range("steps_since_snowfall", self.steps_since_snowfall)
            })?,
            surface_liquid_water: self.surface_liquid_water,
            wind_speed: self.wind_speed,
            latent_heat_sublimation: self.latent_heat_sublimation,
            air_density: self.air_density,
            air_pressure: self.air_pressure,
            vapor_pressure: self.vapor_pressure,
            roughness_heights: self.roughness_heights,
            humidity_reference_height: self.humidity_reference_height,
            snow_depth: self.snow_depth,
            lag_one: self.lag_one,
            sigma_slope: self.sigma_slope,
            snow_surface_temperature: self.snow_surface_temperature,
            vegetation_class: count("vegetation_class", self.vegetation_class)?,
            vegetation_class_count: count("vegetation_class_count", self.vegetation_class_count)?,
            fetch: self.fetch,
            displacement_height: self.displacement_height,
            vegetation_roughness: self.vegetation_roughness,
        })
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Default model switches: full two-layer model, spatial wind with 10 bins,
/// variable threshold, fetch correction and computed occurrence.
#[no_mangle]
pub extern "C" fn blowing_snow_default_options() -> BlowingSnowOptions {
    BlowingSnowOptions::default()
}

/// Compute the blowing-snow sublimation flux of one grid cell
///
/// # Parameters
/// - `inputs`: Cell state for this time step
/// - `options`: Model switches, or null for the defaults
/// - `out_flux`: Receives the flux in kg/(m²·s), positive when snow sublimates
///
/// # Returns
/// - `Ok` (0) on success, with `out_flux` set
/// - `NullPointer` (1) if `inputs` or `out_flux` is null
/// - `InvalidParameter` (2) if the inputs or options are rejected
/// - `InvalidBracket` (3) or `NonConvergence` (4) if the numerics fail;
///   the host should abort the run
///
/// `out_flux` is left untouched on failure.
///
/// # Safety
/// `inputs` and `out_flux` must be valid, non-null, aligned pointers;
/// `options` must be either null or valid.
#[no_mangle]
pub unsafe extern "C" fn blowing_snow_flux(
    inputs: *const BlowingSnowInputs,
    options: *const BlowingSnowOptions,
    out_flux: *mut f64,
) -> BlowingSnowErrorCode {
    if inputs.is_null() {
        return track_error(&BoundaryError::null_pointer("inputs"));
    }
    if out_flux.is_null() {
        return track_error(&BoundaryError::null_pointer("out_flux"));
    }

    let config = if options.is_null() {
        BlowingSnowConfig::default()
    } else {
        match (*options).config() {
            Ok(config) => config,
            Err(e) => return track_error(&e),
        }
    };
    let state = match (*inputs).state() {
        Ok(state) => state,
        Err(e) => return track_error(&e),
    };

    match calc_blowing_snow(&state, &config) {
        Ok(flux) => {
            *out_flux = flux;
            clear_last_error();
            BlowingSnowErrorCode::Ok
        }
        Err(e) => track_error(&e),
    }
}
