//! Blowing-snow sublimation for one grid cell and time step
//!
//! [`BlowingSnowModel`] ties the physics together:
//! 1. Derive the realization-independent quantities ([`DerivedQuantities`])
//! 2. Partition the sub-grid wind distribution, or use the mean wind alone
//! 3. Per realization: occurrence probability, shear velocity, threshold,
//!    and the sublimation flux when snow is transported into sub-saturated air
//! 4. Weight the realizations by probability and occurrence, then apply the
//!    flux floor
//!
//! The computation is a pure function of the state and configuration. A
//! model value can be shared across threads and evaluated concurrently;
//! [`BlowingSnowModel::calculate_batch`] does so with rayon.

pub mod derived;
pub mod report;

pub use derived::{vegetation_adjusted_wind, DerivedQuantities};
pub use report::{FluxReport, RealizationReport};

use crate::config::{BlowingSnowConfig, WindDistribution};
use crate::core_types::MeteorologicalState;
use crate::error::Result;
use crate::physics::{
    occurrence_probability, shear_stress, sublimation_flux, threshold_shear_velocity, wind_bins,
    FluxInputs, SaturationVaporPressure, TetensVaporPressure, ThresholdInputs,
};
use crate::solver::NewtonRaphson;
use rayon::prelude::*;
use tracing::debug;

/// Configured blowing-snow sublimation model
///
/// `V` supplies the saturation vapor pressure; the Tetens curve is the default.
#[derive(Debug, Clone)]
pub struct BlowingSnowModel<V = TetensVaporPressure> {
    config: BlowingSnowConfig,
    vapor_pressure: V,
    solver: NewtonRaphson,
}

impl BlowingSnowModel {
    /// Create a model using the Tetens saturation vapor pressure
    ///
    /// # Errors
    ///
    /// Returns [`crate::BlowingSnowError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: BlowingSnowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            solver: config.root_solver.into(),
            config,
            vapor_pressure: TetensVaporPressure,
        })
    }
}

impl<V: SaturationVaporPressure> BlowingSnowModel<V> {
    /// Replace the saturation vapor pressure source
    pub fn with_vapor_pressure<W: SaturationVaporPressure>(
        self,
        vapor_pressure: W,
    ) -> BlowingSnowModel<W> {
        BlowingSnowModel {
            config: self.config,
            vapor_pressure,
            solver: self.solver,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &BlowingSnowConfig {
        &self.config
    }

    /// Sublimation flux from blowing snow (kg/(m²·s)), positive for mass loss
    ///
    /// A cell without snow returns zero before its state is validated.
    ///
    /// # Errors
    ///
    /// - [`crate::BlowingSnowError::InvalidInput`] for a state that fails validation
    /// - [`crate::BlowingSnowError::InvalidBracket`] or
    ///   [`crate::BlowingSnowError::RootNotConverged`] from the shear solve
    /// - [`crate::BlowingSnowError::IntegrationNotConverged`] from the suspension integral
    pub fn calculate(&self, state: &MeteorologicalState) -> Result<f64> {
        let (flux, _) = self.evaluate(state, |_| {})?;
        Ok(flux)
    }

    /// Flux together with the per-realization breakdown
    ///
    /// # Errors
    ///
    /// Fails exactly when [`Self::calculate`] fails.
    pub fn report(&self, state: &MeteorologicalState) -> Result<FluxReport> {
        let mut realizations = Vec::with_capacity(self.config.wind_bins);
        let (flux, derived) = self.evaluate(state, |r| realizations.push(r))?;

        let Some(derived) = derived else {
            return Ok(FluxReport::snow_free());
        };
        let unclamped_flux = realizations.iter().map(|r| r.contribution).sum();

        Ok(FluxReport {
            flux,
            unclamped_flux,
            derived: Some(derived),
            realizations,
        })
    }

    fn evaluate<R>(
        &self,
        state: &MeteorologicalState,
        mut on_realization: R,
    ) -> Result<(f64, Option<DerivedQuantities>)>
    where
        R: FnMut(RealizationReport),
    {
        if state.snow_depth <= 0.0 {
            return Ok((0.0, None));
        }
        state.validate()?;
        let derived = DerivedQuantities::compute(state, &self.config, &self.vapor_pressure)?;

        let mut total = 0.0;
        let mut accumulate = |wind_speed: f64, weight: f64| -> Result<()> {
            let realization = self.realization(state, &derived, wind_speed, weight)?;
            total += realization.contribution;
            on_realization(realization);
            Ok(())
        };

        if self.config.wind_distribution == WindDistribution::Spatial
            && derived.wind_spread != 0.0
        {
            for bin in wind_bins(self.config.wind_bins, derived.wind_10m, derived.wind_spread) {
                accumulate(bin.wind_speed, bin.probability)?;
            }
        } else {
            accumulate(derived.wind_10m, 1.0)?;
        }

        Ok((total.max(self.config.transport.flux_floor), Some(derived)))
    }

    fn realization(
        &self,
        state: &MeteorologicalState,
        derived: &DerivedQuantities,
        wind_speed: f64,
        weight: f64,
    ) -> Result<RealizationReport> {
        let config = &self.config;
        let surface_wind = derived.vegetation_adjusted_wind(wind_speed, state.snow_depth);
        let occurrence = occurrence_probability(
            config.occurrence_model,
            state.air_temperature,
            derived.snow_age_hours,
            state.surface_liquid_water,
            surface_wind,
        );

        let mut report = RealizationReport {
            wind_speed,
            weight,
            surface_wind,
            occurrence_probability: occurrence,
            shear: None,
            threshold_shear: None,
            flux: 0.0,
            contribution: 0.0,
        };
        if occurrence == 0.0 {
            debug!(wind_speed, surface_wind, "No blowing snow");
            return Ok(report);
        }

        let shear = shear_stress(
            wind_speed,
            state.snow_roughness(),
            &self.solver,
            &config.constants,
        )?;

        // The ambient snow roughness, not the saltation roughness, sets the threshold
        let threshold = threshold_shear_velocity(
            config.threshold_model,
            &ThresholdInputs {
                air_temperature: state.air_temperature,
                surface_liquid_water: state.surface_liquid_water,
                wind_10m: wind_speed,
                roughness: state.snow_roughness(),
                occurrence_probability: occurrence,
                shear_velocity: shear.shear_velocity,
            },
            &config.transport,
            &config.constants,
        );

        // A calm realization has no shear to transport snow, whatever the threshold
        let flux = if shear.shear_velocity > 0.0
            && shear.shear_velocity > threshold
            && state.vapor_pressure < derived.saturation_vapor_pressure
        {
            sublimation_flux(
                &FluxInputs {
                    vapor_pressure: state.vapor_pressure,
                    saturation_vapor_pressure: derived.saturation_vapor_pressure,
                    humidity_reference_height: state.humidity_reference_height,
                    air_density: state.air_density,
                    threshold_shear: threshold,
                    shear_velocity: shear.shear_velocity,
                    fetch: derived.fetch,
                    wind_10m: wind_speed,
                    resistance: derived.resistance,
                },
                config,
            )?
        } else {
            0.0
        };

        report.shear = Some(shear);
        report.threshold_shear = Some(threshold);
        report.flux = flux;
        report.contribution = weight * flux * occurrence;

        debug!(
            wind_speed,
            occurrence,
            shear_velocity = shear.shear_velocity,
            threshold,
            flux,
            "Blowing-snow realization"
        );
        Ok(report)
    }
}

impl<V: SaturationVaporPressure + Sync> BlowingSnowModel<V> {
    /// Evaluate many independent cells in parallel
    ///
    /// The result at index `i` is exactly `self.calculate(&states[i])`.
    pub fn calculate_batch(&self, states: &[MeteorologicalState]) -> Vec<Result<f64>> {
        states.par_iter().map(|state| self.calculate(state)).collect()
    }
}

/// Sublimation flux from blowing snow with the Tetens vapor pressure
///
/// # Errors
///
/// Configuration errors and every error of [`BlowingSnowModel::calculate`].
pub fn calc_blowing_snow(state: &MeteorologicalState, config: &BlowingSnowConfig) -> Result<f64> {
    BlowingSnowModel::new(config.clone())?.calculate(state)
}

/// Evaluate many independent cells in parallel with the Tetens vapor pressure
///
/// An invalid configuration yields its error for every cell.
pub fn calc_blowing_snow_batch(
    states: &[MeteorologicalState],
    config: &BlowingSnowConfig,
) -> Vec<Result<f64>> {
    match BlowingSnowModel::new(config.clone()) {
        Ok(model) => model.calculate_batch(states),
        Err(err) => states.iter().map(|_| Err(err.clone())).collect(),
    }
}
