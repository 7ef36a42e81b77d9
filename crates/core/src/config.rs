//! Model configuration
//!
//! Every tunable of the blowing-snow kernel lives in one immutable
//! [`BlowingSnowConfig`] value: the mode switches, the wind partition size, the
//! numerical budgets of the root solver and the integrator, and the physical
//! constants. Both branches of every mode switch are compiled in and selected
//! at run time.
//!
//! # Example
//!
//! ```rust
//! use blowing_snow_core::{BlowingSnowConfig, FluxModel};
//!
//! let config = BlowingSnowConfig {
//!     flux_model: FluxModel::Simplified,
//!     wind_bins: 20,
//!     ..BlowingSnowConfig::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{BlowingSnowError, Result};
use serde::{Deserialize, Serialize};

/// How the per-realization sublimation flux is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FluxModel {
    /// Saltation closed form plus integrated suspension layer (Liston & Sturm 1998)
    #[default]
    Full,
    /// Single empirical power law in 10 m wind speed (Essery et al. 1999)
    Simplified,
}

/// Treatment of sub-grid wind variability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WindDistribution {
    /// Integrate over an equiprobable partition of a Laplace wind distribution
    #[default]
    Spatial,
    /// Evaluate once at the cell mean 10 m wind speed
    Constant,
}

/// Threshold shear velocity formulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ThresholdModel {
    /// Temperature-dependent threshold after Li & Pomeroy (1997)
    #[default]
    Variable,
    /// Fixed threshold shear velocity (Liston & Sturm 1998)
    Constant,
}

/// Blowing-snow occurrence probability formulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OccurrenceModel {
    /// Logistic probability after Li & Pomeroy (1997)
    #[default]
    Computed,
    /// Blowing snow always occurs when transport is possible
    AlwaysOne,
}

/// Physical constants shared by every component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// von Kármán constant
    pub von_karman: f64,
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    /// Density of ice (kg/m³)
    pub ice_density: f64,
    /// Molecular weight of water (kg/mol)
    pub water_molecular_weight: f64,
    /// Universal gas constant (J/(mol·K))
    pub gas_constant: f64,
    /// Offset between Celsius and Kelvin
    pub kelvin_offset: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            von_karman: 0.4,
            gravity: 9.80616,
            ice_density: 917.0,
            water_molecular_weight: 18.01528e-3,
            gas_constant: 8.314,
            kelvin_offset: 273.15,
        }
    }
}

/// Empirical parameters of snow transport and particle sublimation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportParameters {
    /// Saltation transport constant (Liston & Sturm 1998, eq. 6)
    pub saltation_constant: f64,
    /// Threshold shear velocity used by [`ThresholdModel::Constant`] (m/s)
    pub constant_threshold_shear: f64,
    /// Ratio of horizontal particle velocity to threshold shear velocity
    pub particle_velocity_ratio: f64,
    /// Particle settling velocity in the suspension layer (m/s)
    pub settling_velocity: f64,
    /// Kinematic viscosity of air (m²/s)
    pub kinematic_viscosity: f64,
    /// Thermal conductivity of air (W/(m·K))
    pub air_thermal_conductivity: f64,
    /// Lower bound on the returned flux (kg/(m²·s))
    pub flux_floor: f64,
}

impl Default for TransportParameters {
    fn default() -> Self {
        Self {
            saltation_constant: 0.68,
            constant_threshold_shear: 0.25,
            particle_velocity_ratio: 2.8,
            settling_velocity: 0.3,
            kinematic_viscosity: 1.3e-5,
            air_thermal_conductivity: 0.0245187,
            flux_floor: -5.0e-5,
        }
    }
}

/// Newton-Raphson budget for the shear velocity solve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootSolverSettings {
    /// Absolute tolerance on the root step (m/s)
    pub tolerance: f64,
    /// Iteration cap before the solve is declared non-convergent
    pub max_iterations: usize,
}

impl Default for RootSolverSettings {
    fn default() -> Self {
        Self {
            tolerance: 1.0e-6,
            max_iterations: 100,
        }
    }
}

/// Romberg budget for the suspension-layer integral
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorSettings {
    /// Relative tolerance on the extrapolated integral
    pub tolerance: f64,
    /// Refinement cap before the integral is declared non-convergent
    pub max_refinements: usize,
    /// Number of trapezoid estimates fed to the extrapolation
    pub extrapolation_points: usize,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            tolerance: 1.0e-6,
            max_refinements: 100,
            extrapolation_points: 5,
        }
    }
}

/// Complete configuration of the blowing-snow kernel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlowingSnowConfig {
    /// Full two-layer model or the simplified power law
    pub flux_model: FluxModel,
    /// Spatially variable or constant wind
    pub wind_distribution: WindDistribution,
    /// Variable or constant threshold shear velocity
    pub threshold_model: ThresholdModel,
    /// Reduce saltation transport for short fetch distances
    pub fetch_correction: bool,
    /// Computed or unit occurrence probability
    pub occurrence_model: OccurrenceModel,
    /// Number of equiprobable wind bins (at least 2)
    pub wind_bins: usize,
    /// Shear velocity root solver budget
    pub root_solver: RootSolverSettings,
    /// Suspension integral budget
    pub integrator: IntegratorSettings,
    /// Empirical transport parameters
    pub transport: TransportParameters,
    /// Physical constants
    pub constants: PhysicalConstants,
}

impl Default for BlowingSnowConfig {
    fn default() -> Self {
        Self {
            flux_model: FluxModel::Full,
            wind_distribution: WindDistribution::Spatial,
            threshold_model: ThresholdModel::Variable,
            fetch_correction: true,
            occurrence_model: OccurrenceModel::Computed,
            wind_bins: 10,
            root_solver: RootSolverSettings::default(),
            integrator: IntegratorSettings::default(),
            transport: TransportParameters::default(),
            constants: PhysicalConstants::default(),
        }
    }
}

impl BlowingSnowConfig {
    /// Check that every field is usable by the kernel.
    ///
    /// # Errors
    ///
    /// Returns [`BlowingSnowError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.wind_bins < 2 {
            return Err(invalid(format!(
                "wind_bins must be at least 2, got {}",
                self.wind_bins
            )));
        }
        if self.root_solver.max_iterations == 0 {
            return Err(invalid("root_solver.max_iterations must be positive".into()));
        }
        require_positive("root_solver.tolerance", self.root_solver.tolerance)?;
        require_positive("integrator.tolerance", self.integrator.tolerance)?;
        if self.integrator.extrapolation_points < 2 {
            return Err(invalid(format!(
                "integrator.extrapolation_points must be at least 2, got {}",
                self.integrator.extrapolation_points
            )));
        }
        if self.integrator.max_refinements < self.integrator.extrapolation_points {
            return Err(invalid(format!(
                "integrator.max_refinements ({}) must be at least extrapolation_points ({})",
                self.integrator.max_refinements, self.integrator.extrapolation_points
            )));
        }

        let c = &self.constants;
        require_positive("constants.von_karman", c.von_karman)?;
        require_positive("constants.gravity", c.gravity)?;
        require_positive("constants.ice_density", c.ice_density)?;
        require_positive("constants.water_molecular_weight", c.water_molecular_weight)?;
        require_positive("constants.gas_constant", c.gas_constant)?;
        require_positive("constants.kelvin_offset", c.kelvin_offset)?;

        let t = &self.transport;
        require_positive("transport.saltation_constant", t.saltation_constant)?;
        require_positive("transport.constant_threshold_shear", t.constant_threshold_shear)?;
        require_positive("transport.particle_velocity_ratio", t.particle_velocity_ratio)?;
        require_positive("transport.settling_velocity", t.settling_velocity)?;
        require_positive("transport.kinematic_viscosity", t.kinematic_viscosity)?;
        require_positive("transport.air_thermal_conductivity", t.air_thermal_conductivity)?;
        if !t.flux_floor.is_finite() || t.flux_floor > 0.0 {
            return Err(invalid(format!(
                "transport.flux_floor must be finite and non-positive, got {}",
                t.flux_floor
            )));
        }

        Ok(())
    }

    /// Probability mass of a single wind bin
    pub fn bin_probability(&self) -> f64 {
        1.0 / self.wind_bins as f64
    }
}

fn invalid(msg: String) -> BlowingSnowError {
    BlowingSnowError::InvalidConfig(msg)
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}
