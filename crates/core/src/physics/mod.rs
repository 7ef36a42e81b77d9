//! Physical parameterizations of blowing-snow transport and sublimation
//!
//! Each module covers one process and is usable on its own; the
//! [`crate::model`] orchestrator wires them together per wind realization.

pub mod height_profile;
pub mod occurrence;
pub mod shear_stress;
pub mod sublimation_flux;
pub mod threshold;
pub mod vapor_pressure;
pub mod wind_distribution;

pub use height_profile::{ProfileMode, ProfileParameters};
pub use occurrence::{occurrence_probability, SnowRegime};
pub use shear_stress::{shear_equation, shear_stress, ShearStress};
pub use sublimation_flux::{fetch_factor, sublimation_flux, FluxInputs};
pub use threshold::{threshold_shear_velocity, ThresholdInputs};
pub use vapor_pressure::{SaturationVaporPressure, TetensVaporPressure};
pub use wind_distribution::{wind_bin, wind_bins, WindBin};
