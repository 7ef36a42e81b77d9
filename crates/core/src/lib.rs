//! Blowing-Snow Sublimation Core Library
//!
//! Computes the mass flux of water sublimated from wind-transported snow during
//! one time step of a land-surface energy-balance model. The host supplies the
//! meteorological and snowpack state of a grid cell; the library returns a
//! single flux in kg/(m²·s), positive when snow mass is lost to the atmosphere.
//!
//! ## Model
//!
//! - Two-layer transport after Liston & Sturm (1998): a saltation layer with a
//!   closed-form sublimation rate and a suspension layer integrated over height
//! - Simplified power law in the 10 m wind after Essery et al. (1999)
//! - Sub-grid wind variability through an equiprobable Laplace partition
//!   (Bowling et al. 2004)
//! - Occurrence probability and threshold wind after Li & Pomeroy (1997)
//!
//! ## Example
//!
//! ```rust
//! use blowing_snow_core::{BlowingSnowConfig, BlowingSnowModel, MeteorologicalState};
//!
//! let model = BlowingSnowModel::new(BlowingSnowConfig::default())?;
//! let state = MeteorologicalState {
//!     wind_speed: 12.0,
//!     ..MeteorologicalState::default()
//! };
//! let flux = model.calculate(&state)?;
//! assert!(flux >= model.config().transport.flux_floor);
//! # Ok::<(), blowing_snow_core::BlowingSnowError>(())
//! ```

// Configuration, errors and inputs
pub mod config;
pub mod core_types;
pub mod error;

// Numerical machinery
pub mod solver;

// Physical parameterizations and their composition
pub mod model;
pub mod physics;

pub use config::{
    BlowingSnowConfig, FluxModel, IntegratorSettings, OccurrenceModel, PhysicalConstants,
    RootSolverSettings, ThresholdModel, TransportParameters, WindDistribution,
};
pub use core_types::MeteorologicalState;
pub use error::{BlowingSnowError, ErrorKind, Result};
pub use model::{
    calc_blowing_snow, calc_blowing_snow_batch, BlowingSnowModel, DerivedQuantities, FluxReport,
    RealizationReport,
};
pub use physics::{SaturationVaporPressure, TetensVaporPressure, WindBin};
pub use solver::{NewtonRaphson, RombergIntegrator};
