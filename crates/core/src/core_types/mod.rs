//! Core input types

pub mod meteorology;

pub use meteorology::{MeteorologicalState, SNOW_ROUGHNESS_INDEX, WIND_REFERENCE_HEIGHT};
