//! Diagnostic breakdown of a flux computation

use super::derived::DerivedQuantities;
use crate::physics::ShearStress;
use serde::{Deserialize, Serialize};

/// One wind realization's share of the cell flux
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealizationReport {
    /// Representative 10 m wind speed (m/s)
    pub wind_speed: f64,
    /// Probability weight of the realization
    pub weight: f64,
    /// Wind speed after the vegetation drag partition (m/s)
    pub surface_wind: f64,
    /// Probability of blowing-snow occurrence
    pub occurrence_probability: f64,
    /// Shear solve result; `None` when blowing snow cannot occur
    pub shear: Option<ShearStress>,
    /// Threshold shear velocity (m/s); `None` when blowing snow cannot occur
    pub threshold_shear: Option<f64>,
    /// Sublimation flux while blowing snow occurs (kg/(m²·s))
    pub flux: f64,
    /// `weight × flux × occurrence_probability` (kg/(m²·s))
    pub contribution: f64,
}

impl RealizationReport {
    /// Whether snow was transported in this realization
    pub fn is_transporting(&self) -> bool {
        match (self.shear, self.threshold_shear) {
            (Some(shear), Some(threshold)) => shear.shear_velocity > threshold,
            _ => false,
        }
    }
}

/// Result of a flux computation with its intermediate quantities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluxReport {
    /// Cell flux after the floor clamp (kg/(m²·s)); equals the value of
    /// [`super::BlowingSnowModel::calculate`]
    pub flux: f64,
    /// Sum of the realization contributions before the floor clamp
    pub unclamped_flux: f64,
    /// Realization-independent quantities; `None` for a snow-free cell
    pub derived: Option<DerivedQuantities>,
    /// One entry per wind realization, in order of increasing wind speed
    pub realizations: Vec<RealizationReport>,
}

impl FluxReport {
    /// Report for a cell without snow
    pub(crate) fn snow_free() -> Self {
        Self {
            flux: 0.0,
            unclamped_flux: 0.0,
            derived: None,
            realizations: Vec::new(),
        }
    }

    /// Whether the floor clamp changed the result
    pub fn is_clamped(&self) -> bool {
        self.flux != self.unclamped_flux
    }
}
