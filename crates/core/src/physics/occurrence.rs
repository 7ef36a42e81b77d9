//! Probability of blowing-snow occurrence
//!
//! Li & Pomeroy fitted a cumulative normal (approximated by a logistic curve)
//! to observed blowing-snow events on the Canadian prairies. Dry snow becomes
//! mobile at lower wind speeds, and the mean threshold rises as the surface
//! ages and bonds. Wet snow needs much stronger wind.
//!
//! # Scientific References
//!
//! - Li, L., Pomeroy, J.W. (1997). "Probability of occurrence of blowing snow"
//!   Journal of Geophysical Research, 102(D18), 21955-21964

use crate::config::OccurrenceModel;
use std::f64::consts::PI;

/// Surface liquid water content (m) below which snow counts as dry
pub const DRY_SNOW_LIQUID_WATER: f64 = 0.001;

/// Moisture regime of the snow surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnowRegime {
    /// Surface liquid water below [`DRY_SNOW_LIQUID_WATER`]
    Dry,
    /// Wet or melting surface
    Wet,
}

impl SnowRegime {
    /// Classify a surface by its liquid water content (m)
    #[must_use]
    pub fn from_liquid_water(surface_liquid_water: f64) -> Self {
        if surface_liquid_water < DRY_SNOW_LIQUID_WATER {
            Self::Dry
        } else {
            Self::Wet
        }
    }
}

/// Probability that blowing snow occurs at a given 10 m wind speed
///
/// Non-positive snow age is treated as a freshly fallen surface: the age term
/// diverges to −∞ and any wind above the regime minimum gives probability 1.
///
/// # Arguments
/// * `model` - Computed or unit probability
/// * `air_temperature` - Air temperature (°C)
/// * `snow_age_hours` - Time since last snowfall (hours)
/// * `surface_liquid_water` - Liquid water in the surface layer (m)
/// * `wind_speed` - Vegetation-adjusted 10 m wind speed (m/s)
///
/// # Returns
/// Probability in `[0, 1]`
pub fn occurrence_probability(
    model: OccurrenceModel,
    air_temperature: f64,
    snow_age_hours: f64,
    surface_liquid_water: f64,
    wind_speed: f64,
) -> f64 {
    if model == OccurrenceModel::AlwaysOne {
        return 1.0;
    }

    let t = air_temperature;
    let (mean, sigma, minimum_wind) = match SnowRegime::from_liquid_water(surface_liquid_water) {
        SnowRegime::Dry => (
            11.2 + 0.365 * t + 0.00706 * t * t + 0.9 * snow_age_hours.max(0.0).ln(),
            4.3 + 0.145 * t + 0.00196 * t * t,
            3.0,
        ),
        SnowRegime::Wet => (21.0, 7.0, 7.0),
    };

    if wind_speed <= minimum_wind {
        return 0.0;
    }

    let probability = 1.0 / (1.0 + (PI.sqrt() * (mean - wind_speed) / sigma).exp());
    probability.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_regime_boundary() {
        assert_eq!(SnowRegime::from_liquid_water(0.0), SnowRegime::Dry);
        assert_eq!(SnowRegime::from_liquid_water(0.000_999), SnowRegime::Dry);
        assert_eq!(SnowRegime::from_liquid_water(0.001), SnowRegime::Wet);
    }

    #[test]
    fn test_calm_dry_snow_does_not_blow() {
        let p = occurrence_probability(OccurrenceModel::Computed, -10.0, 24.0, 0.0, 3.0);
        assert_eq!(p, 0.0);
    }

    #[test]
    fn test_wet_snow_needs_seven_metres_per_second() {
        assert_eq!(
            occurrence_probability(OccurrenceModel::Computed, 0.0, 24.0, 0.01, 7.0),
            0.0
        );
        // At the wet-regime mean the logistic is exactly one half
        assert_relative_eq!(
            occurrence_probability(OccurrenceModel::Computed, 0.0, 24.0, 0.01, 21.0),
            0.5
        );
    }

    #[test]
    fn test_dry_probability_at_mean_is_half() {
        let t: f64 = -10.0;
        let age: f64 = 24.0;
        let mean = 11.2 + 0.365 * t + 0.00706 * t * t + 0.9 * age.ln();
        let p = occurrence_probability(OccurrenceModel::Computed, t, age, 0.0, mean);
        assert_relative_eq!(p, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_older_snow_is_harder_to_mobilize() {
        let fresh = occurrence_probability(OccurrenceModel::Computed, -10.0, 1.0, 0.0, 10.0);
        let aged = occurrence_probability(OccurrenceModel::Computed, -10.0, 240.0, 0.0, 10.0);
        assert!(fresh > aged);
    }

    #[test]
    fn test_zero_age_is_fresh_surface() {
        let p = occurrence_probability(OccurrenceModel::Computed, -10.0, 0.0, 0.0, 5.0);
        assert_eq!(p, 1.0);
        let negative = occurrence_probability(OccurrenceModel::Computed, -10.0, -3.0, 0.0, 5.0);
        assert_eq!(negative, 1.0);
    }

    #[test]
    fn test_disabled_model_always_occurs() {
        assert_eq!(
            occurrence_probability(OccurrenceModel::AlwaysOne, -10.0, 24.0, 0.0, 0.0),
            1.0
        );
    }
}
