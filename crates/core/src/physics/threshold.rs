//! Threshold shear velocity for snow transport
//!
//! Below the threshold shear velocity no snow leaves the surface. The
//! variable formulation converts the Li & Pomeroy threshold 10 m wind speed
//! into a shear velocity through the log profile. When the surface is already
//! likely to be blowing but the actual shear falls short of that threshold,
//! the threshold is relaxed to half a metre per second below the current wind.
//!
//! # Scientific References
//!
//! - Li, L., Pomeroy, J.W. (1997). "Estimates of threshold wind speeds for snow
//!   transport using meteorological data". Journal of Applied Meteorology, 36, 205-213
//! - Liston, G.E., Sturm, M. (1998). "A snow-transport model for complex terrain"
//!   Journal of Glaciology, 44(148), 498-516

use super::occurrence::SnowRegime;
use crate::config::{PhysicalConstants, ThresholdModel, TransportParameters};

/// Occurrence probability above which the threshold may be relaxed
const RELAXATION_PROBABILITY: f64 = 0.001;

/// Wind speed offset (m/s) applied when relaxing the threshold
const RELAXATION_OFFSET: f64 = 0.5;

/// State needed to evaluate the threshold for one wind realization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdInputs {
    /// Air temperature (°C)
    pub air_temperature: f64,
    /// Liquid water in the surface layer (m)
    pub surface_liquid_water: f64,
    /// Representative 10 m wind speed (m/s)
    pub wind_10m: f64,
    /// Roughness length used in the log profile (m)
    pub roughness: f64,
    /// Probability of blowing-snow occurrence
    pub occurrence_probability: f64,
    /// Actual shear velocity (m/s)
    pub shear_velocity: f64,
}

/// Threshold 10 m wind speed (m/s) after Li & Pomeroy (1997)
#[inline]
pub fn threshold_wind_speed(regime: SnowRegime, air_temperature: f64) -> f64 {
    match regime {
        SnowRegime::Dry => {
            9.43 + 0.18 * air_temperature + 0.0033 * air_temperature * air_temperature
        }
        SnowRegime::Wet => 9.9,
    }
}

/// Threshold shear velocity (m/s)
///
/// # Arguments
/// * `model` - Variable or constant threshold
/// * `inputs` - Realization state
/// * `transport` - Supplies the constant threshold
/// * `constants` - Supplies the von Kármán constant
pub fn threshold_shear_velocity(
    model: ThresholdModel,
    inputs: &ThresholdInputs,
    transport: &TransportParameters,
    constants: &PhysicalConstants,
) -> f64 {
    match model {
        ThresholdModel::Constant => transport.constant_threshold_shear,
        ThresholdModel::Variable => {
            let regime = SnowRegime::from_liquid_water(inputs.surface_liquid_water);
            let log_height = (10.0 / inputs.roughness).ln();
            let ut10 = threshold_wind_speed(regime, inputs.air_temperature);
            let threshold = constants.von_karman * ut10 / log_height;

            if inputs.shear_velocity < threshold
                && inputs.occurrence_probability > RELAXATION_PROBABILITY
            {
                constants.von_karman * (inputs.wind_10m - RELAXATION_OFFSET) / log_height
            } else {
                threshold
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn inputs() -> ThresholdInputs {
        ThresholdInputs {
            air_temperature: -10.0,
            surface_liquid_water: 0.0,
            wind_10m: 8.0,
            roughness: 1e-4,
            occurrence_probability: 0.0,
            shear_velocity: 1.0,
        }
    }

    #[test]
    fn test_dry_threshold_wind() {
        // 9.43 - 1.8 + 0.33
        assert_relative_eq!(
            threshold_wind_speed(SnowRegime::Dry, -10.0),
            7.96,
            max_relative = 1e-12
        );
        assert_eq!(threshold_wind_speed(SnowRegime::Wet, -10.0), 9.9);
    }

    #[test]
    fn test_constant_threshold() {
        let u = threshold_shear_velocity(
            ThresholdModel::Constant,
            &inputs(),
            &TransportParameters::default(),
            &PhysicalConstants::default(),
        );
        assert_eq!(u, 0.25);
    }

    #[test]
    fn test_variable_threshold_from_log_profile() {
        let u = threshold_shear_velocity(
            ThresholdModel::Variable,
            &inputs(),
            &TransportParameters::default(),
            &PhysicalConstants::default(),
        );
        assert_relative_eq!(u, 0.4 * 7.96 / (1e5_f64).ln(), max_relative = 1e-12);
    }

    #[test]
    fn test_relaxed_when_blowing_is_likely() {
        let weak = ThresholdInputs {
            shear_velocity: 0.1,
            occurrence_probability: 0.5,
            ..inputs()
        };
        let u = threshold_shear_velocity(
            ThresholdModel::Variable,
            &weak,
            &TransportParameters::default(),
            &PhysicalConstants::default(),
        );
        assert_relative_eq!(u, 0.4 * 7.5 / (1e5_f64).ln(), max_relative = 1e-12);
    }

    #[test]
    fn test_not_relaxed_when_blowing_is_unlikely() {
        let weak = ThresholdInputs {
            shear_velocity: 0.1,
            occurrence_probability: 0.0005,
            ..inputs()
        };
        let u = threshold_shear_velocity(
            ThresholdModel::Variable,
            &weak,
            &TransportParameters::default(),
            &PhysicalConstants::default(),
        );
        assert_relative_eq!(u, 0.4 * 7.96 / (1e5_f64).ln(), max_relative = 1e-12);
    }
}
