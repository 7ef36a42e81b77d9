//! Saturation vapor pressure
//!
//! The host model usually owns its own saturation curve, so the kernel only
//! depends on the [`SaturationVaporPressure`] trait. [`TetensVaporPressure`]
//! is provided for stand-alone use; any `Fn(f64) -> f64` also qualifies.
//!
//! # References
//! - Tetens, O. (1930). "Über einige meteorologische Begriffe"
//!   Zeitschrift für Geophysik, 6, 297-309
//! - Murray, F.W. (1967). "On the computation of saturation vapor pressure"
//!   Journal of Applied Meteorology, 6(1), 203-204

/// Saturation vapor pressure as a function of air temperature
pub trait SaturationVaporPressure {
    /// Saturation vapor pressure (Pa) at `air_temperature` (°C)
    fn saturation_vapor_pressure(&self, air_temperature: f64) -> f64;
}

impl<F> SaturationVaporPressure for F
where
    F: Fn(f64) -> f64,
{
    fn saturation_vapor_pressure(&self, air_temperature: f64) -> f64 {
        self(air_temperature)
    }
}

/// Tetens formula over water with a polynomial correction below freezing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TetensVaporPressure;

impl SaturationVaporPressure for TetensVaporPressure {
    fn saturation_vapor_pressure(&self, air_temperature: f64) -> f64 {
        const A: f64 = 610.78; // Pa
        const B: f64 = 17.269;
        const C: f64 = 237.3; // °C

        let t = air_temperature;
        let mut es = A * ((B * t) / (C + t)).exp();

        // Depression of the saturation curve over ice
        if t < 0.0 {
            es *= 1.0 + 0.00972 * t + 0.000042 * t * t;
        }
        es
    }
}
