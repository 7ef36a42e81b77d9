//! Shear velocity during saltation
//!
//! During saltation the roughness of the surface is set by the saltating
//! particles themselves (Owen's effect), so the shear velocity solves the
//! implicit log-profile relation
//!
//! ```text
//! Ur = (u*/κ) · ln(Zr / z0salt),   z0salt = 0.12 · u*² / (2g)
//! ```
//!
//! rewritten as `exp(κ·Ur/u*) = 2·g·Zr / (0.12·u*²)`. When the implied
//! saltation roughness falls below the ambient snow roughness, the plain
//! logarithmic estimate over the snow surface is used instead.
//!
//! # Scientific References
//!
//! - Owen, P.R. (1964). "Saltation of uniform grains in air"
//!   Journal of Fluid Mechanics, 20(2), 225-242
//! - Pomeroy, J.W., Gray, D.M. (1990). "Saltation of snow"
//!   Water Resources Research, 26(7), 1583-1594

use crate::config::PhysicalConstants;
use crate::error::Result;
use crate::solver::NewtonRaphson;
use serde::{Deserialize, Serialize};
use tracing::{error, trace};

/// Height of the reference wind speed used by the shear solve (m)
pub const REFERENCE_HEIGHT: f64 = 10.0;

/// Owen's coefficient relating saltation roughness to `u*²/2g`
pub const SALTATION_ROUGHNESS_COEFFICIENT: f64 = 0.12;

/// Lower end of the shear velocity bracket (m/s)
const BRACKET_LOWER: f64 = 1.0e-7;

/// Width added to the logarithmic estimate for the upper bracket end (m/s)
const BRACKET_WIDTH: f64 = 5.0;

/// Shear velocity and the roughness length it implies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShearStress {
    /// Friction (shear) velocity u* (m/s)
    pub shear_velocity: f64,
    /// Saltation roughness length z0salt (m), never below the snow roughness
    pub saltation_roughness: f64,
}

/// Residual of the saltation log-profile relation and its derivative at `x`
///
/// # Arguments
/// * `x` - Trial shear velocity (m/s)
/// * `reference_wind` - Wind speed at `reference_height` (m/s)
/// * `reference_height` - Height of the wind measurement (m)
/// * `constants` - Physical constants
///
/// # Returns
/// `(f(x), f'(x))`
pub fn shear_equation(
    x: f64,
    reference_wind: f64,
    reference_height: f64,
    constants: &PhysicalConstants,
) -> (f64, f64) {
    let a = constants.von_karman * reference_wind;
    let b = 2.0 * constants.gravity * reference_height / SALTATION_ROUGHNESS_COEFFICIENT;
    let growth = (a / x).exp();

    let f = growth - b / (x * x);
    let df = -(a / (x * x)) * growth + 2.0 * b / (x * x * x);
    (f, df)
}

/// Solve for the shear velocity and saltation roughness at a 10 m wind speed
///
/// A calm wind has no shear; it returns `u* = 0` over the ambient snow
/// roughness without invoking the solver.
///
/// # Arguments
/// * `wind_10m` - Wind speed at 10 m (m/s)
/// * `snow_roughness` - Ambient roughness length of the snow surface (m)
/// * `solver` - Root solver budget
/// * `constants` - Physical constants
///
/// # Errors
///
/// Propagates [`crate::BlowingSnowError::InvalidBracket`] and
/// [`crate::BlowingSnowError::RootNotConverged`] from the root solver.
pub fn shear_stress(
    wind_10m: f64,
    snow_roughness: f64,
    solver: &NewtonRaphson,
    constants: &PhysicalConstants,
) -> Result<ShearStress> {
    let log_estimate =
        constants.von_karman * wind_10m / (REFERENCE_HEIGHT / snow_roughness).ln();

    if wind_10m <= 0.0 {
        return Ok(ShearStress {
            shear_velocity: 0.0,
            saltation_roughness: snow_roughness,
        });
    }

    let shear_velocity = solver.solve(
        |x| shear_equation(x, wind_10m, REFERENCE_HEIGHT, constants),
        BRACKET_LOWER,
        log_estimate + BRACKET_WIDTH,
    )
    .inspect_err(|err| {
        error!(
            wind_10m,
            snow_roughness,
            log_estimate,
            "Saltation shear solve failed: {err}"
        );
    })?;
    let saltation_roughness = saltation_roughness(shear_velocity, constants);

    trace!(
        wind_10m,
        shear_velocity,
        saltation_roughness,
        log_estimate,
        "Saltation shear solve"
    );

    if saltation_roughness < snow_roughness {
        return Ok(ShearStress {
            shear_velocity: log_estimate,
            saltation_roughness: snow_roughness,
        });
    }

    Ok(ShearStress {
        shear_velocity,
        saltation_roughness,
    })
}

/// Owen's saltation roughness `0.12·u*²/(2g)` (m)
#[inline]
pub fn saltation_roughness(shear_velocity: f64, constants: &PhysicalConstants) -> f64 {
    SALTATION_ROUGHNESS_COEFFICIENT * shear_velocity * shear_velocity
        / (2.0 * constants.gravity)
}
