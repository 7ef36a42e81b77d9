//! Romberg quadrature
//!
//! Successive trapezoid refinements, each doubling the number of panels, are
//! extrapolated to zero step size with Neville's polynomial scheme. The
//! trapezoid rule's error expands in even powers of the step, so the table is
//! indexed by `h²` (quartering each refinement).
//!
//! Each refinement reuses the previous estimate, so the running sum is state.
//! That state lives in a [`TrapezoidRefinement`] owned by one call to
//! [`RombergIntegrator::integrate`]; concurrent integrations never share it.
//!
//! # References
//! - Press, W.H. et al. (1992). "Numerical Recipes in C", 2nd ed., Sections 3.1, 4.2, 4.3

use crate::config::IntegratorSettings;
use crate::error::{BlowingSnowError, Result};
use tracing::{error, trace};

/// Integral estimate together with the work needed to reach it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrature {
    /// Extrapolated integral
    pub value: f64,
    /// Number of trapezoid refinements performed
    pub refinements: usize,
}

/// Adaptive Romberg integrator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RombergIntegrator {
    /// Relative tolerance on the extrapolated value
    pub tolerance: f64,
    /// Refinement cap
    pub max_refinements: usize,
    /// Number of most recent estimates used by the extrapolation
    pub extrapolation_points: usize,
}

impl Default for RombergIntegrator {
    fn default() -> Self {
        IntegratorSettings::default().into()
    }
}

impl From<IntegratorSettings> for RombergIntegrator {
    fn from(settings: IntegratorSettings) -> Self {
        Self {
            tolerance: settings.tolerance,
            max_refinements: settings.max_refinements,
            extrapolation_points: settings.extrapolation_points,
        }
    }
}

impl RombergIntegrator {
    /// Integrate `integrand` over `[lower, upper]`.
    ///
    /// # Errors
    ///
    /// - [`BlowingSnowError::IntegrationNotConverged`] if the relative error
    ///   estimate stays above the tolerance for `max_refinements` refinements,
    ///   or the estimate becomes non-finite
    /// - [`BlowingSnowError::DegenerateExtrapolation`] if two step sizes coincide
    pub fn integrate<F>(&self, integrand: F, lower: f64, upper: f64) -> Result<Quadrature>
    where
        F: Fn(f64) -> f64,
    {
        let order = self.extrapolation_points;
        let mut steps = Vec::with_capacity(self.max_refinements);
        let mut estimates = Vec::with_capacity(self.max_refinements);
        let mut trapezoid = TrapezoidRefinement::new(&integrand, lower, upper);

        let mut step = 1.0;
        let mut last_value = f64::NAN;
        let mut refinements = 0;

        while refinements < self.max_refinements {
            let Some(estimate) = trapezoid.refine() else {
                break;
            };
            refinements += 1;
            steps.push(step);
            estimates.push(estimate);

            if refinements >= order {
                let window = refinements - order..refinements;
                let (value, error_estimate) =
                    polynomial_extrapolation(&steps[window.clone()], &estimates[window], 0.0)?;
                trace!(
                    refinements,
                    value,
                    error_estimate,
                    "Romberg extrapolation"
                );
                last_value = value;

                if !value.is_finite() {
                    break;
                }
                if error_estimate.abs() <= self.tolerance * value.abs() {
                    return Ok(Quadrature { value, refinements });
                }
            }
            step *= 0.25;
        }

        error!(
            "Too many steps in Romberg integration over [{}, {}]: {} refinements, last estimate {}",
            lower, upper, refinements, last_value
        );
        Err(BlowingSnowError::IntegrationNotConverged {
            refinements,
            lower,
            upper,
            estimate: last_value,
        })
    }
}

/// Extended trapezoid rule, one refinement level at a time
///
/// Level 1 evaluates the endpoints; level `n > 1` adds the `2^(n-2)` interior
/// midpoints of the previous level and halves the panel width.
pub struct TrapezoidRefinement<'f, F> {
    integrand: &'f F,
    lower: f64,
    upper: f64,
    estimate: f64,
    level: u32,
}

impl<'f, F> TrapezoidRefinement<'f, F>
where
    F: Fn(f64) -> f64,
{
    /// Start a fresh refinement sequence over `[lower, upper]`
    pub fn new(integrand: &'f F, lower: f64, upper: f64) -> Self {
        Self {
            integrand,
            lower,
            upper,
            estimate: 0.0,
            level: 0,
        }
    }

    /// Current refinement level (0 before the first call to [`Self::refine`])
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Advance one level and return the refined estimate.
    ///
    /// Returns `None` once the number of new midpoints no longer fits in `usize`.
    pub fn refine(&mut self) -> Option<f64> {
        let f = self.integrand;
        let (a, b) = (self.lower, self.upper);
        let width = b - a;

        if self.level == 0 {
            self.estimate = 0.5 * width * (f(a) + f(b));
        } else {
            let midpoints = 1_usize.checked_shl(self.level - 1)?;
            let panels = midpoints as f64;
            let spacing = width / panels;
            let sum: f64 = (0..midpoints)
                .map(|j| f(a + (j as f64 + 0.5) * spacing))
                .sum();
            self.estimate = 0.5 * (self.estimate + width * sum / panels);
        }

        self.level += 1;
        Some(self.estimate)
    }
}

/// Neville's algorithm: evaluate at `x` the polynomial through `(xa[i], ya[i])`.
///
/// Returns the interpolated value and the last correction applied, which
/// serves as the error estimate.
pub(crate) fn polynomial_extrapolation(xa: &[f64], ya: &[f64], x: f64) -> Result<(f64, f64)> {
    let n = xa.len();
    debug_assert_eq!(n, ya.len());

    let mut c = ya.to_vec();
    let mut d = ya.to_vec();

    let mut nearest = 0;
    let mut dif = (x - xa[0]).abs();
    for (i, &xi) in xa.iter().enumerate() {
        let dift = (x - xi).abs();
        if dift < dif {
            nearest = i;
            dif = dift;
        }
    }

    let mut y = ya[nearest];
    let mut dy = 0.0;
    let mut k = nearest;

    for m in 1..n {
        for i in 0..n - m {
            let ho = xa[i] - x;
            let hp = xa[i + m] - x;
            let w = c[i + 1] - d[i];
            let den = ho - hp;
            if den == 0.0 {
                return Err(BlowingSnowError::DegenerateExtrapolation);
            }
            let den = w / den;
            d[i] = hp * den;
            c[i] = ho * den;
        }
        // Follow the straightest path through the tableau toward the nearest point
        dy = if 2 * k < n - m {
            c[k]
        } else {
            k -= 1;
            d[k]
        };
        y += dy;
    }

    Ok((y, dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_relative_eq;
    use std::cell::Cell;

    #[test]
    fn test_extrapolation_recovers_quadratic() {
        // y = 3x² + 2x + 1 sampled at 1, 2, 3; value at 0 is 1
        let xa = [1.0, 2.0, 3.0];
        let ya = xa.map(|x| 3.0 * x * x + 2.0 * x + 1.0);
        let (y, _) = polynomial_extrapolation(&xa, &ya, 0.0).unwrap();
        assert_relative_eq!(y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_extrapolation_rejects_coincident_abscissae() {
        let err = polynomial_extrapolation(&[1.0, 1.0], &[2.0, 3.0], 0.0).unwrap_err();
        assert_eq!(err, BlowingSnowError::DegenerateExtrapolation);
    }

    #[test]
    fn test_trapezoid_levels_converge() {
        let f = |x: f64| x * x;
        let mut trapezoid = TrapezoidRefinement::new(&f, 0.0, 1.0);
        assert_eq!(trapezoid.level(), 0);
        let first = trapezoid.refine().unwrap();
        assert_relative_eq!(first, 0.5);
        let mut last = first;
        for _ in 0..12 {
            last = trapezoid.refine().unwrap();
        }
        assert_eq!(trapezoid.level(), 13);
        assert_relative_eq!(last, 1.0 / 3.0, max_relative = 1e-7);
    }

    #[test]
    fn test_cubic_polynomial() {
        let result = RombergIntegrator::default()
            .integrate(|x| x.powi(3) - 2.0 * x + 1.0, 0.0, 2.0)
            .unwrap();
        // ∫₀² x³ - 2x + 1 dx = 4 - 4 + 2
        assert_relative_eq!(result.value, 2.0, max_relative = 1e-6);
        assert!(result.refinements < 20);
    }

    #[test]
    fn test_exponential() {
        let result = RombergIntegrator::default()
            .integrate(f64::exp, 0.0, 1.0)
            .unwrap();
        assert_relative_eq!(result.value, std::f64::consts::E - 1.0, max_relative = 1e-6);
        assert!(result.refinements < 20, "took {}", result.refinements);
    }

    #[test]
    fn test_power_law_decay() {
        // Shape of the suspension concentration profile
        let result = RombergIntegrator::default()
            .integrate(|z| z.powf(-1.5), 0.05, 2.0)
            .unwrap();
        let exact = -2.0 * (2.0_f64.powf(-0.5) - 0.05_f64.powf(-0.5));
        assert_relative_eq!(result.value, exact, max_relative = 1e-5);
    }

    #[test]
    fn test_reversed_limits_negate() {
        let integrator = RombergIntegrator::default();
        let forward = integrator.integrate(f64::sin, 0.0, 1.0).unwrap();
        let backward = integrator.integrate(f64::sin, 1.0, 0.0).unwrap();
        assert_relative_eq!(forward.value, -backward.value, max_relative = 1e-10);
    }

    #[test]
    fn test_zero_width_interval() {
        let result = RombergIntegrator::default()
            .integrate(f64::exp, 1.0, 1.0)
            .unwrap();
        assert_eq!(result.value, 0.0);
    }

    #[test]
    fn test_refinement_cap_is_fatal() {
        let integrator = RombergIntegrator {
            tolerance: 1e-15,
            max_refinements: 5,
            extrapolation_points: 5,
        };
        let err = integrator
            .integrate(|x: f64| x.abs().sqrt(), -1.0, 1.0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NonConvergence);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_sessions_are_independent() {
        // Interleaving two integrations must not mix their running sums
        let calls = Cell::new(0_usize);
        let f = |x: f64| {
            calls.set(calls.get() + 1);
            x
        };
        let g = |x: f64| 10.0 * x;
        let mut a = TrapezoidRefinement::new(&f, 0.0, 1.0);
        let mut b = TrapezoidRefinement::new(&g, 0.0, 1.0);
        for _ in 0..4 {
            a.refine();
            b.refine();
        }
        assert_relative_eq!(a.refine().unwrap(), 0.5);
        assert_relative_eq!(b.refine().unwrap(), 5.0);
        assert_eq!(calls.get(), 2 + 1 + 2 + 4 + 8);
    }
}
