//! Bracketed Newton-Raphson root finding
//!
//! Newton steps are taken while they stay inside the current bracket and
//! shrink fast enough; otherwise the solver bisects. The bracket is tightened
//! after every step from the sign of the new function value, so the method
//! keeps the global convergence of bisection with the local speed of Newton.
//!
//! # References
//! - Press, W.H. et al. (1992). "Numerical Recipes in C", 2nd ed., Section 9.4

use crate::config::RootSolverSettings;
use crate::error::{BlowingSnowError, Result};
use tracing::error;

/// Safeguarded Newton-Raphson solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonRaphson {
    /// Absolute tolerance on the step size
    pub tolerance: f64,
    /// Iteration cap
    pub max_iterations: usize,
}

impl Default for NewtonRaphson {
    fn default() -> Self {
        RootSolverSettings::default().into()
    }
}

impl From<RootSolverSettings> for NewtonRaphson {
    fn from(settings: RootSolverSettings) -> Self {
        Self {
            tolerance: settings.tolerance,
            max_iterations: settings.max_iterations,
        }
    }
}

impl NewtonRaphson {
    /// Create a solver with the given step tolerance and iteration cap
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Find a root of `func` inside `[x1, x2]`.
    ///
    /// `func` returns the function value and its derivative at `x`. If either
    /// endpoint is an exact root it is returned unchanged.
    ///
    /// # Errors
    ///
    /// - [`BlowingSnowError::InvalidBracket`] if `func(x1)` and `func(x2)` share
    ///   a sign or either is NaN
    /// - [`BlowingSnowError::RootNotConverged`] if the step never drops below
    ///   the tolerance within `max_iterations`
    pub fn solve<F>(&self, func: F, x1: f64, x2: f64) -> Result<f64>
    where
        F: Fn(f64) -> (f64, f64),
    {
        let (f_lower, _) = func(x1);
        let (f_upper, _) = func(x2);

        if f_lower.is_nan()
            || f_upper.is_nan()
            || (f_lower > 0.0 && f_upper > 0.0)
            || (f_lower < 0.0 && f_upper < 0.0)
        {
            error!(
                "Root must be bracketed: f({}) = {}, f({}) = {}",
                x1, f_lower, x2, f_upper
            );
            return Err(BlowingSnowError::InvalidBracket {
                lower: x1,
                upper: x2,
                f_lower,
                f_upper,
            });
        }

        if f_lower == 0.0 {
            return Ok(x1);
        }
        if f_upper == 0.0 {
            return Ok(x2);
        }

        // Orient the bracket so that f(xl) < 0 < f(xh)
        let (mut xl, mut xh) = if f_lower < 0.0 { (x1, x2) } else { (x2, x1) };

        let mut rts = 0.5 * (x1 + x2);
        let mut dx_old = (x2 - x1).abs();
        let mut dx = dx_old;
        let (mut f, mut df) = func(rts);

        for _ in 0..self.max_iterations {
            let leaves_bracket = ((rts - xh) * df - f) * ((rts - xl) * df - f) > 0.0;
            let too_slow = (2.0 * f).abs() > (dx_old * df).abs();
            let unusable = !f.is_finite() || !df.is_finite() || df == 0.0;

            if leaves_bracket || too_slow || unusable {
                dx_old = dx;
                dx = 0.5 * (xh - xl);
                rts = xl + dx;
                if xl == rts {
                    return Ok(rts);
                }
            } else {
                dx_old = dx;
                dx = f / df;
                let previous = rts;
                rts -= dx;
                if previous == rts {
                    return Ok(rts);
                }
            }

            if dx.abs() < self.tolerance {
                return Ok(rts);
            }

            (f, df) = func(rts);
            if f < 0.0 {
                xl = rts;
            } else {
                xh = rts;
            }
        }

        error!(
            "Maximum number of iterations ({}) exceeded in root solver on [{}, {}], last estimate {}",
            self.max_iterations, x1, x2, rts
        );
        Err(BlowingSnowError::RootNotConverged {
            iterations: self.max_iterations,
            estimate: rts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_abs_diff_eq;

    fn square_minus_two(x: f64) -> (f64, f64) {
        (x * x - 2.0, 2.0 * x)
    }

    #[test]
    fn test_finds_square_root_of_two() {
        let solver = NewtonRaphson::new(1e-12, 100);
        let root = solver.solve(square_minus_two, 0.0, 2.0).unwrap();
        assert_abs_diff_eq!(root, 2.0_f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_bracket_order_does_not_matter() {
        let solver = NewtonRaphson::new(1e-12, 100);
        let forward = solver.solve(square_minus_two, 0.0, 2.0).unwrap();
        let reverse = solver.solve(square_minus_two, 2.0, 0.0).unwrap();
        assert_abs_diff_eq!(forward, reverse, epsilon = 1e-10);
    }

    #[test]
    fn test_symmetric_bracket_hits_root_at_midpoint() {
        // f(1) = -2 and f(5) = +2: the first midpoint is the exact root
        let solver = NewtonRaphson::default();
        let root = solver.solve(|x| (x - 3.0, 1.0), 1.0, 5.0).unwrap();
        assert_eq!(root, 3.0);
    }

    #[test]
    fn test_odd_symmetric_function() {
        // Asymmetric bracket around the root of an odd function
        let solver = NewtonRaphson::new(1e-12, 100);
        let root = solver
            .solve(|x| (x.tanh(), 1.0 - x.tanh().powi(2)), -1.5, 2.5)
            .unwrap();
        assert_abs_diff_eq!(root, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_endpoint_root_returned_immediately() {
        let solver = NewtonRaphson::default();
        assert_eq!(solver.solve(|x| (x - 1.0, 1.0), 1.0, 4.0).unwrap(), 1.0);
        assert_eq!(solver.solve(|x| (x - 4.0, 1.0), 1.0, 4.0).unwrap(), 4.0);
    }

    #[test]
    fn test_invalid_bracket() {
        let solver = NewtonRaphson::default();
        let err = solver
            .solve(|x| (x * x + 1.0, 2.0 * x), -1.0, 1.0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidBracket);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_nan_endpoint_is_invalid_bracket() {
        let solver = NewtonRaphson::default();
        let err = solver.solve(|x| (x.ln(), 1.0 / x), -1.0, 2.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidBracket);
    }

    #[test]
    fn test_iteration_cap_is_fatal() {
        let solver = NewtonRaphson::new(1e-15, 1);
        let err = solver.solve(square_minus_two, 0.0, 2.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NonConvergence);
        assert!(matches!(
            err,
            BlowingSnowError::RootNotConverged { iterations: 1, .. }
        ));
    }

    #[test]
    fn test_residual_small_at_returned_root() {
        let solver = NewtonRaphson::new(1e-10, 100);
        let cubic = |x: f64| (x.powi(3) - x - 2.0, 3.0 * x * x - 1.0);
        let root = solver.solve(cubic, 1.0, 2.0).unwrap();
        assert!(cubic(root).0.abs() < 1e-8, "residual {}", cubic(root).0);
    }
}
