//! Error taxonomy for blowing-snow flux computations
//!
//! Only failures with no numerically sound recovery surface here. Recoverable
//! conditions (degenerate wind spread, unmet partition branches, implausible
//! negative fluxes) are handled where they occur with a logged fallback.
//!
//! Callers use [`BlowingSnowError::is_fatal`] and [`BlowingSnowError::kind`] to
//! decide whether to abort a model run or substitute a zero flux for one cell.

use std::fmt;

/// Broad failure category, stable across error payload changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Root solver endpoints do not bracket a sign change
    InvalidBracket,
    /// Root solver or integrator exhausted its iteration budget
    NonConvergence,
    /// Configuration rejected by validation
    InvalidConfig,
    /// Meteorological input rejected by validation
    InvalidInput,
}

/// Errors that can occur while computing a blowing-snow sublimation flux
#[derive(Debug, Clone, PartialEq)]
pub enum BlowingSnowError {
    /// Function values at both interval endpoints share a sign (or are NaN)
    InvalidBracket {
        /// Lower interval endpoint
        lower: f64,
        /// Upper interval endpoint
        upper: f64,
        /// Function value at `lower`
        f_lower: f64,
        /// Function value at `upper`
        f_upper: f64,
    },
    /// Newton-Raphson iteration cap reached without meeting the tolerance
    RootNotConverged {
        /// Iterations performed
        iterations: usize,
        /// Last root estimate
        estimate: f64,
    },
    /// Romberg refinement cap reached without meeting the relative tolerance
    IntegrationNotConverged {
        /// Refinements performed
        refinements: usize,
        /// Lower integration limit
        lower: f64,
        /// Upper integration limit
        upper: f64,
        /// Last extrapolated estimate
        estimate: f64,
    },
    /// Two extrapolation abscissae coincided
    DegenerateExtrapolation,
    /// Configuration failed validation
    InvalidConfig(String),
    /// Input state failed validation
    InvalidInput(String),
}

impl BlowingSnowError {
    /// Failure category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidBracket { .. } => ErrorKind::InvalidBracket,
            Self::RootNotConverged { .. }
            | Self::IntegrationNotConverged { .. }
            | Self::DegenerateExtrapolation => ErrorKind::NonConvergence,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    /// True for numerical failures where no fallback value is sound.
    ///
    /// Configuration and input errors are caller mistakes rather than
    /// numerical breakdowns and report `false`.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidBracket | ErrorKind::NonConvergence
        )
    }
}

impl fmt::Display for BlowingSnowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlowingSnowError::InvalidBracket {
                lower,
                upper,
                f_lower,
                f_upper,
            } => write!(
                f,
                "Root must be bracketed: f({lower}) = {f_lower}, f({upper}) = {f_upper}"
            ),
            BlowingSnowError::RootNotConverged {
                iterations,
                estimate,
            } => write!(
                f,
                "Root solver did not converge after {iterations} iterations (last estimate {estimate})"
            ),
            BlowingSnowError::IntegrationNotConverged {
                refinements,
                lower,
                upper,
                estimate,
            } => write!(
                f,
                "Romberg integration over [{lower}, {upper}] did not converge after {refinements} refinements (last estimate {estimate})"
            ),
            BlowingSnowError::DegenerateExtrapolation => {
                write!(f, "Polynomial extrapolation hit coincident abscissae")
            }
            BlowingSnowError::InvalidConfig(msg) => write!(f, "Invalid configuration: {msg}"),
            BlowingSnowError::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
        }
    }
}

impl std::error::Error for BlowingSnowError {}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, BlowingSnowError>;
