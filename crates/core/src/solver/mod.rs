//! Numerical solvers
//!
//! General-purpose building blocks used by the physics modules:
//! - [`NewtonRaphson`]: bracketed root finding with bisection fallback
//! - [`RombergIntegrator`]: adaptive quadrature by Richardson extrapolation
//!
//! Both carry explicit iteration caps; exhausting a cap is reported as a
//! fatal [`BlowingSnowError`](crate::BlowingSnowError).

pub mod newton;
pub mod romberg;

pub use newton::NewtonRaphson;
pub use romberg::{Quadrature, RombergIntegrator, TrapezoidRefinement};
