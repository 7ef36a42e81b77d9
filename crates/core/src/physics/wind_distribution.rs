//! Equiprobable partition of the sub-grid wind speed distribution
//!
//! Wind speed within a grid cell is modelled as a Laplace distribution
//! centered on the cell-mean 10 m wind `Uo` with scale `σw`. The distribution
//! is cut into `N` intervals of equal probability `1/N`, and each interval is
//! represented by its analytic conditional mean. The last interval is capped
//! at `2·Uo` rather than extending to infinity.
//!
//! # Scientific References
//!
//! - Bowling, L.C., Pomeroy, J.W., Lettenmaier, D.P. (2004). "Parameterization of
//!   blowing-snow sublimation in a macroscale hydrology model"
//!   Journal of Hydrometeorology, 5, 745-762

use tracing::warn;

/// Representative wind speed assigned when an interval straddles the center (m/s)
pub const FALLBACK_WIND_SPEED: f64 = 0.4;

/// Lower clamp on representative wind speeds (m/s)
pub const MIN_WIND_SPEED: f64 = 0.4;

/// Upper clamp on representative wind speeds (m/s)
pub const MAX_WIND_SPEED: f64 = 25.0;

/// One equiprobable interval of the wind speed distribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindBin {
    /// Lower bound (m/s)
    pub lower: f64,
    /// Upper bound (m/s)
    pub upper: f64,
    /// Representative (conditional mean) wind speed, clamped to `[0.4, 25]` m/s
    pub wind_speed: f64,
    /// Probability mass of the interval
    pub probability: f64,
}

/// Interval bounds of bin `index` out of `count`, before clamping
fn bin_bounds(index: usize, count: usize, mean: f64, spread: f64) -> (f64, f64) {
    let area = 1.0 / count as f64;
    let p = index as f64;
    let below_center = |k: f64| mean + spread * (2.0 * k * area).ln();
    let above_center = |k: f64| mean - spread * (2.0 - 2.0 * k * area).ln();

    if index == 0 {
        (0.0, below_center(1.0))
    } else if index == count - 1 {
        (above_center(p), 2.0 * mean)
    } else if index < count / 2 {
        (below_center(p), below_center(p + 1.0))
    } else {
        (above_center(p), above_center(p + 1.0))
    }
}

/// Bin `index` (0-based) of an `count`-bin partition of a Laplace
/// distribution with center `mean` and scale `spread`
///
/// An interval that contains the center has no closed-form conditional mean
/// in this scheme; it is assigned [`FALLBACK_WIND_SPEED`] with a warning.
/// With an even `count` and a moderate spread this never happens.
///
/// The last interval is truncated at `2·Uo` but its conditional mean is still
/// normalized by the full `1/N` mass. Once `σw` grows past roughly `0.3·Uo`
/// (10 bins; `0.33` for 8, `0.39` for 6, `0.51` for 4) its representative
/// speed falls below that of the bin before it.
///
/// # Arguments
/// * `index` - Bin index, `0 <= index < count`
/// * `count` - Number of bins, at least 2
/// * `mean` - Distribution center, the cell-mean 10 m wind (m/s)
/// * `spread` - Laplace scale parameter σw (m/s), non-zero
pub fn wind_bin(index: usize, count: usize, mean: f64, spread: f64) -> WindBin {
    debug_assert!(count >= 2 && index < count);
    let area = 1.0 / count as f64;

    let (mut lower, mut upper) = bin_bounds(index, count, mean, spread);
    lower = lower.max(0.0);
    upper = upper.max(0.0);
    if lower > upper {
        lower = upper;
    }

    let tail = |bound: f64, sign: f64| {
        (bound + sign * spread) * (-sign * (bound - mean) / spread).exp()
    };
    let conditional_mean = if lower >= mean {
        -0.5 * (tail(upper, 1.0) - tail(lower, 1.0)) / area
    } else if upper <= mean {
        0.5 * (tail(upper, -1.0) - tail(lower, -1.0)) / area
    } else {
        warn!(
            "Wind bin {} of {} spans the distribution center: limits {} - {}, σw = {}, Uo = {}; using {} m/s",
            index, count, lower, upper, spread, mean, FALLBACK_WIND_SPEED
        );
        FALLBACK_WIND_SPEED
    };

    WindBin {
        lower,
        upper,
        wind_speed: conditional_mean.clamp(MIN_WIND_SPEED, MAX_WIND_SPEED),
        probability: area,
    }
}

/// All `count` bins of the partition, in increasing order of wind speed
pub fn wind_bins(count: usize, mean: f64, spread: f64) -> impl Iterator<Item = WindBin> {
    (0..count).map(move |index| wind_bin(index, count, mean, spread))
}
