//! Net run rate arithmetic.
//!
//! NRR = runs_for / overs_for − runs_against / overs_against, with overs in
//! decimal (balls / 6). Once a hypothetical fixture fixes everything but one
//! quantity, NRR is a monotone function of that quantity and can be inverted
//! in closed form; the inversions live here next to the forward formula.

use thiserror::Error;

use crate::standings::Overs;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NrrError {
    #[error("run rate undefined: {runs} runs in zero overs")]
    ZeroOvers { runs: u32 },
}

/// Runs per (decimal) over.
pub fn run_rate(runs: u32, overs: Overs) -> Result<f64, NrrError> {
    if overs.is_zero() {
        return Err(NrrError::ZeroOvers { runs });
    }
    Ok(runs as f64 / overs.as_decimal())
}

/// The canonical net run rate.
pub fn nrr_of(
    runs_for: u32,
    overs_for: Overs,
    runs_against: u32,
    overs_against: Overs,
) -> Result<f64, NrrError> {
    Ok(run_rate(runs_for, overs_for)? - run_rate(runs_against, overs_against)?)
}

/// NRR rendered for people: always three decimals.
pub fn format_nrr(nrr: f64) -> String {
    format!("{:.3}", nrr)
}

/// Total runs conceded (over `overs_against` decimal overs) at which the NRR
/// equals `target` exactly.
///
/// NRR is strictly decreasing in runs conceded, so any total below the
/// returned value yields a higher NRR.
pub fn invert_runs_against(
    target: f64,
    runs_for: f64,
    overs_for: f64,
    overs_against: f64,
) -> f64 {
    (runs_for / overs_for - target) * overs_against
}

/// Total decimal overs batted at which the NRR equals `target` exactly.
///
/// Returns `None` when no overs value gets down to `target`: the scoring
/// rate is always positive, so if the conceded rate alone already sits at or
/// above `-target`, every finite innings beats it.
pub fn invert_overs_for(
    target: f64,
    runs_for: f64,
    runs_against: f64,
    overs_against: f64,
) -> Option<f64> {
    let required_rate = target + runs_against / overs_against;
    if required_rate <= 0.0 {
        return None;
    }
    Some(runs_for / required_rate)
}

/// Root of an affine function sampled at 0 and 1.
///
/// Returns +∞/−∞ for a flat function that never crosses (positive/negative).
pub fn affine_root(f0: f64, f1: f64) -> f64 {
    let slope = f1 - f0;
    if slope == 0.0 {
        return if f0 > 0.0 { f64::INFINITY } else { f64::NEG_INFINITY };
    }
    -f0 / slope
}

/// The unique `t > -min(y0, z0)` with `a/(y0+t) + b/(z0+t) = k`.
///
/// The left-hand side is strictly decreasing from +∞ towards 0, so a root
/// exists only for `k > 0`. Multiplying out gives the quadratic
/// `k·t² + (k(y0+z0) − a − b)·t + (k·y0·z0 − a·z0 − b·y0) = 0`, whose larger
/// root is the one on the decreasing branch.
pub fn decreasing_rates_crossing(a: f64, y0: f64, b: f64, z0: f64, k: f64) -> Option<f64> {
    if k <= 0.0 {
        return None;
    }
    let qb = k * (y0 + z0) - a - b;
    let qc = k * y0 * z0 - a * z0 - b * y0;
    let disc = qb * qb - 4.0 * k * qc;
    if disc < 0.0 {
        return None;
    }
    Some((-qb + disc.sqrt()) / (2.0 * k))
}
