//! Cricket overs notation.
//!
//! `12.3` overs means 12 completed overs plus 3 balls, i.e. 75 balls or
//! 12.5 decimal overs. The fractional digit is a ball count (0–5), not a
//! decimal fraction, so every conversion goes through the ball count.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use thiserror::Error;

/// Legal deliveries in one over.
pub const BALLS_PER_OVER: u32 = 6;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OversError {
    #[error("overs must be a finite, non-negative number (got {0})")]
    OutOfRange(f64),
    #[error("invalid overs notation {0}: the ball digit must be 0-5")]
    InvalidBalls(f64),
}

/// A duration of an innings, held as a ball count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Overs {
    balls: u32,
}

impl Overs {
    pub fn from_balls(balls: u32) -> Self {
        Overs { balls }
    }

    pub fn whole(overs: u32) -> Self {
        Overs {
            balls: overs * BALLS_PER_OVER,
        }
    }

    /// Parse cricket notation (`12.3` → 12 overs 3 balls).
    pub fn from_notation(value: f64) -> Result<Self, OversError> {
        if !value.is_finite() || value < 0.0 {
            return Err(OversError::OutOfRange(value));
        }
        let whole = value.trunc();
        if whole > (u32::MAX / BALLS_PER_OVER) as f64 {
            return Err(OversError::OutOfRange(value));
        }
        let tenths = (value - whole) * 10.0;
        let ball_digit = tenths.round();
        // 12.35 is not a ball count; 12.6+ would be a completed over
        if (tenths - ball_digit).abs() > 1e-6 || ball_digit >= BALLS_PER_OVER as f64 {
            return Err(OversError::InvalidBalls(value));
        }
        Ok(Overs {
            balls: whole as u32 * BALLS_PER_OVER + ball_digit as u32,
        })
    }

    /// Cricket notation as a number (`75` balls → `12.3`).
    pub fn to_notation(self) -> f64 {
        // one rounding step, so 14.3 serialises as 14.3
        (self.completed_overs() as f64 * 10.0 + self.remainder_balls() as f64) / 10.0
    }

    /// Decimal overs for rate arithmetic (`75` balls → `12.5`).
    pub fn as_decimal(self) -> f64 {
        self.balls as f64 / BALLS_PER_OVER as f64
    }

    pub fn balls(self) -> u32 {
        self.balls
    }

    pub fn completed_overs(self) -> u32 {
        self.balls / BALLS_PER_OVER
    }

    pub fn remainder_balls(self) -> u32 {
        self.balls % BALLS_PER_OVER
    }

    pub fn is_zero(self) -> bool {
        self.balls == 0
    }
}

impl Add for Overs {
    type Output = Overs;

    fn add(self, rhs: Overs) -> Overs {
        Overs {
            balls: self.balls + rhs.balls,
        }
    }
}

impl TryFrom<f64> for Overs {
    type Error = OversError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Overs::from_notation(value)
    }
}

impl From<Overs> for f64 {
    fn from(overs: Overs) -> f64 {
        overs.to_notation()
    }
}

impl fmt::Display for Overs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.remainder_balls() {
            0 => write!(f, "{}", self.completed_overs()),
            balls => write!(f, "{}.{}", self.completed_overs(), balls),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parses_ball_digit_as_sixths() {
        let overs = Overs::from_notation(12.3).unwrap();
        assert_eq!(overs.balls(), 75);
        assert_relative_eq!(overs.as_decimal(), 12.5, epsilon = 1e-12);
    }

    #[test]
    fn whole_overs_have_no_ball_digit() {
        let overs = Overs::from_notation(140.0).unwrap();
        assert_eq!(overs, Overs::whole(140));
        assert_eq!(overs.to_string(), "140");
    }

    #[test]
    fn rejects_six_or_more_balls() {
        assert_eq!(
            Overs::from_notation(12.6),
            Err(OversError::InvalidBalls(12.6))
        );
        assert!(Overs::from_notation(19.9).is_err());
    }

    #[test]
    fn rejects_non_ball_fractions() {
        assert!(Overs::from_notation(12.35).is_err());
    }

    #[test]
    fn rejects_negative_and_nan() {
        assert!(matches!(
            Overs::from_notation(-1.0),
            Err(OversError::OutOfRange(_))
        ));
        assert!(Overs::from_notation(f64::NAN).is_err());
    }

    #[test]
    fn notation_round_trips_every_ball_count() {
        for balls in 0..=6 * 200 {
            let overs = Overs::from_balls(balls);
            let back = Overs::from_notation(overs.to_notation()).unwrap();
            assert_eq!(back.balls(), balls);
            assert!(back.remainder_balls() <= 5);
        }
    }

    #[test]
    fn display_uses_cricket_notation() {
        assert_eq!(Overs::from_balls(87).to_string(), "14.3");
        assert_eq!(Overs::from_balls(120).to_string(), "20");
        assert_eq!(Overs::from_balls(5).to_string(), "0.5");
    }

    #[test]
    fn adds_by_ball_count() {
        let sum = Overs::from_notation(128.2).unwrap() + Overs::from_notation(0.5).unwrap();
        assert_eq!(sum.to_string(), "129.1");
    }

    #[test]
    fn serde_uses_notation_numbers() {
        let overs: Overs = serde_json::from_str("137.1").unwrap();
        assert_eq!(overs.balls(), 823);
        assert_eq!(serde_json::to_string(&overs).unwrap(), "137.1");
        assert!(serde_json::from_str::<Overs>("10.7").is_err());
    }
}
