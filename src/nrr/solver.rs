//! Net run rate range solver.
//!
//! Given the current table and a fixture the requesting team is assumed to
//! win, find the band of outcomes (opposition runs when batting first, balls
//! taken to chase when bowling first) that lands the team at exactly the
//! desired position.
//!
//! Teams on more projected points are always ahead and teams on fewer are
//! always behind. Every team level on points has a crossing point where the
//! two NRRs are equal; the requester's margin over each of them falls
//! strictly as the free variable grows, so the position is a step function
//! and the wanted band sits between two consecutive sorted crossings. The
//! crossings come from closed-form inversion, then the integer band is
//! checked against the projected table at both ends.

use std::cmp::Ordering;
use thiserror::Error;
use tracing::debug;

use super::rate::{
    affine_root, decreasing_rates_crossing, invert_overs_for, invert_runs_against, NrrError,
};
use super::request::{
    batting_summary, bowling_summary, BattingFirstRange, BowlingFirstRange, MatchRequest,
    OutcomeRange, TossResult,
};
use crate::standings::{
    compare_rank, MatchResult, Overs, RankedStanding, StandingsSnapshot, TeamStanding,
    BALLS_PER_OVER, POINTS_PER_WIN,
};

/// Longest fixture accepted (one-day internationals).
pub const MAX_MATCH_OVERS: u32 = 50;
/// A six off every legal ball; extras are not modelled.
pub const MAX_RUNS_PER_BALL: u32 = 6;
/// Integer steps allowed when reconciling a rounded bound with the table.
const MAX_NUDGE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(
        "position {desired} is not reachable with a win; a win places the team between \
         {best} and {worst}"
    )]
    Unsatisfiable {
        desired: usize,
        best: usize,
        worst: usize,
    },
    #[error("internal fault: {0}")]
    Internal(String),
}

impl SolveError {
    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SolveError::InvalidRequest(_) => "invalid_request",
            SolveError::Unsatisfiable { .. } => "unsatisfiable",
            SolveError::Internal(_) => "internal",
        }
    }
}

impl From<NrrError> for SolveError {
    fn from(err: NrrError) -> Self {
        SolveError::Internal(err.to_string())
    }
}

fn invalid(msg: impl Into<String>) -> SolveError {
    SolveError::InvalidRequest(msg.into())
}

/// Solve `request` against `snapshot`. Pure; the snapshot is only read.
pub fn solve(
    snapshot: &StandingsSnapshot,
    request: &MatchRequest,
) -> Result<OutcomeRange, SolveError> {
    let fixture = Fixture::new(snapshot, request)?;
    let (lo, hi) = fixture.band()?;

    // conceding more runs or taking more balls only lowers the NRR
    let max_nrr = fixture.projected_nrr(lo)?.0;
    let min_nrr = fixture.projected_nrr(hi)?.0;
    if min_nrr > max_nrr {
        return Err(SolveError::Internal(format!(
            "NRR band inverted ({} > {})",
            min_nrr, max_nrr
        )));
    }

    let range = match fixture.toss {
        TossResult::Batting => {
            let mut range = BattingFirstRange {
                your_team: fixture.you.team.clone(),
                opposition_team: fixture.opposition.team.clone(),
                runs_scored: fixture.runs,
                overs_batted: fixture.quota,
                min_runs_to_restrict: lo as u32,
                max_runs_to_restrict: hi as u32,
                overs_to_restrict: fixture.quota,
                min_nrr,
                max_nrr,
                summary: String::new(),
            };
            range.summary = batting_summary(&range);
            OutcomeRange::BattingFirst(range)
        }
        TossResult::Bowling => {
            let mut range = BowlingFirstRange {
                your_team: fixture.you.team.clone(),
                opposition_team: fixture.opposition.team.clone(),
                runs_to_chase: fixture.runs,
                min_overs_to_chase: Overs::from_balls(lo as u32),
                max_overs_to_chase: Overs::from_balls(hi as u32),
                min_nrr,
                max_nrr,
                summary: String::new(),
            };
            range.summary = bowling_summary(&range);
            OutcomeRange::BowlingFirst(range)
        }
    };
    Ok(range)
}

/// Where the requester lands for one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Placement {
    /// Teams strictly ahead.
    ahead: usize,
    /// Teams level on points and NRR.
    tied: usize,
}

impl Placement {
    fn is_exactly(self, position: usize) -> bool {
        self.tied == 0 && self.ahead + 1 == position
    }

    fn best(self) -> usize {
        self.ahead + 1
    }

    fn worst(self) -> usize {
        self.ahead + self.tied + 1
    }
}

/// A validated request bound to the rows it talks about.
struct Fixture<'a> {
    you: &'a TeamStanding,
    opposition: &'a TeamStanding,
    others: Vec<&'a RankedStanding>,
    toss: TossResult,
    runs: u32,
    quota: Overs,
    desired: usize,
}

impl<'a> Fixture<'a> {
    fn new(snapshot: &'a StandingsSnapshot, request: &MatchRequest) -> Result<Self, SolveError> {
        if request.your_team == request.opposition_team {
            return Err(invalid("your team and opposition team cannot be the same"));
        }
        let (_, you) = snapshot
            .find(&request.your_team)
            .ok_or_else(|| invalid(format!("unknown team '{}'", request.your_team)))?;
        let (_, opposition) = snapshot
            .find(&request.opposition_team)
            .ok_or_else(|| invalid(format!("unknown team '{}'", request.opposition_team)))?;
        if !(1..=snapshot.len()).contains(&request.desired_position) {
            return Err(invalid(format!(
                "desired position must be between 1 and {} (got {})",
                snapshot.len(),
                request.desired_position
            )));
        }
        if !(1..=MAX_MATCH_OVERS).contains(&request.match_overs) {
            return Err(invalid(format!(
                "match overs must be between 1 and {} (got {})",
                MAX_MATCH_OVERS, request.match_overs
            )));
        }
        if request.runs == 0 {
            return Err(invalid("runs must be positive"));
        }
        let quota = Overs::whole(request.match_overs);
        let possible = MAX_RUNS_PER_BALL * quota.balls();
        if request.runs > possible {
            return Err(invalid(format!(
                "{} runs is more than can be scored in {} overs ({})",
                request.runs, quota, possible
            )));
        }

        let others = snapshot
            .rows()
            .iter()
            .filter(|row| row.team() != you.team() && row.team() != opposition.team())
            .collect();

        Ok(Fixture {
            you: you.standing(),
            opposition: opposition.standing(),
            others,
            toss: request.toss_result,
            runs: request.runs,
            quota,
            desired: request.desired_position,
        })
    }

    /// Physically possible values of the free variable, inclusive.
    fn domain(&self) -> (i64, i64) {
        match self.toss {
            // opposition must finish short of our total
            TossResult::Batting => (0, self.runs as i64 - 1),
            TossResult::Bowling => {
                let fastest = self.runs.div_ceil(MAX_RUNS_PER_BALL).max(1);
                (fastest as i64, self.quota.balls() as i64)
            }
        }
    }

    /// The fixture from the requester's side for outcome `x`.
    fn result(&self, x: i64) -> MatchResult {
        let x = x as u32;
        match self.toss {
            TossResult::Batting => MatchResult {
                runs_for: self.runs,
                overs_for: self.quota,
                runs_against: x,
                overs_against: self.quota,
                won: true,
            },
            // `runs` is the target, so the side batting first made one fewer
            TossResult::Bowling => MatchResult {
                runs_for: self.runs,
                overs_for: Overs::from_balls(x),
                runs_against: self.runs - 1,
                overs_against: self.quota,
                won: true,
            },
        }
    }

    fn you_points(&self) -> u32 {
        self.you.points + POINTS_PER_WIN
    }

    /// Post-match NRR of (requester, opposition) for outcome `x`.
    fn projected_nrr(&self, x: i64) -> Result<(f64, f64), NrrError> {
        let result = self.result(x);
        let you = self.you.after_match(&result).nrr()?;
        let opposition = self.opposition.after_match(&result.reversed()).nrr()?;
        Ok((you, opposition))
    }

    fn placement(&self, x: i64) -> Result<Placement, SolveError> {
        let (you_nrr, opposition_nrr) = self.projected_nrr(x)?;
        let you_points = self.you_points();
        let rivals = self
            .others
            .iter()
            .map(|row| (row.points(), row.nrr()))
            .chain(std::iter::once((self.opposition.points, opposition_nrr)));

        let mut placement = Placement::default();
        for (points, nrr) in rivals {
            match compare_rank(points, nrr, you_points, you_nrr) {
                Ordering::Less => placement.ahead += 1,
                Ordering::Equal => placement.tied += 1,
                Ordering::Greater => {}
            }
        }
        Ok(placement)
    }

    fn fits(&self, x: i64) -> Result<bool, SolveError> {
        Ok(self.placement(x)?.is_exactly(self.desired))
    }

    /// Teams always ahead, and the sorted crossing points of the teams that
    /// finish level on points.
    fn crossings(&self) -> Result<(usize, Vec<f64>), SolveError> {
        let you_points = self.you_points();
        let mut always_ahead = 0;
        let mut crossings = Vec::new();
        for row in &self.others {
            match row.points().cmp(&you_points) {
                Ordering::Greater => always_ahead += 1,
                Ordering::Equal => crossings.push(self.crossing_with_fixed(row.nrr())),
                Ordering::Less => {}
            }
        }
        match self.opposition.points.cmp(&you_points) {
            Ordering::Greater => always_ahead += 1,
            Ordering::Equal => crossings.push(self.crossing_with_opposition()?),
            Ordering::Less => {}
        }
        if crossings.iter().any(|c| c.is_nan()) {
            return Err(SolveError::Internal("crossing point is not a number".into()));
        }
        crossings.sort_by(f64::total_cmp);
        Ok((always_ahead, crossings))
    }

    /// Free-variable value at which our NRR equals a rival's unchanged NRR.
    fn crossing_with_fixed(&self, rival_nrr: f64) -> f64 {
        let you = self.you;
        let quota = self.quota.as_decimal();
        let runs_for = (you.runs_for + self.runs) as f64;
        let overs_against = you.overs_against.as_decimal() + quota;
        match self.toss {
            TossResult::Batting => {
                let total = invert_runs_against(
                    rival_nrr,
                    runs_for,
                    you.overs_for.as_decimal() + quota,
                    overs_against,
                );
                total - you.runs_against as f64
            }
            TossResult::Bowling => {
                let runs_against = (you.runs_against + self.runs - 1) as f64;
                match invert_overs_for(rival_nrr, runs_for, runs_against, overs_against) {
                    Some(total) => (total - you.overs_for.as_decimal()) * BALLS_PER_OVER as f64,
                    None => f64::INFINITY,
                }
            }
        }
    }

    /// Free-variable value at which our NRR equals the opposition's, both
    /// moving with the result.
    fn crossing_with_opposition(&self) -> Result<f64, SolveError> {
        match self.toss {
            TossResult::Batting => {
                // both NRRs are affine in runs conceded
                let margin = |r| -> Result<f64, NrrError> {
                    let (you, opposition) = self.projected_nrr(r)?;
                    Ok(you - opposition)
                };
                Ok(affine_root(margin(0)?, margin(1)?))
            }
            TossResult::Bowling => {
                let (you, opp) = (self.you, self.opposition);
                let quota = self.quota.as_decimal();
                let first_innings = self.runs - 1;
                // margin(t) = a/(y0+t) + b/(z0+t) − k, t = overs taken
                let a = (you.runs_for + self.runs) as f64;
                let b = (opp.runs_against + self.runs) as f64;
                let k = (you.runs_against + first_innings) as f64
                    / (you.overs_against.as_decimal() + quota)
                    + (opp.runs_for + first_innings) as f64 / (opp.overs_for.as_decimal() + quota);
                if k <= 0.0 {
                    return Ok(f64::INFINITY);
                }
                decreasing_rates_crossing(
                    a,
                    you.overs_for.as_decimal(),
                    b,
                    opp.overs_against.as_decimal(),
                    k,
                )
                .map(|t| t * BALLS_PER_OVER as f64)
                .ok_or_else(|| SolveError::Internal("no chase crossing with opposition".into()))
            }
        }
    }

    /// Inclusive integer band of outcomes that place the requester exactly.
    fn band(&self) -> Result<(i64, i64), SolveError> {
        let (dom_lo, dom_hi) = self.domain();
        let (always_ahead, crossings) = self.crossings()?;
        let base = always_ahead + 1;
        debug!(
            "{} vs {}: {} always ahead, crossings {:?}, domain {}..={}",
            self.you.team, self.opposition.team, always_ahead, crossings, dom_lo, dom_hi
        );

        if self.desired < base || self.desired > base + crossings.len() {
            return Err(self.unsatisfiable(dom_lo, dom_hi)?);
        }
        let ahead = self.desired - base;
        let lower = if ahead == 0 {
            f64::NEG_INFINITY
        } else {
            crossings[ahead - 1]
        };
        let upper = crossings.get(ahead).copied().unwrap_or(f64::INFINITY);

        let lo = first_integer_above(lower, dom_lo, dom_hi);
        let hi = last_integer_below(upper, dom_lo, dom_hi);
        match self.reconcile(lo, hi, dom_lo, dom_hi)? {
            Some(band) => Ok(band),
            None => Err(self.unsatisfiable(dom_lo, dom_hi)?),
        }
    }

    /// Align rounded bounds with exact evaluation of the projected table.
    fn reconcile(
        &self,
        mut lo: i64,
        mut hi: i64,
        dom_lo: i64,
        dom_hi: i64,
    ) -> Result<Option<(i64, i64)>, SolveError> {
        if lo > hi {
            return Ok(None);
        }
        for _ in 0..MAX_NUDGE {
            if lo > hi || self.fits(lo)? {
                break;
            }
            lo += 1;
        }
        for _ in 0..MAX_NUDGE {
            if lo > hi || self.fits(hi)? {
                break;
            }
            hi -= 1;
        }
        if lo > hi || !self.fits(lo)? || !self.fits(hi)? {
            return Ok(None);
        }
        for _ in 0..MAX_NUDGE {
            if lo > dom_lo && self.fits(lo - 1)? {
                lo -= 1;
            } else {
                break;
            }
        }
        for _ in 0..MAX_NUDGE {
            if hi < dom_hi && self.fits(hi + 1)? {
                hi += 1;
            } else {
                break;
            }
        }
        Ok(Some((lo, hi)))
    }

    fn unsatisfiable(&self, dom_lo: i64, dom_hi: i64) -> Result<SolveError, SolveError> {
        Ok(SolveError::Unsatisfiable {
            desired: self.desired,
            best: self.placement(dom_lo)?.best(),
            worst: self.placement(dom_hi)?.worst(),
        })
    }
}

/// Smallest integer strictly above `c`, no lower than `lo`.
fn first_integer_above(c: f64, lo: i64, hi: i64) -> i64 {
    let c = c.clamp((lo - 1) as f64, (hi + 1) as f64);
    (c.floor() as i64 + 1).max(lo)
}

/// Largest integer strictly below `c`, no higher than `hi`.
fn last_integer_below(c: f64, lo: i64, hi: i64) -> i64 {
    let c = c.clamp((lo - 1) as f64, (hi + 1) as f64);
    (c.ceil() as i64 - 1).min(hi)
}
