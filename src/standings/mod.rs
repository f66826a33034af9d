pub mod overs;
pub mod seed;

pub use overs::{Overs, BALLS_PER_OVER};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use thiserror::Error;

use crate::nrr::rate::{nrr_of, NrrError};

/// League points for a win. No ties or no-results are modelled.
pub const POINTS_PER_WIN: u32 = 2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StandingsError {
    #[error("team '{0}' appears more than once")]
    DuplicateTeam(String),
    #[error("team '{team}' has {points} points but {won} wins")]
    PointsMismatch { team: String, points: u32, won: u32 },
    #[error("team '{team}' has {won} wins and {lost} losses in {matches} matches")]
    ImpossibleRecord {
        team: String,
        matches: u32,
        won: u32,
        lost: u32,
    },
    #[error("team '{team}' has played but has zero overs recorded")]
    ZeroOvers { team: String },
    #[error("no team at position {position} (table has {teams} teams)")]
    PositionNotFound { position: usize, teams: usize },
}

/// One side's view of a completed fixture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    pub runs_for: u32,
    pub overs_for: Overs,
    pub runs_against: u32,
    pub overs_against: Overs,
    pub won: bool,
}

impl MatchResult {
    /// The same fixture seen by the other side.
    pub fn reversed(&self) -> MatchResult {
        MatchResult {
            runs_for: self.runs_against,
            overs_for: self.overs_against,
            runs_against: self.runs_for,
            overs_against: self.overs_for,
            won: !self.won,
        }
    }
}

/// One row of the points table. NRR is never stored here; it is derived
/// from the cumulative for/against figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStanding {
    pub team: String,
    pub matches: u32,
    pub won: u32,
    pub lost: u32,
    pub points: u32,
    pub runs_for: u32,
    pub overs_for: Overs,
    pub runs_against: u32,
    pub overs_against: Overs,
}

impl TeamStanding {
    /// Net run rate; a team yet to play sits on 0.
    pub fn nrr(&self) -> Result<f64, NrrError> {
        if self.matches == 0 {
            return Ok(0.0);
        }
        nrr_of(
            self.runs_for,
            self.overs_for,
            self.runs_against,
            self.overs_against,
        )
    }

    /// This row after one more fixture.
    pub fn after_match(&self, result: &MatchResult) -> TeamStanding {
        TeamStanding {
            team: self.team.clone(),
            matches: self.matches + 1,
            won: self.won + u32::from(result.won),
            lost: self.lost + u32::from(!result.won),
            points: self.points + if result.won { POINTS_PER_WIN } else { 0 },
            runs_for: self.runs_for + result.runs_for,
            overs_for: self.overs_for + result.overs_for,
            runs_against: self.runs_against + result.runs_against,
            overs_against: self.overs_against + result.overs_against,
        }
    }

    fn validate(&self) -> Result<(), StandingsError> {
        if self.won + self.lost > self.matches {
            return Err(StandingsError::ImpossibleRecord {
                team: self.team.clone(),
                matches: self.matches,
                won: self.won,
                lost: self.lost,
            });
        }
        if self.points != POINTS_PER_WIN * self.won {
            return Err(StandingsError::PointsMismatch {
                team: self.team.clone(),
                points: self.points,
                won: self.won,
            });
        }
        if self.matches > 0 && (self.overs_for.is_zero() || self.overs_against.is_zero()) {
            return Err(StandingsError::ZeroOvers {
                team: self.team.clone(),
            });
        }
        Ok(())
    }
}

/// Table order between two (points, nrr) pairs. `Less` means `a` ranks
/// above `b`; `Equal` only for an exact tie on both keys.
pub fn compare_rank(a_points: u32, a_nrr: f64, b_points: u32, b_nrr: f64) -> Ordering {
    b_points
        .cmp(&a_points)
        .then_with(|| b_nrr.total_cmp(&a_nrr))
}

/// A validated row with its derived NRR.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedStanding {
    standing: TeamStanding,
    nrr: f64,
}

impl RankedStanding {
    pub fn standing(&self) -> &TeamStanding {
        &self.standing
    }

    pub fn team(&self) -> &str {
        &self.standing.team
    }

    pub fn points(&self) -> u32 {
        self.standing.points
    }

    pub fn nrr(&self) -> f64 {
        self.nrr
    }
}

/// Sort rows into table order: points desc, then NRR desc. Stable, so exact
/// ties keep their input order.
pub fn rank(rows: &mut [RankedStanding]) {
    rows.sort_by(|a, b| compare_rank(a.points(), a.nrr, b.points(), b.nrr));
}

/// Points table row as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    pub team: String,
    pub matches: u32,
    pub won: u32,
    pub lost: u32,
    pub nrr: f64,
    pub runs_for: u32,
    pub overs_for: Overs,
    pub runs_against: u32,
    pub overs_against: Overs,
    pub points: u32,
}

impl From<&RankedStanding> for TeamRecord {
    fn from(row: &RankedStanding) -> Self {
        let s = &row.standing;
        TeamRecord {
            team: s.team.clone(),
            matches: s.matches,
            won: s.won,
            lost: s.lost,
            nrr: row.nrr,
            runs_for: s.runs_for,
            overs_for: s.overs_for,
            runs_against: s.runs_against,
            overs_against: s.overs_against,
            points: s.points,
        }
    }
}

/// Immutable, ranked points table.
#[derive(Debug, Clone, PartialEq)]
pub struct StandingsSnapshot {
    rows: Vec<RankedStanding>,
}

impl StandingsSnapshot {
    pub fn new(teams: Vec<TeamStanding>) -> Result<Self, StandingsError> {
        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(teams.len());
        for standing in teams {
            if !seen.insert(standing.team.clone()) {
                return Err(StandingsError::DuplicateTeam(standing.team));
            }
            standing.validate()?;
            let nrr = standing.nrr().map_err(|_| StandingsError::ZeroOvers {
                team: standing.team.clone(),
            })?;
            rows.push(RankedStanding { standing, nrr });
        }
        rank(&mut rows);
        Ok(StandingsSnapshot { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[RankedStanding] {
        &self.rows
    }

    /// Row at a 1-based table position.
    pub fn team_at(&self, position: usize) -> Result<&RankedStanding, StandingsError> {
        position
            .checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .ok_or(StandingsError::PositionNotFound {
                position,
                teams: self.rows.len(),
            })
    }

    /// 1-based position and row for a team name.
    pub fn find(&self, team: &str) -> Option<(usize, &RankedStanding)> {
        self.rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.team() == team)
            .map(|(i, row)| (i + 1, row))
    }

    /// Team names in table order.
    pub fn ranking(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.team()).collect()
    }

    pub fn records(&self) -> Vec<TeamRecord> {
        self.rows.iter().map(TeamRecord::from).collect()
    }
}
