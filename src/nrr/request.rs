use serde::{Deserialize, Serialize};
use std::fmt;

use super::rate::format_nrr;
use crate::standings::Overs;

/// Which innings the requesting team plays in the hypothetical fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TossResult {
    #[serde(alias = "battingFirst", alias = "batting_first")]
    Batting,
    #[serde(alias = "bowlingFirst", alias = "bowling_first")]
    Bowling,
}

impl fmt::Display for TossResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TossResult::Batting => write!(f, "batting first"),
            TossResult::Bowling => write!(f, "bowling first"),
        }
    }
}

/// "If we win this fixture, what keeps/moves us to `desired_position`?"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub your_team: String,
    pub opposition_team: String,
    pub match_overs: u32,
    pub desired_position: usize,
    pub toss_result: TossResult,
    /// Runs scored when batting first; the target when bowling first.
    pub runs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattingFirstRange {
    pub your_team: String,
    pub opposition_team: String,
    pub runs_scored: u32,
    pub overs_batted: Overs,
    pub min_runs_to_restrict: u32,
    pub max_runs_to_restrict: u32,
    pub overs_to_restrict: Overs,
    #[serde(rename = "minNRR")]
    pub min_nrr: f64,
    #[serde(rename = "maxNRR")]
    pub max_nrr: f64,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlingFirstRange {
    pub your_team: String,
    pub opposition_team: String,
    pub runs_to_chase: u32,
    pub min_overs_to_chase: Overs,
    pub max_overs_to_chase: Overs,
    #[serde(rename = "minNRR")]
    pub min_nrr: f64,
    #[serde(rename = "maxNRR")]
    pub max_nrr: f64,
    pub summary: String,
}

/// Solved band of outcomes, tagged by scenario on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scenario")]
pub enum OutcomeRange {
    #[serde(rename = "batting_first")]
    BattingFirst(BattingFirstRange),
    #[serde(rename = "bowling_first")]
    BowlingFirst(BowlingFirstRange),
}

impl OutcomeRange {
    pub fn nrr_band(&self) -> (f64, f64) {
        match self {
            OutcomeRange::BattingFirst(r) => (r.min_nrr, r.max_nrr),
            OutcomeRange::BowlingFirst(r) => (r.min_nrr, r.max_nrr),
        }
    }

    pub fn summary(&self) -> &str {
        match self {
            OutcomeRange::BattingFirst(r) => &r.summary,
            OutcomeRange::BowlingFirst(r) => &r.summary,
        }
    }
}

pub(crate) fn batting_summary(r: &BattingFirstRange) -> String {
    format!(
        "If {you} score {runs} runs in {overs} overs, {you} need to restrict {opp} \
         between {min} to {max} runs in {overs} overs. \
         Revised NRR of {you} will be between {lo} to {hi}.",
        you = r.your_team,
        runs = r.runs_scored,
        overs = r.overs_batted,
        opp = r.opposition_team,
        min = r.min_runs_to_restrict,
        max = r.max_runs_to_restrict,
        lo = format_nrr(r.min_nrr),
        hi = format_nrr(r.max_nrr),
    )
}

pub(crate) fn bowling_summary(r: &BowlingFirstRange) -> String {
    format!(
        "{you} need to chase {runs} runs between {min} and {max} overs. \
         Revised NRR for {you} will be between {lo} to {hi}.",
        you = r.your_team,
        runs = r.runs_to_chase,
        min = r.min_overs_to_chase,
        max = r.max_overs_to_chase,
        lo = format_nrr(r.min_nrr),
        hi = format_nrr(r.max_nrr),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_front_end_body() {
        let req: MatchRequest = serde_json::from_str(
            r#"{"yourTeam":"Rajasthan Royals","oppositionTeam":"Delhi Capitals",
                "matchOvers":20,"desiredPosition":3,"tossResult":"batting","runs":120}"#,
        )
        .unwrap();
        assert_eq!(req.toss_result, TossResult::Batting);
        assert_eq!(req.desired_position, 3);
    }

    #[test]
    fn toss_accepts_long_names() {
        let toss: TossResult = serde_json::from_str(r#""bowlingFirst""#).unwrap();
        assert_eq!(toss, TossResult::Bowling);
        let toss: TossResult = serde_json::from_str(r#""batting_first""#).unwrap();
        assert_eq!(toss, TossResult::Batting);
    }

    #[test]
    fn bowling_range_serialises_with_scenario_tag() {
        let mut range = BowlingFirstRange {
            your_team: "RR".into(),
            opposition_team: "DC".into(),
            runs_to_chase: 120,
            min_overs_to_chase: Overs::from_balls(86),
            max_overs_to_chase: Overs::whole(20),
            min_nrr: 0.278,
            max_nrr: 0.595,
            summary: String::new(),
        };
        range.summary = bowling_summary(&range);
        let json = serde_json::to_value(OutcomeRange::BowlingFirst(range)).unwrap();
        assert_eq!(json["scenario"], "bowling_first");
        assert_eq!(json["minOversToChase"], 14.2);
        assert_eq!(json["maxOversToChase"], 20.0);
        assert_eq!(json["minNRR"], 0.278);
        assert_eq!(
            json["summary"],
            "RR need to chase 120 runs between 14.2 and 20 overs. \
             Revised NRR for RR will be between 0.278 to 0.595."
        );
    }
}
