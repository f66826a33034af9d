use anyhow::{Context, Result};
use std::path::Path;

use super::TeamStanding;
#[cfg(test)]
use super::StandingsSnapshot;

/// Built-in points table used when no seed file is configured.
pub const DEFAULT_TABLE_JSON: &str = include_str!("../../data/points_table.json");

/// Parse a JSON array of standings rows. Any `nrr` field present in the
/// input is ignored; NRR is always derived.
pub fn parse_table(json: &str) -> Result<Vec<TeamStanding>> {
    serde_json::from_str(json).context("Failed to parse standings JSON")
}

pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<TeamStanding>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read standings file {}", path.display()))?;
    parse_table(&json)
}

pub fn default_table() -> Result<Vec<TeamStanding>> {
    parse_table(DEFAULT_TABLE_JSON)
}

#[cfg(test)]
pub fn default_snapshot() -> Result<StandingsSnapshot> {
    Ok(StandingsSnapshot::new(default_table()?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_valid() {
        let snapshot = default_snapshot().unwrap();
        assert_eq!(snapshot.len(), 5);
    }

    #[test]
    fn ignores_supplied_nrr() {
        let teams = parse_table(
            r#"[{"team":"X","matches":1,"won":1,"lost":0,"points":2,"nrr":9.9,
                 "runsFor":120,"oversFor":20,"runsAgainst":100,"oversAgainst":20}]"#,
        )
        .unwrap();
        assert_eq!(teams[0].nrr(), Ok(1.0));
    }

    #[test]
    fn rejects_illegal_overs_in_seed() {
        let err = parse_table(
            r#"[{"team":"X","matches":1,"won":1,"lost":0,"points":2,
                 "runsFor":120,"oversFor":19.7,"runsAgainst":100,"oversAgainst":20}]"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_file("/nonexistent/points.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/points.json"));
    }
}
