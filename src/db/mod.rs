use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::standings::{Overs, StandingsSnapshot, TeamStanding};

/// Thread-safe SQLite handle (single connection behind a mutex) holding the
/// current points table.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path.
    /// `:memory:` gives a private in-memory store.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database mutex poisoned"))
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        self.conn()?.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    // ── Standings ────────────────────────────────────────────────────────────

    /// Replace the whole table in one transaction. Input order is kept as
    /// the tie order for rows that rank identically.
    pub fn replace_standings(&self, teams: &[TeamStanding]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM standings", [])?;
        let now = Utc::now();
        for (seq, t) in teams.iter().enumerate() {
            tx.execute(
                "INSERT INTO standings (
                    team, seq, matches, won, lost, points,
                    runs_for, balls_for, runs_against, balls_against, updated_at
                 ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
                params![
                    t.team,
                    seq as i64,
                    t.matches,
                    t.won,
                    t.lost,
                    t.points,
                    t.runs_for,
                    t.overs_for.balls(),
                    t.runs_against,
                    t.overs_against.balls(),
                    now,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// All rows in stored order.
    pub fn load_standings(&self) -> Result<Vec<TeamStanding>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT team, matches, won, lost, points,
                    runs_for, balls_for, runs_against, balls_against
             FROM standings ORDER BY seq",
        )?;
        let rows = stmt
            .query_map([], map_standing)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Validated, ranked snapshot of the stored table.
    pub fn load_snapshot(&self) -> Result<StandingsSnapshot> {
        Ok(StandingsSnapshot::new(self.load_standings()?)?)
    }

    pub fn standings_count(&self) -> Result<i64> {
        let count = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM standings", [], |r| r.get(0))?;
        Ok(count)
    }

    /// When the table was last replaced, if ever.
    pub fn last_updated(&self) -> Result<Option<DateTime<Utc>>> {
        let updated = self
            .conn()?
            .query_row("SELECT MAX(updated_at) FROM standings", [], |r| r.get(0))?;
        Ok(updated)
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

fn map_standing(row: &rusqlite::Row) -> rusqlite::Result<TeamStanding> {
    Ok(TeamStanding {
        team: row.get(0)?,
        matches: row.get(1)?,
        won: row.get(2)?,
        lost: row.get(3)?,
        points: row.get(4)?,
        runs_for: row.get(5)?,
        overs_for: Overs::from_balls(row.get(6)?),
        runs_against: row.get(7)?,
        overs_against: Overs::from_balls(row.get(8)?),
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS standings (
    team          TEXT    PRIMARY KEY,
    seq           INTEGER NOT NULL,
    matches       INTEGER NOT NULL,
    won           INTEGER NOT NULL,
    lost          INTEGER NOT NULL,
    points        INTEGER NOT NULL,
    runs_for      INTEGER NOT NULL,
    balls_for     INTEGER NOT NULL,
    runs_against  INTEGER NOT NULL,
    balls_against INTEGER NOT NULL,
    updated_at    TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_standings_seq ON standings(seq);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standings::seed::default_table;

    fn memory_db() -> Database {
        Database::open(":memory:").unwrap()
    }

    #[test]
    fn empty_store_has_no_rows() {
        let db = memory_db();
        assert_eq!(db.standings_count().unwrap(), 0);
        assert_eq!(db.last_updated().unwrap(), None);
        assert!(db.load_snapshot().unwrap().is_empty());
    }

    #[test]
    fn stores_and_reloads_table() {
        let db = memory_db();
        let teams = default_table().unwrap();
        db.replace_standings(&teams).unwrap();
        assert_eq!(db.standings_count().unwrap(), 5);
        assert_eq!(db.load_standings().unwrap(), teams);
        assert!(db.last_updated().unwrap().is_some());
    }

    #[test]
    fn replace_overwrites_previous_table() {
        let db = memory_db();
        let teams = default_table().unwrap();
        db.replace_standings(&teams).unwrap();
        db.replace_standings(&teams[..2]).unwrap();
        assert_eq!(db.standings_count().unwrap(), 2);
    }

    #[test]
    fn snapshot_is_ranked() {
        let db = memory_db();
        let mut teams = default_table().unwrap();
        teams.reverse();
        db.replace_standings(&teams).unwrap();
        let snapshot = db.load_snapshot().unwrap();
        assert_eq!(snapshot.team_at(1).unwrap().team(), "Chennai Super Kings");
    }

    #[test]
    fn overs_survive_as_balls() {
        let db = memory_db();
        db.replace_standings(&default_table().unwrap()).unwrap();
        let rr = db
            .load_standings()
            .unwrap()
            .into_iter()
            .find(|t| t.team == "Rajasthan Royals")
            .unwrap();
        assert_eq!(rr.overs_for.to_string(), "128.2");
        assert_eq!(rr.overs_against.to_string(), "137.1");
    }
}
