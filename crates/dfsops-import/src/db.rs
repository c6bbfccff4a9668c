// SQLite persistence layer for the canonical roster and imported data.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use dfsops_core::{CanonicalPlayer, Position};
use rusqlite::{params, Connection, OptionalExtension, Transaction};

use crate::team_cache::TeamCache;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A player's salary on one DraftKings draft group.
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryRecord {
    pub draft_group_id: i64,
    pub player_dk_id: i64,
    pub roster_position: String,
    pub salary: u32,
    pub avg_points: f64,
    pub game_info: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionRecord {
    pub player_dk_id: i64,
    pub week: u8,
    pub source: String,
    pub points: f64,
    pub ownership: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActualRecord {
    pub player_dk_id: i64,
    pub week: u8,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropRecord {
    pub player_dk_id: i64,
    pub week: u8,
    pub market: String,
    pub bookmaker: String,
    pub line: f64,
    pub over_odds: Option<i32>,
    pub under_odds: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NflverseRecord {
    pub player_dk_id: i64,
    pub season: u16,
    pub week: u8,
    pub passing_yards: f64,
    pub passing_tds: f64,
    pub interceptions: f64,
    pub rushing_yards: f64,
    pub rushing_tds: f64,
    pub receptions: f64,
    pub targets: f64,
    pub receiving_yards: f64,
    pub receiving_tds: f64,
    pub fantasy_points: f64,
    pub fantasy_points_ppr: f64,
}

/// A canonical player plus the slate-specific salary row that came with it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPoolEntry {
    pub player: CanonicalPlayer,
    pub salary: SalaryRecord,
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

/// SQLite-backed persistence for teams, the canonical player roster and
/// everything the importers attach to it.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS teams (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                abbreviation TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS players (
                player_dk_id INTEGER PRIMARY KEY,
                first_name   TEXT NOT NULL,
                last_name    TEXT NOT NULL,
                display_name TEXT NOT NULL,
                short_name   TEXT,
                position     TEXT NOT NULL,
                team_id      INTEGER NOT NULL REFERENCES teams(id),
                updated_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE IF NOT EXISTS salaries (
                draft_group_id  INTEGER NOT NULL,
                player_dk_id    INTEGER NOT NULL REFERENCES players(player_dk_id),
                roster_position TEXT NOT NULL,
                salary          INTEGER NOT NULL,
                avg_points      REAL NOT NULL,
                game_info       TEXT NOT NULL,
                PRIMARY KEY (draft_group_id, player_dk_id)
            );

            CREATE TABLE IF NOT EXISTS projections (
                player_dk_id INTEGER NOT NULL REFERENCES players(player_dk_id),
                week         INTEGER NOT NULL,
                source       TEXT NOT NULL,
                points       REAL NOT NULL,
                ownership    REAL,
                PRIMARY KEY (player_dk_id, week, source)
            );

            CREATE TABLE IF NOT EXISTS actuals (
                player_dk_id INTEGER NOT NULL REFERENCES players(player_dk_id),
                week         INTEGER NOT NULL,
                points       REAL NOT NULL,
                PRIMARY KEY (player_dk_id, week)
            );

            CREATE TABLE IF NOT EXISTS player_props (
                player_dk_id INTEGER NOT NULL REFERENCES players(player_dk_id),
                week         INTEGER NOT NULL,
                market       TEXT NOT NULL,
                bookmaker    TEXT NOT NULL,
                line         REAL NOT NULL,
                over_odds    INTEGER,
                under_odds   INTEGER,
                PRIMARY KEY (player_dk_id, week, market, bookmaker)
            );

            CREATE TABLE IF NOT EXISTS nflverse_stats (
                player_dk_id       INTEGER NOT NULL REFERENCES players(player_dk_id),
                season             INTEGER NOT NULL,
                week               INTEGER NOT NULL,
                passing_yards      REAL NOT NULL,
                passing_tds        REAL NOT NULL,
                interceptions      REAL NOT NULL,
                rushing_yards      REAL NOT NULL,
                rushing_tds        REAL NOT NULL,
                receptions         REAL NOT NULL,
                targets            REAL NOT NULL,
                receiving_yards    REAL NOT NULL,
                receiving_tds      REAL NOT NULL,
                fantasy_points     REAL NOT NULL,
                fantasy_points_ppr REAL NOT NULL,
                PRIMARY KEY (player_dk_id, season, week)
            );

            CREATE INDEX IF NOT EXISTS idx_players_display_name ON players(display_name);
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Teams and players
    // ------------------------------------------------------------------

    /// Insert a team abbreviation if new and return its row id.
    pub fn upsert_team(&self, abbreviation: &str) -> Result<i64> {
        let conn = self.conn();
        upsert_team_on(&conn, abbreviation)
    }

    /// Insert or update a single canonical player.
    pub fn upsert_player(&self, player: &CanonicalPlayer) -> Result<()> {
        let conn = self.conn();
        let team_id = upsert_team_on(&conn, &player.team)?;
        upsert_player_on(&conn, player, team_id)
    }

    /// Import a DraftKings player pool in one transaction: teams (resolved
    /// through `teams`), canonical players keyed by `player_dk_id`, and the
    /// salary rows for the draft group. Returns the number of players written.
    pub fn import_player_pool(&self, entries: &[PlayerPoolEntry], teams: &mut TeamCache) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .context("failed to begin player pool transaction")?;

        for entry in entries {
            let team_id = teams.team_id(&tx, &entry.player.team)?;
            upsert_player_on(&tx, &entry.player, team_id)?;
            record_salary_on(&tx, &entry.salary)?;
        }

        tx.commit().context("failed to commit player pool import")?;
        Ok(entries.len())
    }

    /// Snapshot every canonical player, ordered by `player_dk_id`.
    pub fn load_roster(&self) -> Result<Vec<CanonicalPlayer>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT p.player_dk_id, p.first_name, p.last_name, p.display_name,
                        p.short_name, p.position, t.abbreviation
                 FROM players p JOIN teams t ON t.id = p.team_id
                 ORDER BY p.player_dk_id",
            )
            .context("failed to prepare load_roster query")?;

        let players = stmt
            .query_map([], |row| {
                let position: String = row.get(5)?;
                Ok(CanonicalPlayer {
                    player_dk_id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    display_name: row.get(3)?,
                    short_name: row.get(4)?,
                    position: Position::parse(&position)
                        .unwrap_or(Position::Other(position)),
                    team: row.get(6)?,
                })
            })
            .context("failed to query players")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map player rows")?;

        Ok(players)
    }

    /// Record one player's salary for a draft group, replacing any prior row.
    pub fn record_salary(&self, salary: &SalaryRecord) -> Result<()> {
        let conn = self.conn();
        record_salary_on(&conn, salary)
    }

    pub fn player_count(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM players")
    }

    pub fn team_count(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM teams")
    }

    fn count(&self, sql: &str) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row(sql, [], |row| row.get(0))
            .with_context(|| format!("failed to run count query: {sql}"))?;
        Ok(count as usize)
    }

    /// Salary for one player on one draft group.
    pub fn salary_for(&self, draft_group_id: i64, player_dk_id: i64) -> Result<Option<SalaryRecord>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT draft_group_id, player_dk_id, roster_position, salary, avg_points, game_info
             FROM salaries WHERE draft_group_id = ?1 AND player_dk_id = ?2",
            params![draft_group_id, player_dk_id],
            |row| {
                Ok(SalaryRecord {
                    draft_group_id: row.get(0)?,
                    player_dk_id: row.get(1)?,
                    roster_position: row.get(2)?,
                    salary: row.get(3)?,
                    avg_points: row.get(4)?,
                    game_info: row.get(5)?,
                })
            },
        )
        .optional()
        .context("failed to query salary")
    }

    // ------------------------------------------------------------------
    // Matched imports
    // ------------------------------------------------------------------

    /// Run `write` for every record inside one transaction. Any failure rolls
    /// the whole batch back.
    fn write_batch<T>(
        &self,
        what: &str,
        records: &[T],
        write: impl Fn(&Transaction<'_>, &T) -> rusqlite::Result<usize>,
    ) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .with_context(|| format!("failed to begin {what} transaction"))?;
        for record in records {
            write(&tx, record).with_context(|| format!("failed to write {what} row"))?;
        }
        tx.commit()
            .with_context(|| format!("failed to commit {what} batch"))?;
        Ok(records.len())
    }

    /// Upsert projections. Re-importing the same (player, week, source)
    /// overwrites the prior value.
    pub fn write_projections(&self, records: &[ProjectionRecord]) -> Result<usize> {
        self.write_batch("projection", records, |tx, r| {
            tx.execute(
                "INSERT OR REPLACE INTO projections (player_dk_id, week, source, points, ownership)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![r.player_dk_id, r.week, r.source, r.points, r.ownership],
            )
        })
    }

    pub fn projection_for(&self, player_dk_id: i64, week: u8, source: &str) -> Result<Option<ProjectionRecord>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT player_dk_id, week, source, points, ownership
             FROM projections WHERE player_dk_id = ?1 AND week = ?2 AND source = ?3",
            params![player_dk_id, week, source],
            |row| {
                Ok(ProjectionRecord {
                    player_dk_id: row.get(0)?,
                    week: row.get(1)?,
                    source: row.get(2)?,
                    points: row.get(3)?,
                    ownership: row.get(4)?,
                })
            },
        )
        .optional()
        .context("failed to query projection")
    }

    pub fn write_actuals(&self, records: &[ActualRecord]) -> Result<usize> {
        self.write_batch("actuals", records, |tx, r| {
            tx.execute(
                "INSERT OR REPLACE INTO actuals (player_dk_id, week, points) VALUES (?1, ?2, ?3)",
                params![r.player_dk_id, r.week, r.points],
            )
        })
    }

    pub fn actual_for(&self, player_dk_id: i64, week: u8) -> Result<Option<ActualRecord>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT player_dk_id, week, points FROM actuals WHERE player_dk_id = ?1 AND week = ?2",
            params![player_dk_id, week],
            |row| {
                Ok(ActualRecord {
                    player_dk_id: row.get(0)?,
                    week: row.get(1)?,
                    points: row.get(2)?,
                })
            },
        )
        .optional()
        .context("failed to query actual points")
    }

    pub fn write_props(&self, records: &[PropRecord]) -> Result<usize> {
        self.write_batch("prop", records, |tx, r| {
            tx.execute(
                "INSERT OR REPLACE INTO player_props
                    (player_dk_id, week, market, bookmaker, line, over_odds, under_odds)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    r.player_dk_id,
                    r.week,
                    r.market,
                    r.bookmaker,
                    r.line,
                    r.over_odds,
                    r.under_odds,
                ],
            )
        })
    }

    /// All prop lines for a player in a week, ordered by market then book.
    pub fn props_for(&self, player_dk_id: i64, week: u8) -> Result<Vec<PropRecord>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT player_dk_id, week, market, bookmaker, line, over_odds, under_odds
                 FROM player_props WHERE player_dk_id = ?1 AND week = ?2
                 ORDER BY market, bookmaker",
            )
            .context("failed to prepare props_for query")?;
        let props = stmt
            .query_map(params![player_dk_id, week], |row| {
                Ok(PropRecord {
                    player_dk_id: row.get(0)?,
                    week: row.get(1)?,
                    market: row.get(2)?,
                    bookmaker: row.get(3)?,
                    line: row.get(4)?,
                    over_odds: row.get(5)?,
                    under_odds: row.get(6)?,
                })
            })
            .context("failed to query props")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map prop rows")?;
        Ok(props)
    }

    pub fn write_nflverse(&self, records: &[NflverseRecord]) -> Result<usize> {
        self.write_batch("NFLverse", records, |tx, r| {
            tx.execute(
                "INSERT OR REPLACE INTO nflverse_stats
                    (player_dk_id, season, week, passing_yards, passing_tds, interceptions,
                     rushing_yards, rushing_tds, receptions, targets, receiving_yards,
                     receiving_tds, fantasy_points, fantasy_points_ppr)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    r.player_dk_id,
                    r.season,
                    r.week,
                    r.passing_yards,
                    r.passing_tds,
                    r.interceptions,
                    r.rushing_yards,
                    r.rushing_tds,
                    r.receptions,
                    r.targets,
                    r.receiving_yards,
                    r.receiving_tds,
                    r.fantasy_points,
                    r.fantasy_points_ppr,
                ],
            )
        })
    }

    pub fn nflverse_for(&self, player_dk_id: i64, season: u16, week: u8) -> Result<Option<NflverseRecord>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT player_dk_id, season, week, passing_yards, passing_tds, interceptions,
                    rushing_yards, rushing_tds, receptions, targets, receiving_yards,
                    receiving_tds, fantasy_points, fantasy_points_ppr
             FROM nflverse_stats WHERE player_dk_id = ?1 AND season = ?2 AND week = ?3",
            params![player_dk_id, season, week],
            |row| {
                Ok(NflverseRecord {
                    player_dk_id: row.get(0)?,
                    season: row.get(1)?,
                    week: row.get(2)?,
                    passing_yards: row.get(3)?,
                    passing_tds: row.get(4)?,
                    interceptions: row.get(5)?,
                    rushing_yards: row.get(6)?,
                    rushing_tds: row.get(7)?,
                    receptions: row.get(8)?,
                    targets: row.get(9)?,
                    receiving_yards: row.get(10)?,
                    receiving_tds: row.get(11)?,
                    fantasy_points: row.get(12)?,
                    fantasy_points_ppr: row.get(13)?,
                })
            },
        )
        .optional()
        .context("failed to query NFLverse stats")
    }
}

// ---------------------------------------------------------------------------
// Connection-level helpers (usable inside a transaction)
// ---------------------------------------------------------------------------

/// Insert `abbreviation` into `teams` if absent and return its id in a single
/// statement. The no-op `DO UPDATE` makes `RETURNING` yield the existing row.
pub(crate) fn upsert_team_on(conn: &Connection, abbreviation: &str) -> Result<i64> {
    let id: i64 = conn
        .query_row(
            "INSERT INTO teams (abbreviation) VALUES (?1)
             ON CONFLICT(abbreviation) DO UPDATE SET abbreviation = excluded.abbreviation
             RETURNING id",
            params![abbreviation],
            |row| row.get(0),
        )
        .with_context(|| format!("failed to upsert team {abbreviation}"))?;
    Ok(id)
}

fn upsert_player_on(conn: &Connection, player: &CanonicalPlayer, team_id: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO players
            (player_dk_id, first_name, last_name, display_name, short_name, position, team_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(player_dk_id) DO UPDATE SET
            first_name   = excluded.first_name,
            last_name    = excluded.last_name,
            display_name = excluded.display_name,
            short_name   = excluded.short_name,
            position     = excluded.position,
            team_id      = excluded.team_id,
            updated_at   = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        params![
            player.player_dk_id,
            player.first_name,
            player.last_name,
            player.display_name,
            player.short_name,
            player.position.as_str(),
            team_id,
        ],
    )
    .with_context(|| format!("failed to upsert player {}", player.player_dk_id))?;
    Ok(())
}

fn record_salary_on(conn: &Connection, salary: &SalaryRecord) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO salaries
            (draft_group_id, player_dk_id, roster_position, salary, avg_points, game_info)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            salary.draft_group_id,
            salary.player_dk_id,
            salary.roster_position,
            salary.salary,
            salary.avg_points,
            salary.game_info,
        ],
    )
    .context("failed to record salary")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: create a fresh in-memory database for each test.
    fn test_db() -> Database {
        Database::open(":memory:").expect("in-memory database should open")
    }

    fn allen() -> CanonicalPlayer {
        CanonicalPlayer::new(39971296, "Josh Allen", Position::QB, "BUF")
    }

    fn pool_entry(player: CanonicalPlayer, salary: u32) -> PlayerPoolEntry {
        PlayerPoolEntry {
            salary: SalaryRecord {
                draft_group_id: 100,
                player_dk_id: player.player_dk_id,
                roster_position: player.position.to_string(),
                salary,
                avg_points: 20.0,
                game_info: "BUF@MIA".into(),
            },
            player,
        }
    }

    // ------------------------------------------------------------------
    // Schema / open
    // ------------------------------------------------------------------

    #[test]
    fn open_creates_tables() {
        let db = test_db();
        let conn = db.conn();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        for table in [
            "teams",
            "players",
            "salaries",
            "projections",
            "actuals",
            "player_props",
            "nflverse_stats",
        ] {
            assert!(tables.contains(&table.to_string()), "missing table {table}");
        }
    }

    // ------------------------------------------------------------------
    // Teams and players
    // ------------------------------------------------------------------

    #[test]
    fn upsert_team_is_idempotent() {
        let db = test_db();
        let a = db.upsert_team("BUF").unwrap();
        let b = db.upsert_team("BUF").unwrap();
        let c = db.upsert_team("MIA").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(db.team_count().unwrap(), 2);
    }

    #[test]
    fn upsert_player_round_trips_through_roster() {
        let db = test_db();
        db.upsert_player(&allen()).unwrap();

        let roster = db.load_roster().unwrap();
        assert_eq!(roster, vec![allen()]);
    }

    #[test]
    fn upsert_player_updates_team_and_name_in_place() {
        let db = test_db();
        db.upsert_player(&CanonicalPlayer::new(5, "Stefon Diggs", Position::WR, "BUF"))
            .unwrap();
        db.upsert_player(&CanonicalPlayer::new(5, "Stefon Diggs", Position::WR, "HOU"))
            .unwrap();

        let roster = db.load_roster().unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].team, "HOU");
    }

    #[test]
    fn unknown_positions_survive_round_trip() {
        let db = test_db();
        let lb = CanonicalPlayer::new(2, "Josh Allen", Position::Other("LB".into()), "JAX");
        db.upsert_player(&lb).unwrap();
        assert_eq!(db.load_roster().unwrap()[0].position, Position::Other("LB".into()));
    }

    #[test]
    fn roster_ordered_by_id() {
        let db = test_db();
        db.upsert_player(&CanonicalPlayer::new(30, "C", Position::QB, "BUF")).unwrap();
        db.upsert_player(&CanonicalPlayer::new(10, "A", Position::QB, "BUF")).unwrap();
        db.upsert_player(&CanonicalPlayer::new(20, "B", Position::QB, "BUF")).unwrap();
        let ids: Vec<i64> = db.load_roster().unwrap().iter().map(|p| p.player_dk_id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn import_player_pool_writes_players_teams_and_salaries() {
        let db = test_db();
        let mut teams = TeamCache::new(8);
        let entries = vec![
            pool_entry(allen(), 8200),
            pool_entry(CanonicalPlayer::new(7, "Bills", Position::DST, "BUF"), 3200),
            pool_entry(CanonicalPlayer::new(8, "Tua Tagovailoa", Position::QB, "MIA"), 5800),
        ];

        let written = db.import_player_pool(&entries, &mut teams).unwrap();
        assert_eq!(written, 3);
        assert_eq!(db.player_count().unwrap(), 3);
        assert_eq!(db.team_count().unwrap(), 2);
        assert_eq!(teams.misses(), 2);
        assert_eq!(teams.hits(), 1);

        let salary = db.salary_for(100, 39971296).unwrap().unwrap();
        assert_eq!(salary.salary, 8200);
        assert_eq!(salary.roster_position, "QB");
        assert!(db.salary_for(999, 39971296).unwrap().is_none());
    }

    // ------------------------------------------------------------------
    // Matched imports
    // ------------------------------------------------------------------

    #[test]
    fn projections_replace_on_conflict() {
        let db = test_db();
        db.upsert_player(&allen()).unwrap();

        let mut record = ProjectionRecord {
            player_dk_id: allen().player_dk_id,
            week: 3,
            source: "consensus".into(),
            points: 22.0,
            ownership: Some(15.0),
        };
        db.write_projections(std::slice::from_ref(&record)).unwrap();
        record.points = 24.5;
        record.ownership = None;
        db.write_projections(std::slice::from_ref(&record)).unwrap();

        let stored = db.projection_for(allen().player_dk_id, 3, "consensus").unwrap();
        assert_eq!(stored, Some(record));
        assert!(db.projection_for(allen().player_dk_id, 3, "other").unwrap().is_none());
    }

    #[test]
    fn batch_rolls_back_on_foreign_key_failure() {
        let db = test_db();
        db.upsert_player(&allen()).unwrap();

        let records = vec![
            ActualRecord {
                player_dk_id: allen().player_dk_id,
                week: 1,
                points: 30.0,
            },
            ActualRecord {
                player_dk_id: 424242,
                week: 1,
                points: 5.0,
            },
        ];
        assert!(db.write_actuals(&records).is_err());
        assert!(db.actual_for(allen().player_dk_id, 1).unwrap().is_none());
    }

    #[test]
    fn actuals_round_trip() {
        let db = test_db();
        db.upsert_player(&allen()).unwrap();
        let record = ActualRecord {
            player_dk_id: allen().player_dk_id,
            week: 2,
            points: 31.4,
        };
        assert_eq!(db.write_actuals(std::slice::from_ref(&record)).unwrap(), 1);
        assert_eq!(db.actual_for(allen().player_dk_id, 2).unwrap(), Some(record));
    }

    #[test]
    fn props_keyed_by_market_and_book() {
        let db = test_db();
        db.upsert_player(&allen()).unwrap();
        let prop = |market: &str, book: &str, line: f64| PropRecord {
            player_dk_id: allen().player_dk_id,
            week: 1,
            market: market.into(),
            bookmaker: book.into(),
            line,
            over_odds: Some(-110),
            under_odds: Some(-110),
        };
        db.write_props(&[
            prop("player_pass_yds", "fanduel", 260.5),
            prop("player_pass_yds", "draftkings", 262.5),
            prop("player_pass_yds", "draftkings", 264.5),
        ])
        .unwrap();

        let props = db.props_for(allen().player_dk_id, 1).unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(props[0].bookmaker, "draftkings");
        assert!((props[0].line - 264.5).abs() < f64::EPSILON);
        assert_eq!(props[1].bookmaker, "fanduel");
    }

    #[test]
    fn nflverse_round_trip() {
        let db = test_db();
        db.upsert_player(&allen()).unwrap();
        let record = NflverseRecord {
            player_dk_id: allen().player_dk_id,
            season: 2025,
            week: 1,
            passing_yards: 394.0,
            passing_tds: 2.0,
            interceptions: 0.0,
            rushing_yards: 30.0,
            rushing_tds: 2.0,
            receptions: 0.0,
            targets: 0.0,
            receiving_yards: 0.0,
            receiving_tds: 0.0,
            fantasy_points: 38.76,
            fantasy_points_ppr: 38.76,
        };
        db.write_nflverse(std::slice::from_ref(&record)).unwrap();
        assert_eq!(db.nflverse_for(allen().player_dk_id, 2025, 1).unwrap(), Some(record));
        assert!(db.nflverse_for(allen().player_dk_id, 2024, 1).unwrap().is_none());
    }

    #[test]
    fn foreign_keys_enforced() {
        let db = test_db();
        let result = db.write_projections(&[ProjectionRecord {
            player_dk_id: 1,
            week: 1,
            source: "x".into(),
            points: 1.0,
            ownership: None,
        }]);
        assert!(result.is_err());
    }
}
