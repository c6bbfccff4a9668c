// Import pipelines: read a source file, resolve every row against the
// canonical roster, write the accepted rows and report the rest.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use dfsops_core::{
    CanonicalPlayer, ConfidenceTier, MatchMethod, MatchResult, MatchTally, NameQuery,
    PlayerMatcher, RosterIndex,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::{
    ActualRecord, Database, NflverseRecord, PlayerPoolEntry, ProjectionRecord, PropRecord,
    SalaryRecord,
};
use crate::sources::{
    self, ActualsCsvRow, DkSalaryRow, LoadedRows, NflverseStatRow, ProjectionCsvRow, PropCsvRow,
    SourceError, SourceRow,
};
use crate::team_cache::TeamCache;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Projections,
    Actuals,
    Props,
    Nflverse,
}

impl ImportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::Projections => "projections",
            ImportKind::Actuals => "actuals",
            ImportKind::Props => "props",
            ImportKind::Nflverse => "nflverse",
        }
    }
}

/// Compact view of a roster player for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSummary {
    pub player_dk_id: i64,
    pub display_name: String,
    pub position: String,
    pub team: String,
}

impl From<&CanonicalPlayer> for CandidateSummary {
    fn from(p: &CanonicalPlayer) -> Self {
        Self {
            player_dk_id: p.player_dk_id,
            display_name: p.display_name.clone(),
            position: p.position.to_string(),
            team: p.team.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// `candidates` is capped at `max_reported_candidates`; `candidate_count`
    /// is the full count.
    Ambiguous {
        tier: ConfidenceTier,
        candidate_count: usize,
        candidates: Vec<CandidateSummary>,
    },
    NoMatch,
}

/// A source row that was not written because it did not resolve to exactly
/// one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedPlayer {
    pub line: u64,
    pub query: NameQuery,
    #[serde(flatten)]
    pub reason: UnmatchedReason,
}

/// A row that matched, but below the auto-accept threshold, so it was held
/// back for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowConfidenceMatch {
    pub line: u64,
    pub query: NameQuery,
    pub player: CandidateSummary,
    pub confidence: ConfidenceTier,
    pub method: MatchMethod,
}

/// Outcome of one matched import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub kind: ImportKind,
    pub started_at: DateTime<Utc>,
    /// Rows that survived parsing and filtering and went to the matcher.
    pub total_rows: usize,
    /// Malformed rows plus rows for a different week/season.
    pub skipped_rows: usize,
    pub written_rows: usize,
    /// `successful_matches`, `failed_matches`, `ambiguous`, `no_match`,
    /// `by_confidence`.
    #[serde(flatten)]
    pub tally: MatchTally,
    pub unmatched_players: Vec<UnmatchedPlayer>,
    pub low_confidence: Vec<LowConfidenceMatch>,
}

impl ImportSummary {
    fn new(kind: ImportKind, skipped_rows: usize) -> Self {
        Self {
            kind,
            started_at: Utc::now(),
            total_rows: 0,
            skipped_rows,
            written_rows: 0,
            tally: MatchTally::new(),
            unmatched_players: Vec::new(),
            low_confidence: Vec::new(),
        }
    }

    pub fn successful_matches(&self) -> usize {
        self.tally.successful_matches
    }

    pub fn failed_matches(&self) -> usize {
        self.tally.failed_matches
    }
}

/// Outcome of a DraftKings player-pool import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerPoolSummary {
    pub draft_group_id: i64,
    pub started_at: DateTime<Utc>,
    pub total_rows: usize,
    pub skipped_rows: usize,
    pub players_written: usize,
    pub teams: usize,
    pub roster_size: usize,
}

// ---------------------------------------------------------------------------
// Importer
// ---------------------------------------------------------------------------

/// Runs imports against one database with one configuration.
pub struct Importer<'a> {
    db: &'a Database,
    config: &'a Config,
}

/// A row that resolved to a player and cleared the auto-accept threshold.
struct Accepted<T> {
    row: T,
    player_dk_id: i64,
}

impl<'a> Importer<'a> {
    pub fn new(db: &'a Database, config: &'a Config) -> Self {
        Self { db, config }
    }

    // ------------------------------------------------------------------
    // Player pool
    // ------------------------------------------------------------------

    pub fn import_player_pool(&self, path: &Path, draft_group_id: i64) -> Result<PlayerPoolSummary, ImportError> {
        let loaded = sources::draftkings::load(path)?;
        self.import_player_pool_rows(loaded, draft_group_id)
    }

    /// Write the canonical players and salaries from a DraftKings export.
    /// Duplicate IDs within one file keep the last row.
    pub fn import_player_pool_rows(
        &self,
        loaded: LoadedRows<DkSalaryRow>,
        draft_group_id: i64,
    ) -> Result<PlayerPoolSummary, ImportError> {
        let started_at = Utc::now();
        info!(
            "importing DraftKings player pool: {} rows for draft group {}",
            loaded.len(),
            draft_group_id
        );

        let entries: Vec<PlayerPoolEntry> = loaded
            .rows
            .iter()
            .map(|row| PlayerPoolEntry {
                player: row.to_player(),
                salary: SalaryRecord {
                    draft_group_id,
                    player_dk_id: row.player_dk_id,
                    roster_position: row.roster_position.clone(),
                    salary: row.salary,
                    avg_points: row.avg_points,
                    game_info: row.game_info.clone(),
                },
            })
            .collect();

        let mut teams = TeamCache::new(self.config.import.team_cache_capacity);
        let written = self.db.import_player_pool(&entries, &mut teams)?;
        let distinct_teams: BTreeSet<&str> = entries.iter().map(|e| e.player.team.as_str()).collect();

        let summary = PlayerPoolSummary {
            draft_group_id,
            started_at,
            total_rows: loaded.len(),
            skipped_rows: loaded.skipped,
            players_written: written,
            teams: distinct_teams.len(),
            roster_size: self.db.player_count()?,
        };
        info!(
            "player pool import done: {} players written, {} skipped, {} teams ({} cache hits)",
            summary.players_written,
            summary.skipped_rows,
            summary.teams,
            teams.hits()
        );
        Ok(summary)
    }

    // ------------------------------------------------------------------
    // Matched imports
    // ------------------------------------------------------------------

    pub fn import_projections(&self, path: &Path, week: u8, source: Option<&str>) -> Result<ImportSummary, ImportError> {
        let loaded = sources::projections::load(path)?;
        self.import_projection_rows(loaded, week, source)
    }

    /// `source` defaults to `import.default_projection_source`.
    pub fn import_projection_rows(
        &self,
        loaded: LoadedRows<ProjectionCsvRow>,
        week: u8,
        source: Option<&str>,
    ) -> Result<ImportSummary, ImportError> {
        let source = source
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.config.import.default_projection_source)
            .to_string();

        let (accepted, mut summary) = self.resolve(ImportKind::Projections, loaded.rows, loaded.skipped)?;
        let records: Vec<ProjectionRecord> = accepted
            .into_iter()
            .map(|a| ProjectionRecord {
                player_dk_id: a.player_dk_id,
                week,
                source: source.clone(),
                points: a.row.points,
                ownership: a.row.ownership,
            })
            .collect();
        summary.written_rows = self.db.write_projections(&records)?;
        Ok(finish(summary))
    }

    pub fn import_actuals(&self, path: &Path, week: u8) -> Result<ImportSummary, ImportError> {
        let loaded = sources::actuals::load(path)?;
        self.import_actuals_rows(loaded, week)
    }

    /// Rows that carry a different week are skipped; rows without a week
    /// column are taken to be for `week`.
    pub fn import_actuals_rows(&self, loaded: LoadedRows<ActualsCsvRow>, week: u8) -> Result<ImportSummary, ImportError> {
        let (rows, off_week) = partition_rows(loaded.rows, |r| r.week.map_or(true, |w| w == week));
        if off_week > 0 {
            info!("ignoring {off_week} actuals rows for weeks other than {week}");
        }

        let (accepted, mut summary) = self.resolve(ImportKind::Actuals, rows, loaded.skipped + off_week)?;
        let records: Vec<ActualRecord> = accepted
            .into_iter()
            .map(|a| ActualRecord {
                player_dk_id: a.player_dk_id,
                week,
                points: a.row.points,
            })
            .collect();
        summary.written_rows = self.db.write_actuals(&records)?;
        Ok(finish(summary))
    }

    pub fn import_props(&self, path: &Path, week: u8) -> Result<ImportSummary, ImportError> {
        let loaded = sources::props::load(path)?;
        self.import_prop_rows(loaded, week)
    }

    pub fn import_prop_rows(&self, loaded: LoadedRows<PropCsvRow>, week: u8) -> Result<ImportSummary, ImportError> {
        let (accepted, mut summary) = self.resolve(ImportKind::Props, loaded.rows, loaded.skipped)?;
        let records: Vec<PropRecord> = accepted
            .into_iter()
            .map(|a| PropRecord {
                player_dk_id: a.player_dk_id,
                week,
                market: a.row.market,
                bookmaker: a.row.bookmaker,
                line: a.row.prop_line,
                over_odds: a.row.over_odds,
                under_odds: a.row.under_odds,
            })
            .collect();
        summary.written_rows = self.db.write_props(&records)?;
        Ok(finish(summary))
    }

    /// `season` defaults to `import.season`.
    pub fn import_nflverse(&self, path: &Path, season: Option<u16>) -> Result<ImportSummary, ImportError> {
        let loaded = sources::nflverse::load(path)?;
        self.import_nflverse_rows(loaded, season)
    }

    pub fn import_nflverse_rows(
        &self,
        loaded: LoadedRows<NflverseStatRow>,
        season: Option<u16>,
    ) -> Result<ImportSummary, ImportError> {
        let season = season.unwrap_or(self.config.import.season);
        let (rows, off_season) = partition_rows(loaded.rows, |r| r.season == season);
        if off_season > 0 {
            info!("ignoring {off_season} NFLverse rows for seasons other than {season}");
        }

        let (accepted, mut summary) = self.resolve(ImportKind::Nflverse, rows, loaded.skipped + off_season)?;
        let records: Vec<NflverseRecord> = accepted
            .into_iter()
            .map(|a| {
                let r = a.row;
                NflverseRecord {
                    player_dk_id: a.player_dk_id,
                    season: r.season,
                    week: r.week,
                    passing_yards: r.passing_yards,
                    passing_tds: r.passing_tds,
                    interceptions: r.interceptions,
                    rushing_yards: r.rushing_yards,
                    rushing_tds: r.rushing_tds,
                    receptions: r.receptions,
                    targets: r.targets,
                    receiving_yards: r.receiving_yards,
                    receiving_tds: r.receiving_tds,
                    fantasy_points: r.fantasy_points,
                    fantasy_points_ppr: r.fantasy_points_ppr,
                }
            })
            .collect();
        summary.written_rows = self.db.write_nflverse(&records)?;
        Ok(finish(summary))
    }

    // ------------------------------------------------------------------
    // Matching
    // ------------------------------------------------------------------

    /// A matcher over the current roster with the configured options.
    pub fn matcher(&self) -> Result<PlayerMatcher, ImportError> {
        let roster = RosterIndex::new(self.db.load_roster()?);
        Ok(PlayerMatcher::new(roster, self.config.matching.matcher_options()))
    }

    /// Match every row, sorting each into accepted, low-confidence or
    /// unmatched. Nothing is written here.
    fn resolve<T: SourceRow>(
        &self,
        kind: ImportKind,
        rows: Vec<T>,
        skipped_rows: usize,
    ) -> Result<(Vec<Accepted<T>>, ImportSummary), ImportError> {
        let matcher = self.matcher()?;
        if matcher.roster().is_empty() {
            warn!("{} import: roster is empty, nothing can match", kind.as_str());
        }
        info!(
            "{} import: matching {} rows against {} players",
            kind.as_str(),
            rows.len(),
            matcher.roster().len()
        );

        let threshold = self.config.matching.auto_accept_min_confidence;
        let cap = self.config.matching.max_reported_candidates;
        let mut summary = ImportSummary::new(kind, skipped_rows);
        summary.total_rows = rows.len();
        let mut accepted = Vec::new();

        for row in rows {
            let query = row.query();
            let result = matcher.match_query(&query);
            summary.tally.record(&result);

            match result {
                MatchResult::Matched {
                    player,
                    confidence,
                    method,
                } => {
                    if confidence < threshold {
                        warn!(
                            "{} line {}: '{}' matched {} at {} (below {}), held for review",
                            kind.as_str(),
                            row.line(),
                            query.raw_name,
                            player.display_name,
                            confidence,
                            threshold
                        );
                        summary.low_confidence.push(LowConfidenceMatch {
                            line: row.line(),
                            query,
                            player: CandidateSummary::from(&player),
                            confidence,
                            method,
                        });
                        continue;
                    }
                    accepted.push(Accepted {
                        player_dk_id: player.player_dk_id,
                        row,
                    });
                }
                MatchResult::Ambiguous { tier, candidates } => {
                    warn!(
                        "{} line {}: '{}' is ambiguous at {} ({} candidates)",
                        kind.as_str(),
                        row.line(),
                        query,
                        tier,
                        candidates.len()
                    );
                    summary.unmatched_players.push(UnmatchedPlayer {
                        line: row.line(),
                        query,
                        reason: UnmatchedReason::Ambiguous {
                            tier,
                            candidate_count: candidates.len(),
                            candidates: candidates.iter().take(cap).map(CandidateSummary::from).collect(),
                        },
                    });
                }
                MatchResult::NoMatch => {
                    warn!("{} line {}: no match for '{}'", kind.as_str(), row.line(), query);
                    summary.unmatched_players.push(UnmatchedPlayer {
                        line: row.line(),
                        query,
                        reason: UnmatchedReason::NoMatch,
                    });
                }
            }
        }

        Ok((accepted, summary))
    }
}

/// Keep rows for which `keep` holds; return them with the count dropped.
fn partition_rows<T>(rows: Vec<T>, keep: impl Fn(&T) -> bool) -> (Vec<T>, usize) {
    let before = rows.len();
    let kept: Vec<T> = rows.into_iter().filter(|r| keep(r)).collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

fn finish(summary: ImportSummary) -> ImportSummary {
    info!(
        "{} import done: {} rows, {} written, {} matched, {} failed ({} ambiguous, {} unmatched), {} held, {} skipped",
        summary.kind.as_str(),
        summary.total_rows,
        summary.written_rows,
        summary.tally.successful_matches,
        summary.tally.failed_matches,
        summary.tally.ambiguous,
        summary.tally.no_match,
        summary.low_confidence.len(),
        summary.skipped_rows
    );
    summary
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
