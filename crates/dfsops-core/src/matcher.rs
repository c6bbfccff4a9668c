// Player identity matching: resolve a free-text name against the canonical
// roster with a tiered cascade that never guesses between equal candidates.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

use crate::normalize::normalize;
use crate::player::{CanonicalPlayer, Position};
use crate::team::{canonical_team, same_team};

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// A name to resolve, as scraped or parsed from a third-party row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameQuery {
    pub raw_name: String,
    pub team: Option<String>,
    pub position: Option<String>,
}

impl NameQuery {
    /// Build a query. Empty or whitespace-only team/position strings are
    /// treated as absent, since most sources send `""` rather than omitting
    /// the column.
    pub fn new(raw_name: &str, team: Option<&str>, position: Option<&str>) -> Self {
        let non_empty = |s: Option<&str>| {
            s.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            raw_name: raw_name.to_string(),
            team: non_empty(team),
            position: non_empty(position),
        }
    }

    /// Name-only query.
    pub fn name(raw_name: &str) -> Self {
        Self::new(raw_name, None, None)
    }
}

impl fmt::Display for NameQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.raw_name,
            self.team.as_deref().unwrap_or("-"),
            self.position.as_deref().unwrap_or("-")
        )
    }
}

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

/// How much query context was needed to reach a unique match. Declared
/// weakest-first so the derived ordering gives `Exact > ... > NameOnly`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    NameOnly,
    Partial,
    ExactNoTeam,
    Exact,
}

impl ConfidenceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::Exact => "exact",
            ConfidenceTier::ExactNoTeam => "exact_no_team",
            ConfidenceTier::Partial => "partial",
            ConfidenceTier::NameOnly => "name_only",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The finer-grained label for how a unique match was found. Every method
/// collapses to exactly one `ConfidenceTier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Name, position and team all equal.
    Exact,
    /// Name and position equal; the query carried no team.
    ExactNoTeam,
    /// Name and position equal; the query's team differs from the roster
    /// (typically a traded player whose source data is stale).
    ExactTeamMismatch,
    /// Normalized query is a substring of the normalized display name and
    /// the position is equal.
    Partial,
    /// Normalized substring match with no position or team check.
    NameOnly,
}

impl MatchMethod {
    pub fn tier(&self) -> ConfidenceTier {
        match self {
            MatchMethod::Exact => ConfidenceTier::Exact,
            MatchMethod::ExactNoTeam | MatchMethod::ExactTeamMismatch => {
                ConfidenceTier::ExactNoTeam
            }
            MatchMethod::Partial => ConfidenceTier::Partial,
            MatchMethod::NameOnly => ConfidenceTier::NameOnly,
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Outcome of resolving one `NameQuery`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchResult {
    Matched {
        player: CanonicalPlayer,
        confidence: ConfidenceTier,
        method: MatchMethod,
    },
    /// Two or more equally-qualified candidates at `tier`, ordered by
    /// `player_dk_id`.
    Ambiguous {
        tier: ConfidenceTier,
        candidates: Vec<CanonicalPlayer>,
    },
    NoMatch,
}

impl MatchResult {
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }

    /// The matched player, if any.
    pub fn player(&self) -> Option<&CanonicalPlayer> {
        match self {
            MatchResult::Matched { player, .. } => Some(player),
            _ => None,
        }
    }

    pub fn confidence(&self) -> Option<ConfidenceTier> {
        match self {
            MatchResult::Matched { confidence, .. } => Some(*confidence),
            _ => None,
        }
    }

    /// Candidate list of an ambiguous result; empty otherwise.
    pub fn candidates(&self) -> &[CanonicalPlayer] {
        match self {
            MatchResult::Ambiguous { candidates, .. } => candidates,
            _ => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Roster snapshot
// ---------------------------------------------------------------------------

/// A roster player with its comparison keys precomputed.
#[derive(Debug, Clone)]
struct RosterEntry {
    player: CanonicalPlayer,
    /// Trimmed, lower-cased display name (exact tiers; suffix-sensitive).
    name_lower: String,
    /// `normalize(display_name)` (substring tiers; suffix-tolerant).
    name_norm: String,
    team: String,
}

/// Immutable snapshot of the canonical roster for one batch of matches.
///
/// Players are held in `player_dk_id` order so that every candidate list the
/// matcher returns is deterministic regardless of how the caller loaded them.
#[derive(Debug, Clone, Default)]
pub struct RosterIndex {
    entries: Vec<RosterEntry>,
}

impl RosterIndex {
    /// Build a snapshot. Duplicate `player_dk_id`s keep the first occurrence.
    pub fn new(players: impl IntoIterator<Item = CanonicalPlayer>) -> Self {
        let mut seen = HashSet::new();
        let mut entries: Vec<RosterEntry> = Vec::new();
        for player in players {
            if !seen.insert(player.player_dk_id) {
                warn!(
                    "duplicate player_dk_id {} ('{}') in roster snapshot, keeping first",
                    player.player_dk_id, player.display_name
                );
                continue;
            }
            entries.push(RosterEntry {
                name_lower: player.display_name.trim().to_lowercase(),
                name_norm: normalize(&player.display_name),
                team: canonical_team(&player.team),
                player,
            });
        }
        entries.sort_by_key(|e| e.player.player_dk_id);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn players(&self) -> impl Iterator<Item = &CanonicalPlayer> {
        self.entries.iter().map(|e| &e.player)
    }

    pub fn get(&self, player_dk_id: i64) -> Option<&CanonicalPlayer> {
        self.entries
            .binary_search_by_key(&player_dk_id, |e| e.player.player_dk_id)
            .ok()
            .map(|i| &self.entries[i].player)
    }
}

// ---------------------------------------------------------------------------
// Cascade
// ---------------------------------------------------------------------------

/// Comparison keys derived once per query.
struct QueryKey {
    name_lower: String,
    name_norm: String,
    team: Option<String>,
    position: Option<Position>,
}

impl QueryKey {
    fn from_query(query: &NameQuery) -> Self {
        Self {
            name_lower: query.raw_name.trim().to_lowercase(),
            name_norm: normalize(&query.raw_name),
            team: query
                .team
                .as_deref()
                .map(canonical_team)
                .filter(|t| !t.is_empty()),
            position: query.position.as_deref().and_then(Position::parse),
        }
    }
}

/// One step of the cascade. `applies` decides whether the query carries the
/// context the step needs; `accepts` filters roster entries.
struct TierRule {
    tier: ConfidenceTier,
    applies: fn(&QueryKey) -> bool,
    accepts: fn(&QueryKey, &RosterEntry) -> bool,
}

fn same_position(q: &QueryKey, e: &RosterEntry) -> bool {
    q.position.as_ref() == Some(&e.player.position)
}

fn has_team_and_position(q: &QueryKey) -> bool {
    q.team.is_some() && q.position.is_some()
}

fn has_position(q: &QueryKey) -> bool {
    q.position.is_some()
}

fn always(_: &QueryKey) -> bool {
    true
}

fn exact_name_position_team(q: &QueryKey, e: &RosterEntry) -> bool {
    e.name_lower == q.name_lower
        && same_position(q, e)
        && q.team.as_deref() == Some(e.team.as_str())
}

fn exact_name_position(q: &QueryKey, e: &RosterEntry) -> bool {
    e.name_lower == q.name_lower && same_position(q, e)
}

fn partial_name_position(q: &QueryKey, e: &RosterEntry) -> bool {
    e.name_norm.contains(q.name_norm.as_str()) && same_position(q, e)
}

fn partial_name(q: &QueryKey, e: &RosterEntry) -> bool {
    e.name_norm.contains(q.name_norm.as_str())
}

/// Strictest first.
const CASCADE: [TierRule; 4] = [
    TierRule {
        tier: ConfidenceTier::Exact,
        applies: has_team_and_position,
        accepts: exact_name_position_team,
    },
    TierRule {
        tier: ConfidenceTier::ExactNoTeam,
        applies: has_position,
        accepts: exact_name_position,
    },
    TierRule {
        tier: ConfidenceTier::Partial,
        applies: has_position,
        accepts: partial_name_position,
    },
    TierRule {
        tier: ConfidenceTier::NameOnly,
        applies: always,
        accepts: partial_name,
    },
];

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

/// Tunables for the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherOptions {
    /// Queries whose normalized name has fewer characters than this are
    /// rejected as `NoMatch` before any tier runs. A one-letter name would
    /// otherwise substring-match most of the roster.
    pub min_name_len: usize,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self { min_name_len: 2 }
    }
}

/// Resolves `NameQuery`s against one roster snapshot.
///
/// Pure and synchronous: the snapshot is never mutated, so a matcher can be
/// shared freely across threads for the duration of a batch.
#[derive(Debug, Clone)]
pub struct PlayerMatcher {
    roster: RosterIndex,
    options: MatcherOptions,
}

impl PlayerMatcher {
    pub fn new(roster: RosterIndex, options: MatcherOptions) -> Self {
        Self { roster, options }
    }

    /// Matcher over `players` with default options.
    pub fn from_players(players: impl IntoIterator<Item = CanonicalPlayer>) -> Self {
        Self::new(RosterIndex::new(players), MatcherOptions::default())
    }

    pub fn roster(&self) -> &RosterIndex {
        &self.roster
    }

    pub fn options(&self) -> MatcherOptions {
        self.options
    }

    /// Convenience wrapper over [`match_query`](Self::match_query).
    pub fn match_name(&self, name: &str, team: Option<&str>, position: Option<&str>) -> MatchResult {
        self.match_query(&NameQuery::new(name, team, position))
    }

    /// Run the cascade.
    ///
    /// Each tier runs only if every earlier tier found nobody. The first tier
    /// that finds anyone decides the result: one candidate is a match at that
    /// tier, two or more is `Ambiguous` and looser tiers are never consulted.
    pub fn match_query(&self, query: &NameQuery) -> MatchResult {
        let key = QueryKey::from_query(query);

        if key.name_norm.chars().count() < self.options.min_name_len {
            debug!(
                "rejecting query '{}': normalized name shorter than {} chars",
                query.raw_name, self.options.min_name_len
            );
            return MatchResult::NoMatch;
        }

        for rule in CASCADE.iter() {
            if !(rule.applies)(&key) {
                debug!("tier {} skipped for '{}': missing context", rule.tier, query.raw_name);
                continue;
            }

            let hits: Vec<&RosterEntry> = self
                .roster
                .entries
                .iter()
                .filter(|e| (rule.accepts)(&key, e))
                .collect();

            match hits.as_slice() {
                [] => continue,
                [only] => {
                    let method = method_for(rule.tier, &key, only);
                    debug!(
                        "matched '{}' -> {} ({}) via {:?}",
                        query.raw_name, only.player.display_name, only.player.player_dk_id, method
                    );
                    return MatchResult::Matched {
                        player: only.player.clone(),
                        confidence: rule.tier,
                        method,
                    };
                }
                many => {
                    debug!(
                        "ambiguous '{}' at tier {}: {} candidates",
                        query.raw_name,
                        rule.tier,
                        many.len()
                    );
                    return MatchResult::Ambiguous {
                        tier: rule.tier,
                        candidates: many.iter().map(|e| e.player.clone()).collect(),
                    };
                }
            }
        }

        debug!("no match for '{}'", query.raw_name);
        MatchResult::NoMatch
    }

    /// Match a whole batch, preserving input order.
    pub fn match_all<'a>(&self, queries: impl IntoIterator<Item = &'a NameQuery>) -> Vec<MatchResult> {
        queries.into_iter().map(|q| self.match_query(q)).collect()
    }
}

fn method_for(tier: ConfidenceTier, key: &QueryKey, entry: &RosterEntry) -> MatchMethod {
    match tier {
        ConfidenceTier::Exact => MatchMethod::Exact,
        ConfidenceTier::ExactNoTeam => match key.team.as_deref() {
            Some(team) if !same_team(team, &entry.team) => MatchMethod::ExactTeamMismatch,
            _ => MatchMethod::ExactNoTeam,
        },
        ConfidenceTier::Partial => MatchMethod::Partial,
        ConfidenceTier::NameOnly => MatchMethod::NameOnly,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
