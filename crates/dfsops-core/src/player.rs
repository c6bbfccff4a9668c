// Canonical roster entities: positions and the DraftKings-keyed player record.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::team::canonical_team;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Football roster positions. DFS slates only carry the first six, but
/// third-party sources (NFLverse, props feeds) also report defensive and
/// special-teams players, which are kept verbatim in `Other`.
///
/// Serialized as its abbreviation (`"QB"`, `"LB"`), never as a tagged enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    K,
    DST,
    Other(String),
}

impl Position {
    /// Parse a position string. Matching is case-insensitive and tolerant of
    /// the defense spellings used by different sites ("DEF", "D", "D/ST").
    ///
    /// Returns `None` for an empty or whitespace-only string.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }
        let upper = trimmed.to_uppercase();
        let pos = match upper.as_str() {
            "QB" => Position::QB,
            "RB" | "HB" => Position::RB,
            "WR" => Position::WR,
            "TE" => Position::TE,
            "K" | "PK" => Position::K,
            "DST" | "DEF" | "D" | "D/ST" | "DS" => Position::DST,
            _ => Position::Other(upper),
        };
        Some(pos)
    }

    /// Display abbreviation.
    pub fn as_str(&self) -> &str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::K => "K",
            Position::DST => "DST",
            Position::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Position> for String {
    fn from(pos: Position) -> Self {
        pos.as_str().to_string()
    }
}

impl TryFrom<String> for Position {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Position::parse(&s).ok_or_else(|| "empty position".to_string())
    }
}

// ---------------------------------------------------------------------------
// CanonicalPlayer
// ---------------------------------------------------------------------------

/// The authoritative identity of a player, as created by the DraftKings
/// player-pool import.
///
/// `player_dk_id` is unique and never changes. `display_name` is NOT unique:
/// two players with the same name can coexist on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPlayer {
    pub player_dk_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub short_name: Option<String>,
    pub position: Position,
    pub team: String,
}

impl CanonicalPlayer {
    /// Build a player from a display name, deriving first/last name from the
    /// first whitespace-separated token. The team abbreviation is stored in
    /// canonical form.
    pub fn new(player_dk_id: i64, display_name: &str, position: Position, team: &str) -> Self {
        let display_name = display_name.trim().to_string();
        let (first_name, last_name) = crate::normalize::split_name(&display_name);
        Self {
            player_dk_id,
            first_name,
            last_name,
            display_name,
            short_name: None,
            position,
            team: canonical_team(team),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
