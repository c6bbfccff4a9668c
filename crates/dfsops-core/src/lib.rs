// Library root for the player identity core: canonical roster types, name
// normalization and the tiered matcher shared by every import path.

pub mod matcher;
pub mod normalize;
pub mod player;
pub mod tally;
pub mod team;

pub use matcher::{
    ConfidenceTier, MatchMethod, MatchResult, MatcherOptions, NameQuery, PlayerMatcher,
    RosterIndex,
};
pub use player::{CanonicalPlayer, Position};
pub use tally::MatchTally;
