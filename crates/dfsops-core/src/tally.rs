// Aggregate counts over a batch of match results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::matcher::{ConfidenceTier, MatchResult};

/// Per-batch match counters, in the shape import summaries report them.
///
/// `failed_matches` counts both ambiguous and unmatched queries; the split is
/// kept in `ambiguous` / `no_match`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTally {
    pub successful_matches: usize,
    pub failed_matches: usize,
    pub ambiguous: usize,
    pub no_match: usize,
    pub by_confidence: BTreeMap<ConfidenceTier, usize>,
}

impl MatchTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every result in `results`.
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a MatchResult>) -> Self {
        let mut tally = Self::new();
        for result in results {
            tally.record(result);
        }
        tally
    }

    pub fn record(&mut self, result: &MatchResult) {
        match result {
            MatchResult::Matched { confidence, .. } => {
                self.successful_matches += 1;
                *self.by_confidence.entry(*confidence).or_insert(0) += 1;
            }
            MatchResult::Ambiguous { .. } => {
                self.failed_matches += 1;
                self.ambiguous += 1;
            }
            MatchResult::NoMatch => {
                self.failed_matches += 1;
                self.no_match += 1;
            }
        }
    }

    pub fn total(&self) -> usize {
        self.successful_matches + self.failed_matches
    }

    /// Count of matches at `tier`.
    pub fn at(&self, tier: ConfidenceTier) -> usize {
        self.by_confidence.get(&tier).copied().unwrap_or(0)
    }

    /// Fraction of queries that matched, or 0.0 for an empty batch.
    pub fn match_rate(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        self.successful_matches as f64 / self.total() as f64
    }
}
