// Batch-scoped team abbreviation -> row id cache.

use std::num::NonZeroUsize;

use anyhow::Result;
use dfsops_core::team::canonical_team;
use lru::LruCache;
use rusqlite::Connection;

use crate::db::upsert_team_on;

/// Caches `teams.id` lookups while a player pool is written, so a 500-row
/// slate touches the `teams` table once per team rather than once per row.
pub struct TeamCache {
    entries: LruCache<String, i64>,
    hits: usize,
    misses: usize,
}

impl TeamCache {
    /// A zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Row id for `abbreviation`, inserting the team on first sight.
    /// Aliases (`JAC`, `WSH`, ...) resolve to the same row as their canonical
    /// abbreviation.
    pub fn team_id(&mut self, conn: &Connection, abbreviation: &str) -> Result<i64> {
        let key = canonical_team(abbreviation);
        if let Some(&id) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(id);
        }
        self.misses += 1;
        let id = upsert_team_on(conn, &key)?;
        self.entries.put(key, id);
        Ok(id)
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
