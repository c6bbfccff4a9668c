// Library root for the import side: configuration, SQLite persistence, typed
// source readers and the matched import pipelines.

pub mod config;
pub mod db;
pub mod pipeline;
pub mod sources;
pub mod team_cache;

pub use config::{Config, ConfigError};
pub use db::Database;
pub use pipeline::{ImportError, ImportKind, ImportSummary, Importer, PlayerPoolSummary};
pub use team_cache::TeamCache;
