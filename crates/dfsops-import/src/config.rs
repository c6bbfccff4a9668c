// Configuration loading and parsing (dfsops.toml, credentials.toml).

use dfsops_core::{ConfidenceTier, MatcherOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub matching: MatchingConfig,
    pub import: ImportConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// dfsops.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire dfsops.toml file.
#[derive(Debug, Clone, Deserialize)]
struct OpsFile {
    database: DatabaseSection,
    #[serde(default)]
    matching: MatchingConfig,
    import: ImportConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

/// `[matching]`: knobs for the player matcher and how its results are
/// reported.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    /// Queries with fewer normalized characters than this never match.
    #[serde(default = "default_min_name_len")]
    pub min_name_len: usize,
    /// Matches weaker than this tier are held back for review instead of
    /// being written.
    #[serde(default = "default_auto_accept")]
    pub auto_accept_min_confidence: ConfidenceTier,
    /// Cap on candidates listed per ambiguous row in import summaries.
    #[serde(default = "default_max_reported_candidates")]
    pub max_reported_candidates: usize,
}

fn default_min_name_len() -> usize {
    2
}

fn default_auto_accept() -> ConfidenceTier {
    ConfidenceTier::NameOnly
}

fn default_max_reported_candidates() -> usize {
    10
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_name_len: default_min_name_len(),
            auto_accept_min_confidence: default_auto_accept(),
            max_reported_candidates: default_max_reported_candidates(),
        }
    }
}

impl MatchingConfig {
    pub fn matcher_options(&self) -> MatcherOptions {
        MatcherOptions {
            min_name_len: self.min_name_len,
        }
    }
}

/// `[import]`: defaults for the import pipelines.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    pub season: u16,
    pub default_projection_source: String,
    pub team_cache_capacity: usize,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

/// API keys for the upstream data providers. Only stored here; fetching is
/// done by separate tooling that drops CSV exports for the importers.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub draftkings_api_key: Option<String>,
    pub odds_api_key: Option<String>,
    pub firecrawl_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/dfsops.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// Does not seed from `defaults/`; see [`load_config_in`].
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- dfsops.toml (required) ---
    let ops_path = config_dir.join("dfsops.toml");
    let ops_text = read_file(&ops_path)?;
    let ops_file: OpsFile = toml::from_str(&ops_text).map_err(|e| ConfigError::ParseError {
        path: ops_path.clone(),
        source: e,
    })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        db_path: ops_file.database.path,
        matching: ops_file.matching,
        import: ops_file.import,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Config files seeded from `defaults/` on first run. `credentials.toml` is
/// deliberately absent: keys are user-supplied, `defaults/` only ships an
/// `.example` of it.
const SEEDED_FILES: &[&str] = &["dfsops.toml"];

/// Copy any of the seeded config files missing from `config/` out of
/// `defaults/`. Returns the files that were created.
///
/// A missing `defaults/` is fine as long as `config/dfsops.toml` already
/// exists (e.g. an installed binary run from a prepared data directory).
pub fn seed_config(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.join("dfsops.toml").is_file() {
            return Ok(vec![]);
        }
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "no config/dfsops.toml and no defaults/ to seed it from in {}",
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create {}: {e}", config_dir.display()),
    })?;

    let mut created = Vec::new();
    for name in SEEDED_FILES {
        let source = defaults_dir.join(name);
        if !source.is_file() {
            continue;
        }
        let target = config_dir.join(name);
        if copy_if_absent(&source, &target)? {
            created.push(target);
        }
    }
    Ok(created)
}

/// Seed `config/` under `base_dir`, then load it.
pub fn load_config_in(base_dir: &Path) -> Result<Config, ConfigError> {
    seed_config(base_dir)?;
    load_config_from(base_dir)
}

impl Config {
    /// The database path with a relative `database.path` resolved against
    /// `base_dir`. `:memory:` is passed through.
    pub fn database_path(&self, base_dir: &Path) -> PathBuf {
        let path = Path::new(&self.db_path);
        if self.db_path == ":memory:" || path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create `target` with the contents of `source` unless it already exists.
/// `create_new` keeps a user's edited file from ever being overwritten.
fn copy_if_absent(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(dest) => dest,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => {
            return Err(ConfigError::DefaultsCopyError {
                message: format!("failed to create {}: {e}", target.display()),
            })
        }
    };
    let mut src = std::fs::File::open(source).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to open {}: {e}", source.display()),
    })?;
    std::io::copy(&mut src, &mut dest).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to write {}: {e}", target.display()),
    })?;
    Ok(true)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.db_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    let positive_fields: &[(&str, usize)] = &[
        ("matching.min_name_len", config.matching.min_name_len),
        (
            "matching.max_reported_candidates",
            config.matching.max_reported_candidates,
        ),
        ("import.team_cache_capacity", config.import.team_cache_capacity),
    ];
    for (name, val) in positive_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    let season = config.import.season;
    if !(1999..=2100).contains(&season) {
        return Err(ConfigError::ValidationError {
            field: "import.season".into(),
            message: format!("must be between 1999 and 2100, got {season}"),
        });
    }

    if config.import.default_projection_source.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "import.default_projection_source".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
