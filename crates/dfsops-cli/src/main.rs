// dfsops entry point.
//
// Startup sequence:
// 1. Initialize tracing (append to <base-dir>/logs/dfsops.log; stdout is
//    reserved for JSON output)
// 2. Seed and load <base-dir>/config
// 3. Open database (relative paths resolve against <base-dir>)
// 4. Run the requested import or lookup and print the result

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use dfsops_import::{config, Database, Importer};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "dfsops", about = "Import DFS data sources against the DraftKings player pool")]
struct Cli {
    /// Directory holding `config/`, `defaults/`, `logs/` and a relative database path.
    #[arg(long, global = true, default_value = ".")]
    base_dir: PathBuf,

    /// Log every matcher tier decision (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import a DraftKings salary export; creates and updates canonical players.
    Players {
        csv: PathBuf,
        #[arg(long)]
        draft_group: i64,
    },
    /// Import projected points.
    Projections {
        csv: PathBuf,
        #[arg(long)]
        week: u8,
        /// Projection source label; defaults to `import.default_projection_source`.
        #[arg(long)]
        source: Option<String>,
    },
    /// Import actual fantasy points for a week.
    Actuals {
        csv: PathBuf,
        #[arg(long)]
        week: u8,
    },
    /// Import player prop lines for a week.
    Props {
        csv: PathBuf,
        #[arg(long)]
        week: u8,
    },
    /// Import NFLverse weekly player stats.
    Nflverse {
        csv: PathBuf,
        /// Defaults to `import.season`.
        #[arg(long)]
        season: Option<u16>,
    },
    /// Resolve one name against the roster.
    Match {
        name: String,
        #[arg(long)]
        team: Option<String>,
        #[arg(long)]
        position: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.base_dir.join("logs"), cli.verbose)?;
    info!("dfsops starting in {}: {:?}", cli.base_dir.display(), cli.command);

    let config = config::load_config_in(&cli.base_dir).context("failed to load configuration")?;
    let db_path = config.database_path(&cli.base_dir);
    let db = Database::open(&db_path.to_string_lossy())
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    info!("Database opened at {}", db_path.display());

    let importer = Importer::new(&db, &config);

    match cli.command {
        Command::Players { csv, draft_group } => {
            print_json(&importer.import_player_pool(&csv, draft_group)?)
        }
        Command::Projections { csv, week, source } => {
            print_json(&importer.import_projections(&csv, week, source.as_deref())?)
        }
        Command::Actuals { csv, week } => print_json(&importer.import_actuals(&csv, week)?),
        Command::Props { csv, week } => print_json(&importer.import_props(&csv, week)?),
        Command::Nflverse { csv, season } => print_json(&importer.import_nflverse(&csv, season)?),
        Command::Match {
            name,
            team,
            position,
        } => {
            let matcher = importer.matcher()?;
            let result = matcher.match_name(&name, team.as_deref(), position.as_deref());
            print_json(&result)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// Default filter: `dfsops` crates at info (debug with `--verbose`, which
/// includes per-tier matcher decisions), everything else at warn. `RUST_LOG`
/// overrides both.
fn log_filter(verbose: bool) -> &'static str {
    if verbose {
        "dfsops=debug,warn"
    } else {
        "dfsops=info,warn"
    }
}

/// Log to `<log_dir>/dfsops.log`, appending so that a week's worth of
/// imports stays in one file.
fn init_tracing(log_dir: &Path, verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join("dfsops.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter(verbose)));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
