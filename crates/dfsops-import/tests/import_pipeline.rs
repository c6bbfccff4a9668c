// End-to-end imports over the CSV fixtures with an in-memory database.

use std::path::PathBuf;

use dfsops_core::ConfidenceTier;
use dfsops_import::config::load_config_from;
use dfsops_import::pipeline::UnmatchedReason;
use dfsops_import::{Config, Database, Importer};

const ALLEN: i64 = 39971296;
const ACHANE: i64 = 39971410;
const WALKER: i64 = 39971422;
const JEFFERSON: i64 = 39971373;
const HARRISON: i64 = 39971530;
const BILLS: i64 = 39971800;
const JAGUARS: i64 = 39971801;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// The shipped defaults, loaded the same way the binary loads them.
fn default_config() -> Config {
    let tmp = tempfile::tempdir().unwrap();
    let config_dir = tmp.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    let defaults = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../defaults/dfsops.toml");
    std::fs::copy(defaults, config_dir.join("dfsops.toml")).unwrap();
    load_config_from(tmp.path()).unwrap()
}

fn seeded() -> (Database, Config) {
    let db = Database::open(":memory:").unwrap();
    let config = default_config();
    Importer::new(&db, &config)
        .import_player_pool(&fixture("dk_salaries.csv"), 120_345)
        .unwrap();
    (db, config)
}

#[test]
fn player_pool_import() {
    let db = Database::open(":memory:").unwrap();
    let config = default_config();
    let summary = Importer::new(&db, &config)
        .import_player_pool(&fixture("dk_salaries.csv"), 120_345)
        .unwrap();

    assert_eq!(summary.total_rows, 11);
    assert_eq!(summary.skipped_rows, 1);
    assert_eq!(summary.players_written, 11);
    assert_eq!(summary.roster_size, 11);
    assert_eq!(db.team_count().unwrap(), 9);

    let roster = db.load_roster().unwrap();
    let harrison = roster.iter().find(|p| p.player_dk_id == HARRISON).unwrap();
    assert_eq!(harrison.first_name, "Marvin");
    assert_eq!(harrison.last_name, "Harrison Jr.");

    let salary = db.salary_for(120_345, JEFFERSON).unwrap().unwrap();
    assert_eq!(salary.salary, 8000);
    assert_eq!(salary.roster_position, "WR/FLEX");
}

#[test]
fn projections_import() {
    let (db, config) = seeded();
    let summary = Importer::new(&db, &config)
        .import_projections(&fixture("projections.csv"), 1, None)
        .unwrap();

    assert_eq!(summary.total_rows, 11);
    assert_eq!(summary.skipped_rows, 1);
    assert_eq!(summary.successful_matches(), 8);
    assert_eq!(summary.failed_matches(), 3);
    assert_eq!(summary.tally.ambiguous, 1);
    assert_eq!(summary.tally.no_match, 2);
    assert_eq!(summary.tally.at(ConfidenceTier::Exact), 5);
    assert_eq!(summary.tally.at(ConfidenceTier::Partial), 3);
    assert_eq!(summary.written_rows, 8);

    // Suffix and punctuation differences resolve through the partial tier.
    for id in [ACHANE, WALKER, HARRISON] {
        assert!(
            db.projection_for(id, 1, "consensus").unwrap().is_some(),
            "missing projection for {id}"
        );
    }
    // JAC/DEF aliases resolve to the JAX defense.
    let jags = db.projection_for(JAGUARS, 1, "consensus").unwrap().unwrap();
    assert!((jags.points - 6.1).abs() < f64::EPSILON);
    assert_eq!(jags.ownership, Some(4.4));

    // "Buffalo Bills" is not a substring of the roster's "Bills".
    assert!(db.projection_for(BILLS, 1, "consensus").unwrap().is_none());

    let ambiguous: Vec<_> = summary
        .unmatched_players
        .iter()
        .filter(|u| matches!(u.reason, UnmatchedReason::Ambiguous { .. }))
        .collect();
    assert_eq!(ambiguous.len(), 1);
    assert_eq!(ambiguous[0].query.raw_name, "Mike Williams");
}

#[test]
fn reimport_overwrites() {
    let (db, config) = seeded();
    let importer = Importer::new(&db, &config);
    importer
        .import_projections(&fixture("projections.csv"), 1, Some("site_a"))
        .unwrap();
    let again = importer
        .import_projections(&fixture("projections.csv"), 1, Some("site_a"))
        .unwrap();
    assert_eq!(again.written_rows, 8);

    let allen = db.projection_for(ALLEN, 1, "site_a").unwrap().unwrap();
    assert!((allen.points - 24.8).abs() < f64::EPSILON);
}

#[test]
fn actuals_import_for_one_week() {
    let (db, config) = seeded();
    let summary = Importer::new(&db, &config)
        .import_actuals(&fixture("actuals.csv"), 1)
        .unwrap();

    assert_eq!(summary.total_rows, 4);
    assert_eq!(summary.skipped_rows, 1);
    assert_eq!(summary.successful_matches(), 4);
    assert_eq!(summary.written_rows, 4);

    let bills = db.actual_for(BILLS, 1).unwrap().unwrap();
    assert!((bills.points + 1.0).abs() < f64::EPSILON);
    assert!(db.actual_for(ALLEN, 2).unwrap().is_none());
}

#[test]
fn props_import() {
    let (db, config) = seeded();
    let summary = Importer::new(&db, &config)
        .import_props(&fixture("props.csv"), 1)
        .unwrap();

    assert_eq!(summary.total_rows, 4);
    assert_eq!(summary.skipped_rows, 1);
    assert_eq!(summary.successful_matches(), 3);
    assert_eq!(summary.tally.ambiguous, 1);

    let props = db.props_for(ALLEN, 1).unwrap();
    let markets: Vec<&str> = props.iter().map(|p| p.market.as_str()).collect();
    assert_eq!(markets, vec!["player_pass_tds", "player_pass_yds"]);
    assert!(props.iter().all(|p| p.bookmaker == "draftkings"));
    assert_eq!(props[0].over_odds, Some(120));
}

#[test]
fn nflverse_import_uses_configured_season() {
    let (db, config) = seeded();
    let summary = Importer::new(&db, &config)
        .import_nflverse(&fixture("nflverse.csv"), None)
        .unwrap();

    assert_eq!(summary.total_rows, 5);
    assert_eq!(summary.skipped_rows, 1);
    assert_eq!(summary.successful_matches(), 4);
    assert_eq!(summary.tally.at(ConfidenceTier::Exact), 4);
    assert_eq!(summary.tally.no_match, 1);

    let walker = db.nflverse_for(WALKER, 2025, 1).unwrap().unwrap();
    assert_eq!(walker.passing_yards, 0.0);
    assert!((walker.rushing_yards - 72.0).abs() < f64::EPSILON);
    assert!(db.nflverse_for(ALLEN, 2024, 1).unwrap().is_none());

    let earlier = Importer::new(&db, &config)
        .import_nflverse(&fixture("nflverse.csv"), Some(2024))
        .unwrap();
    assert_eq!(earlier.written_rows, 1);
    assert!(db.nflverse_for(ALLEN, 2024, 1).unwrap().is_some());
}

#[test]
fn missing_file_is_a_source_error() {
    let (db, config) = seeded();
    let err = Importer::new(&db, &config)
        .import_actuals(&fixture("does_not_exist.csv"), 1)
        .unwrap_err();
    assert!(matches!(err, dfsops_import::ImportError::Source(_)));
}

#[test]
fn summary_json_shape() {
    let (db, config) = seeded();
    let summary = Importer::new(&db, &config)
        .import_projections(&fixture("projections.csv"), 1, None)
        .unwrap();
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["kind"], "projections");
    assert_eq!(json["successful_matches"], 8);
    assert_eq!(json["by_confidence"]["exact"], 5);
    assert_eq!(json["by_confidence"]["partial"], 3);
    let ambiguous = json["unmatched_players"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["reason"] == "ambiguous")
        .unwrap();
    assert_eq!(ambiguous["tier"], "exact_no_team");
    assert_eq!(ambiguous["candidate_count"], 2);
}
