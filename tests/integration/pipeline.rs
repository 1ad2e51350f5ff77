//! End-to-end scans through `EdgeEngine::run`.

use rust_decimal_macros::dec;

use sharpline::config::AppConfig;
use sharpline::data::snapshot::Snapshot;
use sharpline::data::Sources;
use sharpline::engine::{EdgeEngine, ScanReport};
use sharpline::types::{ConfidenceTier, EngineError, InjuryStatus, MarketType, Position, Side};

use crate::fixtures::{rating_scenario, team, SnapshotBuilder};

fn scan(snapshot: &Snapshot) -> ScanReport {
    let engine = EdgeEngine::from_config(&AppConfig::default());
    engine.run(&snapshot.games, &Sources::from_snapshot(snapshot))
}

#[test]
fn test_rating_scenario_matches_hand_computation() {
    let snapshot = rating_scenario()
        .quote("scenario", "consensus", 0, ["PHI", "DAL"], -3.0, 49.0, "2025-12-06T12:00:00Z")
        .build();
    let report = scan(&snapshot);

    assert_eq!(report.games_scored, 1);
    let v = &report.valuations[0];
    // (5 - 3) - (1 - (-2)) + 2.0
    assert_eq!(v.line.margin, 1.0);
    assert_eq!(v.line.total, 49.0);
    // Market has home by 3: gap -2.0 toward the away side, below WEAK.
    assert!(report.edges.is_empty());
    assert!(report.suppressed.is_empty());
}

#[test]
fn test_tier_decoy_is_ignored() {
    let snapshot = rating_scenario()
        .quote("scenario", "exchange", 1, ["DAL", "PHI"], 7.0, 44.0, "2025-12-06T18:00:00Z")
        .quote("scenario", "consensus", 0, ["PHI", "DAL"], -7.0, 47.0, "2025-12-06T12:00:00Z")
        .build();
    let engine = EdgeEngine::from_config(&AppConfig::default());
    let score = engine
        .score_game(&snapshot.games[0], &Sources::from_snapshot(&snapshot))
        .unwrap();

    assert_eq!(score.line.provider, "consensus");
    assert_eq!(score.line.tier, 0);
    assert_eq!(score.line.home_spread, Some(-7.0));
    assert_eq!(score.line.total, Some(47.0));
}

#[test]
fn test_listing_order_does_not_change_output() {
    let home_first = rating_scenario()
        .quote("scenario", "consensus", 0, ["PHI", "DAL"], -7.0, 47.0, "2025-12-06T12:00:00Z")
        .build();
    let away_first = rating_scenario()
        .quote("scenario", "consensus", 0, ["Dallas Cowboys", "Philadelphia Eagles"], 7.0, 47.0, "2025-12-06T12:00:00Z")
        .build();

    let a = scan(&home_first);
    let b = scan(&away_first);
    assert_eq!(a.edges, b.edges);
    assert_eq!(a.edges.len(), 1);
    // Model home by 1, market home by 7: gap -6 on the away side.
    assert_eq!(a.edges[0].side, Side::Away);
    assert_eq!(a.edges[0].tier, ConfidenceTier::Medium);
}

#[test]
fn test_implausible_gap_is_suppressed_not_reported() {
    let snapshot = SnapshotBuilder::new()
        .game("blowout", team("Kansas City Chiefs", "KC"), team("Las Vegas Raiders", "LV"), "Arrowhead Stadium", true)
        .rating("KC", 12.0, 5.0)
        .rating("LV", -5.0, -3.0)
        .quote("blowout", "consensus", 0, ["KC", "LV"], -5.0, 49.0, "2025-12-06T12:00:00Z")
        .build();
    let report = scan(&snapshot);

    // Home 37, away 12, +2 home field: margin 27 against a 5-point line.
    assert!(report.edges.is_empty());
    assert_eq!(report.suppressed.len(), 1);
    let s = &report.suppressed[0];
    assert_eq!(s.market_type, MarketType::Spread);
    assert_eq!(s.magnitude, 22.0);
}

#[test]
fn test_zero_quotes_skip_game_and_batch_continues() {
    let snapshot = rating_scenario()
        .game("no-market", team("New York Giants", "NYG"), team("Washington Commanders", "WAS"), "MetLife Stadium", true)
        .rating("NYG", 0.0, 0.0)
        .rating("WAS", 0.0, 0.0)
        .quote("scenario", "consensus", 0, ["PHI", "DAL"], -7.0, 47.0, "2025-12-06T12:00:00Z")
        .build();
    let report = scan(&snapshot);

    assert_eq!(report.games_scored, 1);
    assert_eq!(report.games_failed, 1);
    assert_eq!(
        report.failures[0].error,
        EngineError::NoQuoteAvailable { game_id: "no-market".into() }
    );
    assert_eq!(report.edges.len(), 1);
}

#[test]
fn test_primary_quote_without_lines_fails_game() {
    let mut snapshot = rating_scenario()
        .quote("scenario", "consensus", 0, ["PHI", "DAL"], -7.0, 47.0, "2025-12-06T12:00:00Z")
        .quote("scenario", "exchange", 1, ["PHI", "DAL"], -7.0, 47.0, "2025-12-06T12:00:00Z")
        .build();
    snapshot.quotes[0].spread = None;
    snapshot.quotes[0].total = None;
    snapshot.quotes[0].moneylines = Some([-300, 250]);
    let report = scan(&snapshot);

    assert_eq!(report.games_scored, 0);
    assert_eq!(report.games_failed, 1);
    assert_eq!(
        report.failures[0].error,
        EngineError::NoQuoteAvailable { game_id: "scenario".into() }
    );
    assert!(report.edges.is_empty());
    assert!(report.lines.is_empty());
}

#[test]
fn test_report_carries_oriented_line_and_no_vig_price() {
    let mut snapshot = rating_scenario()
        .quote("scenario", "consensus", 0, ["DAL", "PHI"], 7.0, 47.0, "2025-12-06T12:00:00Z")
        .build();
    snapshot.quotes[0].moneylines = Some([250, -300]);
    let report = scan(&snapshot);

    assert_eq!(report.lines.len(), 1);
    let priced = &report.lines[0];
    assert_eq!(priced.line.home_spread, Some(-7.0));
    assert_eq!(priced.line.home_moneyline, Some(-300));
    assert_eq!(priced.line.away_moneyline, Some(250));
    // 0.75 / (0.75 + 100/350)
    let expected = 0.75 / (0.75 + 100.0 / 350.0);
    assert!((priced.home_win_probability.unwrap() - expected).abs() < 1e-12);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["lines"][0]["provider"], "consensus");
    assert!(json["lines"][0]["home_win_probability"].is_number());
}

#[test]
fn test_same_team_game_does_not_abort_batch() {
    let mut snapshot = rating_scenario()
        .game("mirror", team("New York Giants", "NYG"), team("Washington Commanders", "WAS"), "MetLife Stadium", true)
        .quote("scenario", "consensus", 0, ["PHI", "DAL"], -7.0, 47.0, "2025-12-06T12:00:00Z")
        .build();
    snapshot.games[1].away = snapshot.games[1].home.clone();
    snapshot.validate().unwrap();
    let report = scan(&snapshot);

    assert_eq!(report.games_scored, 1);
    assert_eq!(report.games_failed, 1);
    assert!(matches!(
        report.failures[0].error,
        EngineError::InvalidGame { ref game_id, .. } if game_id == "mirror"
    ));
    assert_eq!(report.edges.len(), 1);
}

#[test]
fn test_missing_rating_skips_game() {
    let snapshot = rating_scenario()
        .game("unrated", team("Detroit Lions", "DET"), team("Chicago Bears", "CHI"), "Ford Field", true)
        .rating("DET", 3.0, 1.0)
        .quote("scenario", "consensus", 0, ["PHI", "DAL"], -3.0, 49.0, "2025-12-06T12:00:00Z")
        .quote("unrated", "consensus", 0, ["DET", "CHI"], -6.5, 48.5, "2025-12-06T12:00:00Z")
        .build();
    let report = scan(&snapshot);

    assert_eq!(report.games_scored, 1);
    assert_eq!(
        report.failures[0].error,
        EngineError::MissingRating { team: "CHI".into(), week: 14, season: 2025 }
    );
    assert!(report.failures[0].message.contains("CHI"));
}

#[test]
fn test_injuries_and_weather_flow_into_edges() {
    let snapshot = SnapshotBuilder::new()
        .game("nfc-north", team("Green Bay Packers", "GB"), team("Chicago Bears", "CHI"), "Lambeau Field", false)
        .rating("GB", 3.0, 1.0)
        .rating("CHI", 0.0, 0.0)
        .injury("CHI", "Starting QB", Position::Qb, InjuryStatus::Out)
        .forecast("Lambeau Field", 27.0, 0.0, 40.0)
        .quote("nfc-north", "consensus", 0, ["GB", "CHI"], -4.5, 46.5, "2025-12-06T12:00:00Z")
        .build();
    let report = scan(&snapshot);

    // Base: GB 25, CHI 21, +2 => margin 6, total 46.
    // QB out: margin +6, total -3. Wind (27-15)*0.25: total -3.
    let v = &report.valuations[0];
    assert_eq!(v.line.margin, 12.0);
    assert_eq!(v.line.total, 40.0);

    assert_eq!(report.edges.len(), 2);
    let spread = &report.edges[0];
    assert_eq!(spread.market_type, MarketType::Spread);
    assert_eq!(spread.side, Side::Home);
    assert_eq!(spread.tier, ConfidenceTier::Strong);
    assert_eq!(spread.magnitude, 7.5);

    let total = &report.edges[1];
    assert_eq!(total.market_type, MarketType::Total);
    assert_eq!(total.side, Side::Under);
    assert_eq!(total.tier, ConfidenceTier::Medium);

    // Default risk cap 5% of a 1000 bankroll binds both stakes.
    for e in &report.edges {
        let stake = e.stake.as_ref().unwrap();
        assert_eq!(stake.fraction, 0.05);
        assert_eq!(stake.amount, dec!(50));
        assert!(stake.capped);
    }
    assert_eq!(report.total_staked(), dec!(100));
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    let snapshot = rating_scenario()
        .game("nfc-north", team("Green Bay Packers", "GB"), team("Chicago Bears", "CHI"), "Lambeau Field", false)
        .rating("GB", 3.0, 1.0)
        .rating("CHI", 0.0, 0.0)
        .injury("GB", "WR1", Position::Wr, InjuryStatus::Questionable)
        .forecast("Lambeau Field", 19.0, 0.7, 18.0)
        .quote("scenario", "consensus", 0, ["PHI", "DAL"], -7.0, 47.0, "2025-12-06T12:00:00Z")
        .quote("nfc-north", "consensus", 0, ["CHI", "GB"], 4.5, 42.0, "12/06/2025 12:00")
        .quote("nfc-north", "offshore", 0, ["GB", "CHI"], -3.0, 44.0, "2025-12-06T09:00:00Z")
        .build();

    let first = serde_json::to_string(&scan(&snapshot)).unwrap();
    let second = serde_json::to_string(&scan(&snapshot)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_snapshot_file_round_trip_through_loader() {
    let snapshot = rating_scenario()
        .quote("scenario", "consensus", 0, ["PHI", "DAL"], -7.0, 47.0, "2025-12-06T12:00:00Z")
        .build();

    let mut path = std::env::temp_dir();
    path.push(format!("sharpline_it_snapshot_{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

    let loaded = Snapshot::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(scan(&loaded), scan(&snapshot));
}
