use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use scoring::balance::{self, Advisory, Verdict};
use scoring::model::{PlayerAppearance, PlayerTable, Side};
use scoring::tier::{Tier, TierSnapshot};
use scoring::Points;

fn overrides(entries: &[(&str, Tier)]) -> BTreeMap<String, Tier> {
    entries
        .iter()
        .map(|(name, tier)| ((*name).to_owned(), *tier))
        .collect()
}

fn roster(names: &[&str]) -> Vec<PlayerAppearance> {
    names.iter().map(|n| PlayerAppearance::named(*n)).collect()
}

fn classified_league() -> BTreeMap<String, Tier> {
    overrides(&[
        ("e1", Tier::Elite),
        ("e2", Tier::Elite),
        ("m1", Tier::Mid),
        ("m2", Tier::Mid),
        ("m3", Tier::Mid),
        ("m4", Tier::Mid),
        ("m5", Tier::Mid),
        ("m6", Tier::Mid),
        ("m7", Tier::Mid),
        ("m8", Tier::Mid),
        ("a1", Tier::Auto),
    ])
}

#[test]
fn two_point_gap_invalidates() {
    let players = PlayerTable::new();
    let overrides = classified_league();
    let tiers = TierSnapshot::new(&players, &overrides);

    let winners = roster(&["e1", "e2", "m1", "m2", "m3"]);
    let losers = roster(&["m4", "m5", "m6", "m7", "m8"]);

    let result = balance::evaluate(&tiers, &winners, &losers);

    assert_eq!(
        Verdict {
            winner_team_value: 2,
            loser_team_value: 0,
            difference: 2,
            compensation_per_player: Points::ZERO,
            invalid: true,
            all_classified: true,
        },
        result
    );
}

#[test]
fn one_point_gap_compensates_losers() {
    let players = PlayerTable::new();
    let overrides = classified_league();
    let tiers = TierSnapshot::new(&players, &overrides);

    let winners = roster(&["e1", "m1", "m2", "m3", "m4"]);
    let losers = roster(&["m5", "m6", "m7", "m8", "m2"]);

    let result = balance::evaluate(&tiers, &winners, &losers);

    assert_eq!(1, result.difference);
    assert_eq!(Points::HALF, result.compensation_per_player);
    assert!(!result.invalid);
}

#[test]
fn stronger_losers_get_nothing() {
    let players = PlayerTable::new();
    let overrides = classified_league();
    let tiers = TierSnapshot::new(&players, &overrides);

    let winners = roster(&["a1", "m1", "m2", "m3", "m4"]);
    let losers = roster(&["e1", "e2", "m5", "m6", "m7"]);

    let result = balance::evaluate(&tiers, &winners, &losers);

    assert_eq!(-3, result.difference);
    assert_eq!(Points::ZERO, result.compensation_per_player);
    assert!(!result.invalid);
    assert!(result.all_classified);
}

#[test]
fn unclassified_player_disables_rules() {
    let players = PlayerTable::new();
    let overrides = classified_league();
    let tiers = TierSnapshot::new(&players, &overrides);

    let winners = roster(&["e1", "e2", "m1", "m2", "newcomer"]);
    let losers = roster(&["m4", "m5", "m6", "m7", "m8"]);

    let result = balance::evaluate(&tiers, &winners, &losers);

    assert_eq!(Verdict::default(), result);
    assert!(!result.all_classified);
}

#[test]
fn unnamed_entries_are_ignored() {
    let players = PlayerTable::new();
    let overrides = classified_league();
    let tiers = TierSnapshot::new(&players, &overrides);

    let winners = roster(&["e1", "", "m1"]);
    let losers = roster(&["m4", ""]);

    let result = balance::evaluate(&tiers, &winners, &losers);

    assert!(result.all_classified);
    assert_eq!(1, result.difference);
    assert_eq!(1, balance::team_value(&tiers, ["e1", "", "m1"]));
}

#[test]
fn preview_reports_compensation_for_weaker_side() {
    let players = PlayerTable::new();
    let overrides = classified_league();
    let tiers = TierSnapshot::new(&players, &overrides);

    let result = balance::preview(
        &tiers,
        &["m1", "m2", "m3", "m4", "m5"],
        &["e1", "m6", "m7", "m8", ""],
    );

    assert_eq!(0, result.radiant_value);
    assert_eq!(1, result.dire_value);
    assert_eq!(1, result.difference);
    assert_eq!(4, result.dire_players.len());
    assert_eq!(
        Some(Advisory::Compensation {
            weaker: Side::Radiant
        }),
        result.advisory
    );
    assert_eq!(
        "imbalance of 1 point: losing team would receive +0.5 each",
        result.warning
    );
}

#[test]
fn preview_messages() {
    let players = PlayerTable::new();
    let overrides = classified_league();
    let tiers = TierSnapshot::new(&players, &overrides);

    let invalid = balance::preview(&tiers, &["a1", "m1"], &["e1", "e2"]);
    assert_eq!(3, invalid.difference);
    assert_eq!(Some(Advisory::Invalid { difference: 3 }), invalid.advisory);
    assert_eq!(
        "imbalance of 3 points (≥2): result would be invalid",
        invalid.warning
    );

    let unclassified = balance::preview(&tiers, &["e1", "someone"], &["m1", "m2"]);
    assert!(!unclassified.all_classified);
    assert_eq!(
        "no compensation rule active (unclassified players present)",
        unclassified.warning
    );
    assert_eq!(None, unclassified.radiant_players[1].horse_level);
    assert_eq!(0, unclassified.radiant_players[1].horse_value);

    let balanced = balance::preview(&tiers, &["e1", "a1"], &["m1", "m2"]);
    assert_eq!(None, balanced.advisory);
    assert_eq!("", balanced.warning);
}
