//! Folding concluded matches into the per-player running totals.

use crate::model::{MatchRecord, PlayerAppearance, PlayerTable, Side, Tag};
use crate::points::Points;

/// Applies one appearance to its player's record, creating it on first sight.
///
/// Tags are counted wherever they appear; only the score rules look at
/// which side won. Entries without a name are skipped.
pub fn apply_appearance(
    players: &mut PlayerTable,
    appearance: &PlayerAppearance,
    won: bool,
    bonus: Points,
) {
    if appearance.name.is_empty() {
        tracing::debug!("Skipping appearance without a name");
        return;
    }

    let is_mvp = appearance.has_tag(Tag::Mvp);
    let is_svp = appearance.has_tag(Tag::Svp);
    let is_jiang = appearance.has_tag(Tag::Jiang);

    let player = players.entry(&appearance.name);
    player.total_games += 1;

    if won {
        player.wins += 1;
        player.score += Points::ONE;
        if is_mvp {
            player.score += Points::HALF;
        }
    } else {
        player.losses += 1;
        player.score -= Points::ONE;
        if is_svp {
            player.score += Points::HALF;
        }
        if is_jiang {
            player.score -= Points::HALF;
        }
    }

    if bonus.is_positive() {
        player.score += bonus;
    }

    if is_mvp {
        player.mvp_count += 1;
    }
    if is_svp {
        player.svp_count += 1;
    }
    if is_jiang {
        player.jiang_count += 1;
    }
}

fn named(roster: &[PlayerAppearance]) -> Vec<&str> {
    roster
        .iter()
        .map(|p| p.name.as_str())
        .filter(|n| !n.is_empty())
        .collect()
}

/// Records who played with and against whom.
///
/// Relations live on the subject's record and count the subject's wins, so
/// an opponent's success against the subject is `games - wins`. Subjects
/// without a record are left alone.
pub fn apply_relations(
    players: &mut PlayerTable,
    winner: Side,
    radiant: &[PlayerAppearance],
    dire: &[PlayerAppearance],
) {
    let radiant = named(radiant);
    let dire = named(dire);

    for (side, own, other) in [
        (Side::Radiant, &radiant, &dire),
        (Side::Dire, &dire, &radiant),
    ] {
        let won = side == winner;

        for subject in own.iter() {
            let record = match players.get_mut(subject) {
                Some(r) => r,
                None => continue,
            };

            for mate in own.iter().filter(|m| *m != subject) {
                record
                    .teammates
                    .entry((*mate).to_owned())
                    .or_default()
                    .record(won);
            }

            for opponent in other.iter() {
                record
                    .opponents
                    .entry((*opponent).to_owned())
                    .or_default()
                    .record(won);
            }
        }
    }
}

/// Replays a stored match, paying out the compensation its verdict recorded.
pub fn apply_match(players: &mut PlayerTable, record: &MatchRecord) {
    for side in [Side::Radiant, Side::Dire] {
        let won = side == record.winner;
        let bonus = record.bonus_for(side);

        for appearance in record.roster(side) {
            apply_appearance(players, appearance, won, bonus);
        }
    }

    apply_relations(
        players,
        record.winner,
        &record.radiant_players,
        &record.dire_players,
    );
}
