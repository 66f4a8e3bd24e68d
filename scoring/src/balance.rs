//! Team strength comparison and the compensation verdict.

use serde::{Deserialize, Serialize};

use crate::model::{PlayerAppearance, Side};
use crate::points::Points;
use crate::tier::{self, Tier, TierSnapshot};

/// Winner advantage at which a result no longer counts.
pub const INVALID_DIFFERENCE: i32 = 2;

/// Paid to every loser when the winners were exactly one tier point stronger.
pub const COMPENSATION: Points = Points::HALF;

/// Outcome of the balance check for one match.
///
/// Persisted on the match so replays reuse it instead of recomputing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Verdict {
    #[serde(alias = "winner_score")]
    pub winner_team_value: i32,
    #[serde(alias = "loser_score")]
    pub loser_team_value: i32,
    pub difference: i32,
    #[serde(alias = "compensation")]
    pub compensation_per_player: Points,
    pub invalid: bool,
    pub all_classified: bool,
}

fn named<'a, I>(names: I) -> impl Iterator<Item = &'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    names.into_iter().filter(|n| !n.is_empty())
}

pub fn team_value<'a, I>(tiers: &TierSnapshot<'_>, names: I) -> i32
where
    I: IntoIterator<Item = &'a str>,
{
    named(names).map(|n| tier::value_of(tiers.tier(n))).sum()
}

pub fn all_classified<'a, I>(tiers: &TierSnapshot<'_>, names: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    named(names).all(|n| tiers.is_classified(n))
}

fn names(roster: &[PlayerAppearance]) -> impl Iterator<Item = &str> {
    roster.iter().map(|p| p.name.as_str())
}

/// Compares the winning roster against the losing one.
///
/// Nothing is compensated or invalidated unless every named player on both
/// sides has a tier.
pub fn evaluate(
    tiers: &TierSnapshot<'_>,
    winners: &[PlayerAppearance],
    losers: &[PlayerAppearance],
) -> Verdict {
    if !all_classified(tiers, names(winners).chain(names(losers))) {
        return Verdict::default();
    }

    let winner_team_value = team_value(tiers, names(winners));
    let loser_team_value = team_value(tiers, names(losers));
    let difference = winner_team_value - loser_team_value;

    let mut verdict = Verdict {
        winner_team_value,
        loser_team_value,
        difference,
        compensation_per_player: Points::ZERO,
        invalid: false,
        all_classified: true,
    };

    if difference >= INVALID_DIFFERENCE {
        verdict.invalid = true;
    } else if difference == 1 {
        verdict.compensation_per_player = COMPENSATION;
    }

    verdict
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    Unclassified,
    Invalid { difference: i32 },
    Compensation { weaker: Side },
}

impl core::fmt::Display for Advisory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unclassified => {
                write!(f, "no compensation rule active (unclassified players present)")
            }
            Self::Invalid { difference } => write!(
                f,
                "imbalance of {} points (≥{}): result would be invalid",
                difference, INVALID_DIFFERENCE
            ),
            Self::Compensation { .. } => write!(
                f,
                "imbalance of 1 point: losing team would receive +{} each",
                COMPENSATION
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewEntry {
    pub name: String,
    pub horse_level: Option<Tier>,
    pub horse_value: i32,
}

/// Balance of two prospective rosters, before anyone has won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub radiant_value: i32,
    pub dire_value: i32,
    pub difference: i32,
    pub radiant_players: Vec<PreviewEntry>,
    pub dire_players: Vec<PreviewEntry>,
    pub advisory: Option<Advisory>,
    pub warning: String,
    pub all_classified: bool,
}

fn preview_entries<S>(tiers: &TierSnapshot<'_>, names: &[S]) -> Vec<PreviewEntry>
where
    S: AsRef<str>,
{
    named(names.iter().map(AsRef::<str>::as_ref))
        .map(|name| {
            let horse_level = tiers.tier(name);
            PreviewEntry {
                name: name.to_owned(),
                horse_level,
                horse_value: tier::value_of(horse_level),
            }
        })
        .collect()
}

pub fn preview<S>(tiers: &TierSnapshot<'_>, radiant: &[S], dire: &[S]) -> Preview
where
    S: AsRef<str>,
{
    let radiant_players = preview_entries(tiers, radiant);
    let dire_players = preview_entries(tiers, dire);

    let all_classified = radiant_players
        .iter()
        .chain(dire_players.iter())
        .all(|p| p.horse_level.is_some());

    let radiant_value: i32 = radiant_players.iter().map(|p| p.horse_value).sum();
    let dire_value: i32 = dire_players.iter().map(|p| p.horse_value).sum();
    let difference = (radiant_value - dire_value).abs();

    let advisory = if !all_classified {
        Some(Advisory::Unclassified)
    } else if difference >= INVALID_DIFFERENCE {
        Some(Advisory::Invalid { difference })
    } else if difference == 1 {
        let weaker = if radiant_value < dire_value {
            Side::Radiant
        } else {
            Side::Dire
        };
        Some(Advisory::Compensation { weaker })
    } else {
        None
    };

    let warning = advisory.as_ref().map(|a| a.to_string()).unwrap_or_default();

    Preview {
        radiant_value,
        dire_value,
        difference,
        radiant_players,
        dire_players,
        advisory,
        warning,
        all_classified,
    }
}
