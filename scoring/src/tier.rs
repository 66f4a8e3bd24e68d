//! Percentile tiers ("horse levels") over the long-term score table.
//!
//! Only players with at least [`QUALIFYING_GAMES`] games are ranked. The top
//! fifth is [`Tier::Elite`], the bottom fifth [`Tier::Auto`], everyone in
//! between [`Tier::Mid`]. A manual override always wins. Players that are
//! neither qualified nor overridden have no tier at all, which callers must
//! keep apart from `Mid`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::{PlayerRecord, PlayerTable};

pub const QUALIFYING_GAMES: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[serde(alias = "特等")]
    Elite,
    #[serde(alias = "中等")]
    Mid,
    #[serde(alias = "自动")]
    Auto,
}

impl Tier {
    pub fn value(self) -> i32 {
        match self {
            Self::Elite => 1,
            Self::Mid => 0,
            Self::Auto => -1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Elite => "elite",
            Self::Mid => "mid",
            Self::Auto => "auto",
        }
    }

    /// Position `rank` (1-based) out of `qualified` ranked players.
    pub fn from_rank(rank: usize, qualified: usize) -> Self {
        if qualified == 0 {
            return Self::Mid;
        }

        // rank / qualified <= 0.2 and <= 0.8, kept in integers
        if rank * 5 <= qualified {
            Self::Elite
        } else if rank * 5 <= qualified * 4 {
            Self::Mid
        } else {
            Self::Auto
        }
    }
}

impl core::fmt::Display for Tier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl core::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "elite" | "特等" => Ok(Self::Elite),
            "mid" | "中等" => Ok(Self::Mid),
            "auto" | "自动" => Ok(Self::Auto),
            other => Err(format!("Unknown tier {:?}", other)),
        }
    }
}

/// Value of a possibly unclassified player inside a team total.
pub fn value_of(tier: Option<Tier>) -> i32 {
    tier.map(Tier::value).unwrap_or(0)
}

pub fn is_qualified(player: &PlayerRecord) -> bool {
    player.total_games >= QUALIFYING_GAMES
}

fn ranked(players: &PlayerTable) -> Vec<&PlayerRecord> {
    let mut qualified: Vec<&PlayerRecord> = players.iter().filter(|p| is_qualified(p)).collect();
    // stable, so equal scores keep first-appearance order
    qualified.sort_by(|a, b| b.score.cmp(&a.score));
    qualified
}

/// Classifies a single player from scratch.
///
/// Every call re-ranks the whole table. Use [`TierSnapshot`] when many
/// players need a tier against the same state.
pub fn classify(
    players: &PlayerTable,
    overrides: &BTreeMap<String, Tier>,
    name: &str,
) -> Option<Tier> {
    if let Some(tier) = overrides.get(name) {
        return Some(*tier);
    }

    let player = players.get(name)?;
    if !is_qualified(player) {
        return None;
    }

    let qualified = ranked(players);
    let rank = qualified.iter().position(|p| p.name == name)? + 1;

    Some(Tier::from_rank(rank, qualified.len()))
}

/// Every tier against one state of the table, ranked once.
#[derive(Debug, Clone)]
pub struct TierSnapshot<'l> {
    overrides: &'l BTreeMap<String, Tier>,
    ranked: HashMap<&'l str, Tier>,
}

impl<'l> TierSnapshot<'l> {
    pub fn new(players: &'l PlayerTable, overrides: &'l BTreeMap<String, Tier>) -> Self {
        let qualified = ranked(players);
        let total = qualified.len();

        let ranked = qualified
            .into_iter()
            .enumerate()
            .map(|(idx, p)| (p.name.as_str(), Tier::from_rank(idx + 1, total)))
            .collect();

        Self { overrides, ranked }
    }

    pub fn tier(&self, name: &str) -> Option<Tier> {
        self.overrides
            .get(name)
            .copied()
            .or_else(|| self.ranked.get(name).copied())
    }

    pub fn is_classified(&self, name: &str) -> bool {
        self.tier(name).is_some()
    }
}
