//! Read-side views over a [`Ledger`]: standings and per-player breakdowns.

use serde::Serialize;

use crate::ledger::Ledger;
use crate::model::{PlayerRecord, Relation};
use crate::points::Points;
use crate::tier::{self, Tier, TierSnapshot};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub name: String,
    pub total_games: u32,
    pub wins: u32,
    pub losses: u32,
    pub score: Points,
    pub mvp_count: u32,
    pub svp_count: u32,
    pub jiang_count: u32,
    /// Percentage with one decimal.
    pub win_rate: f64,
    pub horse_level: Option<Tier>,
    pub horse_value: Option<i32>,
    pub horse_override: Option<Tier>,
    pub is_horse_auto: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub player: PlayerSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeammateStat {
    pub name: String,
    pub games: u32,
    pub wins: u32,
    pub win_rate: f64,
}

/// How a single opponent fared against the subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpponentStat {
    pub name: String,
    pub games: u32,
    /// Games the opponent won.
    pub wins: u32,
    pub my_wins: u32,
    /// The opponent's win rate against the subject.
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerDetail {
    #[serde(flatten)]
    pub player: PlayerSummary,
    pub teammate_stats: Vec<TeammateStat>,
    pub opponent_stats: Vec<OpponentStat>,
}

pub fn win_rate(wins: u32, games: u32) -> f64 {
    if games == 0 {
        return 0.0;
    }

    (wins as f64 / games as f64 * 1000.0).round() / 10.0
}

fn by_rate_then_games(a: (f64, u32), b: (f64, u32)) -> core::cmp::Ordering {
    b.0.total_cmp(&a.0).then(b.1.cmp(&a.1))
}

impl Ledger {
    fn summarize(&self, tiers: &TierSnapshot<'_>, player: &PlayerRecord) -> PlayerSummary {
        let horse_level = tiers.tier(&player.name);
        let horse_override = self.horse_overrides().get(&player.name).copied();

        PlayerSummary {
            name: player.name.clone(),
            total_games: player.total_games,
            wins: player.wins,
            losses: player.losses,
            score: player.score,
            mvp_count: player.mvp_count,
            svp_count: player.svp_count,
            jiang_count: player.jiang_count,
            win_rate: win_rate(player.wins, player.total_games),
            horse_level,
            horse_value: horse_level.map(Tier::value),
            horse_override,
            is_horse_auto: tier::is_qualified(player) && horse_override.is_none(),
        }
    }

    /// Every player, highest score first. Equal scores keep the order in
    /// which the players first appeared.
    pub fn standings(&self) -> Vec<PlayerSummary> {
        let tiers = self.tiers();

        let mut players: Vec<_> = self
            .players()
            .iter()
            .map(|p| self.summarize(&tiers, p))
            .collect();
        players.sort_by(|a, b| b.score.cmp(&a.score));
        players
    }

    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.standings()
            .into_iter()
            .enumerate()
            .map(|(idx, player)| LeaderboardEntry {
                rank: idx + 1,
                player,
            })
            .collect()
    }

    /// Tier of every recorded player, in first-appearance order.
    pub fn all_tiers(&self) -> Vec<(String, Option<Tier>)> {
        let tiers = self.tiers();
        self.players()
            .iter()
            .map(|p| (p.name.clone(), tiers.tier(&p.name)))
            .collect()
    }

    pub fn player_detail(&self, name: &str) -> Option<PlayerDetail> {
        let record = self.players().get(name)?;
        let player = self.summarize(&self.tiers(), record);

        let mut teammate_stats: Vec<TeammateStat> = record
            .teammates
            .iter()
            .filter(|(_, rel)| rel.games > 0)
            .map(|(name, rel)| TeammateStat {
                name: name.clone(),
                games: rel.games,
                wins: rel.wins,
                win_rate: win_rate(rel.wins, rel.games),
            })
            .collect();
        teammate_stats.sort_by(|a, b| {
            by_rate_then_games((a.win_rate, a.games), (b.win_rate, b.games))
        });

        let mut opponent_stats: Vec<OpponentStat> = record
            .opponents
            .iter()
            .filter(|(_, rel)| rel.games > 0)
            .map(|(name, rel)| opponent_stat(name, rel))
            .collect();
        opponent_stats.sort_by(|a, b| {
            by_rate_then_games((a.win_rate, a.games), (b.win_rate, b.games))
        });

        Some(PlayerDetail {
            player,
            teammate_stats,
            opponent_stats,
        })
    }
}

fn opponent_stat(name: &str, rel: &Relation) -> OpponentStat {
    let opponent_wins = rel.games - rel.wins;

    OpponentStat {
        name: name.to_owned(),
        games: rel.games,
        wins: opponent_wins,
        my_wins: rel.wins,
        win_rate: win_rate(opponent_wins, rel.games),
    }
}
