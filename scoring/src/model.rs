use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::balance::Verdict;
use crate::points::Points;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[serde(alias = "天辉", alias = "Radiant")]
    Radiant,
    #[serde(alias = "夜魔", alias = "Dire")]
    Dire,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Self::Radiant => Self::Dire,
            Self::Dire => Self::Radiant,
        }
    }
}

impl core::fmt::Display for Side {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Radiant => write!(f, "radiant"),
            Self::Dire => write!(f, "dire"),
        }
    }
}

impl core::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "radiant" | "Radiant" | "天辉" => Ok(Self::Radiant),
            "dire" | "Dire" | "夜魔" => Ok(Self::Dire),
            other => Err(format!("Unknown side {:?}", other)),
        }
    }
}

/// Post-game titles that influence scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    #[serde(rename = "MVP")]
    Mvp,
    #[serde(rename = "SVP")]
    Svp,
    /// Stalled/frozen penalty tag.
    #[serde(rename = "僵", alias = "jiang", alias = "frozen")]
    Jiang,
}

impl Tag {
    pub const ALL: [Tag; 3] = [Tag::Mvp, Tag::Svp, Tag::Jiang];

    pub fn label(self) -> &'static str {
        match self {
            Self::Mvp => "MVP",
            Self::Svp => "SVP",
            Self::Jiang => "僵",
        }
    }

    /// Maps a free-form title onto the vocabulary: exact labels first, then
    /// the first label contained in the text. Anything else is dropped.
    pub fn normalize(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.label() == raw)
            .or_else(|| match raw.to_lowercase().as_str() {
                "jiang" | "frozen" => Some(Self::Jiang),
                _ => None,
            })
            .or_else(|| Self::ALL.into_iter().find(|t| raw.contains(t.label())))
    }
}

/// Stored titles are free-form; only the scoring vocabulary is kept.
fn scoring_tags<'de, D>(deserializer: D) -> Result<Vec<Tag>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;

    let mut tags = Vec::new();
    for tag in raw.iter().filter_map(|t| Tag::normalize(t)) {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    Ok(tags)
}

/// One player's line on a match scoreboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerAppearance {
    pub name: String,
    pub hero: String,
    pub level: u32,
    pub kda: String,
    pub participation: String,
    pub damage: String,
    pub economy: u64,
    #[serde(deserialize_with = "scoring_tags")]
    pub tags: Vec<Tag>,
}

impl PlayerAppearance {
    pub fn named<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: &[Tag]) -> Self {
        self.tags = tags.to_vec();
        self
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }
}

/// A match as submitted, before the ledger assigns identity and a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDraft {
    pub date: String,
    pub winner: Side,
    #[serde(default)]
    pub radiant_players: Vec<PlayerAppearance>,
    #[serde(default)]
    pub dire_players: Vec<PlayerAppearance>,
}

impl MatchDraft {
    pub fn roster(&self, side: Side) -> &[PlayerAppearance] {
        match side {
            Side::Radiant => &self.radiant_players,
            Side::Dire => &self.dire_players,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: u64,
    #[serde(default)]
    pub date: String,
    pub timestamp: chrono::NaiveDateTime,
    pub winner: Side,
    #[serde(default)]
    pub radiant_players: Vec<PlayerAppearance>,
    #[serde(default)]
    pub dire_players: Vec<PlayerAppearance>,
    #[serde(default)]
    pub compensation_info: Verdict,
}

impl MatchRecord {
    pub fn roster(&self, side: Side) -> &[PlayerAppearance] {
        match side {
            Side::Radiant => &self.radiant_players,
            Side::Dire => &self.dire_players,
        }
    }

    /// Compensation owed to each member of `side` under the stored verdict.
    pub fn bonus_for(&self, side: Side) -> Points {
        let compensation = self.compensation_info.compensation_per_player;
        if side != self.winner && compensation.is_positive() {
            compensation
        } else {
            Points::ZERO
        }
    }
}

/// Games played together (or against), and how many of those the subject won.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub games: u32,
    pub wins: u32,
}

impl Relation {
    pub fn record(&mut self, won: bool) {
        self.games += 1;
        if won {
            self.wins += 1;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub total_games: u32,
    pub wins: u32,
    pub losses: u32,
    pub score: Points,
    pub mvp_count: u32,
    pub svp_count: u32,
    pub jiang_count: u32,
    pub teammates: BTreeMap<String, Relation>,
    pub opponents: BTreeMap<String, Relation>,
}

impl PlayerRecord {
    pub fn new<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Player records keyed by name, iterated in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerTable {
    records: Vec<PlayerRecord>,
    index: HashMap<String, usize>,
}

impl PlayerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PlayerRecord> {
        self.index.get(name).map(|idx| &self.records[*idx])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PlayerRecord> {
        match self.index.get(name) {
            Some(idx) => self.records.get_mut(*idx),
            None => None,
        }
    }

    pub fn entry(&mut self, name: &str) -> &mut PlayerRecord {
        let idx = match self.index.get(name) {
            Some(idx) => *idx,
            None => {
                self.records.push(PlayerRecord::new(name));
                let idx = self.records.len() - 1;
                self.index.insert(name.to_owned(), idx);
                idx
            }
        };

        &mut self.records[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.records.iter()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}

impl Serialize for PlayerTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.records.iter())
    }
}
