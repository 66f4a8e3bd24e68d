//! The ordered match history and everything derived from it.
//!
//! Player records are never edited directly: they are the result of
//! replaying [`Ledger::matches`] in order. Adding a match applies it
//! incrementally; updating or deleting one replays the whole history.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregate;
use crate::balance::{self, Preview, Verdict};
use crate::model::{MatchDraft, MatchRecord, PlayerTable};
use crate::tier::{self, Tier, TierSnapshot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredLedger")]
pub struct Ledger {
    matches: Vec<MatchRecord>,
    players: PlayerTable,
    horse_overrides: BTreeMap<String, Tier>,
    next_match_id: u64,
}

/// The persisted shape. Players are derived, so they are rebuilt rather
/// than trusted when a document is loaded.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoredLedger {
    matches: Vec<MatchRecord>,
    horse_overrides: BTreeMap<String, Tier>,
    next_match_id: Option<u64>,
}

impl From<StoredLedger> for Ledger {
    fn from(stored: StoredLedger) -> Self {
        let after_last = stored.matches.iter().map(|m| m.id + 1).max().unwrap_or(1);

        let mut ledger = Self {
            matches: stored.matches,
            players: PlayerTable::new(),
            horse_overrides: stored.horse_overrides,
            next_match_id: stored.next_match_id.unwrap_or(1).max(after_last),
        };
        ledger.recompute();
        ledger
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of committing a new match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Committed {
    pub match_id: u64,
    pub compensation_info: Verdict,
    pub invalid: bool,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            matches: Vec::new(),
            players: PlayerTable::new(),
            horse_overrides: BTreeMap::new(),
            next_match_id: 1,
        }
    }

    /// Matches in insertion order.
    pub fn matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    /// Matches with the most recent first.
    pub fn list_all(&self) -> impl Iterator<Item = &MatchRecord> {
        self.matches.iter().rev()
    }

    pub fn get(&self, id: u64) -> Option<&MatchRecord> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn players(&self) -> &PlayerTable {
        &self.players
    }

    pub fn horse_overrides(&self) -> &BTreeMap<String, Tier> {
        &self.horse_overrides
    }

    pub fn next_match_id(&self) -> u64 {
        self.next_match_id
    }

    pub fn tiers(&self) -> TierSnapshot<'_> {
        TierSnapshot::new(&self.players, &self.horse_overrides)
    }

    pub fn tier_of(&self, name: &str) -> Option<Tier> {
        tier::classify(&self.players, &self.horse_overrides, name)
    }

    /// Verdict for `draft` against the current standings.
    pub fn evaluate(&self, draft: &MatchDraft) -> Verdict {
        let winners = draft.roster(draft.winner);
        let losers = draft.roster(draft.winner.opponent());
        balance::evaluate(&self.tiers(), winners, losers)
    }

    pub fn preview<S>(&self, radiant: &[S], dire: &[S]) -> Preview
    where
        S: AsRef<str>,
    {
        balance::preview(&self.tiers(), radiant, dire)
    }

    #[tracing::instrument(skip(self, draft), fields(winner = %draft.winner))]
    pub fn add(&mut self, draft: MatchDraft, now: chrono::NaiveDateTime) -> Committed {
        let verdict = self.evaluate(&draft);

        let match_id = self.next_match_id;
        self.next_match_id += 1;

        let record = MatchRecord {
            id: match_id,
            date: draft.date,
            timestamp: now,
            winner: draft.winner,
            radiant_players: draft.radiant_players,
            dire_players: draft.dire_players,
            compensation_info: verdict.clone(),
        };

        aggregate::apply_match(&mut self.players, &record);
        self.matches.push(record);

        tracing::info!(
            match_id,
            invalid = verdict.invalid,
            compensation = %verdict.compensation_per_player,
            "Recorded match"
        );

        Committed {
            match_id,
            invalid: verdict.invalid,
            compensation_info: verdict,
        }
    }

    /// Replaces a match, keeping its id and creation time.
    ///
    /// The verdict is re-evaluated against the standings as they are right
    /// before the update, since the rosters or the winner may have changed.
    #[tracing::instrument(skip(self, draft))]
    pub fn update(&mut self, id: u64, draft: MatchDraft) -> bool {
        let verdict = self.evaluate(&draft);

        let existing = match self.matches.iter_mut().find(|m| m.id == id) {
            Some(m) => m,
            None => {
                tracing::debug!("No match to update");
                return false;
            }
        };

        *existing = MatchRecord {
            id: existing.id,
            date: draft.date,
            timestamp: existing.timestamp,
            winner: draft.winner,
            radiant_players: draft.radiant_players,
            dire_players: draft.dire_players,
            compensation_info: verdict,
        };

        self.recompute();
        tracing::info!("Updated match");
        true
    }

    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.matches.len();
        self.matches.retain(|m| m.id != id);
        if self.matches.len() == before {
            tracing::debug!("No match to delete");
            return false;
        }

        self.recompute();
        tracing::info!("Deleted match");
        true
    }

    /// Rebuilds every player record from the stored matches and their
    /// stored verdicts.
    pub fn recompute(&mut self) {
        self.players.clear();
        for record in self.matches.iter() {
            aggregate::apply_match(&mut self.players, record);
        }

        tracing::debug!(
            matches = self.matches.len(),
            players = self.players.len(),
            "Recomputed player statistics"
        );
    }

    pub fn set_override<S>(&mut self, name: S, tier: Tier)
    where
        S: Into<String>,
    {
        let name = name.into();
        tracing::info!(%name, %tier, "Setting tier override");
        self.horse_overrides.insert(name, tier);
    }

    pub fn remove_override(&mut self, name: &str) -> bool {
        let removed = self.horse_overrides.remove(name).is_some();
        if removed {
            tracing::info!(%name, "Removed tier override");
        }
        removed
    }
}
