//! Scoring engine for a private Dota2 league.
//!
//! Turns recorded match results into cumulative player scores, ranks the
//! qualified players into percentile tiers and uses those tiers to decide
//! whether a match was balanced enough to count as-is.

pub mod aggregate;
pub mod balance;
pub mod ledger;
pub mod model;
pub mod points;
pub mod report;
pub mod tier;

pub use balance::{Preview, Verdict};
pub use ledger::{Committed, Ledger};
pub use model::{MatchDraft, MatchRecord, PlayerAppearance, PlayerRecord, Side, Tag};
pub use points::Points;
pub use tier::Tier;
