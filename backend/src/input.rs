use common::matches::{MatchInput, PlayerInput};
use scoring::{MatchDraft, PlayerAppearance, Side, Tag};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("a winner is required")]
    MissingWinner,
    #[error("unknown winner {0:?}")]
    UnknownWinner(String),
    #[error("at least one player is required")]
    NoPlayers,
}

fn appearance(player: PlayerInput) -> PlayerAppearance {
    let mut tags: Vec<Tag> = Vec::new();
    for tag in player.tags.iter().filter_map(|t| Tag::normalize(t)) {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    PlayerAppearance {
        name: player.name.trim().to_owned(),
        hero: player.hero,
        level: player.level,
        kda: player.kda,
        participation: player.participation,
        damage: player.damage,
        economy: player.economy,
        tags,
    }
}

/// Validates a submitted match and turns it into a draft for the ledger.
///
/// `today` is used when the input carries no date.
pub fn to_draft(input: MatchInput, today: &str) -> Result<MatchDraft, InputError> {
    let winner = input.winner.trim();
    if winner.is_empty() {
        return Err(InputError::MissingWinner);
    }
    let winner: Side = winner
        .parse()
        .map_err(|_| InputError::UnknownWinner(winner.to_owned()))?;

    if input.radiant_players.is_empty() && input.dire_players.is_empty() {
        return Err(InputError::NoPlayers);
    }

    let date = input
        .date
        .map(|d| d.trim().to_owned())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| today.to_owned());

    Ok(MatchDraft {
        date,
        winner,
        radiant_players: input.radiant_players.into_iter().map(appearance).collect(),
        dire_players: input.dire_players.into_iter().map(appearance).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str, tags: &[&str]) -> PlayerInput {
        PlayerInput {
            name: name.to_owned(),
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn converts_with_default_date() {
        let input = MatchInput {
            date: None,
            winner: "夜魔".to_owned(),
            radiant_players: vec![player(" a ", &["MVP", "MVP", "unknown"])],
            dire_players: vec![player("b", &["僵尸SVP"])],
        };

        let draft = to_draft(input, "2025-12-04").unwrap();

        assert_eq!("2025-12-04", draft.date);
        assert_eq!(Side::Dire, draft.winner);
        assert_eq!("a", draft.radiant_players[0].name);
        assert_eq!(vec![Tag::Mvp], draft.radiant_players[0].tags);
        assert_eq!(vec![Tag::Svp], draft.dire_players[0].tags);
    }

    #[test]
    fn rejects_invalid_input() {
        let missing = MatchInput {
            radiant_players: vec![player("a", &[])],
            ..Default::default()
        };
        assert_eq!(Err(InputError::MissingWinner), to_draft(missing, "d"));

        let unknown = MatchInput {
            winner: "green".to_owned(),
            radiant_players: vec![player("a", &[])],
            ..Default::default()
        };
        assert_eq!(
            Err(InputError::UnknownWinner("green".to_owned())),
            to_draft(unknown, "d")
        );

        let empty = MatchInput {
            winner: "radiant".to_owned(),
            ..Default::default()
        };
        assert_eq!(Err(InputError::NoPlayers), to_draft(empty, "d"));
    }
}
