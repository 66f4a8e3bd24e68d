use scoring::report::LeaderboardEntry;

pub const EXPORT_FILENAME: &str = "dota_stats.csv";

const HEADER: [&str; 11] = [
    "player",
    "games",
    "wins",
    "losses",
    "score",
    "win rate %",
    "MVP",
    "SVP",
    "僵",
    "tier",
    "tier value",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid file name {0:?}")]
    InvalidName(String),
}

pub fn write_leaderboard<W>(writer: W, entries: &[LeaderboardEntry]) -> Result<(), ExportError>
where
    W: std::io::Write,
{
    let mut writer = csv::WriterBuilder::new().from_writer(writer);

    writer.write_record(HEADER)?;
    for entry in entries {
        let player = &entry.player;
        writer.write_record([
            player.name.clone(),
            player.total_games.to_string(),
            player.wins.to_string(),
            player.losses.to_string(),
            player.score.to_string(),
            player.win_rate.to_string(),
            player.mvp_count.to_string(),
            player.svp_count.to_string(),
            player.jiang_count.to_string(),
            player
                .horse_level
                .map(|t| t.label().to_owned())
                .unwrap_or_default(),
            player
                .horse_value
                .map(|v| v.to_string())
                .unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the leaderboard into `folder` and returns the file name.
pub async fn export_to_folder(
    folder: &std::path::Path,
    entries: &[LeaderboardEntry],
) -> Result<String, ExportError> {
    let mut content = Vec::new();
    write_leaderboard(&mut content, entries)?;

    if !tokio::fs::try_exists(folder).await.unwrap_or(false) {
        tokio::fs::create_dir_all(folder).await?;
    }
    tokio::fs::write(folder.join(EXPORT_FILENAME), content).await?;

    tracing::info!(rows = entries.len(), "Exported leaderboard");

    Ok(EXPORT_FILENAME.to_owned())
}

/// Resolves a requested download inside `folder`, refusing anything that
/// could escape it.
pub fn download_path(
    folder: &std::path::Path,
    filename: &str,
) -> Result<std::path::PathBuf, ExportError> {
    let plain = !filename.is_empty()
        && !filename.starts_with('.')
        && !filename.contains(['/', '\\'])
        && !filename.contains("..");

    if !plain {
        return Err(ExportError::InvalidName(filename.to_owned()));
    }

    Ok(folder.join(filename))
}
