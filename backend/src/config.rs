/// Runtime settings, taken from the command line or the environment.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "backend", about = "Score keeping service for a private Dota2 league")]
pub struct Config {
    #[arg(long, env = "LEAGUE_LISTEN", default_value = "0.0.0.0:5000")]
    pub listen: String,

    /// JSON document holding the whole league.
    #[arg(long, env = "LEAGUE_DATA_FILE", default_value = "game_data.json")]
    pub data_file: std::path::PathBuf,

    #[arg(long, env = "LEAGUE_UPLOAD_DIR", default_value = "uploads/")]
    pub upload_dir: std::path::PathBuf,

    #[arg(long, env = "LEAGUE_STATIC_DIR", default_value = "static/")]
    pub static_dir: std::path::PathBuf,

    #[arg(long, env = "LEAGUE_EXPORT_DIR", default_value = "exports/")]
    pub export_dir: std::path::PathBuf,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Where a key set through the API is persisted.
    #[arg(long, default_value = ".env")]
    pub env_file: std::path::PathBuf,

    /// Keep the league in memory only; nothing is written to disk.
    #[arg(long)]
    pub in_memory: bool,
}

const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Sets the API key line of an env file, leaving every other line as is.
fn with_api_key(existing: &str, api_key: &str) -> String {
    let assignment = format!("{}={}", API_KEY_VAR, api_key);

    let mut replaced = false;
    let mut lines: Vec<String> = Vec::new();
    for line in existing.lines() {
        let key = line.trim_start().trim_start_matches("export ").split('=').next();
        if key.map(str::trim) == Some(API_KEY_VAR) {
            if !replaced {
                lines.push(assignment.clone());
                replaced = true;
            }
            continue;
        }
        lines.push(line.to_owned());
    }
    if !replaced {
        lines.push(assignment);
    }

    let mut content = lines.join("\n");
    content.push('\n');
    content
}

/// Persists `api_key` into `env_file`, replacing the file atomically.
pub async fn store_api_key(env_file: &std::path::Path, api_key: &str) -> std::io::Result<()> {
    let existing = match tokio::fs::read_to_string(env_file).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };

    let mut temporary = env_file.as_os_str().to_os_string();
    temporary.push(".tmp");
    let temporary = std::path::PathBuf::from(temporary);

    tokio::fs::write(&temporary, with_api_key(&existing, api_key)).await?;
    tokio::fs::rename(&temporary, env_file).await
}
