/// A match as entered by hand or extracted from a screenshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MatchInput {
    pub date: Option<String>,
    pub winner: String,
    pub radiant_players: Vec<PlayerInput>,
    pub dire_players: Vec<PlayerInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlayerInput {
    pub name: String,
    pub hero: String,
    pub level: u32,
    pub kda: String,
    pub participation: String,
    pub damage: String,
    pub economy: u64,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AddMatchResponse {
    pub success: bool,
    pub match_id: u64,
    pub invalid: bool,
    pub compensation: f64,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PreviewRequest {
    pub radiant: Vec<String>,
    pub dire: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UploadResult {
    pub image_path: String,
    pub filename: String,
    pub api_available: bool,
    pub recognized: Option<MatchInput>,
    pub error: Option<String>,
}
