//! Extracts a match draft from a post-game screenshot using Gemini.

use base64::Engine;
use serde::{Deserialize, Serialize};

use common::matches::{MatchInput, PlayerInput};

pub const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

const TIMEOUT: std::time::Duration = std::time::Duration::from_secs(120);

static MIME_TYPES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "png" => "image/png",
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "gif" => "image/gif",
    "webp" => "image/webp",
};

const PROMPT: &str = r#"这是一张DOTA2游戏比赛结果截图，请帮我识别其中的信息。

请提取：
1. 获胜方是哪一方（天辉或夜魔）
2. 所有玩家的昵称
3. 玩家的称号标签（只关注：MVP、SVP、僵 这三种）

截图说明：
- 图片分上下两部分，有"胜利"文字的是获胜方
- 每方有5个玩家
- 玩家昵称在头像旁边
- 称号标签是玩家名下方的小字

请用以下JSON格式回复：
{"winner":"天辉或夜魔","radiant_players":[{"name":"玩家名","tags":["MVP"]}],"dire_players":[{"name":"玩家名","tags":[]}]}

注意：天辉=Radiant，夜魔=Dire。只返回JSON，不要其他文字。"#;

/// Looks up the MIME type for an accepted image file name.
pub fn mime_type(filename: &str) -> Option<&'static str> {
    let (_, extension) = filename.rsplit_once('.')?;
    MIME_TYPES.get(extension.to_lowercase().as_str()).copied()
}

#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    #[error("no Gemini API key configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API request failed: {status} - {message}")]
    Status { status: u16, message: String },
    #[error("content blocked: {0}")]
    Blocked(String),
    #[error("API returned no candidates")]
    NoCandidates,
    #[error("API returned empty text")]
    EmptyText,
    #[error("could not parse recognized match: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'p> {
    contents: [RequestContent<'p>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'p> {
    parts: [RequestPart<'p>; 2],
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'p> {
    Image { inline_data: InlineData<'p> },
    Text { text: &'p str },
}

#[derive(Debug, Serialize)]
struct InlineData<'p> {
    mime_type: &'p str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GenerateResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawReply {
    winner: String,
    radiant_players: Vec<serde_json::Value>,
    dire_players: Vec<serde_json::Value>,
}

/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Clone)]
pub struct Recognizer {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl Recognizer {
    pub fn new(api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            endpoint: GEMINI_API_URL.to_owned(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn with_endpoint<S>(mut self, endpoint: S) -> Self
    where
        S: Into<String>,
    {
        self.endpoint = endpoint.into();
        self
    }

    pub fn set_api_key<S>(&mut self, api_key: S)
    where
        S: Into<String>,
    {
        let api_key = api_key.into();
        self.api_key = (!api_key.is_empty()).then_some(api_key);
    }

    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    #[tracing::instrument(skip(self, image))]
    pub async fn recognize(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<MatchInput, RecognitionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(RecognitionError::MissingApiKey)?;

        let request = GenerateRequest {
            contents: [RequestContent {
                parts: [
                    RequestPart::Image {
                        inline_data: InlineData {
                            mime_type,
                            data: base64::engine::general_purpose::STANDARD.encode(image),
                        },
                    },
                    RequestPart::Text { text: PROMPT },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                max_output_tokens: 2000,
            },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            return Err(RecognitionError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let response: GenerateResponse = response.json().await?;
        let text = first_candidate_text(response)?;
        tracing::debug!(?text, "Gemini reply");

        parse_reply(&text)
    }
}

fn first_candidate_text(response: GenerateResponse) -> Result<String, RecognitionError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .filter(|r| !r.is_empty())
            .map(RecognitionError::Blocked)
            .unwrap_or(RecognitionError::NoCandidates));
    };

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(RecognitionError::Blocked("SAFETY".to_owned()));
    }

    candidate
        .content
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or(RecognitionError::EmptyText)
}

fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

fn clean_roster(raw: Vec<serde_json::Value>) -> Vec<PlayerInput> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<PlayerInput>(value) {
            Ok(player) => Some(player),
            Err(e) => {
                tracing::debug!(?e, "Skipping malformed player entry");
                None
            }
        })
        .filter_map(|mut player| {
            player.name = player.name.trim().to_owned();
            if player.name.is_empty() {
                return None;
            }

            player.tags = player
                .tags
                .iter()
                .filter_map(|t| scoring::Tag::normalize(t))
                .map(|t| t.label().to_owned())
                .collect();

            Some(player)
        })
        .collect()
}

/// Parses the model's text reply into a match input.
pub fn parse_reply(text: &str) -> Result<MatchInput, RecognitionError> {
    let raw: RawReply = serde_json::from_str(strip_fences(text))?;

    Ok(MatchInput {
        date: None,
        winner: raw.winner.trim().to_owned(),
        radiant_players: clean_roster(raw.radiant_players),
        dire_players: clean_roster(raw.dire_players),
    })
}
