pub mod matches;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    pub api_available: bool,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ApiKeyRequest {
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub success: bool,
    pub message: String,
}

impl Message {
    pub fn ok<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HorseOverride {
    pub name: String,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HorseLevel {
    pub name: String,
    pub horse_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExportInfo {
    pub success: bool,
    pub filename: String,
    pub message: String,
}
