use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerClass {
    Titan,
    Arcane,
    Umbralist,
    NoClass,
}

impl PlayerClass {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "titan" => Some(PlayerClass::Titan),
            "arcane" => Some(PlayerClass::Arcane),
            "umbralist" => Some(PlayerClass::Umbralist),
            "no_class" => Some(PlayerClass::NoClass),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerClass::Titan => "titan",
            PlayerClass::Arcane => "arcane",
            PlayerClass::Umbralist => "umbralist",
            PlayerClass::NoClass => "no_class",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunResult {
    Victory,
    Defeat,
}

impl RunResult {
    /// Accepts the client synonyms `win` and `loss`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "victory" | "win" => Some(RunResult::Victory),
            "defeat" | "loss" => Some(RunResult::Defeat),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunResult::Victory => "victory",
            RunResult::Defeat => "defeat",
        }
    }
}

/// A fully validated submission, ready for the ingestion transaction. The
/// deck/relic/event/node payloads stay opaque JSON.
#[derive(Debug)]
pub struct RunSubmission {
    pub user_id: String,
    pub nickname: String,
    pub score: i64,
    pub seed: String,
    pub run_seed: i64,
    pub run_time_ms: i64,
    pub version: String,
    pub current_floor: i64,
    pub start_class: PlayerClass,
    pub start_deck: Value,
    pub start_relics: Value,
    pub end_class: PlayerClass,
    pub end_deck: Value,
    pub end_relics: Value,
    pub floor_events: Value,
    pub nodes_state: Value,
    pub run_result: RunResult,
    pub inputs_hash: Option<String>,
    pub proof_hash: Option<String>,
    pub flags: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub run_id: String,
    pub best_score: i64,
}
