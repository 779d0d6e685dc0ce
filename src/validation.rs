use crate::models::player::ProfileUpsert;
use crate::models::run::{PlayerClass, RunResult, RunSubmission};
use serde_json::{Map, Value};

pub const MAX_RUN_TIME_MS: i64 = 24 * 60 * 60 * 1000;
const NICKNAME_MIN_LEN: usize = 3;
const NICKNAME_MAX_LEN: usize = 16;
const MAX_HASH_LEN: usize = 256;
const MAX_USER_ID_LEN: usize = 64;
const MAX_META_LEN: usize = 64;

// Violations are collected, not short-circuited: the client gets every
// failing code in one response. On error paths the parsed values fall back
// to sentinels that are never used, since a non-empty code list returns Err.

fn structured_field(
    data: &Map<String, Value>,
    key: &str,
    code: &'static str,
    errors: &mut Vec<&'static str>,
) -> Value {
    match data.get(key) {
        Some(value @ (Value::Object(_) | Value::Array(_))) => value.clone(),
        _ => {
            errors.push(code);
            Value::Null
        }
    }
}

fn bounded_str_field(
    data: &Map<String, Value>,
    key: &str,
    max_len: usize,
    code: &'static str,
    errors: &mut Vec<&'static str>,
) -> Option<String> {
    match data.get(key).and_then(Value::as_str) {
        Some(value) if value.chars().count() > max_len => {
            errors.push(code);
            None
        }
        Some(value) => Some(value.to_string()),
        None => None,
    }
}

fn nickname_checks(nickname: &str, errors: &mut Vec<&'static str>) {
    if nickname.is_empty() {
        errors.push("nickname_required");
    }
    if !nickname.is_empty() && nickname.trim() != nickname {
        errors.push("nickname_trim");
    }
    let len = nickname.chars().count();
    if len < NICKNAME_MIN_LEN || len > NICKNAME_MAX_LEN {
        errors.push("nickname_length");
    }
}

pub fn validate_run_payload(payload: &Value) -> Result<RunSubmission, Vec<&'static str>> {
    let data = match payload.as_object() {
        Some(map) => map,
        None => return Err(vec!["payload_invalid"]),
    };
    let mut errors: Vec<&'static str> = Vec::new();

    let user_id = data
        .get("user_id")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("");
    if user_id.is_empty() {
        errors.push("user_id_required");
    }

    let nickname = data.get("nickname").and_then(Value::as_str).unwrap_or("");
    nickname_checks(nickname, &mut errors);

    let score = match data.get("score").and_then(Value::as_i64) {
        Some(value) if value >= 0 => value,
        _ => {
            errors.push("score_invalid");
            0
        }
    };

    let seed = data.get("seed").and_then(Value::as_str).unwrap_or("");
    if seed.is_empty() {
        errors.push("seed_required");
    }

    let run_seed = match data.get("run_seed").and_then(Value::as_i64) {
        Some(value) if value >= 0 => value,
        _ => {
            errors.push("run_seed_invalid");
            0
        }
    };

    let run_time_ms = match data.get("run_time_ms").and_then(Value::as_i64) {
        Some(value) if (0..=MAX_RUN_TIME_MS).contains(&value) => value,
        _ => {
            errors.push("run_time_ms_invalid");
            0
        }
    };

    let version = data.get("version").and_then(Value::as_str).unwrap_or("");
    if version.is_empty() {
        errors.push("version_required");
    }

    let current_floor = match data.get("current_floor").and_then(Value::as_i64) {
        Some(value) if value >= 0 => value,
        _ => {
            errors.push("current_floor_invalid");
            0
        }
    };

    let start_class = match data
        .get("start_class")
        .and_then(Value::as_str)
        .and_then(PlayerClass::parse)
    {
        Some(class) => class,
        None => {
            errors.push("start_class_invalid");
            PlayerClass::NoClass
        }
    };

    let start_deck = structured_field(data, "start_deck", "start_deck_required", &mut errors);
    let start_relics = structured_field(data, "start_relics", "start_relics_required", &mut errors);

    let end_class = match data
        .get("end_class")
        .and_then(Value::as_str)
        .and_then(PlayerClass::parse)
    {
        Some(class) => class,
        None => {
            errors.push("end_class_invalid");
            PlayerClass::NoClass
        }
    };

    let end_deck = structured_field(data, "end_deck", "end_deck_required", &mut errors);
    let end_relics = structured_field(data, "end_relics", "end_relics_required", &mut errors);
    let floor_events = structured_field(data, "floor_events", "floor_events_required", &mut errors);
    let nodes_state = structured_field(data, "nodes_state", "nodes_state_required", &mut errors);

    let run_result = match data
        .get("run_result")
        .and_then(Value::as_str)
        .and_then(RunResult::parse)
    {
        Some(result) => result,
        None => {
            errors.push("run_result_invalid");
            RunResult::Defeat
        }
    };

    let inputs_hash =
        bounded_str_field(data, "inputs_hash", MAX_HASH_LEN, "inputs_hash_length", &mut errors);
    let proof_hash =
        bounded_str_field(data, "proof_hash", MAX_HASH_LEN, "proof_hash_length", &mut errors);

    let flags = match data.get("flags") {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.clone()),
    };
    // Only completed runs are accepted; a missing flag counts as completed.
    if let Some(completed) = flags.as_ref().and_then(|f| f.get("completed")) {
        match completed {
            Value::Bool(true) => {}
            Value::Bool(false) => errors.push("run_incomplete"),
            _ => errors.push("flags_completed_invalid"),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(RunSubmission {
        user_id: user_id.to_string(),
        nickname: nickname.to_string(),
        score,
        seed: seed.to_string(),
        run_seed,
        run_time_ms,
        version: version.to_string(),
        current_floor,
        start_class,
        start_deck,
        start_relics,
        end_class,
        end_deck,
        end_relics,
        floor_events,
        nodes_state,
        run_result,
        inputs_hash,
        proof_hash,
        flags,
    })
}

pub fn validate_profile_payload(payload: &Value) -> Result<ProfileUpsert, Vec<&'static str>> {
    let data = match payload.as_object() {
        Some(map) => map,
        None => return Err(vec!["payload_invalid"]),
    };
    let mut errors: Vec<&'static str> = Vec::new();

    let nickname = data.get("nickname").and_then(Value::as_str).unwrap_or("");
    nickname_checks(nickname, &mut errors);
    if !nickname.is_empty()
        && !nickname.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        errors.push("nickname_charset");
    }

    let platform = bounded_str_field(data, "platform", MAX_META_LEN, "platform_length", &mut errors);
    let platform_user_id = bounded_str_field(
        data,
        "platform_user_id",
        MAX_META_LEN,
        "platform_user_id_length",
        &mut errors,
    );
    let app_version = bounded_str_field(
        data,
        "app_version",
        MAX_META_LEN,
        "app_version_length",
        &mut errors,
    );
    let avatar_id =
        bounded_str_field(data, "avatar_id", MAX_META_LEN, "avatar_id_length", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ProfileUpsert {
        nickname: nickname.to_string(),
        platform,
        platform_user_id,
        app_version,
        avatar_id,
    })
}

/// Lookup endpoints take the user id as a path segment; it is bounded but
/// otherwise free-form.
pub fn validate_user_id_param(raw: &str) -> Result<String, Vec<&'static str>> {
    let user_id = raw.trim();
    let mut errors: Vec<&'static str> = Vec::new();
    if user_id.is_empty() {
        errors.push("user_id_required");
    }
    if user_id.chars().count() > MAX_USER_ID_LEN {
        errors.push("user_id_length");
    }
    if errors.is_empty() {
        Ok(user_id.to_string())
    } else {
        Err(errors)
    }
}
