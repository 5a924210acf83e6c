use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::{Action, ActionLog};

/// Version tag written into every payload.
pub const PAYLOAD_VERSION: &str = "1.0";

/// Errors that can occur while decoding a persisted payload
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("payload has no version")]
    MissingVersion,

    #[error("unsupported payload version: {0}")]
    UnsupportedVersion(String),

    #[error("payload `actions` is not a list")]
    ActionsNotAList,
}

/// Errors that can occur while encoding a payload
#[derive(Debug, Error)]
#[error("failed to encode payload: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// The external representation of an action log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedPayload {
    pub actions: ActionLog,
    pub version: String,
}

impl PersistedPayload {
    pub fn new(actions: ActionLog) -> Self {
        Self {
            actions,
            version: PAYLOAD_VERSION.to_owned(),
        }
    }
}

#[derive(Serialize)]
struct PayloadRef<'a> {
    actions: &'a [Action],
    version: &'a str,
}

/// A decoded payload, with the number of individual actions that had to be
/// dropped because they were unknown or incomplete.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub actions: ActionLog,
    pub skipped: usize,
}

/// Encode `log` as a versioned payload string.
pub fn serialize(log: &[Action]) -> Result<String, EncodeError> {
    let payload = PayloadRef {
        actions: log,
        version: PAYLOAD_VERSION,
    };
    Ok(serde_json::to_string(&payload)?)
}

/// Decode a payload string into an action log.
pub fn deserialize(payload: &str) -> Result<ActionLog, DecodeError> {
    decode_payload(payload).map(|decoded| decoded.actions)
}

/// Decode a payload string, reporting how many actions were dropped.
///
/// Payload-level problems (bad JSON, missing or unknown version) fail the
/// whole decode. Inside a good payload, an action with an unknown tool or
/// missing geometry is dropped on its own and the rest of the log survives.
pub fn decode_payload(payload: &str) -> Result<Decoded, DecodeError> {
    let value: serde_json::Value = serde_json::from_str(payload)?;
    let object = value.as_object().ok_or(DecodeError::NotAnObject)?;

    match object.get("version") {
        None | Some(serde_json::Value::Null) => return Err(DecodeError::MissingVersion),
        Some(serde_json::Value::String(version)) if version == PAYLOAD_VERSION => {}
        Some(other) => {
            let version = other.as_str().map_or_else(|| other.to_string(), str::to_owned);
            return Err(DecodeError::UnsupportedVersion(version));
        }
    }

    let Some(actions) = object.get("actions") else {
        log::debug!("payload has no actions, treating it as an empty drawing");
        return Ok(Decoded {
            actions: Vec::new(),
            skipped: 0,
        });
    };
    let entries = actions.as_array().ok_or(DecodeError::ActionsNotAList)?;

    let mut decoded = Decoded {
        actions: Vec::with_capacity(entries.len()),
        skipped: 0,
    };
    for (index, entry) in entries.iter().enumerate() {
        match Action::deserialize(entry) {
            Ok(action) => decoded.actions.push(action),
            Err(err) => {
                log::warn!("dropping action #{index} from payload: {err}");
                decoded.skipped += 1;
            }
        }
    }
    Ok(decoded)
}
