use crate::{Error, Result};

use serde_json::Value;

/// Result of an `["OK", ...]` publish acknowledgment.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CommandResult {
    pub event_id: String,
    pub accepted: bool,
    pub message: String,
}

/// A relay connection update: lifecycle change or a parsed message.
#[derive(Debug)]
pub enum RelayEvent {
    Opened,
    Closed,
    Error(Error),
    Message(RelayMessage),
}

/// Messages sent by relays, received by clients.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RelayMessage {
    Ok(CommandResult),
    Event { sub_id: String, event: String },
    Eose(String),
    Notice(String),
}

impl RelayMessage {
    pub fn ok(event_id: impl Into<String>, accepted: bool, message: impl Into<String>) -> Self {
        RelayMessage::Ok(CommandResult {
            event_id: event_id.into(),
            accepted,
            message: message.into(),
        })
    }

    pub fn event(sub_id: impl Into<String>, event: impl Into<String>) -> Self {
        RelayMessage::Event {
            sub_id: sub_id.into(),
            event: event.into(),
        }
    }

    pub fn eose(sub_id: impl Into<String>) -> Self {
        RelayMessage::Eose(sub_id.into())
    }

    pub fn notice(msg: impl Into<String>) -> Self {
        RelayMessage::Notice(msg.into())
    }

    pub fn from_json(msg: &str) -> Result<RelayMessage> {
        if msg.is_empty() {
            return Err(Error::Empty);
        }

        // cheap dispatch on the array head before paying for a full parse
        let trimmed = msg.trim_start();
        let known = ["[\"OK\"", "[\"EVENT\"", "[\"EOSE\"", "[\"NOTICE\""]
            .iter()
            .any(|prefix| trimmed.starts_with(prefix));
        if !known {
            return Err(Error::DecodeFailed(format!(
                "unrecognized message type: '{msg}'"
            )));
        }

        let value: Value = serde_json::from_str(trimmed)?;
        let arr = value
            .as_array()
            .ok_or_else(|| Error::DecodeFailed("not a json array".into()))?;

        let kind = arr
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| Error::DecodeFailed("missing message type".into()))?;

        match kind {
            "OK" => {
                let event_id = str_at(arr, 1)?;
                let accepted = arr
                    .get(2)
                    .and_then(Value::as_bool)
                    .ok_or_else(|| Error::DecodeFailed("bad boolean value".into()))?;
                let message = arr.get(3).and_then(Value::as_str).unwrap_or_default();
                Ok(Self::ok(event_id, accepted, message))
            }
            "EVENT" => {
                let sub_id = str_at(arr, 1)?;
                let event = arr
                    .get(2)
                    .filter(|v| v.is_object())
                    .ok_or_else(|| Error::DecodeFailed("invalid EVENT format".into()))?;
                Ok(Self::event(sub_id, event.to_string()))
            }
            "EOSE" => Ok(Self::eose(str_at(arr, 1)?)),
            "NOTICE" => Ok(Self::notice(str_at(arr, 1)?)),
            other => Err(Error::DecodeFailed(format!(
                "unrecognized message type: '{other}'"
            ))),
        }
    }
}

fn str_at<'a>(arr: &'a [Value], index: usize) -> Result<&'a str> {
    arr.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::DecodeFailed(format!("missing string at position {index}")))
}
