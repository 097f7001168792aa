use crate::{Filter, Note, Result};

use serde_json::json;

/// Messages sent by clients, received by relays.
#[derive(Debug, Clone)]
pub enum ClientMessage {
    Event(Note),
    Req { sub_id: String, filters: Vec<Filter> },
    Close { sub_id: String },
    Raw(String),
}

impl ClientMessage {
    pub fn event(note: Note) -> Self {
        ClientMessage::Event(note)
    }

    pub fn req(sub_id: String, filters: Vec<Filter>) -> Self {
        ClientMessage::Req { sub_id, filters }
    }

    pub fn close(sub_id: String) -> Self {
        ClientMessage::Close { sub_id }
    }

    pub fn raw(raw: String) -> Self {
        ClientMessage::Raw(raw)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(match self {
            Self::Event(note) => format!("[\"EVENT\",{}]", note.to_json()?),
            Self::Req { sub_id, filters } => {
                if filters.is_empty() {
                    format!("[\"REQ\",\"{}\",{{}}]", sub_id)
                } else {
                    let filters_json: Result<Vec<String>> =
                        filters.iter().map(|f| f.json()).collect();
                    format!("[\"REQ\",\"{}\",{}]", sub_id, filters_json?.join(","))
                }
            }
            Self::Close { sub_id } => json!(["CLOSE", sub_id]).to_string(),
            Self::Raw(raw) => raw.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn req_json_shape() {
        let msg = ClientMessage::req(
            "sub-1".to_owned(),
            vec![Filter::new().kinds([1]).limit(100)],
        );
        assert_eq!(
            msg.to_json().expect("json"),
            r#"["REQ","sub-1",{"kinds":[1],"limit":100}]"#
        );
    }

    #[test]
    fn event_json_is_wrapped_array() {
        let note = Note::from_json(
            r#"{"id":"70b10f70c1318967eddf12527799411b1a9780ad9c43858f5e5fcd45486a13a5","pubkey":"379e863e8357163b5bce5d2688dc4f1dcc2d505222fb8d74db600f30535dfdfe","created_at":1612809991,"kind":1,"tags":[],"content":"test","sig":"273a9cd5d11455590f4359500bccb7a89428262b96b3ea87a756b770964472f8c3e87f5d5e64d8d2e859a71462a3f477b554565c4f2f326cb01dd7620db71502"}"#,
        )
        .expect("note");

        let json = ClientMessage::event(note).to_json().expect("json");
        assert!(json.starts_with("[\"EVENT\",{"));
        assert!(json.ends_with("}]"));
    }

    #[test]
    fn close_json_shape() {
        let msg = ClientMessage::close("sub-1".to_owned());
        assert_eq!(msg.to_json().expect("json"), r#"["CLOSE","sub-1"]"#);
    }
}
