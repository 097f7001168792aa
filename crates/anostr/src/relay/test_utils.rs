//! Scripted transports for exercising relay logic without sockets.

use crate::relay::{LinkEvent, RelayIo};

use std::collections::VecDeque;

type Responder = Box<dyn FnMut(&str) -> Vec<LinkEvent>>;

/// A fake transport that records what was sent and replays queued
/// events. A responder closure can turn outgoing messages into
/// incoming ones, which is enough to fake a relay's publish acks.
#[derive(Default)]
pub struct ScriptedIo {
    pub sent: Vec<String>,
    pub incoming: VecDeque<LinkEvent>,
    responder: Option<Responder>,
}

impl ScriptedIo {
    pub fn new() -> Self {
        ScriptedIo::default()
    }

    /// A transport that reports an already-open connection.
    pub fn opened() -> Self {
        let mut io = ScriptedIo::new();
        io.push(LinkEvent::Opened);
        io
    }

    pub fn push(&mut self, event: LinkEvent) {
        self.incoming.push_back(event);
    }

    pub fn with_responder(mut self, responder: impl FnMut(&str) -> Vec<LinkEvent> + 'static) -> Self {
        self.responder = Some(Box::new(responder));
        self
    }

    /// An open transport that accepts every published event.
    pub fn accepting() -> Self {
        ScriptedIo::opened().with_responder(|sent| {
            ok_events_for(sent, true)
        })
    }

    /// An open transport that rejects every published event.
    pub fn rejecting() -> Self {
        ScriptedIo::opened().with_responder(|sent| {
            ok_events_for(sent, false)
        })
    }

    /// An open transport that answers any send with a transport error.
    pub fn erroring() -> Self {
        ScriptedIo::opened()
            .with_responder(|_| vec![LinkEvent::Error("connection reset".to_owned())])
    }
}

/// Build the `["OK", ...]` responses a relay would send for an
/// outgoing `["EVENT", ...]` message; other messages get no reply.
pub fn ok_events_for(sent: &str, accepted: bool) -> Vec<LinkEvent> {
    let Some(id) = event_id_of(sent) else {
        return vec![];
    };
    vec![LinkEvent::Text(format!(
        "[\"OK\",\"{}\",{},\"\"]",
        id, accepted
    ))]
}

/// Extract the event id from a serialized `["EVENT", ...]` message.
pub fn event_id_of(sent: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(sent).ok()?;
    let arr = value.as_array()?;
    if arr.first()?.as_str()? != "EVENT" {
        return None;
    }
    Some(arr.get(1)?.get("id")?.as_str()?.to_owned())
}

impl RelayIo for ScriptedIo {
    fn send_text(&mut self, text: String) {
        if let Some(responder) = &mut self.responder {
            let events = responder(&text);
            self.incoming.extend(events);
        }
        self.sent.push(text);
    }

    fn try_recv(&mut self) -> Option<LinkEvent> {
        self.incoming.pop_front()
    }
}
