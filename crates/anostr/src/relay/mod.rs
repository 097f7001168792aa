use ewebsock::{Options, WsEvent, WsMessage, WsReceiver, WsSender};

use crate::{ClientMessage, Error, Filter, Result};
use std::fmt;
use tracing::{debug, error, info};

pub mod message;
pub mod pool;
pub mod test_utils;

use self::message::{RelayEvent, RelayMessage};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RelayStatus {
    Connected,
    Connecting,
    Disconnected,
}

/// What a transport hands back when polled.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum LinkEvent {
    Opened,
    Text(String),
    Error(String),
    Closed,
}

/// The seam between relay logic and the underlying socket. Production
/// code uses [`WsIo`]; tests drive the same code with scripted fakes.
pub trait RelayIo {
    fn send_text(&mut self, text: String);
    fn try_recv(&mut self) -> Option<LinkEvent>;
}

/// Non-blocking websocket transport.
pub struct WsIo {
    sender: WsSender,
    receiver: WsReceiver,
}

impl WsIo {
    pub fn connect(url: &str) -> Result<Self> {
        let (sender, receiver) =
            ewebsock::connect(url, Options::default()).map_err(Error::Generic)?;
        Ok(WsIo { sender, receiver })
    }
}

impl RelayIo for WsIo {
    fn send_text(&mut self, text: String) {
        self.sender.send(WsMessage::Text(text));
    }

    fn try_recv(&mut self) -> Option<LinkEvent> {
        while let Some(event) = self.receiver.try_recv() {
            match event {
                WsEvent::Opened => return Some(LinkEvent::Opened),
                WsEvent::Closed => return Some(LinkEvent::Closed),
                WsEvent::Error(err) => return Some(LinkEvent::Error(err)),
                WsEvent::Message(WsMessage::Text(text)) => return Some(LinkEvent::Text(text)),
                WsEvent::Message(WsMessage::Ping(data)) => {
                    self.sender.send(WsMessage::Pong(data));
                }
                WsEvent::Message(_) => {}
            }
        }
        None
    }
}

/// A single relay connection plus its observed status.
pub struct Relay<Io> {
    pub url: String,
    pub status: RelayStatus,
    pub io: Io,
}

impl<Io> fmt::Debug for Relay<Io> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relay")
            .field("url", &self.url)
            .field("status", &self.status)
            .finish()
    }
}

impl<Io: RelayIo> Relay<Io> {
    pub fn new(url: String, io: Io) -> Self {
        Relay {
            url,
            status: RelayStatus::Connecting,
            io,
        }
    }

    pub fn send(&mut self, msg: &ClientMessage) {
        let json = match msg.to_json() {
            Ok(json) => {
                debug!("sending {} to {}", json, self.url);
                json
            }
            Err(e) => {
                error!("error serializing client message: {e}");
                return;
            }
        };

        self.io.send_text(json);
    }

    pub fn subscribe(&mut self, sub_id: String, filters: Vec<Filter>) {
        info!("sending '{}' subscription to {}", sub_id, self.url);
        self.send(&ClientMessage::req(sub_id, filters));
    }

    /// Poll the transport, tracking connection status as a side effect.
    pub fn try_recv(&mut self) -> Option<RelayEvent> {
        let event = self.io.try_recv()?;

        match &event {
            LinkEvent::Opened => {
                self.status = RelayStatus::Connected;
            }
            LinkEvent::Closed => {
                self.status = RelayStatus::Disconnected;
            }
            LinkEvent::Error(err) => {
                error!("relay {}: {}", self.url, err);
                self.status = RelayStatus::Disconnected;
            }
            LinkEvent::Text(_) => {}
        }

        Some(event.into())
    }
}

impl From<LinkEvent> for RelayEvent {
    fn from(event: LinkEvent) -> RelayEvent {
        match event {
            LinkEvent::Opened => RelayEvent::Opened,
            LinkEvent::Closed => RelayEvent::Closed,
            LinkEvent::Error(err) => RelayEvent::Error(Error::Generic(err)),
            LinkEvent::Text(text) => match RelayMessage::from_json(&text) {
                Ok(msg) => RelayEvent::Message(msg),
                Err(err) => RelayEvent::Error(err),
            },
        }
    }
}
