use crate::relay::{Relay, RelayIo, RelayStatus};
use crate::{ClientMessage, Filter, Result};

use std::collections::BTreeSet;

use tracing::debug;
use url::Url;

/// An event drained from one of the pool's relays.
#[derive(Debug)]
pub struct PoolEvent {
    pub relay_url: String,
    pub event: crate::RelayEvent,
}

type Connector<Io> = Box<dyn FnMut(&str) -> Result<Io>>;

/// A set of relay connections keyed by canonical url.
///
/// Connections are opened lazily and reused while they are alive; a
/// relay observed as disconnected is reopened on the next [`ensure`]
/// for its url.
///
/// [`ensure`]: RelayPool::ensure
pub struct RelayPool<Io> {
    pub relays: Vec<Relay<Io>>,
    connector: Connector<Io>,
}

impl<Io: RelayIo> RelayPool<Io> {
    pub fn new(connector: impl FnMut(&str) -> Result<Io> + 'static) -> Self {
        RelayPool {
            relays: vec![],
            connector: Box::new(connector),
        }
    }

    pub fn has(&self, url: &str) -> bool {
        self.index_of(url).is_some()
    }

    pub fn urls(&self) -> BTreeSet<String> {
        self.relays.iter().map(|relay| relay.url.clone()).collect()
    }

    pub fn index_of(&self, url: &str) -> Option<usize> {
        let url = Self::canonicalize_url(url);
        self.relays.iter().position(|relay| relay.url == url)
    }

    pub fn relay_mut(&mut self, index: usize) -> &mut Relay<Io> {
        &mut self.relays[index]
    }

    /// Reuse the connection to `url` if it is still alive, otherwise
    /// (re)connect. Returns the relay's index into `relays`.
    pub fn ensure(&mut self, url: &str) -> Result<usize> {
        let url = Self::canonicalize_url(url);

        if let Some(index) = self.index_of(&url) {
            if self.relays[index].status != RelayStatus::Disconnected {
                debug!("reusing open connection to {}", url);
                return Ok(index);
            }

            debug!("reconnecting to {}", url);
            let io = (self.connector)(&url)?;
            self.relays[index] = Relay::new(url, io);
            return Ok(index);
        }

        debug!("establishing new connection to {}", url);
        let io = (self.connector)(&url)?;
        self.relays.push(Relay::new(url, io));
        Ok(self.relays.len() - 1)
    }

    pub fn add_urls(&mut self, urls: impl IntoIterator<Item = String>) -> Result<()> {
        for url in urls {
            self.ensure(&url)?;
        }
        Ok(())
    }

    pub fn remove_urls(&mut self, urls: &BTreeSet<String>) {
        self.relays
            .retain(|relay| !urls.contains(&relay.url));
    }

    /// Broadcast a message to every relay in the pool.
    pub fn send(&mut self, cmd: &ClientMessage) {
        for relay in &mut self.relays {
            relay.send(cmd);
        }
    }

    pub fn send_to(&mut self, cmd: &ClientMessage, relay_url: &str) {
        if let Some(index) = self.index_of(relay_url) {
            self.relays[index].send(cmd);
        }
    }

    pub fn subscribe(&mut self, sub_id: String, filters: Vec<Filter>) {
        for relay in &mut self.relays {
            relay.subscribe(sub_id.clone(), filters.clone());
        }
    }

    pub fn unsubscribe(&mut self, sub_id: String) {
        for relay in &mut self.relays {
            relay.send(&ClientMessage::close(sub_id.clone()));
        }
    }

    /// Drain one event from the first relay that has one pending.
    pub fn try_recv(&mut self) -> Option<PoolEvent> {
        for relay in &mut self.relays {
            if let Some(event) = relay.try_recv() {
                return Some(PoolEvent {
                    relay_url: relay.url.clone(),
                    event,
                });
            }
        }

        None
    }

    // standardize the format (ie, trailing slashes)
    fn canonicalize_url(url: &str) -> String {
        match Url::parse(url) {
            Ok(parsed) => parsed.to_string(),
            Err(_) => url.to_owned(),
        }
    }
}
