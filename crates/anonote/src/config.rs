use std::time::Duration;

/// Clearnet relays every action publishes to by default.
pub const DEFAULT_RELAYS: &[&str] = &[
    "wss://relay.damus.io",
    "wss://relay.primal.net",
    "wss://relay.nostr.band",
];

/// Onion relays, selected with the tor-relays option.
pub const TOR_RELAYS: &[&str] = &[
    "ws://oxtrdevav64z64yb7x6rjg4ntzqjhedm5b5zjqulugknhzr46ny2qbad.onion",
    "ws://2jsnlhfnelig5acq6iacydmzdbdmg7xwunm4xl6qwbvzacw4lwrjmlyd.onion",
    "ws://nostrnetl6yd5whkldj3vqsxyyaq3tkuspy23a3qgx7cdepb4564qgqd.onion",
];

/// Delay enforced between any two submissions, regardless of target.
pub const SUBMIT_COOLDOWN: Duration = Duration::from_secs(30);

/// How long a publish waits for a relay's ack before giving up on it.
pub const PUBLISH_DEADLINE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub relays: Vec<String>,
    pub tor_relays: Vec<String>,
    pub cooldown: Duration,
    pub publish_deadline: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            relays: DEFAULT_RELAYS.iter().map(|s| s.to_string()).collect(),
            tor_relays: TOR_RELAYS.iter().map(|s| s.to_string()).collect(),
            cooldown: SUBMIT_COOLDOWN,
            publish_deadline: PUBLISH_DEADLINE,
        }
    }
}

impl ClientConfig {
    /// The relay set an action publishes to.
    pub fn relay_set(&self, use_tor_relays: bool) -> &[String] {
        if use_tor_relays {
            &self.tor_relays
        } else {
            &self.relays
        }
    }
}
