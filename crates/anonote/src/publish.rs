use anostr::{ClientMessage, Note, RelayEvent, RelayIo, RelayMessage, RelayPool, RelayStatus};

use rand::Rng;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How an action's messages reach the relay set.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PublishStrategy {
    /// Fan out to every relay at once.
    Direct,
    /// One random relay at a time, falling back through the set.
    Hop,
}

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Attempt {
    Connecting,
    AwaitingAck,
    Accepted,
    Failed,
}

impl Attempt {
    fn settled(&self) -> bool {
        matches!(self, Attempt::Accepted | Attempt::Failed)
    }
}

/// Send `note` to every relay in `relay_set` and wait for all of them
/// to settle, bounded by `deadline`. Returns how many relays
/// explicitly accepted the note.
///
/// The in-flight sends interleave on the calling thread; their
/// settling order does not affect the count.
pub fn publish_direct<Io: RelayIo>(
    pool: &mut RelayPool<Io>,
    note: &Note,
    relay_set: &[String],
    deadline: Duration,
) -> usize {
    let message = ClientMessage::event(note.clone());
    let mut attempts: Vec<(usize, Attempt)> = Vec::with_capacity(relay_set.len());

    for url in relay_set {
        match pool.ensure(url) {
            Ok(index) => {
                let relay = pool.relay_mut(index);
                let state = if relay.status == RelayStatus::Connected {
                    relay.send(&message);
                    Attempt::AwaitingAck
                } else {
                    Attempt::Connecting
                };
                attempts.push((index, state));
            }
            Err(err) => {
                warn!("failed to connect to relay {url}: {err}");
            }
        }
    }

    let expected_id = note.id.hex();
    let started = Instant::now();

    while attempts.iter().any(|(_, state)| !state.settled()) {
        let mut progressed = false;

        for (index, state) in attempts.iter_mut() {
            if state.settled() {
                continue;
            }

            let relay = pool.relay_mut(*index);
            while let Some(event) = relay.try_recv() {
                progressed = true;

                match event {
                    RelayEvent::Opened => {
                        if *state == Attempt::Connecting {
                            relay.send(&message);
                            *state = Attempt::AwaitingAck;
                        }
                    }
                    RelayEvent::Closed => {
                        debug!("relay {} closed before ack", relay.url);
                        *state = Attempt::Failed;
                    }
                    RelayEvent::Error(err) => {
                        debug!("relay {}: {err}", relay.url);
                        *state = Attempt::Failed;
                    }
                    RelayEvent::Message(RelayMessage::Ok(result)) => {
                        if result.event_id != expected_id {
                            // an ack for some other publish; keep waiting
                            continue;
                        }
                        if result.accepted {
                            info!("relay {} accepted event {}", relay.url, expected_id);
                            *state = Attempt::Accepted;
                        } else {
                            warn!(
                                "relay {} rejected event {}: {}",
                                relay.url, expected_id, result.message
                            );
                            *state = Attempt::Failed;
                        }
                    }
                    RelayEvent::Message(_) => {}
                }

                if state.settled() {
                    break;
                }
            }
        }

        if attempts.iter().all(|(_, state)| state.settled()) {
            break;
        }

        if started.elapsed() >= deadline {
            for (_, state) in attempts.iter_mut() {
                if !state.settled() {
                    *state = Attempt::Failed;
                }
            }
            break;
        }

        if !progressed {
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    attempts
        .iter()
        .filter(|(_, state)| *state == Attempt::Accepted)
        .count()
}

/// Publish to a single relay; true only on an explicit matching accept.
pub fn publish_to_relay<Io: RelayIo>(
    pool: &mut RelayPool<Io>,
    note: &Note,
    relay_url: &str,
    deadline: Duration,
) -> bool {
    publish_direct(pool, note, &[relay_url.to_owned()], deadline) == 1
}

/// Publish through one relay chosen uniformly at random, dropping
/// failed candidates from the pool of choices until one accepts or
/// none are left. Spreading successive posts across relays this way
/// keeps them harder to link to each other.
pub fn publish_hop<Io: RelayIo, R: Rng>(
    pool: &mut RelayPool<Io>,
    note: &Note,
    relay_set: &[String],
    deadline: Duration,
    rng: &mut R,
) -> bool {
    let mut candidates: Vec<String> = relay_set.to_vec();

    while !candidates.is_empty() {
        let picked = rng.random_range(0..candidates.len());
        let relay_url = candidates.swap_remove(picked);

        if publish_to_relay(pool, note, &relay_url, deadline) {
            return true;
        }

        warn!("relay hop failed for {relay_url}, trying another relay");
    }

    false
}
