use crate::storage::{ClientStorage, SUBMITTED_EVENT_IDS};
use crate::Result;

use anostr::{fresh_sub_id, Filter, NoteId, Pubkey, RelayIo, RelayPool};

use tracing::debug;

/// Kind-1 notes from the followed authors, newest first.
pub fn feed_filter(authors: &[Pubkey]) -> Filter {
    Filter::new()
        .kinds([1])
        .authors(authors.iter().copied())
        .limit(100)
}

/// Kind-0 metadata for the same authors, to resolve names and avatars.
pub fn profile_filter(authors: &[Pubkey]) -> Filter {
    Filter::new().kinds([0]).authors(authors.iter().copied())
}

/// Replies to our own published notes.
pub fn reply_filter(event_ids: &[NoteId]) -> Filter {
    Filter::new()
        .kinds([1])
        .referenced_events(event_ids.iter().copied())
        .limit(100)
}

/// Full-text relay search.
pub fn search_filter(query: impl Into<String>) -> Filter {
    Filter::new().kinds([1]).search(query).limit(50)
}

/// Ids of every note this client has published, oldest first.
pub fn saved_event_ids(storage: &ClientStorage) -> Vec<NoteId> {
    storage.get(SUBMITTED_EVENT_IDS).unwrap_or_default()
}

/// Append a freshly published note id. The list is append-only and
/// never pruned, so it grows with the lifetime of the client state.
pub fn save_event_id(storage: &ClientStorage, id: NoteId) -> Result<()> {
    storage.update::<Vec<NoteId>, _, _>(SUBMITTED_EVENT_IDS, |mut ids| {
        ids.push(id);
        (ids, ())
    })
}

/// Re-subscribe to replies for everything we have published, under a
/// fresh subscription id on every relay in the pool.
pub fn renew_reply_subscriptions<Io: RelayIo>(pool: &mut RelayPool<Io>, storage: &ClientStorage) {
    let event_ids = saved_event_ids(storage);
    if event_ids.is_empty() {
        return;
    }

    debug!("renewing reply subscriptions for {} events", event_ids.len());
    pool.subscribe(fresh_sub_id(), vec![reply_filter(&event_ids)]);
}
