use anostr::NoteId;

/// Where the session's own posts sit in a conversation. Owned by the
/// client context rather than ambient state so it can be created and
/// reset per session.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ThreadState {
    root_event_id: Option<NoteId>,
    last_event_id: Option<NoteId>,
}

impl ThreadState {
    pub fn new() -> Self {
        ThreadState::default()
    }

    pub fn root(&self) -> Option<&NoteId> {
        self.root_event_id.as_ref()
    }

    pub fn last(&self) -> Option<&NoteId> {
        self.last_event_id.as_ref()
    }

    /// Explicit new-thread detection: a leading note reference in the
    /// input re-roots the session on that note.
    pub fn start_thread(&mut self, root: NoteId) {
        self.root_event_id = Some(root);
    }

    /// Record one of our own published notes. The root sticks to the
    /// first published note and is never silently overwritten.
    pub fn note_published(&mut self, id: NoteId) {
        self.last_event_id = Some(id);
        if self.root_event_id.is_none() {
            self.root_event_id = Some(id);
        }
    }

    pub fn reset(&mut self) {
        *self = ThreadState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(byte: u8) -> NoteId {
        NoteId::new([byte; 32])
    }

    #[test]
    fn root_sticks_to_first_publish() {
        let mut thread = ThreadState::new();
        assert_eq!(thread.root(), None);

        thread.note_published(id(1));
        thread.note_published(id(2));

        assert_eq!(thread.root(), Some(&id(1)));
        assert_eq!(thread.last(), Some(&id(2)));
    }

    #[test]
    fn start_thread_overrides_root() {
        let mut thread = ThreadState::new();
        thread.note_published(id(1));

        thread.start_thread(id(9));
        thread.note_published(id(2));

        assert_eq!(thread.root(), Some(&id(9)));
        assert_eq!(thread.last(), Some(&id(2)));
    }

    #[test]
    fn reset_clears_the_session() {
        let mut thread = ThreadState::new();
        thread.note_published(id(1));
        thread.reset();
        assert_eq!(thread, ThreadState::new());
    }
}
