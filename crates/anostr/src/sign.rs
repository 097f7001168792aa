use crate::{Error, FilledKeypair, Note, NoteKind, NoteTemplate, Result};

use nostr::{EventBuilder, JsonUtil, Keys, Kind, Tag, Timestamp};

/// Compute the note id and signature for a finalized template.
///
/// Id hashing and schnorr signing are delegated to the protocol library;
/// the returned [`Note`] must not be mutated afterwards.
pub fn sign_note(template: NoteTemplate, keypair: FilledKeypair<'_>) -> Result<Note> {
    let keys = Keys::new(keypair.secret_key.clone());

    let kind = match template.kind {
        NoteKind::Profile => Kind::Metadata,
        NoteKind::Text => Kind::TextNote,
    };

    let mut tags: Vec<Tag> = Vec::with_capacity(template.tags.len());
    for tag in &template.tags {
        tags.push(Tag::parse(tag).map_err(|e| Error::Sign(e.to_string()))?);
    }

    let event = EventBuilder::new(kind, &template.content)
        .tags(tags)
        .custom_created_at(Timestamp::from(template.created_at))
        .sign_with_keys(&keys)
        .map_err(|e| Error::Sign(e.to_string()))?;

    Note::from_json(&event.as_json())
}
