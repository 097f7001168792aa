use crate::{Error, Pubkey};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct NoteId([u8; 32]);

impl fmt::Debug for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex())
    }
}

static HRP_NOTE: bech32::Hrp = bech32::Hrp::parse_unchecked("note");

impl NoteId {
    pub fn new(bytes: [u8; 32]) -> Self {
        NoteId(bytes)
    }

    pub fn bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn hex(&self) -> String {
        hex::encode(self.bytes())
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, Error> {
        Ok(NoteId(hex::decode(hex_str)?.as_slice().try_into()?))
    }

    pub fn from_bech32(s: &str) -> Result<Self, Error> {
        let (hrp, data) = bech32::decode(s).map_err(|_| Error::InvalidBech32)?;

        if hrp != HRP_NOTE {
            Err(Error::InvalidBech32)
        } else if data.len() != 32 {
            Err(Error::InvalidByteSize)
        } else {
            Ok(NoteId(data.as_slice().try_into()?))
        }
    }

    pub fn to_bech(&self) -> Option<String> {
        bech32::encode::<bech32::Bech32>(HRP_NOTE, &self.0).ok()
    }
}

/// Message categories the client publishes or consumes.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NoteKind {
    /// kind 0, profile metadata
    Profile,
    /// kind 1, text note
    Text,
}

impl NoteKind {
    pub fn raw(&self) -> u64 {
        match self {
            NoteKind::Profile => 0,
            NoteKind::Text => 1,
        }
    }
}

/// The unsigned half of a note. Tags and content must be final before
/// this is handed to [`crate::sign_note`]; the signed result is immutable.
#[derive(Debug, Clone)]
pub struct NoteTemplate {
    pub kind: NoteKind,
    pub content: String,
    pub tags: Vec<Vec<String>>,
    pub created_at: u64,
}

impl NoteTemplate {
    pub fn new(kind: NoteKind, content: impl Into<String>, created_at: u64) -> Self {
        NoteTemplate {
            kind,
            content: content.into(),
            tags: Vec::new(),
            created_at,
        }
    }

    pub fn tags(mut self, tags: Vec<Vec<String>>) -> Self {
        self.tags = tags;
        self
    }
}

/// A signed note as it travels on the wire.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Note {
    /// 32-byte sha256 of the serialized note data
    pub id: NoteId,
    /// public key of the ephemeral author identity
    pub pubkey: Pubkey,
    /// unix timestamp in seconds
    pub created_at: u64,
    /// 0 for profile metadata, 1 for text notes
    pub kind: u64,
    pub tags: Vec<Vec<String>>,
    pub content: String,
    /// 64-byte schnorr signature over `id`
    pub sig: String,
}

impl Hash for Note {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.0.hash(state);
    }
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Note {}

impl Note {
    pub fn from_json(s: &str) -> Result<Self, Error> {
        serde_json::from_str(s).map_err(Into::into)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(Into::into)
    }
}

impl std::str::FromStr for Note {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Note::from_json(s)
    }
}

impl Serialize for NoteId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.hex())
    }
}

impl<'de> Deserialize<'de> for NoteId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NoteId::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"id":"70b10f70c1318967eddf12527799411b1a9780ad9c43858f5e5fcd45486a13a5","pubkey":"379e863e8357163b5bce5d2688dc4f1dcc2d505222fb8d74db600f30535dfdfe","created_at":1612809991,"kind":1,"tags":[["e","70b10f70c1318967eddf12527799411b1a9780ad9c43858f5e5fcd45486a13a5","","root"],["t","news"]],"content":"test","sig":"273a9cd5d11455590f4359500bccb7a89428262b96b3ea87a756b770964472f8c3e87f5d5e64d8d2e859a71462a3f477b554565c4f2f326cb01dd7620db71502"}"#;

    #[test]
    fn wire_roundtrip() {
        let note = Note::from_json(SAMPLE).expect("parse");
        assert_eq!(note.kind, 1);
        assert_eq!(note.content, "test");
        assert_eq!(note.tags.len(), 2);
        assert_eq!(note.tags[0][3], "root");

        let json = note.to_json().expect("serialize");
        let again = Note::from_json(&json).expect("reparse");
        assert_eq!(note, again);
        assert_eq!(note.tags, again.tags);
    }

    #[test]
    fn note_id_bech32_roundtrip() {
        let id =
            NoteId::from_hex("70b10f70c1318967eddf12527799411b1a9780ad9c43858f5e5fcd45486a13a5")
                .expect("hex");
        let bech = id.to_bech().expect("encode");
        assert!(bech.starts_with("note1"));
        assert_eq!(NoteId::from_bech32(&bech).expect("decode"), id);
    }

    #[test]
    fn rejects_truncated_hex() {
        assert!(NoteId::from_hex("70b10f70").is_err());
    }
}
