use crate::{Error, NoteId, Pubkey, Result};

use nostr::nips::nip19::{FromBech32, Nip19Profile};

/// A successfully decoded NIP-19 entity reference found in note text.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DecodedRef {
    /// `note1...`, a reference to another note
    Note(NoteId),
    /// `npub1...` or `nprofile1...`, a reference to an author
    Profile(Pubkey),
}

impl DecodedRef {
    /// Hex form of the referenced key, used as a rate-limit target.
    pub fn key_hex(&self) -> String {
        match self {
            DecodedRef::Note(id) => id.hex(),
            DecodedRef::Profile(pk) => pk.hex(),
        }
    }
}

/// Decode a bech32-style entity reference. Only the identifier types the
/// client tags (`note`, `npub`, `nprofile`) are supported; anything else
/// is an error the caller is expected to skip.
pub fn decode_identifier(s: &str) -> Result<DecodedRef> {
    let (hrp, _) = bech32::decode(s).map_err(|_| Error::InvalidBech32)?;

    match hrp.to_string().to_lowercase().as_str() {
        "note" => Ok(DecodedRef::Note(NoteId::from_bech32(s)?)),
        "npub" => Ok(DecodedRef::Profile(Pubkey::from_bech32(s)?)),
        "nprofile" => {
            let profile = Nip19Profile::from_bech32(s)
                .map_err(|e| Error::DecodeFailed(e.to_string()))?;
            Ok(DecodedRef::Profile(Pubkey::new(profile.public_key.to_bytes())))
        }
        other => Err(Error::DecodeFailed(format!(
            "unsupported identifier type: {other}"
        ))),
    }
}
