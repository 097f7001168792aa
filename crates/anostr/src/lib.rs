mod client;
mod error;
mod filter;
mod keypair;
mod nip19;
mod note;
mod pubkey;
mod relay;
mod sign;
mod subid;

pub use client::ClientMessage;
pub use error::Error;
pub use filter::Filter;
pub use keypair::{FilledKeypair, FullKeypair};
pub use nip19::{decode_identifier, DecodedRef};
pub use nostr::SecretKey;
pub use note::{Note, NoteId, NoteKind, NoteTemplate};
pub use pubkey::Pubkey;
pub use relay::message::{CommandResult, RelayEvent, RelayMessage};
pub use relay::pool::{PoolEvent, RelayPool};
pub use relay::test_utils::{ok_events_for, ScriptedIo};
pub use relay::{LinkEvent, Relay, RelayIo, RelayStatus, WsIo};
pub use sign::sign_note;
pub use subid::fresh_sub_id;

pub type Result<T> = std::result::Result<T, error::Error>;
