use crate::storage::{ClientStorage, FOLLOWING_PUBKEYS};
use crate::Result;

use anostr::Pubkey;

/// The authors whose notes the following feed shows.
pub fn following(storage: &ClientStorage) -> Vec<Pubkey> {
    storage.get(FOLLOWING_PUBKEYS).unwrap_or_default()
}

pub fn is_following(storage: &ClientStorage, pubkey: &Pubkey) -> bool {
    following(storage).contains(pubkey)
}

pub fn follow(storage: &ClientStorage, pubkey: Pubkey) -> Result<()> {
    storage.update::<Vec<Pubkey>, _, _>(FOLLOWING_PUBKEYS, |mut list| {
        if !list.contains(&pubkey) {
            list.push(pubkey);
        }
        (list, ())
    })
}

pub fn unfollow(storage: &ClientStorage, pubkey: &Pubkey) -> Result<()> {
    storage.update::<Vec<Pubkey>, _, _>(FOLLOWING_PUBKEYS, |mut list| {
        list.retain(|pk| pk != pubkey);
        (list, ())
    })
}

/// Flip the follow state for `pubkey`; returns true when now followed.
pub fn toggle_follow(storage: &ClientStorage, pubkey: Pubkey) -> Result<bool> {
    if is_following(storage, &pubkey) {
        unfollow(storage, &pubkey)?;
        Ok(false)
    } else {
        follow(storage, pubkey)?;
        Ok(true)
    }
}
