use crate::thread::ThreadState;

use anostr::{decode_identifier, DecodedRef, NoteId};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Matches bech32-style entity references (note1..., npub1..., ...).
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[a-z]+1[qpzry9x8gf2tvdw0s3jn54khce6mua7l]{6,}").expect("entity regex")
});

static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+").expect("hashtag regex"));

const NOSTR_LINK_PREFIX: &str = "nostr:";

/// What the annotator extracted from one piece of note text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Finalized tag list; a root tag, if any, is at index 0.
    pub tags: Vec<Vec<String>>,
    /// Input text with implicit roots stripped and note mentions
    /// rewritten as protocol links.
    pub text: String,
    /// Every key this action is rate limited against.
    pub target_keys: Vec<String>,
    /// Set when a leading note reference re-roots the session thread.
    pub new_root: Option<NoteId>,
}

/// One annotation request. `parent` marks a reply action and carries
/// the note being replied to; `chain` links the post to the session's
/// previous one.
#[derive(Debug, Clone, Copy)]
pub struct AnnotateRequest<'a> {
    pub text: &'a str,
    pub parent: Option<&'a NoteId>,
    pub chain: bool,
    pub thread: &'a ThreadState,
}

fn e_tag(id_hex: String, marker: &str) -> Vec<String> {
    vec!["e".to_owned(), id_hex, String::new(), marker.to_owned()]
}

fn p_tag(pk_hex: String) -> Vec<String> {
    vec!["p".to_owned(), pk_hex, String::new(), "mention".to_owned()]
}

/// Scan note text for entity references and hashtags, producing the
/// tag list, the rewritten text and the rate-limit target keys. Pure
/// over its inputs: no storage or network access.
pub fn annotate(req: &AnnotateRequest) -> Annotation {
    let is_reply = req.parent.is_some();
    let text = req.text.trim().to_owned();

    let mut tags: Vec<Vec<String>> = Vec::new();
    let mut targets: Vec<String> = Vec::new();
    let mut new_root: Option<NoteId> = None;
    let mut root_set = false;

    // a reply always references its parent, ahead of everything else
    if let Some(parent) = req.parent {
        tags.push(e_tag(parent.hex(), "reply"));
        targets.push(parent.hex());

        if req.chain {
            if let Some(last) = req.thread.last() {
                tags.push(e_tag(last.hex(), "reply"));

                if let Some(root) = req.thread.root() {
                    let root_hex = root.hex();
                    if !tags.iter().any(|tag| tag.get(1) == Some(&root_hex)) {
                        tags.insert(0, e_tag(root_hex.clone(), "root"));
                        root_set = true;
                        targets.push(root_hex);
                    }
                }
            }
        }
    }

    // entity references, in match order
    let matches: Vec<(usize, usize, String)> = ENTITY_RE
        .find_iter(&text)
        .map(|m| (m.start(), m.end(), m.as_str().to_owned()))
        .collect();

    let mut out = String::with_capacity(text.len() + NOSTR_LINK_PREFIX.len());
    let mut cursor = 0usize;

    for (start, end, matched) in &matches {
        let decoded = match decode_identifier(matched) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!("skipping malformed entity reference '{matched}': {err}");
                continue;
            }
        };

        match decoded {
            DecodedRef::Note(id) => {
                if !is_reply && !root_set && *start == 0 {
                    // a note reference opening the text is an implicit
                    // root: strip it and re-root the thread on it
                    cursor = *end;
                    tags.insert(0, e_tag(id.hex(), "root"));
                    root_set = true;
                    new_root = Some(id);
                    targets.push(id.hex());
                } else {
                    tags.push(e_tag(id.hex(), "mention"));
                    targets.push(id.hex());

                    if !is_reply {
                        out.push_str(&text[cursor..*start]);
                        if !out.ends_with(NOSTR_LINK_PREFIX) {
                            out.push_str(NOSTR_LINK_PREFIX);
                        }
                        out.push_str(matched);
                        cursor = *end;
                    }
                }
            }
            DecodedRef::Profile(pk) => {
                tags.push(p_tag(pk.hex()));
                targets.push(pk.hex());
            }
        }
    }
    out.push_str(&text[cursor..]);
    let text = out.trim().to_owned();

    // hashtags, scanned over the rewritten text
    for m in HASHTAG_RE.find_iter(&text) {
        let hashtag = m.as_str();
        tags.push(vec!["t".to_owned(), hashtag[1..].to_owned()]);
        targets.push(hashtag.to_lowercase());
    }

    // continue the session's own thread
    if !is_reply && req.chain {
        if let Some(last) = req.thread.last() {
            tags.push(e_tag(last.hex(), "reply"));

            if !root_set {
                if let Some(root) = req.thread.root() {
                    tags.insert(0, e_tag(root.hex(), "root"));
                    targets.push(root.hex());
                }
            }
        }
    }

    Annotation {
        tags,
        text,
        target_keys: targets,
        new_root,
    }
}
