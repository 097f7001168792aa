use crate::{NoteId, Pubkey};

use serde::{Deserialize, Serialize};

/// A subscription filter as it appears inside a `REQ` message.
///
/// Only the fields this client actually subscribes with are modeled;
/// unset fields are omitted from the serialized object entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kinds: Option<Vec<u64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<Pubkey>>,

    /// Referenced-event filter, serialized under the `#e` key.
    #[serde(rename = "#e", skip_serializing_if = "Option::is_none")]
    pub referenced_events: Option<Vec<NoteId>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl Filter {
    pub fn new() -> Self {
        Filter::default()
    }

    pub fn kinds(mut self, kinds: impl IntoIterator<Item = u64>) -> Self {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    pub fn authors(mut self, authors: impl IntoIterator<Item = Pubkey>) -> Self {
        self.authors = Some(authors.into_iter().collect());
        self
    }

    pub fn referenced_events(mut self, ids: impl IntoIterator<Item = NoteId>) -> Self {
        self.referenced_events = Some(ids.into_iter().collect());
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(Into::into)
    }
}
