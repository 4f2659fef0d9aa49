use crate::model::Entry;
use serde::Deserialize;

/// Top-level body of the entries export endpoint
///
/// Only `data.entries` is read; links, meta and everything else are ignored.
#[derive(Debug, Deserialize)]
pub struct EntriesResponse {
    pub data: EntriesData,
}

#[derive(Debug, Deserialize)]
pub struct EntriesData {
    pub entries: Vec<Entry>,
}

impl EntriesResponse {
    pub fn into_entries(self) -> Vec<Entry> {
        self.data.entries
    }
}
