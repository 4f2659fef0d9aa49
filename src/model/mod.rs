//! Data model for survey submissions
//!
//! - `Entry`: one field-visit record as stored in the `entries` table
//! - `EntriesResponse`: the JSON envelope returned by the export endpoint

mod entry;
mod response;

pub use entry::Entry;
pub use response::{EntriesData, EntriesResponse};
