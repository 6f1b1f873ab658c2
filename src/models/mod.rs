//! Domain models for CWE lookups.
//!
//! Everything here lives for a single tool call: built from caller input or
//! an upstream response, serialized back, then dropped.

mod entry;
mod identifier;
mod search;
mod view;

pub use entry::{Collection, CweEntry, CweInfo, EntryListing, Hierarchy, Relation};
pub use identifier::{
    normalize, normalize_list, CweId, Identifier, IdentifierList, Selection, ALL_SENTINEL,
};
pub use search::SearchResult;
pub use view::ViewFilter;
