//! Business logic on top of the CWE client.

mod search;

pub use search::SearchService;
