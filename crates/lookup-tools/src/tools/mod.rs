//! Tool implementations.

mod web_search;
mod wikipedia;

pub use web_search::WebSearch;
pub use wikipedia::Wikipedia;
