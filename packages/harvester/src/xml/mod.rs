//! XML utilities for navigating parsed records.
//!
//! Queries match on `(namespace, local-name)` pairs so that tags from other
//! vocabularies with similar names never match by accident.

mod text;
mod utils;

pub use text::mixed_text;
pub use utils::{child_nodes, direct_text, first_text, is_element, select, text_nodes, Step};
