//! Entity extraction and multi-pattern documentation search (C4): extracts
//! function/class names from source, builds a hand-rolled Aho-Corasick
//! automaton over them, and indexes where each entity is mentioned across
//! documentation files.

mod aho_corasick;
mod cross_reference;
mod entity;

pub use aho_corasick::{AhoCorasick, Match};
pub use cross_reference::{build_cross_reference_index, CrossReferenceIndex, MentionIndex};
pub use entity::extract_entities;
