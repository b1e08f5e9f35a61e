//! Orchestrator (C7) and impact scorer (C8): runs the merkle, semantic,
//! community, cross-reference, and similarity layers for one
//! `(old_ref, new_ref)` pair and assembles a priority-ranked
//! [`docimpact_core::AnalysisResult`].

mod orchestrator;
mod scorer;

pub use orchestrator::{run, RunInputs};
pub use scorer::score_impacted_docs;
