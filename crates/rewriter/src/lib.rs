//! Rewriter envelope (C9): builds prompts, enforces the JSON schema and
//! confidence floor, falls back to a deterministic stub when no provider is
//! configured, and applies the result to a doc file with idempotent write
//! discipline.

mod cost;
mod envelope;
mod prompt;
mod provider;
mod writer;

pub use cost::estimate_cost;
pub use envelope::{generate_diff, generate_doc_update, meets_confidence_floor, RewriteRequest, RewriteResult, SuggestionState};
pub use prompt::{build_prompt, detect_key_changes, extract_relevant_section, PromptInput};
pub use provider::{Provider, ProviderKind};
pub use writer::apply_rewrite;
