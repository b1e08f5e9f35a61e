//! Call-graph construction and community detection (C5): builds a
//! function-level call graph from regex-extracted definitions and call
//! sites, symmetrizes it, and partitions it into communities.

mod callgraph;
mod community;

pub use callgraph::{build_call_graph, extract_functions_and_calls, CallGraph, FileExtract, NodeId};
pub use community::{detect_communities, max_community_size_for, Community};
