use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::OnceLock;

/// Opaque node identifier: `"{path}::${name}"`, or `"{path}::$__file__"` for
/// the synthetic file-scope node used to catch calls that cannot be
/// attributed to a known function.
pub type NodeId = String;

fn func_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:export\s+)?function\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap()
    })
}

fn func_var_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?:const|let|var)\s+([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(?:async\s*)?(?:function\s*\(|\([\s\S]*?\)\s*=>)",
        )
        .unwrap()
    })
}

fn call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap())
}

fn comment_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").unwrap())
}

fn comment_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"//[^\n]*").unwrap())
}

fn call_stopwords() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        [
            "if", "for", "while", "switch", "return", "function", "console", "new", "catch",
            "typeof", "await",
        ]
        .into_iter()
        .collect()
    })
}

/// Functions defined in one file, and the set of callee names invoked from
/// file scope. Every call attributes to file scope rather than its
/// enclosing function, since the regex extractor has no real parse tree to
/// bound function bodies.
pub struct FileExtract {
    pub functions: BTreeSet<String>,
    pub file_scope_calls: BTreeSet<String>,
}

/// Extracts function definitions and call sites from one JS/TS source file.
/// Mirrors `_extract_functions_and_calls_js`.
pub fn extract_functions_and_calls(source: &str) -> FileExtract {
    let stripped = comment_block_re().replace_all(source, " ");
    let stripped = comment_line_re().replace_all(&stripped, " ");

    let mut functions: BTreeSet<String> = func_re()
        .captures_iter(&stripped)
        .map(|c| c[1].to_string())
        .collect();
    functions.extend(func_var_re().captures_iter(&stripped).map(|c| c[1].to_string()));

    let stop = call_stopwords();
    let file_scope_calls = call_re()
        .captures_iter(&stripped)
        .map(|c| c[1].to_string())
        .filter(|name| !stop.contains(name.as_str()))
        .collect();

    FileExtract {
        functions,
        file_scope_calls,
    }
}

/// Undirected, symmetrized adjacency graph built from per-file extracts,
/// grounded on `analyze_communities`'s graph-building loop.
#[derive(Debug, Default, Clone)]
pub struct CallGraph {
    pub adjacency: HashMap<NodeId, BTreeSet<NodeId>>,
}

impl CallGraph {
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|n| n.len()).sum::<usize>() / 2
    }
}

/// Builds a call graph from `(path, source)` pairs, restricted to files the
/// caller has already filtered to JS/TS-family extensions (callgraph
/// construction is intentionally language-limited, matching the original's
/// "simple focus" comment).
pub fn build_call_graph<'a>(files: impl IntoIterator<Item = (&'a str, &'a str)>) -> CallGraph {
    let mut defined_funcs: HashMap<String, NodeId> = HashMap::new();
    let mut directed: HashMap<NodeId, BTreeSet<NodeId>> = HashMap::new();

    let mut per_file = Vec::new();
    for (path, source) in files {
        let extract = extract_functions_and_calls(source);
        for fn_name in &extract.functions {
            let node_id = format!("{path}::${fn_name}");
            defined_funcs
                .entry(fn_name.clone())
                .or_insert_with(|| node_id.clone());
            directed.entry(node_id).or_default();
        }
        let file_node = format!("{path}::$__file__");
        directed.entry(file_node.clone()).or_default();
        per_file.push((file_node, extract));
    }

    for (file_node, extract) in per_file {
        directed.entry(file_node.clone()).or_default();
        for callee in &extract.file_scope_calls {
            if let Some(dst) = defined_funcs.get(callee) {
                directed.get_mut(&file_node).unwrap().insert(dst.clone());
            }
        }
    }

    let mut adjacency: HashMap<NodeId, BTreeSet<NodeId>> = HashMap::new();
    for (a, neighbors) in &directed {
        adjacency.entry(a.clone()).or_default();
        for b in neighbors {
            adjacency.entry(a.clone()).or_default().insert(b.clone());
            adjacency.entry(b.clone()).or_default().insert(a.clone());
        }
    }

    CallGraph { adjacency }
}
