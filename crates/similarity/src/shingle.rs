use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// 8-byte fingerprint of a byte window, via BLAKE3 truncated to 8 bytes,
/// giving the fixed-width integer-token shape MinHash needs.
fn window_fingerprint(window: &[u8]) -> u64 {
    let hash = blake3::hash(window);
    let bytes = hash.as_bytes();
    u64::from_be_bytes(bytes[..8].try_into().unwrap())
}

/// Overlapping-window shingle set over `data`: windows of `window` bytes at
/// stride `max(1, window / 4)`, capped at `max_tokens`. Data shorter than
/// `window`, or a zero window size, yields no shingles.
pub fn file_tokens(data: &[u8], window: usize, max_tokens: usize) -> BTreeSet<u64> {
    if data.is_empty() || window == 0 || data.len() < window {
        return BTreeSet::new();
    }
    let stride = (window / 4).max(1);
    let mut tokens = BTreeSet::new();
    let mut i = 0;
    while i + window <= data.len() {
        tokens.insert(window_fingerprint(&data[i..i + window]));
        if tokens.len() >= max_tokens {
            break;
        }
        i += stride;
    }
    tokens
}

fn comment_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").unwrap())
}

fn comment_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"//[^\n]*").unwrap())
}

fn code_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```.*?```").unwrap())
}

fn md_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap())
}

const COMMENT_STRIPPED_EXTS: &[&str] = &[
    ".js", ".ts", ".tsx", ".jsx", ".css", ".scss", ".java", ".go", ".rb", ".php", ".c", ".h",
    ".cpp", ".hpp", ".sh",
];

/// Decodes `data` (UTF-8 with latin-1 fallback), strips carriage returns,
/// applies extension-specific normalization (comment stripping for
/// code-like extensions, JSON canonicalization, markdown fence/link
/// stripping), then collapses whitespace and lowercases. Mirrors
/// `_normalize_text`.
pub fn normalize_text(data: &[u8], ext: &str) -> Vec<u8> {
    let mut text = match std::str::from_utf8(data) {
        Ok(s) => s.to_string(),
        Err(_) => data.iter().map(|&b| b as char).collect(),
    };
    text = text.replace('\r', "");

    if COMMENT_STRIPPED_EXTS.contains(&ext) {
        text = comment_block_re().replace_all(&text, " ").into_owned();
        text = comment_line_re().replace_all(&text, " ").into_owned();
    }

    if ext == ".json" {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
            if let Ok(canonical) = canonicalize_json(&value) {
                text = canonical;
            }
        }
    }

    if ext == ".md" {
        text = code_fence_re().replace_all(&text, " ").into_owned();
        text = md_link_re().replace_all(&text, "$1").into_owned();
    }

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    collapsed.into_bytes()
}

fn canonicalize_json(value: &serde_json::Value) -> Result<String, serde_json::Error> {
    // serde_json's default Map is already insertion-ordered; re-serializing
    // a parsed Value does not sort keys, so build a BTreeMap-backed clone to
    // get `sort_keys=True`-equivalent canonical output.
    let sorted = sort_json_keys(value);
    serde_json::to_string(&sorted)
}

fn sort_json_keys(value: &serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::Object(map) => {
            let sorted: std::collections::BTreeMap<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), sort_json_keys(v)))
                .collect();
            let mut out = serde_json::Map::new();
            for (k, v) in sorted {
                out.insert(k, v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_json_keys).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_data_has_no_tokens() {
        assert!(file_tokens(b"", 32, 4000).is_empty());
    }

    #[test]
    fn data_shorter_than_window_has_no_tokens() {
        assert!(file_tokens(b"short", 32, 4000).is_empty());
    }

    #[test]
    fn token_count_is_capped() {
        let data = vec![1u8; 10_000];
        let tokens = file_tokens(&data, 32, 5);
        assert!(tokens.len() <= 5);
    }

    #[test]
    fn normalize_strips_comments_for_code_extensions() {
        let data = b"// a comment\nfn main() {}\n";
        let normalized = normalize_text(data, ".c");
        let text = String::from_utf8(normalized).unwrap();
        assert!(!text.contains("comment"));
        assert!(text.contains("fn main"));
    }

    #[test]
    fn normalize_canonicalizes_json_key_order() {
        let a = normalize_text(br#"{"b":1,"a":2}"#, ".json");
        let b = normalize_text(br#"{"a":2,"b":1}"#, ".json");
        assert_eq!(a, b);
    }

    #[test]
    fn normalize_strips_markdown_fences_and_links() {
        let data = b"See [docs](http://example.com) for ```code block``` details.";
        let normalized = normalize_text(data, ".md");
        let text = String::from_utf8(normalized).unwrap();
        assert!(text.contains("docs"));
        assert!(!text.contains("http://example.com"));
        assert!(!text.contains("code block"));
    }
}
