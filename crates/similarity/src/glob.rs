/// Minimal shell-style glob matcher (`*` and `?`), matching Python's
/// `fnmatch.fnmatch` semantics closely enough for the include/exclude glob
/// lists this pipeline tunes: `*` matches any run of characters including
/// path separators, `?` matches exactly one character.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    matches(&p, &t)
}

fn matches(p: &[char], t: &[char]) -> bool {
    match p.first() {
        None => t.is_empty(),
        Some('*') => matches(&p[1..], t) || (!t.is_empty() && matches(p, &t[1..])),
        Some('?') => !t.is_empty() && matches(&p[1..], &t[1..]),
        Some(&c) => !t.is_empty() && t[0] == c && matches(&p[1..], &t[1..]),
    }
}

/// `true` if `path` should be considered: any include glob matches (if the
/// include list is nonempty), and no exclude glob matches. Mirrors
/// `_should_consider_path`.
pub fn should_consider_path(path: &str, include_globs: &[String], exclude_globs: &[String]) -> bool {
    if !include_globs.is_empty() && !include_globs.iter().any(|pat| glob_match(pat, path)) {
        return false;
    }
    !exclude_globs.iter().any(|pat| glob_match(pat, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_across_separators() {
        assert!(glob_match("*/node_modules/*", "a/b/node_modules/x.js"));
    }

    #[test]
    fn exact_extension_match() {
        assert!(glob_match("*.lock", "Cargo.lock"));
        assert!(!glob_match("*.lock", "Cargo.toml"));
    }

    #[test]
    fn should_consider_path_applies_include_then_exclude() {
        let include = vec!["*".to_string()];
        let exclude = vec!["*/target/*".to_string()];
        assert!(should_consider_path("src/main.rs", &include, &exclude));
        assert!(!should_consider_path("a/target/debug/x", &include, &exclude));
    }
}
