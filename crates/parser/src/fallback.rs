use crate::tree::TreeNode;
use docimpact_core::Language;
use regex::Regex;
use std::sync::OnceLock;

/// Deterministic line classifier used when a language has no tree-sitter
/// grammar wired up, or the grammar fails to parse. Grounded on
/// `ASTParser._fallback_parse`: classify each nonempty line of the first
/// 100 lines by a small regex vocabulary, and emit a flat tree rooted at
/// `module`. Always succeeds, and is deterministic for identical input.
pub fn fallback_parse(code: &str, language: Language) -> TreeNode {
    let children = code
        .lines()
        .take(100)
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return None;
            }
            let node_type = classify_line(trimmed, language);
            let snippet: String = trimmed.chars().take(50).collect();
            Some(TreeNode::leaf(node_type, snippet))
        })
        .collect();

    TreeNode::branch("module", children)
}

fn classify_line(line: &str, language: Language) -> &'static str {
    match language {
        Language::Python => {
            if line.starts_with("def ") {
                "function_def"
            } else if line.starts_with("class ") {
                "class_def"
            } else if line.starts_with("if ") {
                "if_statement"
            } else if line.starts_with("for ") || line.starts_with("while ") {
                "loop"
            } else {
                "statement"
            }
        }
        Language::JavaScript | Language::TypeScript => {
            if function_re().is_match(line) {
                "function_def"
            } else if line.starts_with("if") || line.starts_with("if(") || line.starts_with("if ") {
                "if_statement"
            } else if line.contains("for") || line.contains("while") {
                "loop"
            } else {
                "statement"
            }
        }
        Language::Java | Language::Kotlin => {
            if line.contains("class ") {
                "class_def"
            } else if function_re().is_match(line) || line.contains("fun ") {
                "function_def"
            } else if line.starts_with("if") {
                "if_statement"
            } else if line.contains("for") || line.contains("while") {
                "loop"
            } else {
                "statement"
            }
        }
        Language::Unknown => "statement",
    }
}

fn function_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bfunction\b").unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_python_constructs() {
        let tree = fallback_parse("def f(x):\n    if x:\n        return x\n", Language::Python);
        let kinds: Vec<&str> = tree.children.iter().map(|c| c.node_type.as_str()).collect();
        assert_eq!(kinds, vec!["function_def", "if_statement", "statement"]);
    }

    #[test]
    fn skips_blank_lines_and_caps_at_100() {
        let many = "x = 1\n".repeat(150);
        let tree = fallback_parse(&many, Language::Python);
        assert_eq!(tree.children.len(), 100);
    }

    #[test]
    fn deterministic_for_same_input() {
        let code = "def f():\n    pass\n";
        let t1 = fallback_parse(code, Language::Python);
        let t2 = fallback_parse(code, Language::Python);
        assert_eq!(t1, t2);
    }
}
