use crate::fallback::fallback_parse;
use crate::tree::TreeNode;
use docimpact_core::Language;
use std::collections::HashSet;
use std::sync::OnceLock;
use tree_sitter::{Node, Parser};

/// Nodes whose grammar-internal type is punctuation or noise we never want
/// in the simplified tree (parentheses, commas, the most common keywords
/// that carry no information once their parent node type already names the
/// construct).
fn is_noise(node: &Node) -> bool {
    if node.is_extra() {
        return true;
    }
    if !node.is_named() {
        let kind = node.kind();
        return !matches!(kind, "identifier" | "type_identifier" | "property_identifier");
    }
    matches!(node.kind(), "comment" | "line_comment" | "block_comment")
}

/// Converts one tree-sitter parse tree into the lean [`TreeNode`] shape used
/// for Zhang-Shasha comparison: internal nodes keep only their grammar
/// `kind()`, leaves (nodes with no named children) additionally capture
/// their source text so identifier/literal renames are detected.
fn convert(node: Node, source: &[u8]) -> Option<TreeNode> {
    if is_noise(&node) {
        return None;
    }

    let mut cursor = node.walk();
    let children: Vec<TreeNode> = node
        .named_children(&mut cursor)
        .filter_map(|child| convert(child, source))
        .collect();

    if children.is_empty() {
        let text = node.utf8_text(source).unwrap_or("").to_string();
        Some(TreeNode::leaf(node.kind(), text))
    } else {
        Some(TreeNode::branch(node.kind(), children))
    }
}

fn new_parser_for(language: Language) -> Option<Parser> {
    let mut parser = Parser::new();
    let ts_language = match language {
        Language::Python => tree_sitter_python::LANGUAGE.into(),
        Language::Java => tree_sitter_java::LANGUAGE.into(),
        Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Language::Kotlin => tree_sitter_kotlin_ng::LANGUAGE.into(),
        Language::Unknown => return None,
    };
    parser.set_language(&ts_language).ok()?;
    Some(parser)
}

fn supported_languages() -> &'static HashSet<Language> {
    static SET: OnceLock<HashSet<Language>> = OnceLock::new();
    SET.get_or_init(|| {
        [
            Language::Python,
            Language::Java,
            Language::JavaScript,
            Language::TypeScript,
            Language::Kotlin,
        ]
        .into_iter()
        .collect()
    })
}

/// Outcome of [`parse_to_tree`]: the tree, and whether the *primary*
/// parser for a supported language failed and the fallback tokenizer had to
/// take over. An unsupported language is not a failure — falling back is
/// its designed behavior — so `used_fallback` is only set when a grammar
/// exists for `language` but could not parse `code`.
pub struct ParseOutcome {
    pub tree: TreeNode,
    pub used_fallback: bool,
}

/// Parses `code` into a [`TreeNode`], falling back to the deterministic line
/// tokenizer whenever the language has no grammar wired up, the
/// grammar fails to produce a parser, or tree-sitter reports the root as an
/// `ERROR` node. This function never fails: the fallback always succeeds.
pub fn parse_to_tree(code: &str, language: Language) -> ParseOutcome {
    if !supported_languages().contains(&language) {
        return ParseOutcome {
            tree: fallback_parse(code, language),
            used_fallback: false,
        };
    }

    let Some(mut parser) = new_parser_for(language) else {
        return ParseOutcome {
            tree: fallback_parse(code, language),
            used_fallback: true,
        };
    };

    let Some(tree) = parser.parse(code, None) else {
        return ParseOutcome {
            tree: fallback_parse(code, language),
            used_fallback: true,
        };
    };

    let root = tree.root_node();
    if root.has_error() {
        return ParseOutcome {
            tree: fallback_parse(code, language),
            used_fallback: true,
        };
    }

    let tree = convert(root, code.as_bytes()).unwrap_or_else(|| TreeNode::branch("module", Vec::new()));
    ParseOutcome {
        tree,
        used_fallback: false,
    }
}
