use docimpact_core::{EntityName, Language};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

/// Keywords that match the entity regexes' identifier shape but are never
/// real entity names.
fn keyword_blocklist() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        [
            "if", "for", "while", "switch", "return", "catch", "try", "async", "await",
            "export", "import", "default",
        ]
        .into_iter()
        .collect()
    })
}

struct Patterns {
    python_function: Regex,
    python_class: Regex,
    js_function: Regex,
    js_arrow: Regex,
    js_class: Regex,
    js_method: Regex,
    java_method: Regex,
    java_class: Regex,
    kotlin_function: Regex,
    kotlin_class: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        python_function: Regex::new(r"def\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*\(").unwrap(),
        python_class: Regex::new(r"class\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*[:\(]").unwrap(),
        js_function: Regex::new(r"function\s+([a-zA-Z_$][a-zA-Z0-9_$]*)\s*\(").unwrap(),
        js_arrow: Regex::new(
            r"(?:const|let|var)\s+([a-zA-Z_$][a-zA-Z0-9_$]*)\s*=\s*(?:async\s*)?\([^)]*\)\s*=>",
        )
        .unwrap(),
        js_class: Regex::new(r"class\s+([a-zA-Z_$][a-zA-Z0-9_$]*)\s*[{]").unwrap(),
        js_method: Regex::new(r"(?:async\s+)?([a-zA-Z_$][a-zA-Z0-9_$]*)\s*\([^)]*\)\s*\{").unwrap(),
        java_method: Regex::new(
            r"(?:public|private|protected|static|final|\s)+[\w<>\[\]]+\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*\([^)]*\)\s*\{",
        )
        .unwrap(),
        java_class: Regex::new(r"(?:class|interface|enum)\s+([a-zA-Z_][a-zA-Z0-9_]*)").unwrap(),
        kotlin_function: Regex::new(r"fun\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*\(").unwrap(),
        kotlin_class: Regex::new(r"(?:class|interface|object)\s+([a-zA-Z_][a-zA-Z0-9_]*)").unwrap(),
    })
}

fn captured(re: &Regex, code: &str) -> impl Iterator<Item = EntityName> + '_ {
    re.captures_iter(code).map(|c| c[1].to_string())
}

fn extract_python(code: &str) -> BTreeSet<EntityName> {
    let p = patterns();
    captured(&p.python_function, code)
        .chain(captured(&p.python_class, code))
        .collect()
}

fn extract_javascript(code: &str) -> BTreeSet<EntityName> {
    let p = patterns();
    let entities: BTreeSet<EntityName> = captured(&p.js_function, code)
        .chain(captured(&p.js_arrow, code))
        .chain(captured(&p.js_class, code))
        .chain(captured(&p.js_method, code))
        .collect();
    let blocklist = keyword_blocklist();
    entities
        .into_iter()
        .filter(|e| !blocklist.contains(e.as_str()))
        .collect()
}

fn extract_java(code: &str) -> BTreeSet<EntityName> {
    let p = patterns();
    let entities: BTreeSet<EntityName> = captured(&p.java_method, code)
        .chain(captured(&p.java_class, code))
        .collect();
    let blocklist = keyword_blocklist();
    entities
        .into_iter()
        .filter(|e| !blocklist.contains(e.as_str()))
        .collect()
}

fn extract_kotlin(code: &str) -> BTreeSet<EntityName> {
    let p = patterns();
    let entities: BTreeSet<EntityName> = captured(&p.kotlin_function, code)
        .chain(captured(&p.kotlin_class, code))
        .collect();
    let blocklist = keyword_blocklist();
    entities
        .into_iter()
        .filter(|e| !blocklist.contains(e.as_str()))
        .collect()
}

/// Extracts function/class/method names from `code`, per the language's
/// fixed regex productions, with the keyword blocklist applied. An
/// unsupported language yields an empty set.
pub fn extract_entities(code: &str, language: Language) -> BTreeSet<EntityName> {
    match language {
        Language::Python => extract_python(code),
        Language::JavaScript | Language::TypeScript => extract_javascript(code),
        Language::Java => extract_java(code),
        Language::Kotlin => extract_kotlin(code),
        Language::Unknown => BTreeSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_python_functions_and_classes() {
        let code = "def validate_password(password):\n    return len(password) >= 8\n\nclass UserAuth:\n    def login(self, username, password):\n        return True\n";
        let entities = extract_entities(code, Language::Python);
        assert!(entities.contains("validate_password"));
        assert!(entities.contains("UserAuth"));
        assert!(entities.contains("login"));
    }

    #[test]
    fn js_extraction_filters_keywords() {
        let code = "function greet(name) { if (name) { return name; } }\n";
        let entities = extract_entities(code, Language::JavaScript);
        assert!(entities.contains("greet"));
        assert!(!entities.contains("if"));
        assert!(!entities.contains("return"));
    }

    #[test]
    fn js_arrow_function_assignment_is_an_entity() {
        let code = "const computeTotal = (items) => { return items.length; };\n";
        let entities = extract_entities(code, Language::JavaScript);
        assert!(entities.contains("computeTotal"));
    }

    #[test]
    fn unknown_language_yields_empty_set() {
        assert!(extract_entities("anything", Language::Unknown).is_empty());
    }

    #[test]
    fn kotlin_fun_and_class_are_extracted() {
        let code = "class Repo {\n    fun save(item: String) {}\n}\n";
        let entities = extract_entities(code, Language::Kotlin);
        assert!(entities.contains("Repo"));
        assert!(entities.contains("save"));
    }
}
