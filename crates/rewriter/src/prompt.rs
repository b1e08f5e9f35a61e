use docimpact_core::Language;

/// Extra facts about the change fed into the prompt's "detected key
/// changes" section, grounded on `llm_doc_generator.py::_detect_key_changes`.
pub fn detect_key_changes(old_code: &str, new_code: &str, language: Language) -> Vec<String> {
    let mut changes = Vec::new();
    let old_lines: Vec<&str> = old_code.lines().collect();
    let new_lines: Vec<&str> = new_code.lines().collect();

    if language == Language::Python {
        let old_defs: Vec<&str> = old_lines.iter().filter(|l| l.trim_start().starts_with("def ")).copied().collect();
        let new_defs: Vec<&str> = new_lines.iter().filter(|l| l.trim_start().starts_with("def ")).copied().collect();
        if old_defs != new_defs {
            changes.push("Function signature changed".to_string());
        }

        let old_returns = old_lines.iter().filter(|l| l.contains("return ")).count();
        let new_returns = new_lines.iter().filter(|l| l.contains("return ")).count();
        if old_returns != new_returns {
            changes.push("Return behavior modified".to_string());
        }
    } else if matches!(language, Language::JavaScript | Language::TypeScript) {
        let old_fn_count = old_code.matches("function").count();
        let new_fn_count = new_code.matches("function").count();
        if old_code.contains("function") && new_code.contains("function") && old_fn_count != new_fn_count {
            changes.push("Function structure changed".to_string());
        }
    }

    if new_lines.len() as f64 > old_lines.len() as f64 * 1.2 {
        changes.push(format!("Significant code additions ({} lines)", new_lines.len() - old_lines.len()));
    } else if (new_lines.len() as f64) < old_lines.len() as f64 * 0.8 {
        changes.push(format!("Significant code removals ({} lines)", old_lines.len() - new_lines.len()));
    }

    let old_ifs = old_code.matches("if ").count();
    let new_ifs = new_code.matches("if ").count();
    if new_ifs > old_ifs {
        changes.push(format!("Added {} conditional branches", new_ifs - old_ifs));
    } else if new_ifs < old_ifs {
        changes.push(format!("Removed {} conditional branches", old_ifs - new_ifs));
    }

    if changes.is_empty() {
        changes.push("Logic or implementation details modified".to_string());
    }
    changes
}

fn format_key_changes(changes: &[String]) -> String {
    if changes.is_empty() {
        "  - No specific changes detected".to_string()
    } else {
        changes.iter().map(|c| format!("  - {c}")).collect::<Vec<_>>().join("\n")
    }
}

/// The paragraphs of `doc` mentioning `entity_name`, or its first three
/// paragraphs if none mention it.
pub fn extract_relevant_section(doc: &str, entity_name: &str) -> String {
    let paragraphs: Vec<&str> = doc.split("\n\n").collect();
    let needle = entity_name.to_lowercase();
    let relevant: Vec<&str> = paragraphs
        .iter()
        .filter(|p| p.to_lowercase().contains(&needle))
        .copied()
        .collect();
    if !relevant.is_empty() {
        relevant.join("\n\n")
    } else {
        paragraphs.into_iter().take(3).collect::<Vec<_>>().join("\n\n")
    }
}

fn truncate_for_prompt(text: &str, max_chars: usize) -> &str {
    if text.len() <= max_chars {
        text
    } else {
        let mut end = max_chars;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        &text[..end]
    }
}

/// Parameters that shape the rewrite prompt, independent of provider.
pub struct PromptInput<'a> {
    pub old_code: &'a str,
    pub new_code: &'a str,
    pub current_doc: &'a str,
    pub change_type: &'a str,
    pub entity_name: &'a str,
    pub filename: Option<&'a str>,
    pub language: Language,
    pub distance: f64,
    pub mention_count: usize,
    pub line_numbers: &'a [u32],
}

/// Builds the strict-JSON-envelope prompt for one rewrite request.
pub fn build_prompt(input: &PromptInput) -> String {
    let key_changes = detect_key_changes(input.old_code, input.new_code, input.language);
    let doc_section = extract_relevant_section(input.current_doc, input.entity_name);

    let line_range = if input.line_numbers.is_empty() {
        "unknown".to_string()
    } else {
        let min = input.line_numbers.iter().min().unwrap();
        let max = input.line_numbers.iter().max().unwrap();
        format!("{min}-{max}")
    };

    let lang_tag = if input.language == Language::Unknown { "text" } else { input.language.as_str() };

    format!(
        "You are a technical documentation expert. Your job is to update documentation when code changes. Be precise, clear, and maintain the existing style.\n\n\
The function `{entity}` in file `{filename}` has changed.\n\n\
CHANGE TYPE: {change_type} (semantic distance: {distance:.2})\n\n\
OLD CODE:\n```{lang}\n{old_code}  # Truncated for brevity\n```\n\n\
NEW CODE:\n```{lang}\n{new_code}  # Truncated for brevity\n```\n\n\
CURRENT DOCUMENTATION (lines {line_range}):\n```markdown\n{doc_section}  # Truncated for brevity\n```\n\n\
ANALYSIS:\n\
- Change classification: {change_type}\n\
- Mentioned in documentation: {mention_count} times\n\
- Key changes detected:\n{key_changes}\n\n\
TASK:\n\
1. Identify what changed in the code that affects the documentation\n\
2. Generate updated documentation that reflects the new behavior\n\
3. Maintain the existing writing style and format\n\
4. Be specific about what changed\n\n\
Generate ONLY the updated documentation section, not the entire file. Format your response as JSON:\n\
{{\n  \"updated_doc\": \"The updated documentation text...\",\n  \"explanation\": \"Brief explanation of what changed...\",\n  \"confidence\": 0.85\n}}\n",
        entity = input.entity_name,
        filename = input.filename.unwrap_or("unknown"),
        change_type = input.change_type.to_uppercase(),
        distance = input.distance,
        lang = lang_tag,
        old_code = truncate_for_prompt(input.old_code, 1000),
        new_code = truncate_for_prompt(input.new_code, 1000),
        line_range = line_range,
        doc_section = truncate_for_prompt(&doc_section, 1000),
        mention_count = input.mention_count,
        key_changes = format_key_changes(&key_changes),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_added_conditional_branches() {
        let old = "def f(x):\n    return x\n";
        let new = "def f(x):\n    if x > 0:\n        return x\n    if x < 0:\n        return -x\n    return 0\n";
        let changes = detect_key_changes(old, new, Language::Python);
        assert!(changes.iter().any(|c| c.contains("conditional branches")));
    }

    #[test]
    fn extracts_paragraph_mentioning_entity() {
        let doc = "# Intro\n\nSome unrelated text.\n\n## login\n\nCall login() to authenticate.\n";
        let section = extract_relevant_section(doc, "login");
        assert!(section.contains("Call login()"));
        assert!(!section.contains("unrelated"));
    }

    #[test]
    fn falls_back_to_first_three_paragraphs_when_entity_absent() {
        let doc = "P1.\n\nP2.\n\nP3.\n\nP4.\n";
        let section = extract_relevant_section(doc, "nonexistent_entity");
        assert!(section.contains("P1."));
        assert!(section.contains("P3."));
        assert!(!section.contains("P4."));
    }

    #[test]
    fn prompt_embeds_entity_and_change_type() {
        let input = PromptInput {
            old_code: "def f(): pass",
            new_code: "def f(): return 1",
            current_doc: "f() does nothing.",
            change_type: "major",
            entity_name: "f",
            filename: Some("a.py"),
            language: Language::Python,
            distance: 0.4,
            mention_count: 2,
            line_numbers: &[3, 5],
        };
        let prompt = build_prompt(&input);
        assert!(prompt.contains("`f`"));
        assert!(prompt.contains("MAJOR"));
        assert!(prompt.contains("lines 3-5"));
    }
}
