use regex::Regex;
use std::sync::OnceLock;

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.*)$").unwrap())
}

struct Heading {
    line_index: usize,
    depth: usize,
    text: String,
}

fn headings(lines: &[&str]) -> Vec<Heading> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| {
            heading_re().captures(line).map(|c| Heading {
                line_index: i,
                depth: c[1].len(),
                text: c[2].to_string(),
            })
        })
        .collect()
}

/// End-of-section line index (exclusive): the next heading at depth <= the
/// section's own depth, or the end of the document.
fn section_end(all: &[Heading], section_depth: usize, after_index: usize, total_lines: usize) -> usize {
    all.iter()
        .filter(|h| h.line_index > after_index && h.depth <= section_depth)
        .map(|h| h.line_index)
        .next()
        .unwrap_or(total_lines)
}

/// Applies one rewrite's body into `doc_text`: replaces an existing
/// heading's section if one at depth ≥ 3
/// matches `entity_name` case-insensitively, otherwise inserts a new
/// `### entity_name` section after the first "API Reference" heading, or
/// appends one at the end. Every section body is prefixed with a
/// `Source: <path>` line. Applying the same rewrite to its own output is a
/// no-op beyond replacing identical content with itself, so repeated writes
/// are idempotent.
pub fn apply_rewrite(doc_text: &str, entity_name: &str, source_path: &str, body: &str) -> String {
    let lines: Vec<&str> = doc_text.lines().collect();
    let all_headings = headings(&lines);
    let needle = entity_name.to_lowercase();

    let section_body = format!("Source: {source_path}\n\n{}", body.trim_end());

    if let Some(target) = all_headings
        .iter()
        .find(|h| h.depth >= 3 && h.text.to_lowercase().contains(&needle))
    {
        let end = section_end(&all_headings, target.depth, target.line_index, lines.len());
        let mut out: Vec<String> = Vec::new();
        out.extend(lines[..=target.line_index].iter().map(|s| s.to_string()));
        out.push(String::new());
        out.push(section_body.clone());
        out.push(String::new());
        out.extend(lines[end..].iter().map(|s| s.to_string()));
        return out.join("\n") + if doc_text.ends_with('\n') { "\n" } else { "" };
    }

    let new_section = format!("### {entity_name}\n\n{section_body}\n");

    if let Some(api_ref) = all_headings.iter().find(|h| h.text.to_lowercase().contains("api reference")) {
        let end = section_end(&all_headings, api_ref.depth, api_ref.line_index, lines.len());
        let mut out: Vec<String> = Vec::new();
        out.extend(lines[..end].iter().map(|s| s.to_string()));
        out.push(String::new());
        out.push(new_section.trim_end().to_string());
        out.push(String::new());
        out.extend(lines[end..].iter().map(|s| s.to_string()));
        return out.join("\n") + if doc_text.ends_with('\n') { "\n" } else { "" };
    }

    let mut out = doc_text.trim_end().to_string();
    if !out.is_empty() {
        out.push_str("\n\n");
    }
    out.push_str(&new_section);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_matching_section() {
        let doc = "# Guide\n\n### login\n\nOld text about login.\n\n### logout\n\nOther section.\n";
        let updated = apply_rewrite(doc, "login", "auth.py", "New text about login.");
        assert!(updated.contains("Source: auth.py"));
        assert!(updated.contains("New text about login."));
        assert!(!updated.contains("Old text about login."));
        assert!(updated.contains("### logout"));
        assert!(updated.contains("Other section."));
    }

    #[test]
    fn inserts_after_api_reference_when_no_match() {
        let doc = "# Guide\n\n## API Reference\n\nIntro text.\n\n## Changelog\n\nNothing yet.\n";
        let updated = apply_rewrite(doc, "login", "auth.py", "Docs for login.");
        assert!(updated.contains("### login"));
        let login_pos = updated.find("### login").unwrap();
        let changelog_pos = updated.find("## Changelog").unwrap();
        assert!(login_pos < changelog_pos);
        assert!(updated.contains("Source: auth.py"));
    }

    #[test]
    fn appends_when_no_heading_and_no_api_reference() {
        let doc = "Just some plain text.\n";
        let updated = apply_rewrite(doc, "login", "auth.py", "Docs for login.");
        assert!(updated.contains("### login"));
        assert!(updated.contains("Source: auth.py"));
        assert!(updated.starts_with("Just some plain text."));
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let doc = "# Guide\n\n### login\n\nOld text.\n";
        let once = apply_rewrite(doc, "login", "auth.py", "New text.");
        let twice = apply_rewrite(&once, "login", "auth.py", "New text.");
        assert_eq!(once, twice);
    }

    #[test]
    fn heading_match_is_case_insensitive() {
        let doc = "### Login\n\nOld text.\n";
        let updated = apply_rewrite(doc, "login", "auth.py", "New text.");
        assert!(updated.contains("New text."));
    }
}
