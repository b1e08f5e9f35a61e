use crate::cost::estimate_cost;
use crate::prompt::{build_prompt, PromptInput};
use crate::provider::{Provider, ProviderKind};
use docimpact_core::Language;
use regex::Regex;
use similar::{ChangeTag, TextDiff};
use std::sync::OnceLock;

/// State machine for one suggestion: `Pending` until a prompt is built,
/// `Generated` once a provider (or the fallback) responds, then exactly one
/// of `Accepted`/`RejectedLowConfidence`/`FallbackStub`. `Accepted` becomes
/// `Written` only after the caller successfully applies the doc
/// replacement -- that transition belongs to [`crate::writer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionState {
    Pending,
    Generated,
    Accepted,
    RejectedLowConfidence,
    FallbackStub,
    Written,
}

/// Input to one rewrite request: the changed entity, its old/new source
/// slices, the current doc text, and scorer-provided context.
pub struct RewriteRequest<'a> {
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

/// Output envelope: the caller drops anything below its confidence floor
/// before treating a suggestion as `Accepted`.
#[derive(Debug, Clone)]
pub struct RewriteResult {
    pub updated_doc: String,
    pub explanation: String,
    pub confidence: f64,
    pub provider: String,
    pub model: String,
    pub tokens_used: usize,
    pub cost_estimate: f64,
    pub diff: String,
    pub state: SuggestionState,
}

/// Unified-diff rendering of `old` vs `new`, fenced as a `diff` code block.
pub fn generate_diff(old: &str, new: &str) -> String {
    let text_diff = TextDiff::from_lines(old, new);
    let mut out = String::from("```diff\n--- current\n+++ updated\n");
    for change in text_diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        out.push_str(sign);
        out.push_str(change.as_str().unwrap_or(""));
        if !change.as_str().unwrap_or("").ends_with('\n') {
            out.push('\n');
        }
    }
    out.push_str("```");
    out
}

/// Parses a provider's response as the strict JSON envelope; on parse
/// failure the whole response becomes `updated_doc` with confidence 0.5.
fn parse_response(response_text: &str, current_doc: &str) -> (String, String, f64) {
    match serde_json::from_str::<serde_json::Value>(response_text) {
        Ok(value) => {
            let updated_doc = value
                .get("updated_doc")
                .and_then(|v| v.as_str())
                .unwrap_or(current_doc)
                .to_string();
            let explanation = value
                .get("explanation")
                .and_then(|v| v.as_str())
                .unwrap_or("No explanation provided")
                .to_string();
            let confidence = value.get("confidence").and_then(|v| v.as_f64()).unwrap_or(0.7);
            (updated_doc, explanation, confidence)
        }
        Err(_) => (response_text.to_string(), "LLM response was not in expected JSON format".to_string(), 0.5),
    }
}

fn python_signature_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"def\s+\w+\s*\([^)]*\)\s*:?").unwrap())
}

fn js_signature_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"function\s+\w+\s*\([^)]*\)").unwrap())
}

fn python_docstring_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?s)"""(.*?)"""|'''(.*?)'''"#).unwrap())
}

fn jsdoc_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)/\*\*(.*?)\*/").unwrap())
}

/// Best-effort signature extraction for the fallback stub: a `def ...:` or
/// `function ...(...)` line, or `None` if neither regex matches.
fn extract_signature(code: &str, language: Language) -> Option<String> {
    let re = match language {
        Language::Python => python_signature_re(),
        Language::JavaScript | Language::TypeScript => js_signature_re(),
        _ => return None,
    };
    re.find(code).map(|m| m.as_str().to_string())
}

/// Best-effort docstring/JSDoc extraction for the fallback stub.
fn extract_docstring(code: &str, language: Language) -> Option<String> {
    match language {
        Language::Python => python_docstring_re()
            .captures(code)
            .and_then(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str().trim().to_string()),
        Language::JavaScript | Language::TypeScript => {
            jsdoc_re().captures(code).map(|c| c[1].trim().to_string())
        }
        _ => None,
    }
}

/// Deterministic stub used when no provider is available: quotes any
/// extractable docstring, a regex-extracted signature, the change type, and
/// a reviewer warning, at a fixed confidence of 0.1.
fn fallback_suggestion(request: &RewriteRequest) -> RewriteResult {
    let signature = extract_signature(request.new_code, request.language);
    let docstring = extract_docstring(request.new_code, request.language);

    let mut body = format!(
        "The function `{}` has a {} change. Please review and update documentation manually.\n",
        request.entity_name,
        request.change_type.to_uppercase()
    );
    if let Some(sig) = &signature {
        body.push_str(&format!("\nNew signature: `{sig}`\n"));
    }
    if let Some(doc) = &docstring {
        if !doc.is_empty() {
            body.push_str(&format!("\nExtracted docstring:\n```\n{doc}\n```\n"));
        }
    }
    body.push_str("\n**Reviewer warning:** this suggestion was generated without an LLM provider and has not been quality-checked.\n");

    RewriteResult {
        updated_doc: request.current_doc.to_string(),
        explanation: body,
        confidence: 0.1,
        provider: "fallback".to_string(),
        model: "none".to_string(),
        tokens_used: 0,
        cost_estimate: 0.0,
        diff: "```diff\n# No diff available (LLM unavailable)\n```".to_string(),
        state: SuggestionState::FallbackStub,
    }
}

/// Runs C9 end to end: builds the prompt, calls `provider` (or falls back
/// to the deterministic stub when `provider` is `None`), parses the
/// response, generates a diff, and estimates cost. Never panics on a
/// malformed provider response -- that becomes confidence 0.5, not an
/// error.
pub fn generate_doc_update(request: &RewriteRequest, provider: Option<&dyn Provider>) -> RewriteResult {
    let Some(provider) = provider else {
        return fallback_suggestion(request);
    };

    let prompt = build_prompt(&PromptInput {
        old_code: request.old_code,
        new_code: request.new_code,
        current_doc: request.current_doc,
        change_type: request.change_type,
        entity_name: request.entity_name,
        filename: request.filename,
        language: request.language,
        distance: request.distance,
        mention_count: request.mention_count,
        line_numbers: request.line_numbers,
    });

    let model = provider.kind().default_model();

    match provider.complete(&prompt) {
        Ok((response_text, tokens_used)) => {
            let (updated_doc, explanation, confidence) = parse_response(&response_text, request.current_doc);
            let diff = generate_diff(request.current_doc, &updated_doc);
            let cost_estimate = estimate_cost(model, tokens_used);
            RewriteResult {
                updated_doc,
                explanation,
                confidence,
                provider: provider.kind().as_str().to_string(),
                model: model.to_string(),
                tokens_used,
                cost_estimate,
                diff,
                state: SuggestionState::Generated,
            }
        }
        Err(message) => {
            tracing::warn!(error = %message, entity = request.entity_name, "LLM call failed, using fallback stub");
            fallback_suggestion(request)
        }
    }
}

/// `true` when `confidence` clears `floor`; the caller uses this to decide
/// `Accepted` vs `RejectedLowConfidence`.
pub fn meets_confidence_floor(confidence: f64, floor: f64) -> bool {
    confidence >= floor
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullProvider;
    impl Provider for NullProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Local
        }
        fn complete(&self, _prompt: &str) -> Result<(String, usize), String> {
            Ok((r#"{"updated_doc": "new text", "explanation": "because", "confidence": 0.9}"#.to_string(), 500))
        }
    }

    struct BrokenProvider;
    impl Provider for BrokenProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::OpenAi
        }
        fn complete(&self, _prompt: &str) -> Result<(String, usize), String> {
            Ok(("not json at all".to_string(), 200))
        }
    }

    fn sample_request<'a>() -> RewriteRequest<'a> {
        RewriteRequest {
            old_code: "def f(x):\n    return x\n",
            new_code: "def f(x):\n    return x * 2\n",
            current_doc: "f() returns its argument unchanged.",
            change_type: "major",
            entity_name: "f",
            filename: Some("a.py"),
            language: Language::Python,
            distance: 0.4,
            mention_count: 1,
            line_numbers: &[1],
        }
    }

    #[test]
    fn no_provider_yields_fallback_stub_at_fixed_confidence() {
        let request = sample_request();
        let result = generate_doc_update(&request, None);
        assert_eq!(result.state, SuggestionState::FallbackStub);
        assert_eq!(result.confidence, 0.1);
        assert_eq!(result.provider, "fallback");
    }

    #[test]
    fn well_formed_json_response_parses_cleanly() {
        let request = sample_request();
        let provider = NullProvider;
        let result = generate_doc_update(&request, Some(&provider));
        assert_eq!(result.updated_doc, "new text");
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.state, SuggestionState::Generated);
    }

    #[test]
    fn malformed_json_response_falls_back_to_raw_text_at_half_confidence() {
        let request = sample_request();
        let provider = BrokenProvider;
        let result = generate_doc_update(&request, Some(&provider));
        assert_eq!(result.updated_doc, "not json at all");
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn confidence_floor_rejects_low_scores() {
        assert!(!meets_confidence_floor(0.1, 0.3));
        assert!(meets_confidence_floor(0.3, 0.3));
    }

    #[test]
    fn diff_marks_insertions_and_deletions() {
        let diff = generate_diff("line one\nline two\n", "line one\nline three\n");
        assert!(diff.contains("-line two"));
        assert!(diff.contains("+line three"));
    }
}
