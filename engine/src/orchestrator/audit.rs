//! Audit response parsing
//!
//! The audit prompt asks for `{"errors": [...]}` and nothing else. Models do
//! not always comply, so the parser accepts the object on its own, inside a
//! Markdown code fence, or embedded in prose. Anything else is a format
//! error, which is an expected outcome and never a crash.

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::presentation::ModalItem;
use crate::render::{escape_html, render_latex};

/// One issue reported by the audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFinding {
    #[serde(default)]
    pub error_description: String,
    #[serde(default)]
    pub current_text: String,
    #[serde(default)]
    pub proposed_fix: String,
    #[serde(default)]
    pub explanation: String,
}

impl ModalItem for AuditFinding {
    fn title(&self) -> String {
        if self.error_description.trim().is_empty() {
            "Finding".to_string()
        } else {
            self.error_description.clone()
        }
    }

    fn body_html(&self) -> String {
        format!(
            concat!(
                r#"<div class="quill-finding">"#,
                r#"<h4>Current</h4><pre class="quill-current">{current}</pre>"#,
                r#"<h4>Proposed fix</h4><pre class="quill-fix">{fix}</pre>"#,
                r#"<h4>Why</h4><div class="quill-explanation">{why}</div>"#,
                r#"</div>"#
            ),
            current = escape_html(&self.current_text),
            fix = escape_html(&self.proposed_fix),
            why = render_latex(&self.explanation),
        )
    }
}

/// Parse the model's audit answer into findings
///
/// # Errors
/// Returns `EngineError::FormatError` when no JSON object can be found, or
/// when the object has no `errors` array.
pub fn parse_audit_response(answer: &str) -> Result<Vec<AuditFinding>, EngineError> {
    let value = find_json_object(answer.trim())
        .ok_or_else(|| EngineError::FormatError("no JSON object in audit answer".to_string()))?;

    let errors = value
        .get("errors")
        .and_then(Value::as_array)
        .ok_or_else(|| EngineError::FormatError("missing \"errors\" array".to_string()))?;

    errors
        .iter()
        .map(|entry| {
            serde_json::from_value::<AuditFinding>(entry.clone())
                .map_err(|e| EngineError::FormatError(format!("malformed finding: {}", e)))
        })
        .collect()
}

/// Locate a JSON object: whole answer, first fenced block, or a balanced `{...}`
///
/// Among balanced candidates, the first one carrying an `errors` key wins;
/// otherwise the first one that parses at all.
fn find_json_object(text: &str) -> Option<Value> {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }

    if let Some(inner) = extract_fenced_block(text) {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(inner.trim()) {
            return Some(value);
        }
    }

    let mut first_object = None;
    for (start, _) in text.match_indices('{') {
        let Some(candidate) = extract_balanced_json(&text[start..]) else {
            continue;
        };
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(candidate) {
            if value.get("errors").is_some() {
                return Some(value);
            }
            first_object.get_or_insert(value);
        }
    }
    first_object
}

/// Extract the body of the first Markdown code fence in the text.
///
/// Works even when there is trailing prose after the closing fence.
fn extract_fenced_block(content: &str) -> Option<&str> {
    let fence_start = content.find("```")?;
    let after_opening = &content[fence_start + 3..];

    // Skip the language tag line (e.g. "json\n")
    let body_start_rel = after_opening.find('\n')? + 1;
    let body_start = fence_start + 3 + body_start_rel;

    let closing = content[body_start..].find("```")?;
    let body_end = body_start + closing;

    if body_start >= body_end {
        return None;
    }

    Some(&content[body_start..body_end])
}

/// Extract a balanced JSON object starting at position 0 of `s`.
///
/// Counts `{` / `}` depth, respecting string literals.
fn extract_balanced_json(s: &str) -> Option<&str> {
    if !s.starts_with('{') {
        return None;
    }
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
