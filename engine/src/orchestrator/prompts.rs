//! Prompt templates
//!
//! Templates are fixed per directive kind. Every template that may produce
//! math pins the delimiters to `$...$` and `$$...$$`, which are the only ones
//! the renderer understands.

use crate::directive::{Directive, DirectiveKind};

/// Delimiter rule appended to prompts whose answers may contain math
pub const DELIMITER_RULE: &str = "Write any mathematics using only $...$ for inline math \
and $$...$$ for display math. Never use \\(...\\), \\[...\\] or any other delimiter syntax.";

/// Build the prompt for one directive
pub fn directive_prompt(directive: &Directive) -> String {
    let content = directive.raw_content.as_str();
    match directive.kind {
        DirectiveKind::Math => format!(
            "Convert the following description into a single LaTeX formula. \
Respond with the formula only, without delimiters, explanations or surrounding text.\n\n{}",
            content
        ),
        DirectiveKind::Wolfram => format!(
            "Write Wolfram Language code for the following task. \
Respond with the source code only: no explanations, no comments outside the code \
and no Markdown code fences.\n\n{}",
            content
        ),
        DirectiveKind::Explain => format!(
            "Explain the following in plain language for a student. \
Use short paragraphs, bullet lists and **bold** where helpful. {}\n\n{}",
            DELIMITER_RULE, content
        ),
    }
}

/// Build the prompt for a free-form question
pub fn ask_prompt(question: &str) -> String {
    format!("{}\n\n{}", question.trim(), DELIMITER_RULE)
}

/// Build the prompt for a whole-document audit
pub fn audit_prompt(document: &str) -> String {
    format!(
        r#"Review the following notebook for mathematical, logical and factual errors.
Respond with a single JSON object and nothing else, in exactly this shape:
{{"errors": [{{"errorDescription": "...", "currentText": "...", "proposedFix": "...", "explanation": "..."}}]}}
Use an empty "errors" array if there is nothing to fix. {}

Notebook:
{}"#,
        DELIMITER_RULE, document
    )
}
