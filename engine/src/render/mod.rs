//! Mixed Markdown + LaTeX rendering
//!
//! Model answers interleave inline math (`$...$`), display math (`$$...$$`)
//! and a small Markdown subset. Rendering runs in three passes so that
//! Markdown rules never see the inside of a math span:
//!
//! 1. math spans are cut out and replaced by unique placeholder tokens,
//! 2. the Markdown subset is rendered over the placeholder text,
//! 3. each placeholder is replaced by the rendered math, or by the original
//!    delimited source when the math renderer rejects it.
//!
//! Rendering is total: a `$` without a closing delimiter stays literal text,
//! and a failed math span falls back to its source.

pub mod markdown;
pub mod math;

pub use markdown::{escape_html, render_markdown};
pub use math::{HtmlMathRenderer, MathError, MathRenderer};

/// Leading text of every math placeholder token
pub const PLACEHOLDER_PREFIX: &str = "QUILLMATH";

/// A math span cut out during extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathSpan {
    pub token: String,
    pub expression: String,
    pub display: bool,
}

impl MathSpan {
    /// The span as it was written, delimiters included
    pub fn source(&self) -> String {
        if self.display {
            format!("$${}$$", self.expression)
        } else {
            format!("${}$", self.expression)
        }
    }
}

/// Replace every closed math span in `text` with a placeholder token
///
/// Returns the substituted text and the recorded spans in order. Tokens are
/// alphanumeric so the Markdown pass leaves them untouched.
pub fn extract_math(text: &str) -> (String, Vec<MathSpan>) {
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    let mut out = String::with_capacity(text.len());
    let mut spans = Vec::new();
    let mut rest = text;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos..];

        let display = after.starts_with("$$");
        let delimiter = if display { "$$" } else { "$" };
        let body = &after[delimiter.len()..];

        match body.find(delimiter) {
            Some(close) => {
                let token = format!("{}{}N{}Q", PLACEHOLDER_PREFIX, nonce, spans.len());
                out.push_str(&token);
                spans.push(MathSpan {
                    token,
                    expression: body[..close].to_string(),
                    display,
                });
                rest = &body[close + delimiter.len()..];
            }
            None => {
                // No closing delimiter: the opener is literal text
                out.push_str(delimiter);
                rest = body;
            }
        }
    }
    out.push_str(rest);

    (out, spans)
}

/// The Markdown + math rendering pipeline
pub struct MarkupRenderer {
    math: Box<dyn MathRenderer>,
}

impl Default for MarkupRenderer {
    fn default() -> Self {
        Self::new(Box::new(HtmlMathRenderer))
    }
}

impl MarkupRenderer {
    pub fn new(math: Box<dyn MathRenderer>) -> Self {
        Self { math }
    }

    /// Render `text` to HTML; never fails
    pub fn render(&self, text: &str) -> String {
        self.render_with(text, |html| html)
    }

    /// Render `text`, running `rewrite` over the Markdown output while math
    /// spans are still placeholders
    ///
    /// Inline rewrites (such as chat control tokens) therefore never reach
    /// into rendered math.
    pub fn render_with<F>(&self, text: &str, rewrite: F) -> String
    where
        F: FnOnce(String) -> String,
    {
        let (substituted, spans) = extract_math(text);
        let mut html = rewrite(render_markdown(&substituted));

        for span in &spans {
            let rendered = match self.math.render(&span.expression, span.display) {
                Ok(rendered) => rendered,
                Err(e) => {
                    tracing::debug!("Math fallback for {:?}: {}", span.expression, e);
                    escape_html(&span.source())
                }
            };
            html = html.replace(&span.token, &rendered);
        }

        html
    }
}

/// Render with the default math renderer
pub fn render_latex(text: &str) -> String {
    MarkupRenderer::default().render(text)
}
