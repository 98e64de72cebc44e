//! LaTeX rendering seam
//!
//! The typesetting itself happens in the host (a KaTeX-style renderer). This
//! module decides whether an expression is renderable and wraps it in the
//! markup the host hydrates. Expressions the host would reject are reported as
//! errors so the pipeline can fall back to literal source.

use thiserror::Error;

use super::markdown::escape_html;

/// Why an expression could not be rendered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("empty expression")]
    Empty,

    #[error("unbalanced braces")]
    UnbalancedBraces,

    #[error("unbalanced \\left/\\right")]
    UnbalancedDelimiters,

    #[error("unbalanced \\begin/\\end")]
    UnbalancedEnvironment,
}

/// Renders one LaTeX expression to markup
pub trait MathRenderer: Send + Sync {
    /// Render `expr`; `display` selects block layout over inline layout
    fn render(&self, expr: &str, display: bool) -> Result<String, MathError>;
}

/// Default renderer emitting host-hydrated `<span>` elements
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlMathRenderer;

impl HtmlMathRenderer {
    fn validate(expr: &str) -> Result<(), MathError> {
        if expr.trim().is_empty() {
            return Err(MathError::Empty);
        }

        let mut depth: i64 = 0;
        let mut escaped = false;
        for ch in expr.chars() {
            if escaped {
                escaped = false;
                continue;
            }
            match ch {
                '\\' => escaped = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(MathError::UnbalancedBraces);
                    }
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(MathError::UnbalancedBraces);
        }

        if count_command(expr, "\\left") != count_command(expr, "\\right") {
            return Err(MathError::UnbalancedDelimiters);
        }
        if expr.matches("\\begin{").count() != expr.matches("\\end{").count() {
            return Err(MathError::UnbalancedEnvironment);
        }

        Ok(())
    }
}

/// Count `command` occurrences not followed by a letter, so `\leftarrow` is not `\left`
fn count_command(expr: &str, command: &str) -> usize {
    expr.match_indices(command)
        .filter(|(i, _)| {
            !expr[i + command.len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic())
        })
        .count()
}

impl MathRenderer for HtmlMathRenderer {
    fn render(&self, expr: &str, display: bool) -> Result<String, MathError> {
        Self::validate(expr)?;

        let class = if display {
            "math math-display"
        } else {
            "math math-inline"
        };
        let tex = escape_html(expr.trim());
        Ok(format!(
            r#"<span class="{class}" data-tex="{tex}">{tex}</span>"#
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_and_display_classes() {
        let r = HtmlMathRenderer;
        assert!(r.render("x^2", false).unwrap().contains("math-inline"));
        assert!(r.render("x^2", true).unwrap().contains("math-display"));
    }

    #[test]
    fn test_expression_is_escaped() {
        let html = HtmlMathRenderer.render("a<b", false).unwrap();
        assert!(html.contains("a&lt;b"));
        assert!(!html.contains("a<b"));
    }

    #[test]
    fn test_rejects_malformed_expressions() {
        let r = HtmlMathRenderer;
        assert_eq!(r.render("  ", false), Err(MathError::Empty));
        assert_eq!(r.render("\\frac{1}{2", false), Err(MathError::UnbalancedBraces));
        assert_eq!(r.render("}{", false), Err(MathError::UnbalancedBraces));
        assert_eq!(
            r.render("\\left( x", false),
            Err(MathError::UnbalancedDelimiters)
        );
        assert_eq!(
            r.render("\\begin{matrix} 1", true),
            Err(MathError::UnbalancedEnvironment)
        );
    }

    #[test]
    fn test_arrow_commands_are_not_delimiters() {
        assert!(HtmlMathRenderer.render("a \\leftarrow b \\rightarrow c", false).is_ok());
        assert!(HtmlMathRenderer.render("\\left( x \\right)", false).is_ok());
    }

    #[test]
    fn test_escaped_braces_do_not_count() {
        assert!(HtmlMathRenderer.render("\\{ x \\}", false).is_ok());
        assert!(HtmlMathRenderer.render("\\{", false).is_ok());
    }
}
