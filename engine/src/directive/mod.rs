//! Directive extraction
//!
//! Directives are bracketed inline instructions in the notebook text:
//!
//! ```text
//! [Math: integral of x^2 from 0 to 1]
//! [Wolfram: plot sin(x) for x in 0..2pi]
//! [Explain: why the determinant vanishes]
//! ```
//!
//! The kind label is case-sensitive, whitespace around the label and the
//! colon is tolerated, and the content runs up to the first `]` (no nesting).
//!
//! Each directive records the precise `Anchor` of its match. Popups are
//! positioned from that anchor directly, so there is no second pass that
//! pairs matches with page elements by index.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::document::{Anchor, DocumentSource, CELL_SEPARATOR};

/// The kind of content a directive asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// A single LaTeX formula
    Math,
    /// Wolfram Language source code
    Wolfram,
    /// A plain-language explanation
    Explain,
}

impl DirectiveKind {
    /// The label as written in the document
    pub fn label(&self) -> &'static str {
        match self {
            Self::Math => "Math",
            Self::Wolfram => "Wolfram",
            Self::Explain => "Explain",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "Math" => Some(Self::Math),
            "Wolfram" => Some(Self::Wolfram),
            "Explain" => Some(Self::Explain),
            _ => None,
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One directive found in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub raw_content: String,
    pub anchor: Anchor,
}

static DIRECTIVE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn directive_pattern() -> &'static Regex {
    DIRECTIVE_PATTERN.get_or_init(|| {
        Regex::new(r"\[\s*(Math|Wolfram|Explain)\s*:\s*([^\]]*)\]")
            .expect("directive pattern is a valid regex")
    })
}

struct RawMatch<'a> {
    kind: DirectiveKind,
    content: &'a str,
    start: usize,
    end: usize,
}

fn scan(text: &str) -> impl Iterator<Item = RawMatch<'_>> {
    directive_pattern().captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        Some(RawMatch {
            kind: DirectiveKind::from_label(caps.get(1)?.as_str())?,
            content: caps.get(2).map(|m| m.as_str()).unwrap_or_default(),
            start: whole.start(),
            end: whole.end(),
        })
    })
}

/// Extract directives from a single cell of text
///
/// Anchors refer to `cell` and to byte offsets of the whole bracketed match.
pub fn extract_from_cell(cell: usize, text: &str) -> Vec<Directive> {
    scan(text)
        .map(|m| Directive {
            kind: m.kind,
            raw_content: m.content.trim().to_string(),
            anchor: Anchor::new(cell, m.start, m.end),
        })
        .collect()
}

/// Extract directives from a plain string, treated as a single cell
pub fn extract_directives(text: &str) -> Vec<Directive> {
    extract_from_cell(0, text)
}

/// Extract directives from the concatenated document text, in document order
///
/// A directive may span several cells; its anchor starts in the cell holding
/// the opening bracket. An empty result means "nothing to do" and is not an
/// error.
pub fn extract_from_document(doc: &dyn DocumentSource) -> Vec<Directive> {
    let cells = doc.cells();
    let text = cells.join(CELL_SEPARATOR);

    let mut cell_starts = Vec::with_capacity(cells.len());
    let mut offset = 0;
    for cell in &cells {
        cell_starts.push(offset);
        offset += cell.len() + CELL_SEPARATOR.len();
    }

    let directives: Vec<Directive> = scan(&text)
        .map(|m| {
            // `[` never falls inside a separator, so the owning cell is the
            // last one starting at or before the match
            let cell = cell_starts
                .partition_point(|&start| start <= m.start)
                .saturating_sub(1);
            let base = cell_starts.get(cell).copied().unwrap_or_default();
            Directive {
                kind: m.kind,
                raw_content: m.content.trim().to_string(),
                anchor: Anchor::new(cell, m.start - base, m.end - base),
            }
        })
        .collect();

    tracing::debug!("Extracted {} directive(s)", directives.len());
    directives
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextDocument;

    #[test]
    fn test_single_math_directive() {
        let found = extract_directives("[Math: x^2]");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, DirectiveKind::Math);
        assert_eq!(found[0].raw_content, "x^2");
        assert_eq!(found[0].anchor, Anchor::new(0, 0, 11));
    }

    #[test]
    fn test_kind_is_case_sensitive() {
        assert!(extract_directives("[math: x]").is_empty());
        assert!(extract_directives("[MATH: x]").is_empty());
        assert!(extract_directives("[Maths: x]").is_empty());
    }

    #[test]
    fn test_whitespace_tolerance() {
        let found = extract_directives("[ Wolfram :   Plot[Sin[x]  ]");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, DirectiveKind::Wolfram);
        // content stops at the first closing bracket
        assert_eq!(found[0].raw_content, "Plot[Sin[x");
    }

    #[test]
    fn test_multiple_kinds_in_order() {
        let text = "Intro [Explain: eigenvalues] then [Math: det(A)] and [Wolfram: Eigenvalues[A]]";
        let kinds: Vec<_> = extract_directives(text).iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DirectiveKind::Explain, DirectiveKind::Math, DirectiveKind::Wolfram]
        );
    }

    #[test]
    fn test_unterminated_directive_ignored() {
        assert!(extract_directives("[Math: x^2 with no end").is_empty());
    }

    #[test]
    fn test_label_mentions_do_not_create_directives() {
        // Prose that merely mentions a label is not a directive
        assert!(extract_directives("Math is fun. Explain: later.").is_empty());
    }

    #[test]
    fn test_document_anchors_point_at_matches() {
        let doc = TextDocument::from_cells(vec![
            "no directives here".into(),
            "see [Math: a+b] and [Math: c]".into(),
        ]);
        let found = extract_from_document(&doc);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].anchor.cell, 1);
        assert_eq!(doc.text_at(&found[0].anchor).as_deref(), Some("[Math: a+b]"));
        assert_eq!(doc.text_at(&found[1].anchor).as_deref(), Some("[Math: c]"));
    }

    #[test]
    fn test_directive_spanning_cells_is_found() {
        let doc = TextDocument::from_text(
            "intro\n\n[Explain: why the first claim\n\nimplies the second]\n\n[Math: c]",
        );
        assert_eq!(doc.len(), 4);

        let found = extract_from_document(&doc);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, DirectiveKind::Explain);
        assert_eq!(found[0].raw_content, "why the first claim\n\nimplies the second");
        assert_eq!(found[0].anchor.cell, 1);
        assert_eq!(
            doc.text_at(&found[0].anchor).as_deref(),
            Some("[Explain: why the first claim\n\nimplies the second]")
        );

        assert_eq!(found[1].anchor, Anchor::new(3, 0, 9));
        assert_eq!(doc.text_at(&found[1].anchor).as_deref(), Some("[Math: c]"));
    }

    #[test]
    fn test_document_matches_full_text_scan() {
        let doc = TextDocument::from_text("[Math: a\n\nb] and [Wolfram: x]\n\nno more");
        assert_eq!(
            extract_from_document(&doc).len(),
            extract_directives(&doc.full_text()).len()
        );
    }

    #[test]
    fn test_empty_document_yields_nothing() {
        let doc = TextDocument::default();
        assert!(extract_from_document(&doc).is_empty());
    }
}
