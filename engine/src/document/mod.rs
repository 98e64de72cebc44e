//! Host document access
//!
//! The notebook itself is owned by the host page. Quill only reads it through
//! `DocumentSource`, as an ordered list of cells of plain text. Locations
//! inside the document are expressed as `Anchor`s: byte ranges that start
//! in one cell and are measured in the concatenated document text, so a span
//! may run on into the following cells.

use std::fmt;
use std::path::Path;

use sdk::errors::EngineError;

/// Separator used when cells are concatenated into one text
pub const CELL_SEPARATOR: &str = "\n\n";

/// Precise location of a span of document text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Anchor {
    /// Index of the cell
    pub cell: usize,
    /// Byte offset of the first character of the span, from the start of `cell`
    pub start: usize,
    /// Byte offset one past the last character of the span, from the start of
    /// `cell` in the concatenated text
    pub end: usize,
}

impl Anchor {
    pub fn new(cell: usize, start: usize, end: usize) -> Self {
        Self { cell, start, end }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell {} [{}..{}]", self.cell, self.start, self.end)
    }
}

/// Read-only view of the host document
pub trait DocumentSource: Send + Sync {
    /// Cell texts in document order
    fn cells(&self) -> Vec<String>;

    /// All cell texts concatenated in document order
    fn full_text(&self) -> String {
        self.cells().join(CELL_SEPARATOR)
    }

    /// Text covered by an anchor, if the anchor is still valid
    fn text_at(&self, anchor: &Anchor) -> Option<String> {
        let cells = self.cells();
        if anchor.cell >= cells.len() {
            return None;
        }
        let rest = cells[anchor.cell..].join(CELL_SEPARATOR);
        rest.get(anchor.start..anchor.end).map(str::to_string)
    }
}

/// A document held in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDocument {
    cells: Vec<String>,
}

impl TextDocument {
    /// Build a document from explicit cells
    pub fn from_cells(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Build a document from plain text, one cell per blank-line-separated block
    pub fn from_text(text: &str) -> Self {
        let mut cells = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    cells.push(current.join("\n"));
                    current.clear();
                }
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            cells.push(current.join("\n"));
        }

        Self { cells }
    }

    /// Read a document from a text file
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_text(&text))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl DocumentSource for TextDocument {
    fn cells(&self) -> Vec<String> {
        self.cells.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_splits_on_blank_lines() {
        let doc = TextDocument::from_text("first line\nsecond line\n\n\nthird\n   \nfourth");
        assert_eq!(
            doc.cells(),
            vec!["first line\nsecond line", "third", "fourth"]
        );
    }

    #[test]
    fn test_full_text_joins_cells() {
        let doc = TextDocument::from_cells(vec!["a".into(), "b".into()]);
        assert_eq!(doc.full_text(), "a\n\nb");
    }

    #[test]
    fn test_text_at_anchor() {
        let doc = TextDocument::from_cells(vec!["hello".into(), "[Math: x]".into()]);
        assert_eq!(doc.text_at(&Anchor::new(1, 0, 9)), Some("[Math: x]".to_string()));
        assert_eq!(doc.text_at(&Anchor::new(5, 0, 1)), None);
        assert_eq!(doc.text_at(&Anchor::new(0, 2, 99)), None);
    }

    #[test]
    fn test_text_at_anchor_running_into_next_cell() {
        let doc = TextDocument::from_cells(vec!["[Explain: a".into(), "b]".into()]);
        assert_eq!(
            doc.text_at(&Anchor::new(0, 0, 15)),
            Some("[Explain: a\n\nb]".to_string())
        );
    }
}
