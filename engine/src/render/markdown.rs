//! Line-oriented Markdown subset
//!
//! Supported: ATX headings (`#`..`######`), bullet lists (`-`/`*`), bold
//! (`**...**`) and blank lines, which are kept as explicit empty-line markers
//! so vertical spacing survives. Everything else is escaped text.

use regex::Regex;
use std::sync::OnceLock;

static HEADING: OnceLock<Regex> = OnceLock::new();
static BULLET: OnceLock<Regex> = OnceLock::new();
static BOLD: OnceLock<Regex> = OnceLock::new();

fn heading() -> &'static Regex {
    HEADING.get_or_init(|| Regex::new(r"^\s*(#{1,6})\s+(.*)$").expect("valid heading regex"))
}

fn bullet() -> &'static Regex {
    BULLET.get_or_init(|| Regex::new(r"^\s*[-*]\s+(.*)$").expect("valid bullet regex"))
}

fn bold() -> &'static Regex {
    BOLD.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex"))
}

/// Marker emitted for each blank line
pub const EMPTY_LINE: &str = r#"<div class="md-empty-line"></div>"#;

/// Escape text for inclusion in HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape and apply inline formatting to one line
pub fn render_inline(text: &str) -> String {
    let escaped = escape_html(text);
    bold()
        .replace_all(&escaped, "<strong>$1</strong>")
        .into_owned()
}

enum Block {
    Paragraph(Vec<String>),
    List(Vec<String>),
}

fn flush(block: &mut Option<Block>, out: &mut Vec<String>) {
    match block.take() {
        Some(Block::Paragraph(lines)) => {
            out.push(format!("<p>{}</p>", lines.join("<br>")));
        }
        Some(Block::List(items)) => {
            let mut html = String::from("<ul>");
            for item in items {
                html.push_str("<li>");
                html.push_str(&item);
                html.push_str("</li>");
            }
            html.push_str("</ul>");
            out.push(html);
        }
        None => {}
    }
}

/// Render the Markdown subset to HTML
///
/// Consecutive plain lines form one paragraph, consecutive bullet lines form
/// one list. Never fails; unknown syntax passes through as escaped text.
pub fn render_markdown(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut block: Option<Block> = None;

    for line in text.lines() {
        if line.trim().is_empty() {
            flush(&mut block, &mut out);
            out.push(EMPTY_LINE.to_string());
            continue;
        }

        if let Some(caps) = heading().captures(line) {
            flush(&mut block, &mut out);
            let level = caps[1].len();
            out.push(format!(
                "<h{level}>{}</h{level}>",
                render_inline(caps[2].trim_end())
            ));
            continue;
        }

        if let Some(caps) = bullet().captures(line) {
            let item = render_inline(&caps[1]);
            match block.as_mut() {
                Some(Block::List(items)) => items.push(item),
                _ => {
                    flush(&mut block, &mut out);
                    block = Some(Block::List(vec![item]));
                }
            }
            continue;
        }

        let rendered = render_inline(line);
        match block.as_mut() {
            Some(Block::Paragraph(lines)) => lines.push(rendered),
            _ => {
                flush(&mut block, &mut out);
                block = Some(Block::Paragraph(vec![rendered]));
            }
        }
    }
    flush(&mut block, &mut out);

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings() {
        assert_eq!(render_markdown("# Title"), "<h1>Title</h1>");
        assert_eq!(render_markdown("###### Deep"), "<h6>Deep</h6>");
        // seven hashes is not a heading
        assert_eq!(render_markdown("####### x"), "<p>####### x</p>");
        // a hash without a space is not a heading
        assert_eq!(render_markdown("#tag"), "<p>#tag</p>");
    }

    #[test]
    fn test_bullets_grouped_into_one_list() {
        let html = render_markdown("- one\n* two\n- three\nafter");
        assert_eq!(
            html,
            "<ul><li>one</li><li>two</li><li>three</li></ul>\n<p>after</p>"
        );
    }

    #[test]
    fn test_bold() {
        assert_eq!(
            render_markdown("a **bold** word"),
            "<p>a <strong>bold</strong> word</p>"
        );
    }

    #[test]
    fn test_blank_lines_become_markers() {
        let html = render_markdown("one\n\n\ntwo");
        assert_eq!(
            html,
            format!("<p>one</p>\n{EMPTY_LINE}\n{EMPTY_LINE}\n<p>two</p>")
        );
    }

    #[test]
    fn test_consecutive_lines_share_paragraph() {
        assert_eq!(render_markdown("one\ntwo"), "<p>one<br>two</p>");
    }

    #[test]
    fn test_html_is_escaped() {
        assert_eq!(
            render_markdown("<script>alert('x')</script>"),
            "<p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(render_markdown(""), "");
    }
}
