//! Markdown import.
//!
//! Notes written as Markdown are converted once into a [`Document`]; they
//! are saved back as markup. Unsupported constructs keep their text.

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

use crate::editing::document::{Document, HeadingLevel, ListKind, TextKind};
use crate::editing::style::{Align, Link};
use crate::parsing::builder::DocumentBuilder;

pub fn import(markdown: &str) -> Document {
    let mut b = DocumentBuilder::new();
    // Text of the open code block, flushed at its end
    let mut code: Option<String> = None;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(tag) => match tag {
                Tag::Paragraph => {
                    if b.current_kind() == Some(TextKind::ListItem) {
                        // Loose list: later paragraphs continue the item
                        if !b.current_is_empty() {
                            b.push_break();
                        }
                    } else if b.in_quote() {
                        b.open_leaf(TextKind::BlockQuote, Align::Left);
                    } else {
                        b.open_leaf(TextKind::Paragraph, Align::Left);
                    }
                }
                Tag::Heading { level, .. } => {
                    let level = match level {
                        pulldown_cmark::HeadingLevel::H1 => HeadingLevel::H1,
                        pulldown_cmark::HeadingLevel::H2 => HeadingLevel::H2,
                        _ => HeadingLevel::H3,
                    };
                    b.open_leaf(TextKind::Heading(level), Align::Left);
                }
                Tag::BlockQuote(..) => {
                    b.finish_leaf();
                    b.enter_quote();
                }
                Tag::CodeBlock(kind) => {
                    if let CodeBlockKind::Fenced(lang) = &kind
                        && !lang.is_empty()
                    {
                        log::debug!("dropping code block language {lang:?}");
                    }
                    b.open_leaf(TextKind::CodeBlock, Align::Left);
                    code = Some(String::new());
                }
                Tag::List(start) => b.open_list(match start {
                    Some(_) => ListKind::Ordered,
                    None => ListKind::Unordered,
                }),
                Tag::Item => b.open_leaf(TextKind::ListItem, Align::Left),
                Tag::Emphasis => b.push_style("em", |s| s.italic = true),
                Tag::Strong => b.push_style("strong", |s| s.bold = true),
                Tag::Link { dest_url, .. } => {
                    let href = dest_url.trim().to_string();
                    b.push_style("a", |s| {
                        if !href.is_empty() {
                            s.link = Some(Link { href });
                        }
                    });
                }
                other => log::debug!("markdown: keeping only the text of {other:?}"),
            },
            Event::End(end) => match end {
                TagEnd::Paragraph => {
                    if b.current_kind() != Some(TextKind::ListItem) {
                        b.finish_leaf();
                    }
                }
                TagEnd::Heading(..) | TagEnd::Item => b.finish_leaf(),
                TagEnd::BlockQuote(..) => b.leave_quote(),
                TagEnd::CodeBlock => {
                    if let Some(text) = code.take() {
                        b.push_text(text.strip_suffix('\n').unwrap_or(&text));
                    }
                    b.finish_leaf();
                }
                TagEnd::List(..) => b.close_list(),
                TagEnd::Emphasis => {
                    b.pop_style("em");
                }
                TagEnd::Strong => {
                    b.pop_style("strong");
                }
                TagEnd::Link => {
                    b.pop_style("a");
                }
                _ => {}
            },
            Event::Text(text) => match code.as_mut() {
                Some(buffer) => buffer.push_str(&text),
                None => b.push_text(&text),
            },
            Event::Code(text) => b.push_text(&text),
            Event::SoftBreak | Event::HardBreak => b.push_break(),
            Event::TaskListMarker(checked) => b.push_text(if checked { "[x] " } else { "[ ] " }),
            other => log::debug!("markdown: dropping {other:?}"),
        }
    }

    b.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::document::{Block, TextBlock};
    use pretty_assertions::assert_eq;

    fn texts(doc: &Document) -> Vec<String> {
        doc.leaves().map(TextBlock::text).collect()
    }

    fn kinds(doc: &Document) -> Vec<TextKind> {
        doc.leaves().map(|leaf| leaf.kind).collect()
    }

    #[test]
    fn imports_headings_and_paragraphs() {
        let doc = import("# Title\n\nSome text\nwrapped\n\n#### Deep");
        assert_eq!(
            kinds(&doc),
            vec![
                TextKind::Heading(HeadingLevel::H1),
                TextKind::Paragraph,
                TextKind::Heading(HeadingLevel::H3),
            ]
        );
        assert_eq!(texts(&doc)[1], "Some text\nwrapped");
    }

    #[test]
    fn imports_emphasis_and_links() {
        let doc = import("plain **bold** *it* [site](https://x.y) `code`");
        let runs = &doc.leaves().next().unwrap().runs;
        let bold = runs.iter().find(|r| r.text == "bold").unwrap();
        assert!(bold.style.bold);
        let it = runs.iter().find(|r| r.text == "it").unwrap();
        assert!(it.style.italic);
        let site = runs.iter().find(|r| r.text == "site").unwrap();
        assert_eq!(
            site.style.link,
            Some(Link {
                href: "https://x.y".into(),
            })
        );
        assert_eq!(texts(&doc), vec!["plain bold it site code".to_string()]);
    }

    #[test]
    fn imports_lists_flattening_nesting() {
        let source = "1. one\n2. two\n   - nested\n\n- loose a\n\n  more a\n\n- loose b\n";
        let doc = import(source);
        let lists: Vec<(ListKind, usize)> = doc
            .blocks()
            .iter()
            .filter_map(|block| match block {
                Block::List(list) => Some((list.kind, list.items.len())),
                Block::Text(_) => None,
            })
            .collect();
        assert_eq!(
            lists,
            vec![(ListKind::Ordered, 2), (ListKind::Unordered, 3)]
        );
        assert_eq!(
            texts(&doc),
            vec!["one", "two", "nested", "loose a\nmore a", "loose b"]
        );
    }

    #[test]
    fn imports_quotes_and_code() {
        let doc = import("> quoted\n\n```rust\nfn main() {}\n```\n");
        assert_eq!(kinds(&doc), vec![TextKind::BlockQuote, TextKind::CodeBlock]);
        assert_eq!(texts(&doc), vec!["quoted", "fn main() {}"]);
    }

    #[test]
    fn empty_markdown_is_empty_document() {
        assert_eq!(import(""), Document::new());
    }
}
