use crate::editing::document::{Document, HeadingLevel, ListKind, TextKind};
use crate::editing::style::{Align, FontSize, Link, Rgb};
use crate::parsing::builder::DocumentBuilder;

use super::css;
use super::lexer::{Token, TokenKind, lex};
use super::tag::{Tag, parse_tag};

/// Parses note markup into a normalized [`Document`].
///
/// Never fails: anything the parser does not understand is kept as plain
/// text or dropped, and the recovery is logged at debug level.
pub fn parse(markup: &str) -> Document {
    let mut parser = Parser {
        builder: DocumentBuilder::new(),
    };
    for token in lex(markup) {
        parser.token(token);
    }
    parser.builder.finish()
}

struct Parser {
    builder: DocumentBuilder,
}

impl Parser {
    fn token(&mut self, token: Token<'_>) {
        match token.kind {
            TokenKind::Text => {
                let text = html_escape::decode_html_entities(token.text);
                self.text(&text);
            }
            TokenKind::Lt => {
                log::debug!("stray '<' kept as text");
                self.text("<");
            }
            TokenKind::Declaration => log::debug!("dropping declaration {:?}", token.text),
            TokenKind::OpenTag => match parse_tag(token.text) {
                Some(tag) => self.open_tag(&tag),
                None => log::debug!("dropping malformed tag {:?}", token.text),
            },
            TokenKind::CloseTag => match parse_tag(token.text) {
                Some(tag) => self.close_tag(&tag.name),
                None => log::debug!("dropping malformed tag {:?}", token.text),
            },
        }
    }

    fn text(&mut self, text: &str) {
        let b = &mut self.builder;
        if b.has_open_leaf() && !b.current_is_implicit() {
            b.push_text(text);
            return;
        }
        // Bare text: one paragraph per line
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                b.finish_leaf();
            }
            let line = line.strip_suffix('\r').unwrap_or(line);
            if !b.has_open_leaf() && line.trim().is_empty() {
                continue;
            }
            b.push_text(line);
        }
    }

    fn open_tag(&mut self, tag: &Tag) {
        let name = tag.name.as_str();
        let b = &mut self.builder;
        match name {
            "p" | "div" => {
                if b.current_kind() == Some(TextKind::ListItem) {
                    // Paragraphs inside an item continue the item
                    if !b.current_is_empty() {
                        b.push_break();
                    }
                    return;
                }
                if b.in_quote() {
                    let reuse = b.current_kind() == Some(TextKind::BlockQuote)
                        && !b.current_is_implicit()
                        && b.current_is_empty();
                    if !reuse {
                        self.open_block(TextKind::BlockQuote, tag);
                    }
                } else {
                    self.open_block(TextKind::Paragraph, tag);
                }
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse().unwrap_or(3);
                self.open_block(TextKind::Heading(HeadingLevel::clamped(level)), tag);
            }
            "blockquote" => {
                b.finish_leaf();
                b.enter_quote();
                self.open_block(TextKind::BlockQuote, tag);
            }
            "pre" => self.open_block(TextKind::CodeBlock, tag),
            "ul" => b.open_list(ListKind::Unordered),
            "ol" => b.open_list(ListKind::Ordered),
            "li" => self.open_block(TextKind::ListItem, tag),
            "br" => b.push_break(),
            _ if tag.self_closing => log::debug!("dropping empty <{name}/>"),
            "b" | "strong" => b.push_style(name, |s| s.bold = true),
            "i" | "em" => b.push_style(name, |s| s.italic = true),
            "u" | "ins" => b.push_style(name, |s| s.underline = true),
            "span" => {
                let css = tag.attr("style").unwrap_or_default();
                b.push_style(name, |s| css::apply(css, s));
            }
            "font" => b.push_style(name, |s| {
                if let Some(color) = tag.attr("color").and_then(|c| c.parse::<Rgb>().ok()) {
                    s.text_color = color;
                }
                let size = tag.attr("size").map(str::trim);
                if let Some(size) = size.and_then(|v| v.parse::<u8>().ok()) {
                    s.font_size = FontSize::from_html_size(size);
                }
                if let Some(css) = tag.attr("style") {
                    css::apply(css, s);
                }
            }),
            "a" => {
                let href = tag.attr("href").map(str::trim).unwrap_or_default();
                b.push_style(name, |s| {
                    if !href.is_empty() {
                        s.link = Some(Link {
                            href: href.to_string(),
                        });
                    }
                });
            }
            _ => log::debug!("dropping unknown tag <{name}>"),
        }
    }

    /// Opens a leaf for a block tag, applying its alignment and any run-level
    /// style it carries.
    fn open_block(&mut self, kind: TextKind, tag: &Tag) {
        let style = tag.attr("style");
        let align = style
            .and_then(css::text_align)
            .or_else(|| tag.attr("align").and_then(|a| a.parse::<Align>().ok()))
            .unwrap_or_default();
        self.builder.open_leaf(kind, align);
        if let Some(css) = style {
            self.builder.push_style(&tag.name, |s| css::apply(css, s));
        }
    }

    fn close_tag(&mut self, name: &str) {
        let b = &mut self.builder;
        match name {
            "p" | "div" if b.current_kind() == Some(TextKind::ListItem) => {}
            "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "pre" | "li" => {
                b.finish_leaf()
            }
            "blockquote" => b.leave_quote(),
            "ul" | "ol" => b.close_list(),
            "br" => {}
            _ => {
                if !b.pop_style(name) {
                    log::debug!("ignoring unmatched </{name}>");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::document::{Block, TextBlock};
    use crate::editing::style::{Highlight, RunStyle};
    use pretty_assertions::assert_eq;

    fn texts(doc: &Document) -> Vec<String> {
        doc.leaves().map(TextBlock::text).collect()
    }

    fn first_leaf(doc: &Document) -> &TextBlock {
        doc.leaves().next().unwrap()
    }

    #[test]
    fn parses_blocks_and_alignment() {
        let doc = parse(
            r#"<h2 style="text-align:right">Title</h2><p>Body</p><blockquote>Quote</blockquote><pre>code  here</pre>"#,
        );
        let kinds: Vec<TextKind> = doc.leaves().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TextKind::Heading(HeadingLevel::H2),
                TextKind::Paragraph,
                TextKind::BlockQuote,
                TextKind::CodeBlock,
            ]
        );
        assert_eq!(first_leaf(&doc).align, Align::Right);
        assert_eq!(texts(&doc)[3], "code  here");
    }

    #[test]
    fn deep_headings_clamp_to_three() {
        let doc = parse("<h5>Small</h5>");
        assert_eq!(first_leaf(&doc).kind, TextKind::Heading(HeadingLevel::H3));
    }

    #[test]
    fn parses_nested_inline_styles() {
        let doc = parse(
            r##"<p><a href="https://x.y"><span style="font-size:20px;color:#ff0000;background-color:#ffff00"><b><i><u>all</u></i></b></span></a> plain</p>"##,
        );
        let runs = &first_leaf(&doc).runs;
        assert_eq!(runs.len(), 2);
        assert_eq!(
            runs[0].style,
            RunStyle {
                bold: true,
                italic: true,
                underline: true,
                font_size: FontSize::new(20).unwrap(),
                text_color: Rgb::new(255, 0, 0),
                highlight: Highlight::Color(Rgb::new(255, 255, 0)),
                link: Some(Link {
                    href: "https://x.y".into(),
                }),
            }
        );
        assert!(runs[1].style.is_default());
    }

    #[test]
    fn accepts_legacy_browser_markup() {
        let doc = parse(
            r##"<div><strong>b</strong><em>i</em><font color="#00ff00" size="5">f</font><span style="font-weight:bold">w</span></div>"##,
        );
        let runs = &first_leaf(&doc).runs;
        assert!(runs[0].style.bold);
        assert!(runs[1].style.italic);
        assert_eq!(runs[2].style.text_color, Rgb::new(0, 255, 0));
        assert_eq!(runs[2].style.font_size, FontSize::new(24).unwrap());
        assert!(runs[3].style.bold);
    }

    #[test]
    fn br_becomes_newline_and_trailing_br_is_dropped() {
        let doc = parse("<p>one<br>two<br></p><p><br></p>");
        assert_eq!(texts(&doc), vec!["one\ntwo".to_string(), String::new()]);
    }

    #[test]
    fn bare_text_becomes_one_paragraph_per_line() {
        let doc = parse("first line\nsecond <b>bold</b>\r\n\nthird");
        assert_eq!(
            texts(&doc),
            vec![
                "first line".to_string(),
                "second bold".to_string(),
                "third".to_string()
            ]
        );
    }

    #[test]
    fn whitespace_between_blocks_is_ignored() {
        let doc = parse("<p>a</p>\n  <ul>\n <li>b</li>\n</ul>\n");
        assert_eq!(texts(&doc), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn unknown_tags_are_dropped_but_text_kept() {
        let doc = parse("<p>keep <blink>this</blink><img src=x> text</p>");
        assert_eq!(texts(&doc), vec!["keep this text".to_string()]);
    }

    #[test]
    fn stray_lt_and_entities_are_text() {
        let doc = parse("<p>1 < 2 &amp;&amp; 3 &gt; 2</p>");
        assert_eq!(texts(&doc), vec!["1 < 2 && 3 > 2".to_string()]);
    }

    #[test]
    fn nested_lists_are_flattened() {
        let doc = parse("<ol><li>a<ul><li>b</li></ul></li><li>c</li></ol>");
        let kinds: Vec<ListKind> = doc
            .blocks()
            .iter()
            .filter_map(|block| match block {
                Block::List(list) => Some(list.kind),
                Block::Text(_) => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![ListKind::Ordered, ListKind::Unordered, ListKind::Ordered]
        );
        assert_eq!(texts(&doc), vec!["a", "b", "c"]);
    }

    #[test]
    fn orphan_list_item_becomes_unordered_list() {
        let doc = parse("<li>lonely</li>");
        assert!(matches!(
            doc.blocks(),
            [Block::List(list)] if list.kind == ListKind::Unordered
        ));
    }

    #[test]
    fn paragraphs_inside_quote_become_quote_blocks() {
        let doc = parse("<blockquote><p>a</p><p>b</p></blockquote><p>c</p>");
        let kinds: Vec<TextKind> = doc.leaves().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![TextKind::BlockQuote, TextKind::BlockQuote, TextKind::Paragraph]
        );
    }

    #[test]
    fn unclosed_inline_tag_ends_with_its_block() {
        let doc = parse("<p><b>bold</p><p>plain</p>");
        let leaves: Vec<&TextBlock> = doc.leaves().collect();
        assert!(leaves[0].runs[0].style.bold);
        assert!(!leaves[1].runs[0].style.bold);
    }

    #[test]
    fn garbage_never_panics() {
        let inputs = [
            "<",
            "<<>>",
            "</p></ul></blockquote>",
            "<a href=>x</a>",
            "&#xZZ;<p",
            "<p style=\"text-align:\">",
        ];
        for input in inputs {
            let doc = parse(input);
            assert!(doc.leaf_count() >= 1, "input {input:?}");
        }
    }
}
