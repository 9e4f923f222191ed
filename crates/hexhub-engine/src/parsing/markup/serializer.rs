use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::editing::document::{Block, Document, ListKind, TextBlock, TextKind};
use crate::editing::style::{Align, FontSize, Highlight, Rgb, Run};

/// Serializes a document to note markup.
///
/// Output is deterministic: equal documents always produce identical bytes.
pub fn serialize(doc: &Document) -> String {
    let mut out = String::new();
    for block in doc.blocks() {
        match block {
            Block::Text(leaf) => write_leaf(&mut out, leaf),
            Block::List(list) => {
                let tag = match list.kind {
                    ListKind::Ordered => "ol",
                    ListKind::Unordered => "ul",
                };
                out.push_str(&format!("<{tag}>"));
                for item in &list.items {
                    write_leaf(&mut out, item);
                }
                out.push_str(&format!("</{tag}>"));
            }
        }
    }
    out
}

fn leaf_tag(kind: TextKind) -> &'static str {
    match kind {
        TextKind::Paragraph => "p",
        TextKind::Heading(level) => match level.number() {
            1 => "h1",
            2 => "h2",
            _ => "h3",
        },
        TextKind::BlockQuote => "blockquote",
        TextKind::CodeBlock => "pre",
        TextKind::ListItem => "li",
    }
}

fn write_leaf(out: &mut String, leaf: &TextBlock) {
    let tag = leaf_tag(leaf.kind);
    match leaf.align {
        Align::Left => out.push_str(&format!("<{tag}>")),
        align => out.push_str(&format!(
            "<{tag} style=\"text-align:{}\">",
            align.as_str()
        )),
    }
    for run in &leaf.runs {
        write_run(out, run);
    }
    out.push_str(&format!("</{tag}>"));
}

fn write_run(out: &mut String, run: &Run) {
    let style = &run.style;
    let mut closers: Vec<&'static str> = Vec::new();

    if let Some(link) = &style.link {
        out.push_str(&format!(
            "<a href=\"{}\">",
            encode_double_quoted_attribute(&link.href)
        ));
        closers.push("</a>");
    }

    let mut css = Vec::new();
    if style.font_size != FontSize::DEFAULT {
        css.push(format!("font-size:{}px", style.font_size.px()));
    }
    if style.text_color != Rgb::BLACK {
        css.push(format!("color:{}", style.text_color));
    }
    if let Highlight::Color(color) = style.highlight {
        css.push(format!("background-color:{color}"));
    }
    if !css.is_empty() {
        out.push_str(&format!("<span style=\"{}\">", css.join(";")));
        closers.push("</span>");
    }

    for (on, open, close) in [
        (style.bold, "<b>", "</b>"),
        (style.italic, "<i>", "</i>"),
        (style.underline, "<u>", "</u>"),
    ] {
        if on {
            out.push_str(open);
            closers.push(close);
        }
    }

    out.push_str(&encode_text(&run.text));
    for close in closers.iter().rev() {
        out.push_str(close);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::document::{BlockId, HeadingLevel, ListBlock};
    use crate::editing::style::{Link, RunStyle};
    use insta::assert_snapshot;

    fn doc(blocks: Vec<Block>) -> Document {
        Document::from_blocks(blocks)
    }

    #[test]
    fn empty_document() {
        assert_snapshot!(serialize(&Document::new()), @"<p></p>");
    }

    #[test]
    fn blocks_and_alignment() {
        let title = TextBlock::new(TextKind::Heading(HeadingLevel::H1))
            .with_align(Align::Center)
            .with_runs([Run::plain("Title")]);
        let one = TextBlock::new(TextKind::ListItem).with_runs([Run::plain("one")]);
        let two = TextBlock::new(TextKind::ListItem)
            .with_align(Align::Right)
            .with_runs([Run::plain("two")]);
        let code = TextBlock::new(TextKind::CodeBlock).with_runs([Run::plain("a < b")]);
        let d = doc(vec![
            Block::Text(title),
            Block::List(ListBlock {
                id: BlockId::new(),
                kind: ListKind::Ordered,
                items: vec![one, two],
            }),
            Block::Text(code),
        ]);
        assert_snapshot!(
            serialize(&d),
            @r#"<h1 style="text-align:center">Title</h1><ol><li>one</li><li style="text-align:right">two</li></ol><pre>a &lt; b</pre>"#
        );
    }

    #[test]
    fn run_wrapping_order() {
        let style = RunStyle {
            bold: true,
            italic: true,
            underline: true,
            font_size: FontSize::new(18).unwrap(),
            text_color: Rgb::new(255, 0, 0),
            highlight: Highlight::Color(Rgb::new(255, 245, 157)),
            link: Some(Link {
                href: "https://x.y/?a=1&b=\"2\"".into(),
            }),
        };
        let runs = [Run::new("all", style), Run::plain(" & more")];
        let d = doc(vec![Block::Text(TextBlock::paragraph().with_runs(runs))]);
        assert_snapshot!(
            serialize(&d),
            @r#"<p><a href="https://x.y/?a=1&amp;b=&quot;2&quot;"><span style="font-size:18px;color:#ff0000;background-color:#fff59d"><b><i><u>all</u></i></b></span></a> &amp; more</p>"#
        );
    }

    #[test]
    fn serialize_is_stable() {
        let block = TextBlock::paragraph().with_runs([Run::plain("same")]);
        let d = doc(vec![Block::Text(block)]);
        assert_eq!(serialize(&d), serialize(&d.clone()));
    }
}
