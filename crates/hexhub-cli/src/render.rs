use hexhub_engine::{
    Align, Document, Highlight, ListKind, Position, RenderKind, Rgb, RunStyle, Selection, Snapshot,
};
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

const CARET: &str = "▏";

/// Selection in snapshot coordinates: (block index, char offset)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSpan {
    pub start: (usize, usize),
    pub end: (usize, usize),
    pub caret: (usize, usize),
}

impl SelectionSpan {
    pub fn locate(doc: &Document, snapshot: &Snapshot, selection: &Selection) -> Option<Self> {
        let point = |position: &Position| {
            let index = snapshot
                .blocks
                .iter()
                .position(|block| block.id == position.block)?;
            Some((index, doc.char_offset(position)?))
        };
        let anchor = point(&selection.anchor)?;
        let caret = point(&selection.focus)?;
        Some(Self {
            start: anchor.min(caret),
            end: anchor.max(caret),
            caret,
        })
    }

    fn contains(&self, at: (usize, usize)) -> bool {
        self.start <= at && at < self.end
    }
}

/// Lines for the editor panel, plus the line index holding the caret.
pub fn document_lines(
    snapshot: &Snapshot,
    selection: Option<&SelectionSpan>,
) -> (Vec<Line<'static>>, Option<usize>) {
    let mut lines = Vec::new();
    let mut caret_line = None;

    for (index, block) in snapshot.blocks.iter().enumerate() {
        let base = block_style(&block.kind);
        let (prefix, indent) = block_prefix(&block.kind);
        let alignment = alignment(block.align);
        let mut spans = vec![Span::styled(prefix, base)];
        let mut offset = 0;

        let mut caret_here = |spans: &mut Vec<Span<'static>>, offset: usize, line: usize| {
            if selection.is_some_and(|s| s.caret == (index, offset)) {
                spans.push(Span::styled(CARET, Style::default().fg(Color::Yellow)));
                caret_line = Some(line);
            }
        };

        for segment in &block.segments {
            let style = base.patch(run_style(&segment.style));
            for ch in segment.text.chars() {
                caret_here(&mut spans, offset, lines.len());
                if ch == '\n' {
                    let next = vec![Span::styled(indent.clone(), base)];
                    let line = std::mem::replace(&mut spans, next);
                    lines.push(Line::from(line).alignment(alignment));
                } else {
                    let selected = selection.is_some_and(|s| s.contains((index, offset)));
                    let style = if selected {
                        style.add_modifier(Modifier::REVERSED)
                    } else {
                        style
                    };
                    push_char(&mut spans, ch, style);
                }
                offset += 1;
            }
        }
        caret_here(&mut spans, offset, lines.len());
        lines.push(Line::from(spans).alignment(alignment));

        let continues_list = matches!(block.kind, RenderKind::ListItem { .. })
            && matches!(
                snapshot.blocks.get(index + 1).map(|next| &next.kind),
                Some(RenderKind::ListItem { .. })
            );
        if !continues_list {
            lines.push(Line::default());
        }
    }

    (lines, caret_line)
}

fn push_char(spans: &mut Vec<Span<'static>>, ch: char, style: Style) {
    match spans.last_mut() {
        Some(last) if last.style == style => last.content.to_mut().push(ch),
        _ => spans.push(Span::styled(ch.to_string(), style)),
    }
}

/// Prefix of the first line of a block and of its continuation lines.
fn block_prefix(kind: &RenderKind) -> (String, String) {
    match kind {
        RenderKind::Heading { level } => {
            let prefix = format!("{} ", "#".repeat(usize::from(*level)));
            let indent = " ".repeat(prefix.len());
            (prefix, indent)
        }
        RenderKind::BlockQuote => ("│ ".to_string(), "│ ".to_string()),
        RenderKind::ListItem { list, ordinal } => {
            let prefix = match list {
                ListKind::Ordered => format!("{ordinal}. "),
                ListKind::Unordered => "• ".to_string(),
            };
            let indent = " ".repeat(prefix.chars().count());
            (prefix, indent)
        }
        RenderKind::Paragraph | RenderKind::CodeBlock => (String::new(), String::new()),
    }
}

fn block_style(kind: &RenderKind) -> Style {
    match kind {
        RenderKind::Heading { .. } => Style::default().add_modifier(Modifier::BOLD),
        RenderKind::BlockQuote => Style::default().fg(Color::Gray),
        RenderKind::CodeBlock => Style::default().fg(Color::Green),
        RenderKind::Paragraph | RenderKind::ListItem { .. } => Style::default(),
    }
}

fn run_style(style: &RunStyle) -> Style {
    let mut out = Style::default();
    if style.bold {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.italic {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.underline || style.link.is_some() {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    if style.link.is_some() {
        out = out.fg(Color::Blue);
    } else if style.text_color != Rgb::BLACK {
        out = out.fg(color(style.text_color));
    }
    if let Highlight::Color(rgb) = style.highlight {
        out = out.bg(color(rgb));
    }
    out
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

fn alignment(align: Align) -> Alignment {
    match align {
        Align::Left => Alignment::Left,
        Align::Center => Alignment::Center,
        Align::Right => Alignment::Right,
    }
}
