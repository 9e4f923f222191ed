use std::ops::Range;

use crate::editing::document::{
    BlockId, Document, HeadingLevel, Leaf, ListKind, ListSlot, TextKind, inherited_style,
};
use crate::editing::selection::{Mark, Point, Selection};
use crate::editing::style::{Align, FontSize, Highlight, Link, Rgb, RunStyle, StyleFlag};

/// Target kind for [`Cmd::SetHeading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Paragraph,
    Heading(HeadingLevel),
    BlockQuote,
    CodeBlock,
}

impl BlockType {
    fn text_kind(self) -> TextKind {
        match self {
            BlockType::Paragraph => TextKind::Paragraph,
            BlockType::Heading(level) => TextKind::Heading(level),
            BlockType::BlockQuote => TextKind::BlockQuote,
            BlockType::CodeBlock => TextKind::CodeBlock,
        }
    }
}

/// Edit commands accepted by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    ToggleBold,
    ToggleItalic,
    ToggleUnderline,
    SetFontSize(FontSize),
    SetTextColor(Rgb),
    SetHighlightColor(Highlight),
    SetAlign(Align),
    ToggleList(ListKind),
    SetHeading(BlockType),
    InsertLink {
        href: String,
        display_text: Option<String>,
    },
    InsertText(String),
    DeleteSelection,
    DeleteBackward,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Document {
    /// Applies `cmd` at `selection` and returns the selection after the edit.
    ///
    /// The document is normalized before this returns. On error it is left
    /// untouched.
    pub fn apply(&mut self, selection: &Selection, cmd: &Cmd) -> Result<Selection, CommandError> {
        execute(self, selection, cmd)
    }
}

/// What the selection becomes once a command has run.
enum After {
    /// Anchor and focus stay on the same characters.
    Keep,
    Caret(Mark),
}

/// Ordered endpoints of the selection a command acts on.
#[derive(Debug, Clone, Copy)]
struct Span {
    start: Point,
    end: Point,
}

impl Span {
    fn is_caret(&self) -> bool {
        self.start == self.end
    }

    /// Block-local `[start, end)` of leaf `index`, `None` when nothing in it
    /// is selected.
    fn local(&self, index: usize, len: usize) -> Option<(usize, usize)> {
        if index < self.start.leaf || index > self.end.leaf {
            return None;
        }
        let from = if index == self.start.leaf {
            self.start.offset
        } else {
            0
        };
        let to = if index == self.end.leaf {
            self.end.offset
        } else {
            len
        };
        (from < to).then_some((from, to.min(len)))
    }

    /// Leaf indices a block-scoped command applies to.
    fn touched(&self) -> Range<usize> {
        let last = if self.end.leaf > self.start.leaf && self.end.offset == 0 {
            self.end.leaf - 1
        } else {
            self.end.leaf
        };
        self.start.leaf..last + 1
    }
}

/// Runs one command against `doc`.
pub fn execute(
    doc: &mut Document,
    selection: &Selection,
    cmd: &Cmd,
) -> Result<Selection, CommandError> {
    log::trace!("execute {cmd:?}");

    let anchor = doc.resolve_position(&selection.anchor);
    let focus = doc.resolve_position(&selection.focus);
    let span = if anchor <= focus {
        Span {
            start: anchor,
            end: focus,
        }
    } else {
        Span {
            start: focus,
            end: anchor,
        }
    };
    let anchor_mark = doc.mark(anchor);
    let focus_mark = doc.mark(focus);

    let after = match cmd {
        Cmd::ToggleBold => toggle(doc, span, StyleFlag::Bold),
        Cmd::ToggleItalic => toggle(doc, span, StyleFlag::Italic),
        Cmd::ToggleUnderline => toggle(doc, span, StyleFlag::Underline),
        Cmd::SetFontSize(size) => restyle(doc, span, |style| style.font_size = *size),
        Cmd::SetTextColor(color) => restyle(doc, span, |style| style.text_color = *color),
        Cmd::SetHighlightColor(color) => restyle(doc, span, |style| style.highlight = *color),
        Cmd::SetAlign(align) => set_align(doc, span, *align),
        Cmd::ToggleList(kind) => toggle_list(doc, span, *kind),
        Cmd::SetHeading(block_type) => set_block_type(doc, span, *block_type),
        Cmd::InsertLink { href, display_text } => {
            let href = href.trim();
            if href.is_empty() {
                return Err(CommandError::InvalidArgument(
                    "link href must not be empty".to_string(),
                ));
            }
            insert_link(doc, span, href, display_text.as_deref())
        }
        Cmd::InsertText(text) => insert_text(doc, span, text),
        Cmd::DeleteSelection if span.is_caret() => After::Keep,
        Cmd::DeleteSelection => delete_selection(doc, span),
        Cmd::DeleteBackward => delete_backward(doc, span),
    };

    doc.normalize();

    Ok(match after {
        After::Keep => Selection::range(doc.restore(anchor_mark), doc.restore(focus_mark)),
        After::Caret(mark) => Selection::caret(doc.restore(mark)),
    })
}

fn toggle(doc: &mut Document, span: Span, flag: StyleFlag) -> After {
    // Turn-on wins: one intersected run without the flag sets it everywhere
    let turn_on = doc.leaves().enumerate().any(|(index, block)| {
        let Some((from, to)) = span.local(index, block.char_len()) else {
            return false;
        };
        block
            .runs_overlapping(from, to)
            .into_iter()
            .any(|run| !block.runs[run].style.has(flag))
    });
    restyle(doc, span, |style| style.set(flag, turn_on))
}

/// Applies `f` to the style of every selected character.
fn restyle(doc: &mut Document, span: Span, mut f: impl FnMut(&mut RunStyle)) -> After {
    if span.is_caret() {
        return After::Keep;
    }
    doc.edit_leaves(|leaves| {
        for (index, leaf) in leaves.iter_mut().enumerate() {
            let Some((from, to)) = span.local(index, leaf.block.char_len()) else {
                continue;
            };
            let first = leaf.block.split_at(from);
            let last = leaf.block.split_at(to);
            for run in &mut leaf.block.runs[first..last] {
                f(&mut run.style);
            }
        }
    });
    After::Keep
}

fn touched_leaves(leaves: &mut [Leaf], span: Span) -> impl Iterator<Item = &mut Leaf> {
    let range = span.touched();
    leaves.iter_mut().skip(range.start).take(range.len())
}

fn set_align(doc: &mut Document, span: Span, align: Align) -> After {
    doc.edit_leaves(|leaves| {
        for leaf in touched_leaves(leaves, span) {
            leaf.block.align = align;
        }
    });
    After::Keep
}

fn toggle_list(doc: &mut Document, span: Span, kind: ListKind) -> After {
    let in_list = |leaf: &Leaf| leaf.list.is_some_and(|slot| slot.kind == kind);
    doc.edit_leaves(|leaves| {
        let range = span.touched();
        let all_in = leaves[range].iter().all(in_list);
        let slot = ListSlot {
            kind,
            container: BlockId::new(),
        };
        for leaf in touched_leaves(leaves, span) {
            if all_in {
                leaf.list = None;
                leaf.block.kind = TextKind::Paragraph;
            } else if !in_list(&*leaf) {
                leaf.list = Some(slot);
                leaf.block.kind = TextKind::ListItem;
            }
        }
    });
    After::Keep
}

fn set_block_type(doc: &mut Document, span: Span, block_type: BlockType) -> After {
    doc.edit_leaves(|leaves| {
        for leaf in touched_leaves(leaves, span) {
            leaf.list = None;
            leaf.block.kind = block_type.text_kind();
        }
    });
    After::Keep
}

fn insert_link(
    doc: &mut Document,
    span: Span,
    href: &str,
    display_text: Option<&str>,
) -> After {
    let link = Link {
        href: href.to_string(),
    };
    if !span.is_caret() {
        return restyle(doc, span, |style| style.link = Some(link.clone()));
    }
    let text = display_text.filter(|text| !text.is_empty()).unwrap_or(href);
    doc.edit_leaves(|leaves| {
        let block = &mut leaves[span.start.leaf].block;
        let mut style = inherited_style(block, span.start.offset);
        style.link = Some(link);
        block.insert_run(span.start.offset, text, style);
        After::Caret(Mark {
            block: block.id,
            offset: span.start.offset + text.chars().count(),
            hint: span.start.leaf,
        })
    })
}

fn insert_text(doc: &mut Document, span: Span, text: &str) -> After {
    doc.edit_leaves(|leaves| {
        remove_span(leaves, span);
        let block = &mut leaves[span.start.leaf].block;
        let style = inherited_style(block, span.start.offset);
        block.insert_run(span.start.offset, text, style);
        After::Caret(Mark {
            block: block.id,
            offset: span.start.offset + text.chars().count(),
            hint: span.start.leaf,
        })
    })
}

fn delete_selection(doc: &mut Document, span: Span) -> After {
    doc.edit_leaves(|leaves| {
        remove_span(leaves, span);
        After::Caret(mark_in(leaves, span.start))
    })
}

fn delete_backward(doc: &mut Document, span: Span) -> After {
    if !span.is_caret() {
        return delete_selection(doc, span);
    }
    let Point { leaf, offset } = span.start;
    doc.edit_leaves(|leaves| {
        if offset > 0 {
            leaves[leaf].block.remove_chars(offset - 1, offset);
            let before = Point {
                leaf,
                offset: offset - 1,
            };
            return After::Caret(mark_in(leaves, before));
        }
        if leaf == 0 {
            return After::Caret(mark_in(leaves, span.start));
        }
        // Block start: pull this block's runs into the previous one
        let moved = std::mem::take(&mut leaves[leaf].block.runs);
        let previous = &mut leaves[leaf - 1].block;
        let joint = previous.char_len();
        previous.runs.extend(moved);
        let mark = Mark {
            block: previous.id,
            offset: joint,
            hint: leaf - 1,
        };
        leaves.remove(leaf);
        After::Caret(mark)
    })
}

/// Removes the selected characters. Bordering blocks merge into the first.
fn remove_span(leaves: &mut Vec<Leaf>, span: Span) {
    let Span { start, end } = span;
    if span.is_caret() {
        return;
    }
    if start.leaf == end.leaf {
        let block = &mut leaves[start.leaf].block;
        block.remove_chars(start.offset, end.offset);
        return;
    }
    let tail = leaves[end.leaf].block.split_off_runs(end.offset);
    let first = &mut leaves[start.leaf].block;
    first.split_off_runs(start.offset);
    first.runs.extend(tail);
    leaves.drain(start.leaf + 1..=end.leaf);
}

fn mark_in(leaves: &[Leaf], point: Point) -> Mark {
    Mark {
        block: leaves
            .get(point.leaf)
            .map_or_else(BlockId::new, |leaf| leaf.block.id),
        offset: point.offset,
        hint: point.leaf,
    }
}
