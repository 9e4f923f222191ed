use serde::Serialize;
use uuid::Uuid;

use crate::editing::selection::{Mark, Point, Position, Selection};
use crate::editing::style::{Align, Run, RunStyle, byte_index};

/// Stable identifier of a block, referenced by selection positions.
///
/// Ids are never part of structural equality: a parsed copy of a document
/// compares equal to the original even though every id differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BlockId(pub Uuid);

impl BlockId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for BlockId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Levels below 1 become `H1`, levels above 3 become `H3`.
    pub fn clamped(level: u8) -> Self {
        match level {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Ordered,
    Unordered,
}

/// Kind of a run-bearing (leaf) block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TextKind {
    Paragraph,
    Heading(HeadingLevel),
    BlockQuote,
    CodeBlock,
    /// Only valid inside a [`ListBlock`].
    ListItem,
}

/// A leaf block: an alignment plus an ordered sequence of runs.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub id: BlockId,
    pub kind: TextKind,
    pub align: Align,
    pub runs: Vec<Run>,
}

impl PartialEq for TextBlock {
    fn eq(&self, other: &Self) -> bool {
        // Ids are identity, not structure
        self.kind == other.kind && self.align == other.align && self.runs == other.runs
    }
}

impl TextBlock {
    pub fn new(kind: TextKind) -> Self {
        Self {
            id: BlockId::new(),
            kind,
            align: Align::Left,
            runs: Vec::new(),
        }
    }

    pub fn paragraph() -> Self {
        Self::new(TextKind::Paragraph)
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_runs(mut self, runs: impl IntoIterator<Item = Run>) -> Self {
        self.runs = runs.into_iter().collect();
        self
    }

    pub fn char_len(&self) -> usize {
        self.runs.iter().map(Run::char_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.is_empty())
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Appends text, extending the last run when the style matches.
    pub fn push_text(&mut self, text: &str, style: &RunStyle) {
        if text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.style == *style => last.text.push_str(text),
            _ => self.runs.push(Run::new(text, style.clone())),
        }
    }

    /// Ensures a run boundary at character `offset` and returns the index of
    /// the first run starting there (`runs.len()` when `offset` is the end).
    pub(crate) fn split_at(&mut self, offset: usize) -> usize {
        let mut start = 0;
        for i in 0..self.runs.len() {
            if offset == start {
                return i;
            }
            let len = self.runs[i].char_len();
            if offset < start + len {
                let tail = self.runs[i].split_off(offset - start);
                self.runs.insert(i + 1, tail);
                return i + 1;
            }
            start += len;
        }
        self.runs.len()
    }

    /// Removes characters in `[start, end)`.
    pub(crate) fn remove_chars(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let from = self.split_at(start);
        let to = self.split_at(end);
        self.runs.drain(from..to);
    }

    /// Detaches every run from character `offset` onwards.
    pub(crate) fn split_off_runs(&mut self, offset: usize) -> Vec<Run> {
        let at = self.split_at(offset);
        self.runs.split_off(at)
    }

    /// Indices of runs overlapping `[start, end)`, without splitting.
    pub(crate) fn runs_overlapping(&self, start: usize, end: usize) -> Vec<usize> {
        let mut cursor = 0;
        let mut hits = Vec::new();
        for (i, run) in self.runs.iter().enumerate() {
            let len = run.char_len();
            if cursor < end && cursor + len > start && len > 0 {
                hits.push(i);
            }
            cursor += len;
        }
        hits
    }

    /// Style of the character at `offset`, if it exists.
    pub(crate) fn style_of_char(&self, offset: usize) -> Option<(&RunStyle, usize, usize)> {
        let mut start = 0;
        for run in &self.runs {
            let len = run.char_len();
            if offset < start + len {
                return Some((&run.style, start, start + len));
            }
            start += len;
        }
        None
    }

    /// Converts a `(run, offset)` pair into a block-local character offset.
    ///
    /// Out-of-range values are clamped to the end of the block.
    pub fn char_offset(&self, run: usize, offset: usize) -> usize {
        let before: usize = self.runs.iter().take(run).map(Run::char_len).sum();
        let within = self.runs.get(run).map_or(0, |r| offset.min(r.char_len()));
        (before + within).min(self.char_len())
    }

    /// Canonical `(run, offset)` for a block-local character offset.
    ///
    /// At a boundary between two runs the earlier run wins, so a caret after
    /// `"Hello"` in `[Hello][World]` is `(0, 5)` rather than `(1, 0)`.
    pub fn run_position(&self, char_offset: usize) -> (usize, usize) {
        let mut start = 0;
        for (i, run) in self.runs.iter().enumerate() {
            let len = run.char_len();
            if char_offset <= start + len {
                return (i, char_offset - start);
            }
            start += len;
        }
        match self.runs.len() {
            0 => (0, 0),
            n => (n - 1, self.runs[n - 1].char_len()),
        }
    }

    /// Inserts `text` at character `offset` as a run of `style`.
    pub(crate) fn insert_run(&mut self, offset: usize, text: &str, style: RunStyle) {
        if text.is_empty() {
            return;
        }
        let at = self.split_at(offset);
        self.runs.insert(at, Run::new(text, style));
    }

    pub(crate) fn slice_text(&self, start: usize, end: usize) -> String {
        let text = self.text();
        let from = byte_index(&text, start);
        let to = byte_index(&text, end);
        text[from..to.max(from)].to_string()
    }
}

/// An ordered or unordered list holding list-item leaves.
#[derive(Debug, Clone)]
pub struct ListBlock {
    pub id: BlockId,
    pub kind: ListKind,
    pub items: Vec<TextBlock>,
}

impl PartialEq for ListBlock {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.items == other.items
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(TextBlock),
    List(ListBlock),
}

/// A leaf together with the list it belongs to, the flat view commands edit.
#[derive(Debug, Clone)]
pub(crate) struct Leaf {
    pub list: Option<ListSlot>,
    pub block: TextBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListSlot {
    pub kind: ListKind,
    pub container: BlockId,
}

impl Leaf {
    pub fn top_level(block: TextBlock) -> Self {
        Self { list: None, block }
    }

    pub fn list_item(block: TextBlock, kind: ListKind, container: BlockId) -> Self {
        Self {
            list: Some(ListSlot { kind, container }),
            block,
        }
    }
}

/// A formatted note: an ordered tree of blocks.
///
/// Documents are kept normalized by every public constructor and command, so
/// an empty document always holds exactly one empty paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub(crate) blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document: a single empty paragraph.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::Text(TextBlock::paragraph())],
        }
    }

    /// Builds a document from arbitrary blocks and normalizes it.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut doc = Self { blocks };
        doc.normalize();
        doc
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn normalize(&mut self) {
        crate::editing::normalize::normalize_in_place(self)
    }

    /// Every leaf block in document order, list items included.
    pub fn leaves(&self) -> impl Iterator<Item = &TextBlock> + '_ {
        self.blocks.iter().flat_map(|block| match block {
            Block::Text(text) => std::slice::from_ref(text).iter(),
            Block::List(list) => list.items.iter(),
        })
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    pub fn leaf(&self, id: BlockId) -> Option<&TextBlock> {
        self.leaves().find(|leaf| leaf.id == id)
    }

    pub(crate) fn leaf_at(&self, index: usize) -> Option<&TextBlock> {
        self.leaves().nth(index)
    }

    pub(crate) fn leaf_index(&self, id: BlockId) -> Option<usize> {
        self.leaves().position(|leaf| leaf.id == id)
    }

    /// Plain text with one line per leaf block.
    pub fn plain_text(&self) -> String {
        self.leaves()
            .map(TextBlock::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.leaves().all(TextBlock::is_empty)
    }

    pub(crate) fn into_leaves(self) -> Vec<Leaf> {
        let mut leaves = Vec::new();
        for block in self.blocks {
            match block {
                Block::Text(text) => leaves.push(Leaf::top_level(text)),
                Block::List(list) => leaves.extend(
                    list.items
                        .into_iter()
                        .map(|item| Leaf::list_item(item, list.kind, list.id)),
                ),
            }
        }
        leaves
    }

    /// Rebuilds the tree, grouping consecutive list items of one kind into a
    /// single container. Does not normalize.
    pub(crate) fn from_leaves(leaves: Vec<Leaf>) -> Self {
        let mut blocks: Vec<Block> = Vec::new();
        let mut used_containers: Vec<BlockId> = Vec::new();

        for Leaf { list, mut block } in leaves {
            match list {
                None => {
                    if block.kind == TextKind::ListItem {
                        block.kind = TextKind::Paragraph;
                    }
                    blocks.push(Block::Text(block));
                }
                Some(slot) => {
                    block.kind = TextKind::ListItem;
                    if let Some(Block::List(open)) = blocks.last_mut()
                        && open.kind == slot.kind
                    {
                        open.items.push(block);
                        continue;
                    }
                    let id = if used_containers.contains(&slot.container) {
                        BlockId::new()
                    } else {
                        slot.container
                    };
                    used_containers.push(id);
                    blocks.push(Block::List(ListBlock {
                        id,
                        kind: slot.kind,
                        items: vec![block],
                    }));
                }
            }
        }

        Self { blocks }
    }

    /// Runs `f` over the flat leaf view and rebuilds the tree afterwards.
    pub(crate) fn edit_leaves<R>(&mut self, f: impl FnOnce(&mut Vec<Leaf>) -> R) -> R {
        let mut leaves = std::mem::take(self).into_leaves();
        let result = f(&mut leaves);
        *self = Self::from_leaves(leaves);
        result
    }

    /// First position of the document.
    pub fn start_position(&self) -> Position {
        self.position_of_point(Point { leaf: 0, offset: 0 })
    }

    /// Last position of the document.
    pub fn end_position(&self) -> Position {
        let last = self.leaf_count().saturating_sub(1);
        let len = self.leaf_at(last).map_or(0, TextBlock::char_len);
        self.position_of_point(Point {
            leaf: last,
            offset: len,
        })
    }

    /// Canonical position for a block-local character offset.
    pub fn position_at(&self, block: BlockId, char_offset: usize) -> Option<Position> {
        let leaf = self.leaf(block)?;
        let (run, offset) = leaf.run_position(char_offset.min(leaf.char_len()));
        Some(Position { block, run, offset })
    }

    /// Block-local character offset of a position, `None` when stale.
    pub fn char_offset(&self, position: &Position) -> Option<usize> {
        self.leaf(position.block)
            .map(|leaf| leaf.char_offset(position.run, position.offset))
    }

    /// Selects `[start, end)` characters of one block.
    pub fn select(&self, block: BlockId, start: usize, end: usize) -> Option<Selection> {
        Some(Selection::range(
            self.position_at(block, start)?,
            self.position_at(block, end)?,
        ))
    }

    pub fn select_all(&self) -> Selection {
        Selection::range(self.start_position(), self.end_position())
    }

    /// The position one character before or after `position`, crossing block
    /// boundaries. Stays put at either end of the document.
    pub fn step(&self, position: &Position, forward: bool) -> Position {
        let point = self.point_of(position).unwrap_or_default();
        let len = self.leaf_at(point.leaf).map_or(0, TextBlock::char_len);
        let next = if forward {
            if point.offset < len {
                Point {
                    offset: point.offset + 1,
                    ..point
                }
            } else if point.leaf + 1 < self.leaf_count() {
                Point {
                    leaf: point.leaf + 1,
                    offset: 0,
                }
            } else {
                point
            }
        } else if point.offset > 0 {
            Point {
                offset: point.offset - 1,
                ..point
            }
        } else if point.leaf > 0 {
            let prev_len = self.leaf_at(point.leaf - 1).map_or(0, TextBlock::char_len);
            Point {
                leaf: point.leaf - 1,
                offset: prev_len,
            }
        } else {
            point
        };
        self.position_of_point(next)
    }

    /// The same block-local offset in the previous or next block, clamped.
    pub fn step_block(&self, position: &Position, forward: bool) -> Position {
        let point = self.point_of(position).unwrap_or_default();
        let target = if forward {
            (point.leaf + 1).min(self.leaf_count().saturating_sub(1))
        } else {
            point.leaf.saturating_sub(1)
        };
        let len = self.leaf_at(target).map_or(0, TextBlock::char_len);
        self.position_of_point(Point {
            leaf: target,
            offset: point.offset.min(len),
        })
    }

    pub(crate) fn point_of(&self, position: &Position) -> Option<Point> {
        let leaf = self.leaf_index(position.block)?;
        let block = self.leaf_at(leaf)?;
        Some(Point {
            leaf,
            offset: block.char_offset(position.run, position.offset),
        })
    }

    pub(crate) fn position_of_point(&self, point: Point) -> Position {
        match self.leaf_at(point.leaf) {
            Some(block) => {
                let (run, offset) = block.run_position(point.offset.min(block.char_len()));
                Position {
                    block: block.id,
                    run,
                    offset,
                }
            }
            // Unreachable for normalized documents, which always hold a leaf
            None => Position {
                block: BlockId::new(),
                run: 0,
                offset: 0,
            },
        }
    }

    /// Text covered by a selection, blocks joined by newlines.
    pub fn selected_text(&self, selection: &Selection) -> String {
        let (start, end) = self.resolve(selection);
        let mut parts = Vec::new();
        for (index, block) in self.leaves().enumerate() {
            if index < start.leaf || index > end.leaf {
                continue;
            }
            let from = if index == start.leaf { start.offset } else { 0 };
            let to = if index == end.leaf {
                end.offset
            } else {
                block.char_len()
            };
            parts.push(block.slice_text(from, to));
        }
        parts.join("\n")
    }

    /// Ordered `(start, end)` points of a selection. Stale positions degrade
    /// to the document start.
    pub(crate) fn resolve(&self, selection: &Selection) -> (Point, Point) {
        let anchor = self.resolve_position(&selection.anchor);
        let focus = self.resolve_position(&selection.focus);
        if anchor <= focus {
            (anchor, focus)
        } else {
            (focus, anchor)
        }
    }

    pub(crate) fn resolve_position(&self, position: &Position) -> Point {
        self.point_of(position).unwrap_or_else(|| {
            log::debug!(
                "stale position in block {:?}, using document start",
                position.block
            );
            Point::default()
        })
    }

    pub(crate) fn mark(&self, point: Point) -> Mark {
        Mark {
            block: self
                .leaf_at(point.leaf)
                .map_or_else(BlockId::new, |leaf| leaf.id),
            offset: point.offset,
            hint: point.leaf,
        }
    }

    /// Position of a mark taken before an edit. When its block is gone the
    /// caret lands at the end of the leaf that preceded it.
    pub(crate) fn restore(&self, mark: Mark) -> Position {
        let point = match self.leaf_index(mark.block) {
            Some(leaf) => Point {
                leaf,
                offset: mark.offset,
            },
            None if mark.hint == 0 => Point::default(),
            None => {
                let leaf = (mark.hint - 1).min(self.leaf_count().saturating_sub(1));
                Point {
                    leaf,
                    offset: self.leaf_at(leaf).map_or(0, TextBlock::char_len),
                }
            }
        };
        self.position_of_point(point)
    }

    /// The style text typed at the selection would take: the caret's
    /// inherited style, or the style of the first selected character.
    ///
    /// Hosts use this for toolbar state (current font size, color, toggles).
    pub fn active_style(&self, selection: &Selection) -> RunStyle {
        let (start, end) = self.resolve(selection);
        if start != end
            && let Some(block) = self.leaf_at(start.leaf)
            && let Some((style, _, _)) = block.style_of_char(start.offset)
        {
            return style.clone();
        }
        self.leaf_at(start.leaf)
            .map(|block| inherited_style(block, start.offset))
            .unwrap_or_default()
    }
}

/// Style for text inserted at `offset` in `block`.
///
/// The character before the caret donates its style; at the start of a block
/// the first character does. Links only extend when the caret is strictly
/// inside the linked run.
pub(crate) fn inherited_style(block: &TextBlock, offset: usize) -> RunStyle {
    let donor = if offset > 0 {
        block.style_of_char(offset - 1)
    } else {
        block.style_of_char(0)
    };
    match donor {
        Some((style, start, end)) => {
            let mut style = style.clone();
            let inside = offset > start && offset < end;
            if !inside {
                style.link = None;
            }
            style
        }
        None => RunStyle::default(),
    }
}
