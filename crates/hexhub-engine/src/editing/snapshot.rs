use serde::Serialize;

use crate::editing::document::{Block, BlockId, Document, ListKind, TextBlock, TextKind};
use crate::editing::style::{Align, RunStyle};

/// Immutable, render-ready view of a [`Document`].
///
/// Hosts render from snapshots and never touch the document tree directly.
/// List items carry their list kind and 1-based ordinal so a host does not
/// need to track list containers itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Editor version the snapshot was taken at, 0 for a bare document
    pub version: u64,
    pub blocks: Vec<RenderBlock>,
}

/// One leaf block prepared for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderBlock {
    pub id: BlockId,
    pub kind: RenderKind,
    pub align: Align,
    pub segments: Vec<Segment>,
}

impl RenderBlock {
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderKind {
    Paragraph,
    Heading { level: u8 },
    BlockQuote,
    CodeBlock,
    ListItem { list: ListKind, ordinal: usize },
}

/// A styled stretch of text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub text: String,
    pub style: RunStyle,
}

impl Document {
    pub fn snapshot(&self) -> Snapshot {
        create_snapshot(self, 0)
    }
}

pub(crate) fn create_snapshot(doc: &Document, version: u64) -> Snapshot {
    let mut blocks = Vec::new();
    for block in doc.blocks() {
        match block {
            Block::Text(text) => blocks.push(render_block(text, leaf_kind(text.kind))),
            Block::List(list) => {
                for (index, item) in list.items.iter().enumerate() {
                    let kind = RenderKind::ListItem {
                        list: list.kind,
                        ordinal: index + 1,
                    };
                    blocks.push(render_block(item, kind));
                }
            }
        }
    }
    Snapshot { version, blocks }
}

fn leaf_kind(kind: TextKind) -> RenderKind {
    match kind {
        TextKind::Paragraph => RenderKind::Paragraph,
        TextKind::Heading(level) => RenderKind::Heading {
            level: level.number(),
        },
        TextKind::BlockQuote => RenderKind::BlockQuote,
        TextKind::CodeBlock => RenderKind::CodeBlock,
        // A list item outside a list is not reachable from a normalized document
        TextKind::ListItem => RenderKind::Paragraph,
    }
}

fn render_block(block: &TextBlock, kind: RenderKind) -> RenderBlock {
    RenderBlock {
        id: block.id,
        kind,
        align: block.align,
        segments: block
            .runs
            .iter()
            .map(|run| Segment {
                text: run.text.clone(),
                style: run.style.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::document::{HeadingLevel, ListBlock};
    use crate::editing::style::Run;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_snapshot_empty_document() {
        let snapshot = Document::new().snapshot();
        assert_eq!(snapshot.version, 0);
        assert_eq!(snapshot.blocks.len(), 1);
        assert_eq!(snapshot.blocks[0].kind, RenderKind::Paragraph);
        assert!(snapshot.blocks[0].segments.is_empty());
    }

    #[test]
    fn test_snapshot_numbers_list_items_per_list() {
        let item = |text: &str| TextBlock::new(TextKind::ListItem).with_runs([Run::plain(text)]);
        let title = TextBlock::new(TextKind::Heading(HeadingLevel::H2))
            .with_align(Align::Center)
            .with_runs([Run::plain("Title")]);
        let doc = Document::from_blocks(vec![
            Block::Text(title),
            Block::List(ListBlock {
                id: BlockId::new(),
                kind: ListKind::Ordered,
                items: vec![item("one"), item("two")],
            }),
        ]);

        let snapshot = doc.snapshot();
        let kinds: Vec<RenderKind> = snapshot.blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RenderKind::Heading { level: 2 },
                RenderKind::ListItem {
                    list: ListKind::Ordered,
                    ordinal: 1,
                },
                RenderKind::ListItem {
                    list: ListKind::Ordered,
                    ordinal: 2,
                },
            ]
        );
        assert_eq!(snapshot.blocks[0].align, Align::Center);
        assert_eq!(snapshot.blocks[2].text(), "two");
    }

    #[test]
    fn test_snapshot_ids_match_document_leaves() {
        let block = TextBlock::paragraph().with_runs([Run::plain("x")]);
        let doc = Document::from_blocks(vec![Block::Text(block)]);
        let snapshot = doc.snapshot();
        let ids: Vec<BlockId> = doc.leaves().map(|leaf| leaf.id).collect();
        let rendered: Vec<BlockId> = snapshot.blocks.iter().map(|b| b.id).collect();
        assert_eq!(rendered, ids);
    }
}
