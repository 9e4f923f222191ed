use crate::editing::document::{BlockId, Document, Leaf, ListKind, ListSlot, TextBlock, TextKind};
use crate::editing::style::{Align, RunStyle};

struct OpenLeaf {
    leaf: Leaf,
    /// Opened by bare text rather than a block tag
    implicit: bool,
    /// Style frames below this depth belong to enclosing elements
    frame_depth: usize,
    /// The leaf currently ends in a newline produced by a line break
    trailing_break: bool,
}

struct StyleFrame {
    tag: String,
    style: RunStyle,
}

/// Streams block and inline events into a normalized [`Document`].
///
/// Shared by the markup parser and the Markdown importer. Callers open and
/// close leaves, lists and quotes; text without an open leaf starts an
/// implicit one whose kind follows the enclosing context.
pub(crate) struct DocumentBuilder {
    leaves: Vec<Leaf>,
    current: Option<OpenLeaf>,
    lists: Vec<ListSlot>,
    quote_depth: usize,
    frames: Vec<StyleFrame>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self {
            leaves: vec![],
            current: None,
            lists: vec![],
            quote_depth: 0,
            frames: vec![],
        }
    }

    pub fn open_leaf(&mut self, kind: TextKind, align: Align) {
        self.open(kind, align, false);
    }

    fn open(&mut self, kind: TextKind, align: Align, implicit: bool) {
        self.finish_leaf();
        let block = TextBlock::new(kind).with_align(align);
        let leaf = if kind == TextKind::ListItem {
            let slot = self.lists.last().copied().unwrap_or_else(|| {
                log::debug!("list item outside a list, treating as unordered");
                ListSlot {
                    kind: ListKind::Unordered,
                    container: BlockId::new(),
                }
            });
            Leaf::list_item(block, slot.kind, slot.container)
        } else {
            Leaf::top_level(block)
        };
        self.current = Some(OpenLeaf {
            leaf,
            implicit,
            frame_depth: self.frames.len(),
            trailing_break: false,
        });
    }

    /// Kind an implicit leaf would take in the current context.
    fn implicit_kind(&self) -> TextKind {
        if !self.lists.is_empty() {
            TextKind::ListItem
        } else if self.quote_depth > 0 {
            TextKind::BlockQuote
        } else {
            TextKind::Paragraph
        }
    }

    pub fn finish_leaf(&mut self) {
        let Some(mut open) = self.current.take() else {
            return;
        };
        if open.trailing_break
            && let Some(last) = open.leaf.block.runs.last_mut()
        {
            last.text.pop();
        }
        self.frames.truncate(open.frame_depth);
        self.leaves.push(open.leaf);
    }

    pub fn current_kind(&self) -> Option<TextKind> {
        self.current.as_ref().map(|open| open.leaf.block.kind)
    }

    pub fn current_is_implicit(&self) -> bool {
        self.current.as_ref().is_some_and(|open| open.implicit)
    }

    pub fn current_is_empty(&self) -> bool {
        self.current
            .as_ref()
            .is_none_or(|open| open.leaf.block.is_empty())
    }

    pub fn has_open_leaf(&self) -> bool {
        self.current.is_some()
    }

    /// Appends text in the current style, opening an implicit leaf if needed.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.current.is_none() {
            let kind = self.implicit_kind();
            self.open(kind, Align::Left, true);
        }
        let style = self.style();
        if let Some(open) = self.current.as_mut() {
            open.leaf.block.push_text(text, &style);
            open.trailing_break = false;
        }
    }

    /// Appends a newline. A break that ends up last in its leaf is dropped.
    pub fn push_break(&mut self) {
        self.push_text("\n");
        if let Some(open) = self.current.as_mut() {
            open.trailing_break = true;
        }
    }

    pub fn open_list(&mut self, kind: ListKind) {
        self.finish_leaf();
        self.lists.push(ListSlot {
            kind,
            container: BlockId::new(),
        });
    }

    pub fn close_list(&mut self) {
        self.finish_leaf();
        if self.lists.pop().is_none() {
            log::debug!("closing a list that was never opened");
        }
    }

    pub fn enter_quote(&mut self) {
        self.quote_depth += 1;
    }

    pub fn leave_quote(&mut self) {
        self.finish_leaf();
        self.quote_depth = self.quote_depth.saturating_sub(1);
    }

    pub fn in_quote(&self) -> bool {
        self.quote_depth > 0
    }

    /// Style applied to text pushed now.
    pub fn style(&self) -> RunStyle {
        self.frames
            .last()
            .map(|frame| frame.style.clone())
            .unwrap_or_default()
    }

    /// Opens an inline element whose style derives from the enclosing one.
    pub fn push_style(&mut self, tag: &str, update: impl FnOnce(&mut RunStyle)) {
        let mut style = self.style();
        update(&mut style);
        self.frames.push(StyleFrame {
            tag: tag.to_string(),
            style,
        });
    }

    /// Closes the innermost open inline element named `tag` and everything
    /// opened inside it. Returns false when no such element is open.
    pub fn pop_style(&mut self, tag: &str) -> bool {
        match self.frames.iter().rposition(|frame| frame.tag == tag) {
            Some(index) => {
                self.frames.truncate(index);
                true
            }
            None => false,
        }
    }

    pub fn finish(mut self) -> Document {
        self.finish_leaf();
        let mut doc = Document::from_leaves(self.leaves);
        doc.normalize();
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::document::Block;
    use pretty_assertions::assert_eq;

    fn texts(doc: &Document) -> Vec<String> {
        doc.leaves().map(TextBlock::text).collect()
    }

    #[test]
    fn bare_text_opens_implicit_paragraph() {
        let mut b = DocumentBuilder::new();
        b.push_text("hello");
        assert!(b.current_is_implicit());
        let doc = b.finish();
        assert_eq!(texts(&doc), vec!["hello".to_string()]);
    }

    #[test]
    fn implicit_leaf_in_list_is_item() {
        let mut b = DocumentBuilder::new();
        b.open_list(ListKind::Ordered);
        b.push_text("one");
        b.close_list();
        let doc = b.finish();
        match doc.blocks() {
            [Block::List(list)] => assert_eq!(list.kind, ListKind::Ordered),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn trailing_break_is_dropped() {
        let mut b = DocumentBuilder::new();
        b.open_leaf(TextKind::Paragraph, Align::Left);
        b.push_text("a");
        b.push_break();
        b.push_text("b");
        b.push_break();
        let doc = b.finish();
        assert_eq!(texts(&doc), vec!["a\nb".to_string()]);
    }

    #[test]
    fn style_frames_nest_and_close_out_of_order() {
        let mut b = DocumentBuilder::new();
        b.open_leaf(TextKind::Paragraph, Align::Left);
        b.push_style("b", |s| s.bold = true);
        b.push_style("i", |s| s.italic = true);
        assert!(b.style().bold && b.style().italic);
        // Closing the outer element closes the inner one too
        assert!(b.pop_style("b"));
        assert!(b.style().is_default());
        assert!(!b.pop_style("i"));
    }

    #[test]
    fn frames_opened_in_leaf_end_with_it() {
        let mut b = DocumentBuilder::new();
        b.open_leaf(TextKind::Paragraph, Align::Left);
        b.push_style("b", |s| s.bold = true);
        b.finish_leaf();
        assert!(b.style().is_default());
    }
}
