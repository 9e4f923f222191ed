use serde::Serialize;

use crate::editing::document::BlockId;

/// A location addressed by block, run index and character offset in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub block: BlockId,
    pub run: usize,
    pub offset: usize,
}

/// Anchor and focus positions. Equal positions form a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    pub fn caret(position: Position) -> Self {
        Self {
            anchor: position,
            focus: position,
        }
    }

    pub fn range(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    /// True when anchor and focus are the same position.
    ///
    /// Two different positions can still address the same point (`(0, 5)` and
    /// `(1, 0)` across a run boundary); commands resolve those through the
    /// document instead.
    pub fn is_caret(&self) -> bool {
        self.anchor == self.focus
    }
}

/// A document-wide point: leaf index plus block-local character offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Point {
    pub leaf: usize,
    pub offset: usize,
}

/// A point that survives edits by naming its block instead of an index.
///
/// `hint` is the leaf index at the time the mark was taken and is used when
/// the block itself no longer exists.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Mark {
    pub block: BlockId,
    pub offset: usize,
    pub hint: usize,
}
