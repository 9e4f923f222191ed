//! UniFFI bindings for hosting the notes editor in native apps
//!
//! A host holds one [`EditorHandle`] per mounted note, feeds it content and
//! textual commands, and renders from snapshots. Change notifications go to
//! a foreign [`ChangeListener`].

use hexhub_engine::{
    BlockId, Highlight, ListKind, NoteEditor, Patch, Reconciliation, RenderBlock, RenderKind,
    RunStyle, Selection, Snapshot, markdown, markup, parse_command,
};
use std::sync::{Arc, Mutex, MutexGuard};

uniffi::setup_scaffolding!();

// ============ Errors ============

/// Errors that can cross the FFI boundary
/// Note: Field is named `reason` not `message` to avoid conflict with Throwable.message in Kotlin
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FfiError {
    #[error("Invalid command: {reason}")]
    InvalidCommand { reason: String },
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },
}

// ============ Callbacks ============

/// Implemented by the host to persist content after every change.
#[uniffi::export(with_foreign)]
pub trait ChangeListener: Send + Sync {
    fn on_change(&self, markup: String);
}

// ============ Editor Handle ============

/// The editor behind one mounted note.
#[derive(uniffi::Object)]
pub struct EditorHandle {
    inner: Mutex<NoteEditor>,
    listener: Mutex<Option<Arc<dyn ChangeListener>>>,
    delivery: Mutex<Delivery>,
}

/// Orders change notifications across threads.
///
/// Every change gets a ticket while the editor lock is held, so tickets
/// follow edit order. One caller at a time delivers, always the newest
/// pending markup, and older tickets are dropped.
#[derive(Debug, Default)]
struct Delivery {
    issued: u64,
    latest: u64,
    pending: Option<String>,
    delivering: bool,
}

/// What `set_content` did with the incoming markup
#[derive(Debug, PartialEq, Eq, uniffi::Enum)]
pub enum ContentUpdate {
    Loaded,
    Unchanged,
    Replaced,
}

impl From<Reconciliation> for ContentUpdate {
    fn from(outcome: Reconciliation) -> Self {
        match outcome {
            Reconciliation::Loaded => Self::Loaded,
            Reconciliation::Unchanged => Self::Unchanged,
            Reconciliation::Replaced => Self::Replaced,
        }
    }
}

impl Default for EditorHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorHandle {
    fn editor(&self) -> MutexGuard<'_, NoteEditor> {
        // Recover from poisoned mutex (another thread panicked while holding lock)
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn delivery(&self) -> MutexGuard<'_, Delivery> {
        self.delivery.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Must be called while the editor lock is held.
    fn issue_ticket(&self) -> u64 {
        let mut delivery = self.delivery();
        delivery.issued += 1;
        delivery.issued
    }

    /// Queues `markup` and delivers it unless another caller is already
    /// delivering, in which case that caller picks it up. No lock is held
    /// while the listener runs.
    fn notify(&self, ticket: u64, markup: String) {
        let mut delivery = self.delivery();
        if ticket <= delivery.latest {
            log::debug!("dropping stale change notification {ticket}");
            return;
        }
        delivery.latest = ticket;
        delivery.pending = Some(markup);
        if delivery.delivering {
            return;
        }
        delivery.delivering = true;

        while let Some(markup) = delivery.pending.take() {
            drop(delivery);
            let listener = self
                .listener
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone();
            if let Some(listener) = listener {
                listener.on_change(markup);
            }
            delivery = self.delivery();
        }
        delivery.delivering = false;
    }
}

#[uniffi::export]
impl EditorHandle {
    #[uniffi::constructor]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(NoteEditor::new()),
            listener: Mutex::new(None),
            delivery: Mutex::new(Delivery::default()),
        }
    }

    pub fn set_listener(&self, listener: Option<Arc<dyn ChangeListener>>) {
        *self.listener.lock().unwrap_or_else(|e| e.into_inner()) = listener;
    }

    /// Hand the editor the note's serialized content. Content equal to what
    /// the editor already holds is ignored.
    pub fn set_content(&self, markup: String) -> ContentUpdate {
        self.editor().set_content(&markup).into()
    }

    /// Discard the live document when the note is closed.
    pub fn unmount(&self) {
        self.editor().unmount();
    }

    pub fn content(&self) -> Option<String> {
        self.editor().content().map(str::to_string)
    }

    /// Apply a textual command such as `toggleBold` or `setFontSize 18`.
    ///
    /// Returns `None` when no note is loaded. The listener runs after the
    /// editor lock is released, so it may call back into this handle.
    /// Concurrent callers see notifications in edit order; a notification
    /// overtaken by a newer one is skipped.
    pub fn apply_command(&self, command: String) -> Result<Option<PatchDto>, FfiError> {
        let cmd = parse_command(&command).map_err(|e| {
            log::debug!("rejected command from host: {e}");
            FfiError::InvalidCommand {
                reason: e.to_string(),
            }
        })?;

        let (patch, ticket) = {
            let mut editor = self.editor();
            let patch = editor.apply(&cmd).map_err(|e| FfiError::InvalidArgument {
                reason: e.to_string(),
            })?;
            let ticket = match &patch {
                Some(patch) if patch.changed => Some(self.issue_ticket()),
                _ => None,
            };
            (patch, ticket)
        };

        let Some(patch) = patch else {
            return Ok(None);
        };
        if let Some(ticket) = ticket {
            self.notify(ticket, patch.markup.clone());
        }
        Ok(Some(PatchDto::from_engine(patch)))
    }

    /// Select from `anchor` to `focus`, each a block id and a character
    /// offset within that block.
    pub fn select(&self, anchor: CaretDto, focus: CaretDto) -> Result<(), FfiError> {
        let mut editor = self.editor();
        let Some(doc) = editor.document() else {
            return Ok(());
        };
        let anchor = anchor.resolve(doc)?;
        let focus = focus.resolve(doc)?;
        editor.set_selection(Selection::range(anchor, focus));
        Ok(())
    }

    pub fn select_all(&self) {
        self.editor().select_all();
    }

    pub fn selection(&self) -> Option<SelectionDto> {
        let editor = self.editor();
        let doc = editor.document()?;
        let selection = editor.selection()?;
        Some(SelectionDto {
            anchor: CaretDto::from_position(doc, &selection.anchor)?,
            focus: CaretDto::from_position(doc, &selection.focus)?,
        })
    }

    /// Style at the selection, for toolbar state.
    pub fn active_style(&self) -> Option<RunStyleDto> {
        self.editor()
            .active_style()
            .map(|style| RunStyleDto::from_engine(&style))
    }

    pub fn snapshot(&self) -> Option<SnapshotDto> {
        self.editor().snapshot().map(SnapshotDto::from_engine)
    }
}

// ============ DTOs ============

/// A caret location: block id and character offset within the block.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct CaretDto {
    pub block_id: String,
    pub offset: u32,
}

impl CaretDto {
    fn resolve(&self, doc: &hexhub_engine::Document) -> Result<hexhub_engine::Position, FfiError> {
        let invalid = || FfiError::InvalidArgument {
            reason: format!("unknown block {:?}", self.block_id),
        };
        let block: BlockId = self.block_id.parse().map_err(|_| invalid())?;
        let offset = self.offset as usize;
        doc.position_at(block, offset).ok_or_else(invalid)
    }

    fn from_position(
        doc: &hexhub_engine::Document,
        position: &hexhub_engine::Position,
    ) -> Option<Self> {
        Some(Self {
            block_id: position.block.to_string(),
            offset: u32::try_from(doc.char_offset(position)?).ok()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct SelectionDto {
    pub anchor: CaretDto,
    pub focus: CaretDto,
}

/// Result of a command.
#[derive(Debug, uniffi::Record)]
pub struct PatchDto {
    /// False when the command had no effect
    pub changed: bool,
    pub version: u64,
    pub markup: String,
}

impl PatchDto {
    fn from_engine(patch: Patch) -> Self {
        Self {
            changed: patch.changed,
            version: patch.version,
            markup: patch.markup,
        }
    }
}

/// UI-ready snapshot of a document.
#[derive(Debug, uniffi::Record)]
pub struct SnapshotDto {
    /// Document version for change detection
    pub version: u64,
    /// Flat list of blocks for rendering
    pub blocks: Vec<RenderBlockDto>,
}

impl SnapshotDto {
    fn from_engine(snapshot: Snapshot) -> Self {
        Self {
            version: snapshot.version,
            blocks: snapshot
                .blocks
                .into_iter()
                .map(RenderBlockDto::from_engine)
                .collect(),
        }
    }
}

/// A single renderable block in the document.
#[derive(Debug, uniffi::Record)]
pub struct RenderBlockDto {
    /// Identifier used in carets
    pub id: String,
    /// Block type: "paragraph", "heading", "block_quote", "code_block" or "list_item"
    pub kind: String,
    /// Heading level (1-3) if this is a heading, 0 otherwise
    pub heading_level: u8,
    /// "ordered" or "unordered" for list items
    pub list_kind: Option<String>,
    /// 1-based position in its list, 0 outside lists
    pub ordinal: u32,
    /// "left", "center" or "right"
    pub align: String,
    pub segments: Vec<SegmentDto>,
}

impl RenderBlockDto {
    fn from_engine(block: RenderBlock) -> Self {
        let (kind, heading_level, list_kind, ordinal) = match block.kind {
            RenderKind::Paragraph => ("paragraph", 0, None, 0),
            RenderKind::Heading { level } => ("heading", level, None, 0),
            RenderKind::BlockQuote => ("block_quote", 0, None, 0),
            RenderKind::CodeBlock => ("code_block", 0, None, 0),
            RenderKind::ListItem { list, ordinal } => {
                let list = match list {
                    ListKind::Ordered => "ordered",
                    ListKind::Unordered => "unordered",
                };
                (
                    "list_item",
                    0,
                    Some(list.to_string()),
                    u32::try_from(ordinal).unwrap_or(u32::MAX),
                )
            }
        };

        Self {
            id: block.id.to_string(),
            kind: kind.to_string(),
            heading_level,
            list_kind,
            ordinal,
            align: block.align.as_str().to_string(),
            segments: block
                .segments
                .into_iter()
                .map(|segment| SegmentDto {
                    style: RunStyleDto::from_engine(&segment.style),
                    text: segment.text,
                })
                .collect(),
        }
    }
}

/// A stretch of text with one style.
#[derive(Debug, uniffi::Record)]
pub struct SegmentDto {
    pub text: String,
    pub style: RunStyleDto,
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct RunStyleDto {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub font_size_px: u16,
    /// `#rrggbb`
    pub text_color: String,
    /// `#rrggbb`, or `None` when transparent
    pub highlight: Option<String>,
    pub link: Option<String>,
}

impl RunStyleDto {
    fn from_engine(style: &RunStyle) -> Self {
        Self {
            bold: style.bold,
            italic: style.italic,
            underline: style.underline,
            font_size_px: style.font_size.px(),
            text_color: style.text_color.to_string(),
            highlight: match style.highlight {
                Highlight::Transparent => None,
                Highlight::Color(rgb) => Some(rgb.to_string()),
            },
            link: style.link.as_ref().map(|link| link.href.clone()),
        }
    }
}

// ============ Standalone Functions ============

/// Convert a Markdown note to editor markup.
#[uniffi::export]
pub fn import_markdown(markdown: String) -> String {
    markup::serialize(&markdown::import(&markdown))
}
