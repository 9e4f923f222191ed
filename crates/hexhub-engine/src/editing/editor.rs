use crate::editing::commands::{Cmd, CommandError, execute};
use crate::editing::document::Document;
use crate::editing::patch::Patch;
use crate::editing::selection::Selection;
use crate::editing::snapshot::{Snapshot, create_snapshot};
use crate::editing::style::RunStyle;
use crate::parsing::markup;

/// Callback receiving the serialized content after every change.
///
/// Listeners are owned by the editor and hold no reference back into it, so
/// they cannot mutate the editor while they run.
pub type ChangeListener = Box<dyn FnMut(&str) + Send>;

/// Outcome of [`NoteEditor::set_content`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The editor was idle and is now live.
    Loaded,
    /// The content matched the live document and was discarded.
    Unchanged,
    /// The content differed; the live document was replaced.
    Replaced,
}

#[derive(Debug)]
struct LiveDocument {
    document: Document,
    selection: Selection,
    /// Serialized form of `document`, kept in step with every mutation
    markup: String,
    instance: u64,
    version: u64,
}

#[derive(Debug)]
enum EditorState {
    Idle,
    Live(LiveDocument),
}

/// The editor behind one mounted note.
///
/// A host passes serialized content in with [`set_content`](Self::set_content)
/// and drives edits with [`apply`](Self::apply). Content that equals what the
/// editor already holds is ignored, so a host echoing back the markup it just
/// received never moves the caret.
pub struct NoteEditor {
    state: EditorState,
    listener: Option<ChangeListener>,
    instances: u64,
}

impl Default for NoteEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NoteEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteEditor")
            .field("state", &self.state)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl NoteEditor {
    pub fn new() -> Self {
        Self {
            state: EditorState::Idle,
            listener: None,
            instances: 0,
        }
    }

    pub fn with_listener(listener: ChangeListener) -> Self {
        Self {
            listener: Some(listener),
            ..Self::new()
        }
    }

    pub fn set_listener(&mut self, listener: Option<ChangeListener>) {
        self.listener = listener;
    }

    /// Reconciles host-supplied content with the live document.
    pub fn set_content(&mut self, content: &str) -> Reconciliation {
        let outcome = match &self.state {
            EditorState::Idle => Reconciliation::Loaded,
            EditorState::Live(live) if live.markup == content => {
                log::debug!("content unchanged, keeping instance {}", live.instance);
                return Reconciliation::Unchanged;
            }
            EditorState::Live(_) => Reconciliation::Replaced,
        };

        let document = markup::parse(content);
        let selection = Selection::caret(document.start_position());
        let markup = markup::serialize(&document);
        let version = match &self.state {
            EditorState::Live(live) => live.version + 1,
            EditorState::Idle => 0,
        };
        self.instances += 1;
        log::debug!(
            "{outcome:?}: instance {} with {} blocks",
            self.instances,
            document.leaf_count()
        );
        self.state = EditorState::Live(LiveDocument {
            document,
            selection,
            markup,
            instance: self.instances,
            version,
        });
        outcome
    }

    /// Discards the live document.
    pub fn unmount(&mut self) {
        if let EditorState::Live(live) = &self.state {
            log::debug!("unmounting instance {}", live.instance);
        }
        self.state = EditorState::Idle;
    }

    pub fn is_live(&self) -> bool {
        matches!(self.state, EditorState::Live(_))
    }

    fn live(&self) -> Option<&LiveDocument> {
        match &self.state {
            EditorState::Live(live) => Some(live),
            EditorState::Idle => None,
        }
    }

    pub fn document(&self) -> Option<&Document> {
        self.live().map(|live| &live.document)
    }

    pub fn selection(&self) -> Option<Selection> {
        self.live().map(|live| live.selection)
    }

    /// Changes whenever the live document is replaced wholesale.
    pub fn instance(&self) -> Option<u64> {
        self.live().map(|live| live.instance)
    }

    pub fn version(&self) -> Option<u64> {
        self.live().map(|live| live.version)
    }

    /// Serialized form of the live document.
    pub fn content(&self) -> Option<&str> {
        self.live().map(|live| live.markup.as_str())
    }

    /// Moves the selection. Positions pointing at blocks that no longer exist
    /// are repaired to the document start.
    pub fn set_selection(&mut self, selection: Selection) {
        if let EditorState::Live(live) = &mut self.state {
            let anchor = live.document.resolve_position(&selection.anchor);
            let focus = live.document.resolve_position(&selection.focus);
            live.selection = Selection::range(
                live.document.position_of_point(anchor),
                live.document.position_of_point(focus),
            );
        }
    }

    pub fn select_all(&mut self) {
        if let EditorState::Live(live) = &mut self.state {
            live.selection = live.document.select_all();
        }
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.live()
            .map(|live| create_snapshot(&live.document, live.version))
    }

    /// Style that text typed at the current selection would take.
    pub fn active_style(&self) -> Option<RunStyle> {
        self.live()
            .map(|live| live.document.active_style(&live.selection))
    }

    /// Applies a command to the live document.
    ///
    /// Returns `Ok(None)` when the editor is idle. The listener is called
    /// only when the serialized content changed, after the selection and
    /// version are final.
    pub fn apply(&mut self, cmd: &Cmd) -> Result<Option<Patch>, CommandError> {
        let Self {
            state, listener, ..
        } = self;
        let EditorState::Live(live) = state else {
            log::trace!("ignoring {cmd:?} on idle editor");
            return Ok(None);
        };

        live.selection = execute(&mut live.document, &live.selection, cmd)?;
        let markup = markup::serialize(&live.document);
        let changed = markup != live.markup;
        if changed {
            live.version += 1;
            live.markup = markup;
        }

        let patch = Patch {
            changed,
            new_selection: live.selection,
            markup: live.markup.clone(),
            version: live.version,
        };

        if changed && let Some(listener) = listener.as_mut() {
            listener(&live.markup);
        }
        Ok(Some(patch))
    }
}
