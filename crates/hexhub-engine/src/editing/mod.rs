/*!
 * # Editing Core
 *
 * The document model, the command engine and the editor that keeps a live
 * document in step with the content a host hands it.
 *
 * ## Architecture Overview
 *
 * ### 1. Structured Document
 * - A [`Document`] is an ordered tree of blocks. Leaf blocks (paragraphs,
 *   headings, quotes, code blocks, list items) hold **runs**: spans of text
 *   with one uniform [`RunStyle`]. Lists hold list items.
 * - Every block carries a random [`BlockId`] that selections refer to. Ids
 *   are identity only and never take part in equality.
 * - Documents are always **normalized**: no empty or mergeable runs, no
 *   empty blocks except one trailing paragraph, no adjacent lists of the
 *   same kind.
 *
 * ### 2. Explicit Selection
 * - A [`Selection`] is an anchor and a focus [`Position`]
 *   (block, run index, character offset). There is no ambient editing
 *   state; every command takes the document and the selection explicitly.
 * - Offsets count Unicode scalar values. A position in a block that no
 *   longer exists resolves to the start of the document.
 *
 * ### 3. Command-Based Editing
 * - All edits are [`Cmd`] values applied with [`Document::apply`] (or
 *   [`commands::execute`]). A command returns the selection after the
 *   edit: formatting keeps the range, insertion and deletion collapse it.
 * - Toggles turn an attribute on when any selected run lacks it.
 * - [`command_line::parse_command`] turns textual names such as
 *   `setFontSize 18` into commands for hosts that speak strings.
 *
 * ### 4. Reconciliation
 * - [`NoteEditor`] owns the live document. `set_content` compares incoming
 *   markup with the serialized live document and only replaces the
 *   document when they differ, so echoing content back never moves the
 *   caret.
 * - After each change the editor serializes, fixes the new selection and
 *   version, and only then calls the change listener.
 *
 * ### 5. Read API: Immutable Snapshots
 * - [`Snapshot`]s describe what to render (block kind, list ordinal,
 *   alignment, styled segments) without exposing the tree.
 *
 * ## Usage Pattern
 *
 * ```rust
 * use hexhub_engine::editing::*;
 *
 * let mut editor = NoteEditor::new();
 * editor.set_content("<p>Hello World</p>");
 *
 * let doc = editor.document().unwrap();
 * let first = doc.leaves().next().unwrap().id;
 * let selection = doc.select(first, 0, 5).unwrap();
 * editor.set_selection(selection);
 *
 * let patch = editor.apply(&Cmd::ToggleBold).unwrap().unwrap();
 * assert_eq!(patch.markup, "<p><b>Hello</b> World</p>");
 * ```
 */

pub mod command_line;
pub mod commands;
pub mod document;
pub mod editor;
pub mod normalize;
pub mod patch;
pub mod selection;
pub mod snapshot;
pub mod style;

// Public API re-exports
pub use command_line::{CommandParseError, parse_command};
pub use commands::{BlockType, Cmd, CommandError, execute};
pub use document::{
    Block, BlockId, Document, HeadingLevel, ListBlock, ListKind, TextBlock, TextKind,
};
pub use editor::{ChangeListener, NoteEditor, Reconciliation};
pub use normalize::normalize;
pub use patch::Patch;
pub use selection::{Position, Selection};
pub use snapshot::{RenderBlock, RenderKind, Segment, Snapshot};
pub use style::{Align, FontSize, Highlight, Link, Rgb, Run, RunStyle, StyleFlag, ValueError};
