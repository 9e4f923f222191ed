use crate::editing::selection::Selection;

/// Result of applying a command through the editor
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// False when the command left the serialized content as it was
    pub changed: bool,
    pub new_selection: Selection,
    pub markup: String,
    pub version: u64,
}
