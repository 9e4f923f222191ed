use relative_path::{RelativePath, RelativePathBuf};
use std::collections::BTreeMap;

/// A discovered note file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEntry {
    pub relative_path: RelativePathBuf,
    pub display_name: String,
}

/// In-memory index of discovered notes.
///
/// Uses BTreeMap for automatic sorted ordering by path.
#[derive(Debug, Default)]
pub struct NoteIndex {
    notes: BTreeMap<RelativePathBuf, NoteEntry>,
}

impl NoteIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single note, replacing any entry at the same path
    pub fn add_note(&mut self, relative_path: RelativePathBuf, display_name: String) {
        self.notes.insert(
            relative_path.clone(),
            NoteEntry {
                relative_path,
                display_name,
            },
        );
    }

    /// All notes, sorted by path
    pub fn notes(&self) -> impl Iterator<Item = &NoteEntry> {
        self.notes.values()
    }

    pub fn get(&self, relative_path: &RelativePath) -> Option<&NoteEntry> {
        self.notes.get(relative_path)
    }

    /// Note at `index` in path order
    pub fn nth(&self, index: usize) -> Option<&NoteEntry> {
        self.notes.values().nth(index)
    }

    pub fn position(&self, relative_path: &RelativePath) -> Option<usize> {
        self.notes
            .keys()
            .position(|path| path.as_relative_path() == relative_path)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Remove a single note. Returns the removed entry if it existed
    pub fn remove_note(&mut self, relative_path: &RelativePath) -> Option<NoteEntry> {
        self.notes.remove(relative_path)
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> RelativePathBuf {
        RelativePathBuf::from(s)
    }

    #[test]
    fn test_new_index_is_empty() {
        let index = NoteIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn test_notes_are_sorted_by_path() {
        let mut index = NoteIndex::new();
        index.add_note(path("zeta.html"), "zeta".into());
        index.add_note(path("alpha.html"), "alpha".into());
        index.add_note(path("mid/beta.md"), "beta".into());

        let names: Vec<&str> = index.notes().map(|n| n.display_name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "zeta"]);
        assert_eq!(index.nth(1).unwrap().display_name, "beta");
        assert_eq!(index.position(RelativePath::new("zeta.html")), Some(2));
    }

    #[test]
    fn test_add_same_path_replaces_entry() {
        let mut index = NoteIndex::new();
        index.add_note(path("a.html"), "old".into());
        index.add_note(path("a.html"), "new".into());
        assert_eq!(index.len(), 1);
        let entry = index.get(RelativePath::new("a.html")).unwrap();
        assert_eq!(entry.display_name, "new");
    }

    #[test]
    fn test_remove_and_clear() {
        let mut index = NoteIndex::new();
        index.add_note(path("a.html"), "a".into());
        index.add_note(path("b.html"), "b".into());

        let removed = index.remove_note(RelativePath::new("a.html"));
        assert_eq!(removed.map(|n| n.display_name), Some("a".to_string()));
        assert!(index.remove_note(RelativePath::new("a.html")).is_none());

        index.clear();
        assert!(index.is_empty());
    }
}
