use crate::editing::Document;
use crate::models::NoteIndex;
use crate::parsing::{markdown, markup};
use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of notes stored as editor markup
pub const MARKUP_EXTENSION: &str = "html";
/// Extension of notes imported from Markdown
pub const MARKDOWN_EXTENSION: &str = "md";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid notes directory: {0}")]
    InvalidNotesDir(String),
}

/// Read a note file and return its raw content
pub fn read_note(relative_path: &RelativePath, notes_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(notes_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write serialized markup to a note file
pub fn write_note(
    relative_path: &RelativePath,
    notes_root: &Path,
    markup: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(notes_root);

    // Create parent directories if they don't exist
    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, markup).map_err(IoError::Io)
}

/// Read a note and parse it, importing Markdown notes on the way
pub fn load_document(relative_path: &RelativePath, notes_root: &Path) -> Result<Document, IoError> {
    let content = read_note(relative_path, notes_root)?;
    let document = if is_markdown(relative_path) {
        markdown::import(&content)
    } else {
        markup::parse(&content)
    };
    Ok(document)
}

/// Path an edited note is saved to. Markdown notes are saved next to the
/// original as markup, since edits are not written back as Markdown.
pub fn markup_path(relative_path: &RelativePath) -> RelativePathBuf {
    if is_markdown(relative_path) {
        relative_path.with_extension(MARKUP_EXTENSION)
    } else {
        relative_path.to_relative_path_buf()
    }
}

fn is_markdown(relative_path: &RelativePath) -> bool {
    relative_path.extension() == Some(MARKDOWN_EXTENSION)
}

/// Scan for note files in the notes directory
pub fn scan_notes(notes_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !notes_root.exists() {
        return Err(IoError::InvalidNotesDir(
            "notes directory not found".to_string(),
        ));
    }

    let mut files = Vec::new();
    scan_directory_recursive(notes_root, &mut files)?;
    files.sort();
    Ok(files)
}

/// Build a sorted index of the notes in the notes directory
pub fn build_note_index(notes_root: &Path) -> Result<NoteIndex, IoError> {
    let mut index = NoteIndex::new();
    refresh_note_index(&mut index, notes_root)?;
    Ok(index)
}

/// Rescan the notes directory into `index`, dropping notes that are gone.
///
/// On error the index is left as it was.
pub fn refresh_note_index(index: &mut NoteIndex, notes_root: &Path) -> Result<(), IoError> {
    let files = scan_notes(notes_root)?;
    index.clear();
    for file in files {
        let Ok(relative) = file.strip_prefix(notes_root) else {
            continue;
        };
        let Ok(relative) = RelativePathBuf::from_path(relative) else {
            log::debug!("skipping note with unrepresentable path {}", file.display());
            continue;
        };
        let display_name = relative
            .file_stem()
            .unwrap_or(relative.as_str())
            .to_string();
        index.add_note(relative, display_name);
    }
    Ok(())
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && (ext == MARKUP_EXTENSION || ext == MARKDOWN_EXTENSION)
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_notes_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidNotesDir(
            "Directory does not exist".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::TextBlock;
    use crate::tests::{create_test_file, create_test_notes_dir};

    #[test]
    fn test_scan_finds_markup_and_markdown_notes() {
        // Given a notes directory with both note formats
        let notes_dir = create_test_notes_dir();
        create_test_file(&notes_dir, "b.html", "<p>markup</p>");
        create_test_file(&notes_dir, "a.md", "# markdown");

        // When scanning for notes
        let files = scan_notes(notes_dir.path()).unwrap();

        // Then both are found, sorted
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.md", "b.html"]);
    }

    #[test]
    fn test_handle_invalid_notes_directory() {
        let nonexistent_path = PathBuf::from("/this/path/does/not/exist");

        let result = scan_notes(&nonexistent_path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("notes directory"));
    }

    #[test]
    fn test_scan_nested_directories_and_ignore_other_files() {
        let notes_dir = create_test_notes_dir();
        create_test_file(&notes_dir, "root.html", "<p>root</p>");
        create_test_file(&notes_dir, "todo.txt", "not a note");
        let sub_dir = notes_dir.path().join("projects");
        std::fs::create_dir(&sub_dir).unwrap();
        std::fs::write(sub_dir.join("nested.md"), "nested").unwrap();

        let files = scan_notes(notes_dir.path()).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.file_name().unwrap() == "nested.md"));
        assert!(!files.iter().any(|f| f.file_name().unwrap() == "todo.txt"));
    }

    #[test]
    fn test_write_creates_parent_dirs_and_reads_back() {
        let notes_dir = create_test_notes_dir();
        let path = RelativePath::new("deep/inside/note.html");

        write_note(path, notes_dir.path(), "<p>saved</p>").unwrap();

        assert_eq!(read_note(path, notes_dir.path()).unwrap(), "<p>saved</p>");
    }

    #[test]
    fn test_read_missing_note_is_not_found() {
        let notes_dir = create_test_notes_dir();
        let result = read_note(RelativePath::new("missing.html"), notes_dir.path());
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn test_load_document_picks_format_by_extension() {
        let notes_dir = create_test_notes_dir();
        create_test_file(&notes_dir, "a.md", "**bold**");
        create_test_file(&notes_dir, "b.html", "<p><b>bold</b></p>");

        let from_md = load_document(RelativePath::new("a.md"), notes_dir.path()).unwrap();
        let from_html = load_document(RelativePath::new("b.html"), notes_dir.path()).unwrap();

        assert_eq!(from_md, from_html);
        assert_eq!(
            from_md.leaves().map(TextBlock::text).collect::<Vec<_>>(),
            vec!["bold"]
        );
    }

    #[test]
    fn test_markdown_notes_save_as_markup() {
        let saved = markup_path(RelativePath::new("dir/a.md"));
        assert_eq!(saved.as_str(), "dir/a.html");
        assert_eq!(markup_path(RelativePath::new("b.html")).as_str(), "b.html");
    }

    #[test]
    fn test_build_note_index_uses_relative_paths() {
        let notes_dir = create_test_notes_dir();
        create_test_file(&notes_dir, "journal.html", "<p>x</p>");
        std::fs::create_dir(notes_dir.path().join("work")).unwrap();
        std::fs::write(notes_dir.path().join("work/plan.md"), "y").unwrap();

        let index = build_note_index(notes_dir.path()).unwrap();
        let entries: Vec<(&str, &str)> = index
            .notes()
            .map(|n| (n.relative_path.as_str(), n.display_name.as_str()))
            .collect();
        assert_eq!(
            entries,
            vec![("journal.html", "journal"), ("work/plan.md", "plan")]
        );
    }

    #[test]
    fn test_refresh_note_index_picks_up_changes() {
        let notes_dir = create_test_notes_dir();
        create_test_file(&notes_dir, "old.html", "<p>x</p>");
        let mut index = build_note_index(notes_dir.path()).unwrap();

        std::fs::remove_file(notes_dir.path().join("old.html")).unwrap();
        create_test_file(&notes_dir, "new.md", "# y");
        refresh_note_index(&mut index, notes_dir.path()).unwrap();

        assert!(index.get(RelativePath::new("old.html")).is_none());
        assert_eq!(index.position(RelativePath::new("new.md")), Some(0));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_failed_refresh_keeps_index() {
        let notes_dir = create_test_notes_dir();
        create_test_file(&notes_dir, "kept.html", "");
        let mut index = build_note_index(notes_dir.path()).unwrap();

        let missing = notes_dir.path().join("missing");
        assert!(refresh_note_index(&mut index, &missing).is_err());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_validate_notes_dir() {
        let notes_dir = create_test_notes_dir();
        assert!(validate_notes_dir(notes_dir.path()).is_ok());
        let file = create_test_file(&notes_dir, "file.html", "");
        assert!(matches!(
            validate_notes_dir(&file),
            Err(IoError::InvalidNotesDir(_))
        ));
    }
}
