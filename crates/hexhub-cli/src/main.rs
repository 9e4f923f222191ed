mod keymap;
mod render;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use hexhub_config::Config;
use hexhub_engine::{
    ChangeListener, Cmd, NoteEditor, NoteIndex, Selection, io, markup, parse_command,
};
use keymap::{Action, EditorPrefs};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use relative_path::RelativePathBuf;
use render::SelectionSpan;
use std::{
    env,
    fs::{self, OpenOptions},
    io::{Stdout, stdout},
    path::PathBuf,
    process,
    sync::{Arc, Mutex},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Notes,
    Editor,
}

struct App {
    notes_path: PathBuf,
    index: NoteIndex,
    list_state: ListState,
    focus: Focus,
    editor: NoteEditor,
    open_note: Option<RelativePathBuf>,
    prefs: EditorPrefs,
    /// Href and optional display text being typed for Ctrl+K
    link_prompt: Option<String>,
    status: String,
    /// Last save failure reported by the change listener
    save_error: Arc<Mutex<Option<String>>>,
}

impl App {
    fn new(notes_path: PathBuf, prefs: EditorPrefs) -> Result<Self> {
        let index = io::build_note_index(&notes_path)?;

        let mut app = Self {
            notes_path,
            index,
            list_state: ListState::default(),
            focus: Focus::Notes,
            editor: NoteEditor::new(),
            open_note: None,
            prefs,
            link_prompt: None,
            status: String::new(),
            save_error: Arc::new(Mutex::new(None)),
        };

        if !app.index.is_empty() {
            app.list_state.select(Some(0));
            app.open_selected_note();
        }

        Ok(app)
    }

    fn next_note(&mut self) {
        if self.index.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % self.index.len(),
            None => 0,
        };
        self.list_state.select(Some(i));
        self.open_selected_note();
    }

    fn previous_note(&mut self) {
        if self.index.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.index.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
        self.open_selected_note();
    }

    fn open_selected_note(&mut self) {
        let Some(entry) = self
            .list_state
            .selected()
            .and_then(|i| self.index.nth(i))
            .cloned()
        else {
            return;
        };

        match io::load_document(&entry.relative_path, &self.notes_path) {
            Ok(document) => {
                let target = io::markup_path(&entry.relative_path);
                self.editor.set_listener(Some(self.save_listener(target)));
                let outcome = self.editor.set_content(&markup::serialize(&document));
                log::info!("opened {} ({outcome:?})", entry.relative_path);
                self.status = format!("Opened {}", entry.display_name);
                self.open_note = Some(entry.relative_path);
            }
            Err(io::IoError::NotFound(path)) => {
                log::warn!("note vanished: {}", path.display());
                self.index.remove_note(&entry.relative_path);
                self.clamp_selection();
                self.editor.set_listener(None);
                self.editor.unmount();
                self.open_note = None;
                self.status = format!("{} no longer exists", entry.display_name);
            }
            Err(e) => {
                log::error!("failed to open {}: {e}", entry.relative_path);
                self.editor.set_listener(None);
                self.editor.unmount();
                self.open_note = None;
                self.status = format!("Error reading note: {e}");
            }
        }
    }

    /// Rescans the notes folder, keeping the open note selected.
    fn refresh_notes(&mut self) {
        if let Err(e) = io::refresh_note_index(&mut self.index, &self.notes_path) {
            log::error!("failed to rescan {}: {e}", self.notes_path.display());
            self.status = format!("Error scanning notes: {e}");
            return;
        }
        let open = self
            .open_note
            .as_deref()
            .and_then(|path| self.index.position(path));
        match open {
            Some(i) => self.list_state.select(Some(i)),
            None => self.clamp_selection(),
        }
        self.status = format!("{} notes", self.index.len());
    }

    fn clamp_selection(&mut self) {
        let selected = match (self.index.len(), self.list_state.selected()) {
            (0, _) => None,
            (len, Some(i)) => Some(i.min(len - 1)),
            (_, None) => Some(0),
        };
        self.list_state.select(selected);
    }

    /// Listener writing every change back to `target` under the notes root.
    fn save_listener(&self, target: RelativePathBuf) -> ChangeListener {
        let notes_path = self.notes_path.clone();
        let save_error = Arc::clone(&self.save_error);
        Box::new(move |content: &str| {
            let result = io::write_note(&target, &notes_path, content);
            let mut slot = match save_error.lock() {
                Ok(slot) => slot,
                Err(poisoned) => poisoned.into_inner(),
            };
            match result {
                Ok(()) => {
                    log::debug!("saved {target}");
                    *slot = None;
                }
                Err(e) => {
                    log::error!("failed to save {target}: {e}");
                    *slot = Some(format!("Failed to save {target}: {e}"));
                }
            }
        })
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Notes if self.editor.is_live() => Focus::Editor,
            _ => Focus::Notes,
        };
        self.link_prompt = None;
    }

    /// Returns false when the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if matches!(key.code, KeyCode::Tab | KeyCode::BackTab) && self.link_prompt.is_none() {
            self.toggle_focus();
            return true;
        }
        match self.focus {
            Focus::Notes => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return false,
                KeyCode::Down | KeyCode::Char('j') => self.next_note(),
                KeyCode::Up | KeyCode::Char('k') => self.previous_note(),
                KeyCode::Char('r') => self.refresh_notes(),
                KeyCode::Enter | KeyCode::Right => self.toggle_focus(),
                _ => {}
            },
            Focus::Editor => self.handle_editor_key(key),
        }
        true
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        if let Some(prompt) = self.link_prompt.as_mut() {
            match key.code {
                KeyCode::Enter => {
                    let line = std::mem::take(prompt);
                    self.link_prompt = None;
                    self.submit_link(&line);
                }
                KeyCode::Esc => self.link_prompt = None,
                KeyCode::Backspace => {
                    prompt.pop();
                }
                KeyCode::Char(c) => prompt.push(c),
                _ => {}
            }
            return;
        }

        let active = self.editor.active_style().unwrap_or_default();
        match keymap::editor_action(&key, &self.prefs, &active) {
            Some(Action::Apply(cmd)) => self.apply(&cmd),
            Some(Action::Move {
                forward,
                by_block,
                extend,
            }) => self.move_caret(forward, by_block, extend),
            Some(Action::LinkPrompt) => self.link_prompt = Some(String::new()),
            Some(Action::LeaveEditor) => self.focus = Focus::Notes,
            None => {}
        }
    }

    fn apply(&mut self, cmd: &Cmd) {
        log::trace!("key command {cmd:?}");
        match self.editor.apply(cmd) {
            Ok(Some(patch)) if patch.changed => {
                self.status = format!("Saved (version {})", patch.version);
            }
            Ok(_) => {}
            Err(e) => self.status = e.to_string(),
        }
        let save_error = match self.save_error.lock() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        if let Some(message) = save_error {
            self.status = message;
        }
    }

    fn submit_link(&mut self, line: &str) {
        match parse_command(&format!("insertLink {line}")) {
            Ok(cmd) => self.apply(&cmd),
            Err(e) => self.status = e.to_string(),
        }
    }

    fn move_caret(&mut self, forward: bool, by_block: bool, extend: bool) {
        let (Some(doc), Some(selection)) = (self.editor.document(), self.editor.selection()) else {
            return;
        };
        let focus = if by_block {
            doc.step_block(&selection.focus, forward)
        } else {
            doc.step(&selection.focus, forward)
        };
        let next = if extend {
            Selection::range(selection.anchor, focus)
        } else {
            Selection::caret(focus)
        };
        self.editor.set_selection(next);
    }
}

const EDITOR_HELP: &str = "Tab/Esc: Notes | ^B/^U, Alt+I: Style | ^L/^E/^R: Align | \
    ^O/^P: List | Alt+0-3: Heading | ^↑/^↓: Size | Alt+H: Highlight | ^K: Link";

fn init_logging(level: &str) {
    let log_path = Config::log_path();
    if let Some(dir) = log_path.parent()
        && let Err(e) = fs::create_dir_all(dir)
    {
        eprintln!("Warning: cannot create {}: {e}", dir.display());
        return;
    }
    match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!("Warning: cannot open log file {}: {e}", log_path.display()),
    }
}

fn main() -> Result<()> {
    // Determine notes path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) if args.len() == 1 => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Usage: {} <notes-folder-path>", args[0]);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Warning: ignoring config file: {e}");
            None
        }
    };

    let (notes_path, from_config) = match (args.len(), &config) {
        (2, _) => (PathBuf::from(&args[1]), false),
        (1, Some(config)) => (config.notes_path.clone(), true),
        (1, None) => {
            eprintln!("Error: No notes path provided and no config file found");
            eprintln!("Usage: {} <notes-folder-path>", args[0]);
            eprintln!("Or create a config file at {}", config_path.display());
            process::exit(1);
        }
        _ => {
            eprintln!("Usage: {} [notes-folder-path]", args[0]);
            process::exit(1);
        }
    };

    init_logging(config.as_ref().map_or("info", |c| c.log_level.as_str()));
    log::info!(
        "hexhub-notes starting with notes at {}",
        notes_path.display()
    );

    if let Err(e) = io::validate_notes_dir(&notes_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Notes path '{}'{} is invalid: {e}",
            notes_path.display(),
            source
        );
        process::exit(1);
    }

    let prefs = config
        .as_ref()
        .map(|c| EditorPrefs::from_config(&c.editor))
        .unwrap_or_default();
    let mut app = App::new(notes_path, prefs)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    // Lets Ctrl+I and Ctrl+H arrive as themselves instead of Tab and Backspace
    let enhanced_keys = matches!(supports_keyboard_enhancement(), Ok(true));
    if enhanced_keys {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }
    log::debug!("keyboard enhancement enabled: {enhanced_keys}");
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    if enhanced_keys {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("{err:?}");
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && !app.handle_key(key)
        {
            return Ok(());
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(f.area());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[0]);

    let focused = |focus: Focus| {
        if app.focus == focus {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        }
    };

    // Note list panel
    let note_items: Vec<ListItem> = app
        .index
        .notes()
        .map(|note| ListItem::new(note.display_name.clone()))
        .collect();

    let notes_list = List::new(note_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focused(Focus::Notes))
                .title("Notes"),
        )
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(notes_list, chunks[0], &mut app.list_state);

    // Editor panel
    let title = app
        .open_note
        .as_deref()
        .and_then(|path| app.index.get(path))
        .map_or("Editor", |note| note.display_name.as_str())
        .to_string();
    let (lines, caret_line) = match (app.editor.document(), app.editor.snapshot()) {
        (Some(doc), Some(snapshot)) => {
            let span = app
                .editor
                .selection()
                .filter(|_| app.focus == Focus::Editor)
                .and_then(|s| SelectionSpan::locate(doc, &snapshot, &s));
            render::document_lines(&snapshot, span.as_ref())
        }
        _ => (vec![Line::from("Select a note to edit it")], None),
    };
    let visible = chunks[1].height.saturating_sub(2);
    let scroll = caret_line
        .and_then(|line| u16::try_from(line).ok())
        .map_or(0, |line| line.saturating_sub(visible.saturating_sub(1)));

    let content = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focused(Focus::Editor))
                .title(title),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    f.render_widget(content, chunks[1]);

    // Status and key help at the bottom
    let footer = match &app.link_prompt {
        Some(prompt) => vec![
            Line::from(format!("Link (href [text]): {prompt}")),
            Line::from("Enter: Insert | Esc: Cancel"),
        ],
        None => vec![
            Line::from(app.status.clone()),
            Line::from(match app.focus {
                Focus::Notes => "Esc/q: Quit | ↑/↓: Select | r: Rescan | Enter/Tab: Edit",
                Focus::Editor => EDITOR_HELP,
            }),
        ],
    };
    f.render_widget(Paragraph::new(footer), rows[1]);
}
