use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use hexhub_config::EditorConfig;
use hexhub_engine::{Align, BlockType, Cmd, HeadingLevel, Highlight, ListKind, Rgb, RunStyle};

/// What a key press in the editor panel asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Apply(Cmd),
    Move {
        forward: bool,
        by_block: bool,
        extend: bool,
    },
    LinkPrompt,
    LeaveEditor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorPrefs {
    pub font_size_step: u16,
    pub highlight: Rgb,
}

impl Default for EditorPrefs {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl EditorPrefs {
    pub fn from_config(config: &EditorConfig) -> Self {
        let highlight = config.highlight_color.parse().unwrap_or_else(|e| {
            log::warn!("ignoring highlight_color {:?}: {e}", config.highlight_color);
            Rgb::new(0xff, 0xf5, 0x9d)
        });
        Self {
            font_size_step: config.font_size_step,
            highlight,
        }
    }
}

/// Maps a key press to an editor action. `active` is the style at the
/// selection, used by keys that step or flip a value.
///
/// Legacy terminals send Ctrl+I as Tab and Ctrl+H as Backspace, so italic
/// and highlight are also bound to Alt+I and Alt+H.
pub fn editor_action(key: &KeyEvent, prefs: &EditorPrefs, active: &RunStyle) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let extend = key.modifiers.contains(KeyModifiers::SHIFT);
    let movement = |forward, by_block| {
        Some(Action::Move {
            forward,
            by_block,
            extend,
        })
    };

    let cmd = match key.code {
        KeyCode::Esc => return Some(Action::LeaveEditor),
        KeyCode::Up | KeyCode::Down if ctrl => {
            let step = i32::from(prefs.font_size_step);
            let delta = if key.code == KeyCode::Up { step } else { -step };
            Cmd::SetFontSize(active.font_size.step(delta))
        }
        KeyCode::Left => return movement(false, false),
        KeyCode::Right => return movement(true, false),
        KeyCode::Up => return movement(false, true),
        KeyCode::Down => return movement(true, true),
        KeyCode::Backspace => Cmd::DeleteBackward,
        KeyCode::Enter => Cmd::InsertText("\n".to_string()),
        KeyCode::Char(c) if ctrl => match c.to_ascii_lowercase() {
            'b' => Cmd::ToggleBold,
            'i' => Cmd::ToggleItalic,
            'u' => Cmd::ToggleUnderline,
            'l' => Cmd::SetAlign(Align::Left),
            'e' => Cmd::SetAlign(Align::Center),
            'r' => Cmd::SetAlign(Align::Right),
            'o' => Cmd::ToggleList(ListKind::Ordered),
            'p' => Cmd::ToggleList(ListKind::Unordered),
            'h' => toggle_highlight(prefs, active),
            'k' => return Some(Action::LinkPrompt),
            _ => return None,
        },
        KeyCode::Char(c) if alt => match c.to_ascii_lowercase() {
            'i' => Cmd::ToggleItalic,
            'h' => toggle_highlight(prefs, active),
            '0' => Cmd::SetHeading(BlockType::Paragraph),
            '1' => Cmd::SetHeading(BlockType::Heading(HeadingLevel::H1)),
            '2' => Cmd::SetHeading(BlockType::Heading(HeadingLevel::H2)),
            '3' => Cmd::SetHeading(BlockType::Heading(HeadingLevel::H3)),
            _ => return None,
        },
        KeyCode::Char(c) => Cmd::InsertText(c.to_string()),
        _ => return None,
    };
    Some(Action::Apply(cmd))
}

fn toggle_highlight(prefs: &EditorPrefs, active: &RunStyle) -> Cmd {
    let on = Highlight::Color(prefs.highlight);
    Cmd::SetHighlightColor(if active.highlight == on {
        Highlight::Transparent
    } else {
        on
    })
}
