//! Textual command names, for hosts that talk to the editor in strings.
//!
//! A command line is a name followed by an optional value:
//! `setFontSize 18`, `setAlign center`, `insertLink https://x.y Docs`.
//! Names are matched case-insensitively. For `insertText` everything after
//! the first space is taken verbatim, so leading spaces are kept.

use crate::editing::commands::{BlockType, Cmd};
use crate::editing::document::{HeadingLevel, ListKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0:?}")]
    UnknownCommand(String),
    #[error("{command} expects a value")]
    MissingValue { command: String },
    #[error("invalid value {value:?} for {command}: {reason}")]
    InvalidValue {
        command: String,
        value: String,
        reason: String,
    },
}

pub fn parse_command(line: &str) -> Result<Cmd, CommandParseError> {
    let line = line.trim_start();
    if line.trim().is_empty() {
        return Err(CommandParseError::Empty);
    }
    let (name, raw) = line.split_once(' ').unwrap_or((line, ""));
    let name = name.trim_end();
    let value = raw.trim();

    let invalid = |reason: String| CommandParseError::InvalidValue {
        command: name.to_string(),
        value: value.to_string(),
        reason,
    };
    let required = || {
        if value.is_empty() {
            Err(CommandParseError::MissingValue {
                command: name.to_string(),
            })
        } else {
            Ok(value)
        }
    };

    let cmd = match name.to_ascii_lowercase().as_str() {
        "togglebold" => Cmd::ToggleBold,
        "toggleitalic" => Cmd::ToggleItalic,
        "toggleunderline" => Cmd::ToggleUnderline,
        "deleteselection" => Cmd::DeleteSelection,
        "deletebackward" => Cmd::DeleteBackward,
        "setfontsize" => Cmd::SetFontSize(
            required()?
                .parse()
                .map_err(|e: crate::ValueError| invalid(e.to_string()))?,
        ),
        "settextcolor" => Cmd::SetTextColor(
            required()?
                .parse()
                .map_err(|e: crate::ValueError| invalid(e.to_string()))?,
        ),
        "sethighlightcolor" => Cmd::SetHighlightColor(
            required()?
                .parse()
                .map_err(|e: crate::ValueError| invalid(e.to_string()))?,
        ),
        "setalign" => Cmd::SetAlign(
            required()?
                .parse()
                .map_err(|e: crate::ValueError| invalid(e.to_string()))?,
        ),
        "togglelist" => Cmd::ToggleList(match required()?.to_ascii_lowercase().as_str() {
            "ordered" | "ol" | "numbered" => ListKind::Ordered,
            "unordered" | "ul" | "bullet" => ListKind::Unordered,
            _ => return Err(invalid("expected ordered or unordered".to_string())),
        }),
        "setheading" => Cmd::SetHeading(parse_block_type(required()?).ok_or_else(|| {
            invalid("expected 1, 2, 3, paragraph, quote or code".to_string())
        })?),
        // An empty href is rejected by the engine, not here
        "insertlink" => {
            let (href, display) = value.split_once(' ').unwrap_or((value, ""));
            let display = display.trim();
            Cmd::InsertLink {
                href: href.to_string(),
                display_text: (!display.is_empty()).then(|| display.to_string()),
            }
        }
        "inserttext" => {
            if raw.is_empty() {
                return Err(CommandParseError::MissingValue {
                    command: name.to_string(),
                });
            }
            Cmd::InsertText(raw.to_string())
        }
        _ => return Err(CommandParseError::UnknownCommand(name.to_string())),
    };
    Ok(cmd)
}

fn parse_block_type(value: &str) -> Option<BlockType> {
    let block_type = match value.to_ascii_lowercase().as_str() {
        "0" | "p" | "paragraph" | "normal" => BlockType::Paragraph,
        "1" | "h1" => BlockType::Heading(HeadingLevel::H1),
        "2" | "h2" => BlockType::Heading(HeadingLevel::H2),
        "3" | "h3" => BlockType::Heading(HeadingLevel::H3),
        "quote" | "blockquote" => BlockType::BlockQuote,
        "code" | "pre" => BlockType::CodeBlock,
        _ => return None,
    };
    Some(block_type)
}
