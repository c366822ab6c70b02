//! Command grammar
//!
//! The whole content of the command file is one command:
//!
//! ```text
//! create a file <path>
//! delete a file <path>
//! rename a file <old path> TO <new path>
//! add to a file <path> content: <content>
//! ```

use std::fmt;
use std::path::PathBuf;

pub const CREATE_FILE: &str = "create a file";
pub const DELETE_FILE: &str = "delete a file";
pub const RENAME_FILE: &str = "rename a file";
pub const ADD_TO_FILE: &str = "add to a file";

pub const RENAME_SEPARATOR: &str = " TO ";
pub const CONTENT_SEPARATOR: &str = " content: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create { path: PathBuf },
    Delete { path: PathBuf },
    Rename { from: PathBuf, to: PathBuf },
    Append { path: PathBuf, content: String },
    /// Text that starts with none of the known prefixes
    Unrecognized(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("'{command}' is missing the '{}' separator", .separator.trim())]
    MissingSeparator {
        command: &'static str,
        separator: &'static str,
    },

    #[error("'{command}' needs a non-empty path")]
    EmptyPath { command: &'static str },
}

impl Command {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        // Editors usually end the file with a newline; paths never carry one
        let text = input.trim_end_matches(['\r', '\n']);

        // Append content is taken as written, trailing newline included
        if let Some(rest) = strip_keyword(input, ADD_TO_FILE) {
            let (path, content) = split_once(ADD_TO_FILE, rest, CONTENT_SEPARATOR)?;
            return Ok(Command::Append {
                path: required_path(ADD_TO_FILE, path)?,
                content: content.to_string(),
            });
        }

        if let Some(rest) = strip_keyword(text, CREATE_FILE) {
            return Ok(Command::Create {
                path: required_path(CREATE_FILE, rest)?,
            });
        }

        if let Some(rest) = strip_keyword(text, DELETE_FILE) {
            return Ok(Command::Delete {
                path: required_path(DELETE_FILE, rest)?,
            });
        }

        if let Some(rest) = strip_keyword(text, RENAME_FILE) {
            let (from, to) = split_once(RENAME_FILE, rest, RENAME_SEPARATOR)?;
            return Ok(Command::Rename {
                from: required_path(RENAME_FILE, from)?,
                to: required_path(RENAME_FILE, to)?,
            });
        }

        Ok(Command::Unrecognized(text.to_string()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Command::Create { .. } => "create",
            Command::Delete { .. } => "delete",
            Command::Rename { .. } => "rename",
            Command::Append { .. } => "append",
            Command::Unrecognized(_) => "unrecognized",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Create { path } => write!(f, "{} {}", CREATE_FILE, path.display()),
            Command::Delete { path } => write!(f, "{} {}", DELETE_FILE, path.display()),
            Command::Rename { from, to } => write!(
                f,
                "{} {}{}{}",
                RENAME_FILE,
                from.display(),
                RENAME_SEPARATOR,
                to.display()
            ),
            Command::Append { path, content } => write!(
                f,
                "{} {}{}{}",
                ADD_TO_FILE,
                path.display(),
                CONTENT_SEPARATOR,
                content
            ),
            Command::Unrecognized(text) => f.write_str(text),
        }
    }
}

/// Strips `keyword` and the single space after it. A bare keyword yields an empty rest.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    if rest.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix(' ')
}

fn split_once<'a>(
    command: &'static str,
    rest: &'a str,
    separator: &'static str,
) -> Result<(&'a str, &'a str), ParseError> {
    rest.split_once(separator)
        .ok_or(ParseError::MissingSeparator { command, separator })
}

fn required_path(command: &'static str, raw: &str) -> Result<PathBuf, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::EmptyPath { command });
    }
    Ok(PathBuf::from(raw))
}
