use crate::{ChangeKind, Watchman};
use notify::EventKind;
use std::path::Path;

impl Watchman {
    /// Maps a raw notification kind to a change of the command file, if it is one.
    pub(crate) fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
        match kind {
            EventKind::Create(_) => Some(ChangeKind::Created),
            // Metadata-only updates (atime, permissions) say nothing about content
            EventKind::Modify(notify::event::ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(ChangeKind::Modified),
            _ => None,
        }
    }

    /// Check if a notification path is something other than the command file.
    /// The watch is non-recursive, so every path lives in the command file's directory.
    pub(crate) fn should_ignore(&self, path: &Path) -> bool {
        match (path.file_name(), self.command_file.file_name()) {
            (Some(name), Some(wanted)) => name != wanted,
            _ => true,
        }
    }
}
