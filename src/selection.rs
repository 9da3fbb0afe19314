//! Per-file change selections: file → hunk → line.
//!
//! A [`ChangeSelection`] is what the user builds up interactively before
//! committing: an ordered set of per-file selections, where each file is
//! either taken wholesale or narrowed to specific hunks and, within a hunk,
//! specific lines.
//!
//! # Examples
//!
//! ```
//! use selective_commit::{ChangeSelection, FileSelection, HunkSelection, HunkHeader};
//!
//! let mut selection = ChangeSelection::new();
//! selection.insert(FileSelection::Full {
//!     path: "README.md".to_string(),
//!     previous_path: None,
//! });
//! selection.insert(FileSelection::Partial {
//!     path: "src/main.rs".to_string(),
//!     previous_path: None,
//!     hunks: vec![HunkSelection::Full {
//!         header: HunkHeader::new(1, 5, 1, 6),
//!     }],
//! });
//! assert_eq!(selection.len(), 2);
//! ```

use crate::hunk::HunkHeader;
use std::collections::BTreeSet;

/// Identifies one changed line within a hunk.
///
/// Deleted lines are addressed by old-side numbering, added lines by
/// new-side numbering. Context lines are never selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SelectedLine {
    /// A deleted line, by old line number
    Old(u32),
    /// An added line, by new line number
    New(u32),
}

/// Selection state for one hunk of a file's diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HunkSelection {
    /// The entire hunk. Its coordinates already are the header to commit.
    Full { header: HunkHeader },
    /// A subset of the hunk's lines, requiring translation before it can be
    /// expressed to the backend.
    Partial {
        header: HunkHeader,
        lines: BTreeSet<SelectedLine>,
    },
}

impl HunkSelection {
    pub fn header(&self) -> HunkHeader {
        match self {
            HunkSelection::Full { header } | HunkSelection::Partial { header, .. } => *header,
        }
    }
}

/// Selection state for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSelection {
    /// The entire file, no hunk filtering.
    Full {
        path: String,
        /// Original path when the change is a rename
        previous_path: Option<String>,
    },
    /// An ordered subset of the file's hunks.
    Partial {
        path: String,
        previous_path: Option<String>,
        hunks: Vec<HunkSelection>,
    },
}

impl FileSelection {
    pub fn path(&self) -> &str {
        match self {
            FileSelection::Full { path, .. } | FileSelection::Partial { path, .. } => path,
        }
    }

    pub fn previous_path(&self) -> Option<&str> {
        match self {
            FileSelection::Full { previous_path, .. }
            | FileSelection::Partial { previous_path, .. } => previous_path.as_deref(),
        }
    }
}

/// Ordered mapping from file path to its selection.
///
/// A path appears at most once: inserting a selection for an already
/// selected path replaces the earlier entry in place, keeping its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSelection {
    files: Vec<FileSelection>,
}

impl ChangeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the selection for a file.
    pub fn insert(&mut self, selection: FileSelection) {
        match self.files.iter_mut().find(|f| f.path() == selection.path()) {
            Some(existing) => *existing = selection,
            None => self.files.push(selection),
        }
    }

    /// Drop the selection for `path`, returning it if present.
    pub fn remove(&mut self, path: &str) -> Option<FileSelection> {
        let index = self.files.iter().position(|f| f.path() == path)?;
        Some(self.files.remove(index))
    }

    pub fn get(&self, path: &str) -> Option<&FileSelection> {
        self.files.iter().find(|f| f.path() == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileSelection> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Drop every file selection at once (after a successful commit or an
    /// explicit cancel).
    pub fn clear(&mut self) {
        self.files.clear();
    }
}
