//! The version-control backend contract.
//!
//! This crate owns no file formats or wire protocols; it orchestrates the
//! calls below. Every method is a suspension point and all composition is
//! strictly sequential.

use crate::hunk::{DiffHunk, HunkHeader};
use async_trait::async_trait;
use error_set::error_set;
use std::fmt;

error_set! {
    /// Opaque failure from a backend call
    BackendError := {
        #[display("Backend call failed: {message}")]
        Failed { message: String },
    }
}

impl BackendError {
    pub fn failed(message: impl Into<String>) -> Self {
        BackendError::Failed {
            message: message.into(),
        }
    }
}

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_type!(
    /// Identifies the project (repository) all operations act on
    ProjectId
);
id_type!(
    /// Identifies a stack of dependent branches
    StackId
);
id_type!(
    /// Identifies a commit created by the backend
    CommitId
);

/// A file the backend currently reports as changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub path: String,
    /// Original path when the change is a rename
    pub previous_path: Option<String>,
}

/// The diff the backend computed for a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeDiff {
    /// A content patch whose hunks can be selected line by line
    Patch { hunks: Vec<DiffHunk> },
    /// Binary content, only selectable as a whole file
    Binary,
    /// Content too large to diff, only selectable as a whole file
    TooLarge,
}

/// One per-path entry of a commit request: take the whole file when
/// `hunk_headers` is empty, otherwise take exactly the listed regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEntry {
    pub path: String,
    pub previous_path: Option<String>,
    pub hunk_headers: Vec<HunkHeader>,
}

impl ChangeEntry {
    /// Whole-file entry, no hunk filtering.
    pub fn whole_file(path: impl Into<String>, previous_path: Option<String>) -> Self {
        Self {
            path: path.into(),
            previous_path,
            hunk_headers: Vec::new(),
        }
    }
}

/// Everything the backend needs to materialize one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub project_id: ProjectId,
    pub stack_id: StackId,
    /// Commit to use as parent; none means the branch decides
    pub parent_id: Option<CommitId>,
    pub message: String,
    pub branch_name: String,
    pub changes: Vec<ChangeEntry>,
}

/// A path the backend refused to include, with its reason (for instance a
/// lock held by another branch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedPath {
    pub reason: String,
    pub path: String,
}

/// Outcome of a successful `create_commit` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    pub new_commit_id: CommitId,
    /// Files excluded from the commit; the commit itself still succeeded
    pub rejected_paths: Vec<RejectedPath>,
}

/// A freshly created stack with its ordered branch names, topmost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedStack {
    pub id: StackId,
    pub branches: Vec<String>,
}

/// Sequentially awaited collaborator interface over the version-control
/// backend.
#[async_trait]
pub trait Backend {
    /// Current change for `path`, or `None` when the backend has no change
    /// recorded for it.
    async fn fetch_change(
        &self,
        project: &ProjectId,
        path: &str,
    ) -> Result<Option<Change>, BackendError>;

    /// Diff for a change, or `None` when no diff could be computed.
    async fn fetch_diff(
        &self,
        project: &ProjectId,
        change: &Change,
    ) -> Result<Option<ChangeDiff>, BackendError>;

    /// Materialize a commit from the flattened change list.
    async fn create_commit(&self, request: CommitRequest) -> Result<CommitResult, BackendError>;

    /// Create a new stack whose first branch is named `branch_name`.
    async fn create_stack(
        &self,
        project: &ProjectId,
        branch_name: &str,
    ) -> Result<CreatedStack, BackendError>;
}
