//! Commit composition state.
//!
//! The session is owned and mutated by the caller (the UI layer); the
//! commit engine reads it while a commit is assembled and reconciles it
//! after the backend reports success.

use crate::backend::{CommitId, CreatedStack, StackId};
use crate::selection::ChangeSelection;

/// Draft commit message, kept as the two fields composition surfaces edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftMessage {
    pub title: String,
    pub description: String,
}

impl DraftMessage {
    /// Full message: title, then the description separated by a blank line.
    pub fn compose(&self) -> String {
        let title = self.title.trim();
        let description = self.description.trim();
        if description.is_empty() {
            title.to_string()
        } else {
            format!("{}\n\n{}", title, description)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.description.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.title.clear();
        self.description.clear();
    }
}

/// What the session knows about one stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackState {
    pub id: StackId,
    /// Ordered branch names, topmost first
    pub branches: Vec<String>,
    /// Branch the user previously picked as commit target
    pub selected_branch: Option<String>,
    /// Currently selected commit, used as parent for the next commit
    pub selected_commit: Option<CommitId>,
}

impl StackState {
    pub fn new(id: StackId, branches: Vec<String>) -> Self {
        Self {
            id,
            branches,
            selected_branch: None,
            selected_commit: None,
        }
    }

    pub fn from_created(created: CreatedStack) -> Self {
        Self::new(created.id, created.branches)
    }

    /// Branch the next commit lands on: the previously selected branch, or
    /// the topmost one.
    pub fn target_branch(&self) -> Option<&str> {
        self.selected_branch
            .as_deref()
            .or_else(|| self.branches.first().map(String::as_str))
    }
}

/// Everything the user has composed towards the next commit.
#[derive(Debug, Clone, Default)]
pub struct CommitSession {
    pub selection: ChangeSelection,
    pub draft: DraftMessage,
    pub stacks: Vec<StackState>,
    /// Whether the commit-composition surface is open
    pub composing: bool,
}

impl CommitSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stack(&self, id: &StackId) -> Option<&StackState> {
        self.stacks.iter().find(|s| &s.id == id)
    }

    pub fn stack_mut(&mut self, id: &StackId) -> Option<&mut StackState> {
        self.stacks.iter_mut().find(|s| &s.id == id)
    }

    /// Record the selected commit for a stack (after a successful commit,
    /// the new commit becomes the selection).
    pub fn select_commit(&mut self, stack_id: &StackId, commit: CommitId) {
        if let Some(stack) = self.stack_mut(stack_id) {
            stack.selected_commit = Some(commit);
        }
    }

    /// Explicit cancel: drop the selection and the draft, close the surface.
    pub fn cancel(&mut self) {
        self.selection.clear();
        self.draft.clear();
        self.composing = false;
    }
}
