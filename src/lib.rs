//! Translate a user's partial, line-granular selection of changes into the
//! exact hunk-header set a version-control backend needs to materialize a
//! commit containing only the selected lines.

use error_set::error_set;

mod backend;
mod flatten;
mod hunk;
mod lookup;
mod selection;
mod session;
mod translate;

pub use backend::{
    Backend, BackendError, Change, ChangeDiff, ChangeEntry, CommitId, CommitRequest, CommitResult,
    CreatedStack, ProjectId, RejectedPath, StackId,
};
pub use flatten::{FlattenError, flatten_selection};
pub use hunk::{DiffHunk, HunkError, HunkHeader};
pub use lookup::{LookupError, find_hunk};
pub use selection::{ChangeSelection, FileSelection, HunkSelection, SelectedLine};
pub use session::{CommitSession, DraftMessage, StackState};
pub use translate::{Purpose, selected_line_headers};

error_set! {
    /// Top-level error for a commit attempt.
    ///
    /// Every failure here is raised before the backend commit call is
    /// issued; the backend's own partial rejections ride in the successful
    /// [`CommitOutcome`] instead.
    CommitError := {
        #[display("Commit message is empty")]
        EmptyMessage,
        #[display("No stack {stack_id} to commit into")]
        NoStackSelected { stack_id: String },
        #[display("Stack {stack_id} has no branch to commit onto")]
        NoBranchSelected { stack_id: String },
        FlattenError(FlattenError),
        BackendError(BackendError),
    }
}

/// What a successful commit produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub new_commit_id: CommitId,
    pub stack_id: StackId,
    pub branch_name: String,
    /// Files the backend excluded because another branch owns them; the
    /// commit still succeeded for everything else
    pub rejected_paths: Vec<RejectedPath>,
}

/// Assembles commits from a [`CommitSession`]'s selection.
///
/// Resolution, flattening and the backend commit call run strictly
/// sequentially; the first failure aborts the attempt with no backend
/// commit issued.
#[derive(Debug)]
pub struct CommitEngine<'a, B: Backend> {
    backend: &'a B,
    project: ProjectId,
}

impl<'a, B: Backend> CommitEngine<'a, B> {
    pub fn new(backend: &'a B, project: ProjectId) -> Self {
        Self { backend, project }
    }

    /// Commit the session's current selection.
    ///
    /// With an explicit `target_stack` the session must already know that
    /// stack, and its previously selected or topmost branch becomes the
    /// target. Without one, a new stack is created using `draft_branch` as
    /// its first branch name and remembered in the session.
    ///
    /// On success the new commit becomes the stack's selected commit, the
    /// change selection and draft message are cleared, and the composition
    /// surface is closed. Paths the backend rejected are reported in the
    /// outcome and logged as a warning, not treated as a failure.
    ///
    /// # Errors
    ///
    /// [`CommitError::EmptyMessage`] is raised locally before any backend
    /// call. [`CommitError::NoStackSelected`] / `NoBranchSelected` guard
    /// target resolution. Lookup, translation and backend failures abort
    /// the attempt with the cause attached.
    pub async fn commit(
        &self,
        session: &mut CommitSession,
        target_stack: Option<&StackId>,
        draft_branch: &str,
    ) -> Result<CommitOutcome, CommitError> {
        let message = session.draft.compose();
        if message.is_empty() {
            return Err(CommitError::EmptyMessage);
        }

        let (stack_id, branch_name, parent_id) = match target_stack {
            Some(id) => {
                let stack = session
                    .stack(id)
                    .ok_or_else(|| CommitError::NoStackSelected {
                        stack_id: id.to_string(),
                    })?;
                let branch = stack
                    .target_branch()
                    .ok_or_else(|| CommitError::NoBranchSelected {
                        stack_id: id.to_string(),
                    })?
                    .to_string();
                (stack.id.clone(), branch, stack.selected_commit.clone())
            }
            None => {
                let created = self
                    .backend
                    .create_stack(&self.project, draft_branch)
                    .await?;
                let state = StackState::from_created(created);
                let branch = state
                    .target_branch()
                    .ok_or_else(|| CommitError::NoBranchSelected {
                        stack_id: state.id.to_string(),
                    })?
                    .to_string();
                let id = state.id.clone();
                session.stacks.push(state);
                (id, branch, None)
            }
        };

        let changes = flatten_selection(self.backend, &self.project, &session.selection).await?;

        let result = self
            .backend
            .create_commit(CommitRequest {
                project_id: self.project.clone(),
                stack_id: stack_id.clone(),
                parent_id,
                message,
                branch_name: branch_name.clone(),
                changes,
            })
            .await?;

        if !result.rejected_paths.is_empty() {
            let paths: Vec<&str> = result
                .rejected_paths
                .iter()
                .map(|r| r.path.as_str())
                .collect();
            tracing::warn!(
                ?paths,
                commit = %result.new_commit_id,
                "files locked to another branch were excluded from the commit"
            );
        }

        session.select_commit(&stack_id, result.new_commit_id.clone());
        session.selection.clear();
        session.draft.clear();
        session.composing = false;

        Ok(CommitOutcome {
            new_commit_id: result.new_commit_id,
            stack_id,
            branch_name,
            rejected_paths: result.rejected_paths,
        })
    }
}
