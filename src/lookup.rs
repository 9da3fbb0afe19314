//! Resolving a hunk selection against the file's current diff.

use crate::backend::{Backend, BackendError, ChangeDiff, ProjectId};
use crate::hunk::{DiffHunk, HunkHeader};
use error_set::error_set;

error_set! {
    /// Errors locating a hunk in the freshly fetched diff for a file.
    ///
    /// All of these mean the selection went stale: the working tree changed
    /// between selection and commit.
    LookupError := {
        #[display("No change found for {path}")]
        ChangeNotFound { path: String },
        #[display("Could not compute a diff for {path}")]
        DiffNotFound { path: String },
        #[display("Hunk {header} no longer exists in the diff for {path}")]
        HunkVanished { path: String, header: String },
        BackendError(BackendError),
    }
}

/// Fetch the current diff for `path` and return its hunk with exactly the
/// coordinates in `header`.
///
/// Returns `Ok(None)` when the change is not a content patch (binary or
/// too large); such files cannot be partially selected. A missing hunk is a
/// hard error ([`LookupError::HunkVanished`]): coordinates are the sole
/// identity key and a miss means the selection is stale. No fuzzy
/// re-matching is attempted.
pub async fn find_hunk<B: Backend>(
    backend: &B,
    project: &ProjectId,
    path: &str,
    header: HunkHeader,
) -> Result<Option<DiffHunk>, LookupError> {
    let change = backend
        .fetch_change(project, path)
        .await?
        .ok_or_else(|| LookupError::ChangeNotFound {
            path: path.to_string(),
        })?;

    let diff = backend
        .fetch_diff(project, &change)
        .await?
        .ok_or_else(|| LookupError::DiffNotFound {
            path: path.to_string(),
        })?;

    let hunks = match diff {
        ChangeDiff::Patch { hunks } => hunks,
        ChangeDiff::Binary | ChangeDiff::TooLarge => return Ok(None),
    };

    hunks
        .into_iter()
        .find(|hunk| hunk.header == header)
        .map(Some)
        .ok_or_else(|| LookupError::HunkVanished {
            path: path.to_string(),
            header: header.to_string(),
        })
}
