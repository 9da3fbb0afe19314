//! Flattening a change selection into the per-path entries of a commit
//! request.

use crate::backend::{Backend, ChangeEntry, ProjectId};
use crate::hunk::HunkError;
use crate::lookup::{self, LookupError};
use crate::selection::{ChangeSelection, FileSelection, HunkSelection};
use crate::translate::{Purpose, selected_line_headers};
use error_set::error_set;

error_set! {
    /// Failure while flattening a change selection.
    ///
    /// Any lookup or translation failure aborts the whole flattening; no
    /// partial change list is ever submitted to the backend.
    FlattenError := {
        LookupError(LookupError),
        HunkError(HunkError),
    }
}

/// Resolve a [`ChangeSelection`] into backend change entries.
///
/// One entry per file, in selection order. Fully selected files become
/// whole-file entries (empty header list). Partially selected files carry
/// one header per fully selected hunk (its coordinates verbatim, no lookup)
/// and the translated headers of each partially selected hunk, in hunk-visit
/// order.
///
/// A partially selected file whose diff turns out not to be a content patch
/// falls back to a whole-file entry; binary files cannot be narrowed to
/// lines.
pub async fn flatten_selection<B: Backend>(
    backend: &B,
    project: &ProjectId,
    selection: &ChangeSelection,
) -> Result<Vec<ChangeEntry>, FlattenError> {
    let mut changes = Vec::with_capacity(selection.len());

    for file in selection.iter() {
        match file {
            FileSelection::Full {
                path,
                previous_path,
            } => changes.push(ChangeEntry::whole_file(path, previous_path.clone())),
            FileSelection::Partial {
                path,
                previous_path,
                hunks,
            } => {
                let mut entry = ChangeEntry {
                    path: path.clone(),
                    previous_path: previous_path.clone(),
                    hunk_headers: Vec::new(),
                };

                for hunk in hunks {
                    match hunk {
                        HunkSelection::Full { header } => entry.hunk_headers.push(*header),
                        HunkSelection::Partial { header, lines } => {
                            match lookup::find_hunk(backend, project, path, *header).await? {
                                Some(found) => entry.hunk_headers.extend(selected_line_headers(
                                    &found.diff,
                                    lines,
                                    Purpose::Commit,
                                )?),
                                None => {
                                    // Not a content patch: the file can only
                                    // go in wholesale
                                    entry.hunk_headers.clear();
                                    break;
                                }
                            }
                        }
                    }
                }

                changes.push(entry);
            }
        }
    }

    tracing::debug!(
        files = changes.len(),
        "flattened change selection into commit entries"
    );
    Ok(changes)
}
