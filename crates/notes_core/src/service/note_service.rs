//! Note use-case service.
//!
//! # Responsibility
//! - Provide note create/update/delete/get/list APIs over a `NoteRepository`.
//! - Apply not-found semantics and the partial tag-update policy.
//! - Expose word-frequency analysis of note text.
//!
//! # Invariants
//! - The service never hands the repository a note with both `title` and
//!   `text` empty.
//! - `update_note` replaces tags only when the supplied set is non-empty.
//! - Store failures surface as `PersistenceFailure` with a stable message;
//!   the underlying cause is logged and kept as `source()` only.
//! - The service holds no state besides its repository.

use crate::analysis::FrequencyTable;
use crate::model::note::{Note, NoteDraft, NoteId, NoteSummary, NoteValidationError, Tag};
use crate::repo::note_repo::{NoteRepository, Page, PageRequest, RepoError};
use log::{debug, error, info};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service operation that touched the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteOperation {
    List,
    Create,
    Update,
    Delete,
    Load,
}

impl NoteOperation {
    /// Stable, caller-facing failure message.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::List => "error listing notes",
            Self::Create => "error creating note",
            Self::Update => "error updating note",
            Self::Delete => "error deleting note",
            Self::Load => "error loading note",
        }
    }

    fn event_name(self) -> &'static str {
        match self {
            Self::List => "note_list",
            Self::Create | Self::Update => "note_save",
            Self::Delete => "note_delete",
            Self::Load => "note_lookup",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Load => "load",
        }
    }
}

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Target note does not exist.
    NotFound(NoteId),
    /// Payload violates the title/text presence rule.
    InvalidNote(NoteValidationError),
    /// Store operation failed; `source` is for diagnostics only.
    PersistenceFailure {
        operation: NoteOperation,
        source: RepoError,
    },
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidNote(err) => write!(f, "invalid note: {err}"),
            Self::PersistenceFailure { operation, .. } => {
                f.write_str(operation.failure_message())
            }
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::InvalidNote(err) => Some(err),
            Self::PersistenceFailure { source, .. } => Some(source),
        }
    }
}

/// Note service facade over a repository implementation.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrows the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Lists note projections newest first.
    ///
    /// An empty `tag_filter` lists every note; otherwise only notes carrying
    /// at least one of the given tags are returned.
    pub fn list_notes(
        &self,
        tag_filter: &BTreeSet<Tag>,
        page: PageRequest,
    ) -> Result<Page<NoteSummary>, NoteServiceError> {
        let result = if tag_filter.is_empty() {
            self.repo.find_all_projected(&page)
        } else {
            self.repo.find_by_tags_in(tag_filter, &page)
        };
        let listed = result.map_err(|err| persistence_failure(NoteOperation::List, err))?;
        debug!(
            "event=note_list module=service status=ok tag_filter_len={} page={} page_size={} returned={} total={}",
            tag_filter.len(),
            listed.page,
            listed.page_size,
            listed.items.len(),
            listed.total_items
        );
        Ok(listed)
    }

    /// Creates one note from a draft. The store assigns id and timestamps.
    pub fn create_note(&self, draft: NoteDraft) -> Result<Note, NoteServiceError> {
        draft.validate().map_err(NoteServiceError::InvalidNote)?;

        let note = Note::new(draft.title, draft.text, draft.tags);
        let saved = self
            .repo
            .save(&note)
            .map_err(|err| map_repo_error(NoteOperation::Create, err))?;
        log_saved(NoteOperation::Create, &saved);
        Ok(saved)
    }

    /// Overwrites title and text of an existing note.
    ///
    /// Tags are replaced only when `draft.tags` is non-empty; an empty set
    /// keeps the stored tags.
    pub fn update_note(&self, id: NoteId, draft: NoteDraft) -> Result<Note, NoteServiceError> {
        draft.validate().map_err(NoteServiceError::InvalidNote)?;

        let mut note = self.load(id)?;
        note.title = draft.title;
        note.text = draft.text;
        if !draft.tags.is_empty() {
            note.tags = draft.tags;
        }

        let saved = self
            .repo
            .save(&note)
            .map_err(|err| map_repo_error(NoteOperation::Update, err))?;
        log_saved(NoteOperation::Update, &saved);
        Ok(saved)
    }

    /// Gets one note by id.
    pub fn get_note(&self, id: NoteId) -> Result<Note, NoteServiceError> {
        self.load(id)
    }

    /// Returns the body text of one note.
    pub fn get_note_text(&self, id: NoteId) -> Result<String, NoteServiceError> {
        self.load(id).map(|note| note.text)
    }

    /// Deletes one note by id.
    pub fn delete_note(&self, id: NoteId) -> Result<(), NoteServiceError> {
        self.load(id)?;
        self.repo
            .delete(id)
            .map_err(|err| map_repo_error(NoteOperation::Delete, err))?;
        info!("event=note_delete module=service status=ok note_id={id}");
        Ok(())
    }

    /// Computes word frequencies for raw text. Touches no storage.
    pub fn analyze_text(&self, text: Option<&str>) -> FrequencyTable {
        crate::analysis::analyze_text(text)
    }

    /// Computes word frequencies for a stored note's text.
    pub fn analyze_note(&self, id: NoteId) -> Result<FrequencyTable, NoteServiceError> {
        let text = self.get_note_text(id)?;
        Ok(crate::analysis::analyze_text(Some(text.as_str())))
    }

    fn load(&self, id: NoteId) -> Result<Note, NoteServiceError> {
        match self.repo.find_by_id(id) {
            Ok(Some(note)) => Ok(note),
            Ok(None) => {
                debug!("event=note_lookup module=service status=not_found note_id={id}");
                Err(NoteServiceError::NotFound(id))
            }
            Err(err) => Err(map_repo_error(NoteOperation::Load, err)),
        }
    }
}

fn map_repo_error(operation: NoteOperation, err: RepoError) -> NoteServiceError {
    match err {
        // Row vanished between lookup and write.
        RepoError::NotFound(id) => NoteServiceError::NotFound(id),
        other => persistence_failure(operation, other),
    }
}

fn persistence_failure(operation: NoteOperation, err: RepoError) -> NoteServiceError {
    error!(
        "event={} module=service status=error op={} error={}",
        operation.event_name(),
        operation.as_str(),
        err
    );
    NoteServiceError::PersistenceFailure {
        operation,
        source: err,
    }
}

fn log_saved(operation: NoteOperation, note: &Note) {
    let note_id = note
        .id
        .map_or_else(|| "unassigned".to_string(), |id| id.to_string());
    info!(
        "event=note_save module=service status=ok op={} note_id={} tag_count={}",
        operation.as_str(),
        note_id,
        note.tags.len()
    );
}

#[cfg(test)]
mod tests {
    use super::{NoteOperation, NoteServiceError};
    use crate::repo::note_repo::RepoError;
    use std::error::Error;

    #[test]
    fn persistence_failure_message_hides_cause() {
        let err = NoteServiceError::PersistenceFailure {
            operation: NoteOperation::Delete,
            source: RepoError::InvalidData("disk on fire".to_string()),
        };
        assert_eq!(err.to_string(), "error deleting note");
        let source = err.source().expect("cause kept as source");
        assert!(source.to_string().contains("disk on fire"));
    }

    #[test]
    fn every_operation_has_a_distinct_message() {
        let messages = [
            NoteOperation::List,
            NoteOperation::Create,
            NoteOperation::Update,
            NoteOperation::Delete,
            NoteOperation::Load,
        ]
        .map(NoteOperation::failure_message);
        for (idx, message) in messages.iter().enumerate() {
            assert!(message.starts_with("error "));
            assert!(!messages[idx + 1..].contains(message));
        }
    }
}
