use notes_core::{
    Note, NoteDraft, NoteId, NoteOperation, NoteRepository, NoteService, NoteServiceError,
    NoteSummary, Page, PageRequest, RepoError, RepoResult, Tag,
};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::error::Error;
use uuid::Uuid;

/// Repository double whose store calls fail on demand.
#[derive(Default)]
struct FlakyRepository {
    stored: RefCell<Option<Note>>,
    fail_save: bool,
    fail_find: bool,
    fail_delete: bool,
    fail_list: bool,
    calls: RefCell<Vec<&'static str>>,
}

impl FlakyRepository {
    fn with_note(note: Note) -> Self {
        Self {
            stored: RefCell::new(Some(note)),
            ..Self::default()
        }
    }

    fn store_error() -> RepoError {
        RepoError::InvalidData("connection reset by peer".to_string())
    }
}

impl NoteRepository for FlakyRepository {
    fn save(&self, note: &Note) -> RepoResult<Note> {
        self.calls.borrow_mut().push("save");
        if self.fail_save {
            return Err(Self::store_error());
        }
        let mut saved = note.clone();
        saved.id.get_or_insert_with(Uuid::new_v4);
        saved.created_at.get_or_insert(1);
        saved.last_modified_at = Some(2);
        *self.stored.borrow_mut() = Some(saved.clone());
        Ok(saved)
    }

    fn find_by_id(&self, id: NoteId) -> RepoResult<Option<Note>> {
        self.calls.borrow_mut().push("find_by_id");
        if self.fail_find {
            return Err(Self::store_error());
        }
        Ok(self
            .stored
            .borrow()
            .clone()
            .filter(|note| note.id == Some(id)))
    }

    fn delete(&self, id: NoteId) -> RepoResult<()> {
        self.calls.borrow_mut().push("delete");
        if self.fail_delete {
            return Err(Self::store_error());
        }
        match self.stored.borrow_mut().take() {
            Some(note) if note.id == Some(id) => Ok(()),
            _ => Err(RepoError::NotFound(id)),
        }
    }

    fn find_all_projected(&self, page: &PageRequest) -> RepoResult<Page<NoteSummary>> {
        self.calls.borrow_mut().push("find_all_projected");
        if self.fail_list {
            return Err(Self::store_error());
        }
        Ok(Page::empty(page))
    }

    fn find_by_tags_in(
        &self,
        _tags: &BTreeSet<Tag>,
        page: &PageRequest,
    ) -> RepoResult<Page<NoteSummary>> {
        self.calls.borrow_mut().push("find_by_tags_in");
        if self.fail_list {
            return Err(Self::store_error());
        }
        Ok(Page::empty(page))
    }
}

fn stored_note() -> Note {
    let mut note = Note::new("title", "text", BTreeSet::new());
    note.id = Some(Uuid::new_v4());
    note.created_at = Some(1);
    note.last_modified_at = Some(1);
    note
}

fn assert_persistence_failure(err: NoteServiceError, operation: NoteOperation, message: &str) {
    assert_eq!(err.to_string(), message);
    assert!(!err.to_string().contains("connection reset"));
    let source = err.source().expect("cause is kept");
    assert!(source.to_string().contains("connection reset"));
    assert!(matches!(
        err,
        NoteServiceError::PersistenceFailure { operation: found, .. } if found == operation
    ));
}

#[test]
fn create_failure_reports_stable_message() {
    let repo = FlakyRepository {
        fail_save: true,
        ..FlakyRepository::default()
    };
    let service = NoteService::new(repo);

    let err = service
        .create_note(NoteDraft::new("t", "x", BTreeSet::new()))
        .unwrap_err();
    assert_persistence_failure(err, NoteOperation::Create, "error creating note");
}

#[test]
fn update_failure_reports_stable_message() {
    let note = stored_note();
    let id = note.id.unwrap();
    let repo = FlakyRepository {
        fail_save: true,
        ..FlakyRepository::with_note(note)
    };
    let service = NoteService::new(repo);

    let err = service
        .update_note(id, NoteDraft::new("t", "x", BTreeSet::new()))
        .unwrap_err();
    assert_persistence_failure(err, NoteOperation::Update, "error updating note");
}

#[test]
fn delete_failure_reports_stable_message() {
    let note = stored_note();
    let id = note.id.unwrap();
    let repo = FlakyRepository {
        fail_delete: true,
        ..FlakyRepository::with_note(note)
    };
    let service = NoteService::new(repo);

    let err = service.delete_note(id).unwrap_err();
    assert_persistence_failure(err, NoteOperation::Delete, "error deleting note");
}

#[test]
fn lookup_failure_is_not_reported_as_not_found() {
    let repo = FlakyRepository {
        fail_find: true,
        ..FlakyRepository::default()
    };
    let service = NoteService::new(repo);

    let err = service.get_note_text(Uuid::new_v4()).unwrap_err();
    assert_persistence_failure(err, NoteOperation::Load, "error loading note");
}

#[test]
fn list_failure_reports_stable_message() {
    let repo = FlakyRepository {
        fail_list: true,
        ..FlakyRepository::default()
    };
    let service = NoteService::new(repo);

    let err = service
        .list_notes(&BTreeSet::new(), PageRequest::default())
        .unwrap_err();
    assert_persistence_failure(err, NoteOperation::List, "error listing notes");
}

#[test]
fn list_routes_by_filter_emptiness() {
    let service = NoteService::new(FlakyRepository::default());

    service
        .list_notes(&BTreeSet::new(), PageRequest::default())
        .unwrap();
    service
        .list_notes(&BTreeSet::from([Tag::Business]), PageRequest::default())
        .unwrap();

    assert_eq!(
        *service.repository().calls.borrow(),
        vec!["find_all_projected", "find_by_tags_in"]
    );
}

#[test]
fn delete_of_missing_note_never_reaches_repository_delete() {
    let service = NoteService::new(FlakyRepository::default());

    let err = service.delete_note(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, NoteServiceError::NotFound(_)));
    assert_eq!(*service.repository().calls.borrow(), vec!["find_by_id"]);
}

#[test]
fn invalid_draft_never_reaches_repository() {
    let service = NoteService::new(FlakyRepository::default());

    let err = service
        .create_note(NoteDraft::new("", "", BTreeSet::new()))
        .unwrap_err();
    assert!(matches!(err, NoteServiceError::InvalidNote(_)));
    assert!(service.repository().calls.borrow().is_empty());
}

#[test]
fn analyze_text_does_not_touch_repository() {
    let service = NoteService::new(FlakyRepository {
        fail_find: true,
        fail_list: true,
        fail_save: true,
        fail_delete: true,
        ..FlakyRepository::default()
    });

    let table = service.analyze_text(Some("Hello, Hello!! World@@"));
    assert_eq!(table.get("hello"), Some(2));
    assert_eq!(table.get("world"), Some(1));
    assert!(service.analyze_text(None).is_empty());
    assert!(service.repository().calls.borrow().is_empty());
}
