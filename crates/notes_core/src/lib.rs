//! Core domain logic for the notes service.
//! This crate is the single source of truth for note invariants.

pub mod analysis;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use analysis::{analyze_text, compare_words_descending, FrequencyTable};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{
    has_title_or_text, parse_tags, Note, NoteDraft, NoteId, NoteSummary, NoteValidationError, Tag,
};
pub use db::StoreError;
pub use repo::note_repo::{
    NoteRepository, Page, PageRequest, RepoError, RepoResult, SqliteNoteRepository,
    DEFAULT_PAGE_SIZE,
};
pub use service::note_service::{NoteOperation, NoteService, NoteServiceError};

/// Minimal health check for linkage smoke tests.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
