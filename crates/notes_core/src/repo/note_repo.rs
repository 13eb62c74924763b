//! Note repository contract, pagination types and SQLite implementation.
//!
//! # Responsibility
//! - Define the persistence port used by `NoteService`.
//! - Own id and timestamp assignment for saved notes.
//! - Serve newest-first paginated projections, optionally tag-filtered.
//!
//! # Invariants
//! - `save` inserts when `Note::id` is `None` and updates otherwise.
//! - `created_at` is written once; `updated_at` is refreshed on every save
//!   and never moves backwards.
//! - A note row and its tag set are always written in one transaction.
//! - Listings are ordered by `created_at DESC`, newest insert first on ties.

use crate::db::migrations::ensure_notes_schema;
use crate::db::StoreError;
use crate::model::note::{Note, NoteId, NoteSummary, NoteValidationError, Tag};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction};
use serde::Serialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Page size used when callers pass none (or zero).
pub const DEFAULT_PAGE_SIZE: u32 = 5;

const NOTE_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    text,
    created_at,
    updated_at
FROM notes";

const LISTING_ORDER_SQL: &str = " ORDER BY created_at DESC, rowid DESC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValidationError),
    Store(StoreError),
    NotFound(NoteId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(StoreError::Sqlite(value))
    }
}

/// Zero-based page coordinates for listing queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Creates a request. A `page_size` of zero means [`DEFAULT_PAGE_SIZE`].
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size: normalize_page_size(Some(page_size)),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }
}

impl Default for PageRequest {
    /// First page with the default size.
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// One page of query results plus totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    /// Rows matching the query across all pages.
    pub total_items: u64,
}

impl<T> Page<T> {
    /// Page with no rows for the given request.
    pub fn empty(request: &PageRequest) -> Self {
        Self {
            items: Vec::new(),
            page: request.page(),
            page_size: request.page_size(),
            total_items: 0,
        }
    }

    /// Number of pages needed for `total_items`.
    ///
    /// `Page` fields are public, so a hand-built page may carry
    /// `page_size == 0`; such a page has no pages.
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_items.div_ceil(u64::from(self.page_size))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) + 1 < self.total_pages()
    }

    /// Transforms items while keeping paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
        }
    }
}

/// Persistence port for notes.
pub trait NoteRepository {
    /// Inserts (no id) or updates (id present) a note and returns the stored
    /// record with id and timestamps populated.
    fn save(&self, note: &Note) -> RepoResult<Note>;
    /// Gets one note by id.
    fn find_by_id(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Removes one note. `RepoError::NotFound` when nothing was removed.
    fn delete(&self, id: NoteId) -> RepoResult<()>;
    /// Lists projections of all notes, newest first.
    fn find_all_projected(&self, page: &PageRequest) -> RepoResult<Page<NoteSummary>>;
    /// Lists projections of notes carrying at least one of `tags`.
    fn find_by_tags_in(
        &self,
        tags: &BTreeSet<Tag>,
        page: &PageRequest,
    ) -> RepoResult<Page<NoteSummary>>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `RepoError::Store(StoreError::MissingTable(_))` when migrations were
    ///   not applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_notes_schema(conn)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn save(&self, note: &Note) -> RepoResult<Note> {
        note.validate()?;

        let now = now_epoch_ms();
        let tx = self.conn.unchecked_transaction()?;
        let id = match note.id {
            None => {
                let id = Uuid::new_v4();
                tx.execute(
                    "INSERT INTO notes (uuid, title, text, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?4);",
                    params![id.to_string(), note.title.as_str(), note.text.as_str(), now],
                )?;
                id
            }
            Some(id) => {
                let changed = tx.execute(
                    "UPDATE notes
                     SET
                        title = ?2,
                        text = ?3,
                        updated_at = MAX(?4, updated_at)
                     WHERE uuid = ?1;",
                    params![id.to_string(), note.title.as_str(), note.text.as_str(), now],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound(id));
                }
                id
            }
        };
        replace_tags(&tx, id, &note.tags)?;
        tx.commit()?;

        self.find_by_id(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("note `{id}` missing after save")))
    }

    fn find_by_id(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_note_row(self.conn, row)?)),
            None => Ok(None),
        }
    }

    fn delete(&self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn find_all_projected(&self, page: &PageRequest) -> RepoResult<Page<NoteSummary>> {
        query_summaries(self.conn, "", Vec::new(), page)
    }

    fn find_by_tags_in(
        &self,
        tags: &BTreeSet<Tag>,
        page: &PageRequest,
    ) -> RepoResult<Page<NoteSummary>> {
        if tags.is_empty() {
            return Ok(Page::empty(page));
        }

        let placeholders = vec!["?"; tags.len()].join(", ");
        let filter = format!(
            " WHERE EXISTS (
                SELECT 1
                FROM note_tags nt
                WHERE nt.note_uuid = notes.uuid
                  AND nt.tag IN ({placeholders})
            )"
        );
        let bind_values = tags
            .iter()
            .map(|tag| Value::Text(tag.as_str().to_string()))
            .collect();
        query_summaries(self.conn, &filter, bind_values, page)
    }
}

/// Resolves a requested page size. `None` and `Some(0)` fall back to
/// [`DEFAULT_PAGE_SIZE`]; any other size is kept as requested.
pub fn normalize_page_size(page_size: Option<u32>) -> u32 {
    match page_size {
        None | Some(0) => DEFAULT_PAGE_SIZE,
        Some(value) => value,
    }
}

fn query_summaries(
    conn: &Connection,
    filter_sql: &str,
    filter_values: Vec<Value>,
    page: &PageRequest,
) -> RepoResult<Page<NoteSummary>> {
    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM notes{filter_sql};"),
        params_from_iter(filter_values.iter()),
        |row| row.get(0),
    )?;

    let offset = i64::try_from(page.offset())
        .map_err(|_| RepoError::InvalidData(format!("page offset {} too large", page.offset())))?;
    let mut bind_values = filter_values;
    bind_values.push(Value::Integer(i64::from(page.page_size())));
    bind_values.push(Value::Integer(offset));

    let mut stmt = conn.prepare(&format!(
        "SELECT uuid, title, created_at FROM notes{filter_sql}{LISTING_ORDER_SQL} LIMIT ? OFFSET ?;"
    ))?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        let uuid_text: String = row.get("uuid")?;
        items.push(NoteSummary {
            id: parse_uuid(&uuid_text)?,
            title: row.get("title")?,
            created_at: row.get("created_at")?,
        });
    }

    Ok(Page {
        items,
        page: page.page(),
        page_size: page.page_size(),
        total_items: u64::try_from(total).unwrap_or(0),
    })
}

fn replace_tags(tx: &Transaction<'_>, id: NoteId, tags: &BTreeSet<Tag>) -> RepoResult<()> {
    let id_text = id.to_string();
    tx.execute(
        "DELETE FROM note_tags WHERE note_uuid = ?1;",
        [id_text.as_str()],
    )?;
    for tag in tags {
        tx.execute(
            "INSERT INTO note_tags (note_uuid, tag) VALUES (?1, ?2);",
            params![id_text.as_str(), tag.as_str()],
        )?;
    }
    Ok(())
}

fn parse_note_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text)?;
    let note = Note {
        id: Some(id),
        title: row.get("title")?,
        text: row.get("text")?,
        tags: load_tags_for_note(conn, &uuid_text)?,
        created_at: Some(row.get("created_at")?),
        last_modified_at: Some(row.get("updated_at")?),
    };
    note.validate()?;
    Ok(note)
}

fn load_tags_for_note(conn: &Connection, note_uuid: &str) -> RepoResult<BTreeSet<Tag>> {
    let mut stmt = conn.prepare("SELECT tag FROM note_tags WHERE note_uuid = ?1;")?;
    let mut rows = stmt.query([note_uuid])?;
    let mut tags = BTreeSet::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        let tag = value.parse::<Tag>().map_err(|_| {
            RepoError::InvalidData(format!("invalid tag `{value}` in note_tags.tag"))
        })?;
        tags.insert(tag);
    }
    Ok(tags)
}

fn parse_uuid(value: &str) -> RepoResult<NoteId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in notes.uuid")))
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}
