//! Note domain model.
//!
//! # Responsibility
//! - Define `Note`, `NoteSummary`, `NoteDraft` and the closed `Tag` set.
//! - Provide the title/text presence rule as a plain predicate.
//!
//! # Invariants
//! - At least one of `title` and `text` is non-empty for any stored note.
//! - `id` and `created_at` never change after the first save.
//! - Tags are restricted to `BUSINESS`, `PERSONAL` and `IMPORTANT`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier assigned by persistence on first save.
pub type NoteId = Uuid;

/// Closed set of note categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tag {
    Business,
    Personal,
    Important,
}

impl Tag {
    /// All tag values in declaration order.
    pub const ALL: [Tag; 3] = [Tag::Business, Tag::Personal, Tag::Important];

    /// Stable wire/storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Business => "BUSINESS",
            Self::Personal => "PERSONAL",
            Self::Important => "IMPORTANT",
        }
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = NoteValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "BUSINESS" => Ok(Self::Business),
            "PERSONAL" => Ok(Self::Personal),
            "IMPORTANT" => Ok(Self::Important),
            other => Err(NoteValidationError::UnknownTag(other.to_string())),
        }
    }
}

/// Parses raw tag names into a tag set.
///
/// Names must match exactly (upper case). Duplicates collapse.
pub fn parse_tags<S: AsRef<str>>(values: &[S]) -> Result<BTreeSet<Tag>, NoteValidationError> {
    values.iter().map(|value| value.as_ref().parse()).collect()
}

/// Validation failures for note payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Both `title` and `text` are empty.
    MissingTitleAndText,
    /// Tag name outside the closed set.
    UnknownTag(String),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitleAndText => write!(f, "title or text must not be empty"),
            Self::UnknownTag(value) => write!(
                f,
                "unknown tag `{value}`: tag should be BUSINESS, PERSONAL or IMPORTANT"
            ),
        }
    }
}

impl Error for NoteValidationError {}

/// Returns whether a payload satisfies the title/text presence rule.
pub fn has_title_or_text(title: &str, text: &str) -> bool {
    !title.is_empty() || !text.is_empty()
}

fn require_title_or_text(title: &str, text: &str) -> Result<(), NoteValidationError> {
    if has_title_or_text(title, text) {
        Ok(())
    } else {
        Err(NoteValidationError::MissingTitleAndText)
    }
}

/// Persisted note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// `None` until the first successful save.
    pub id: Option<NoteId>,
    pub title: String,
    pub text: String,
    pub tags: BTreeSet<Tag>,
    /// Epoch milliseconds of the first save.
    pub created_at: Option<i64>,
    /// Epoch milliseconds of the latest save.
    pub last_modified_at: Option<i64>,
}

impl Note {
    /// Creates an unsaved note. Id and timestamps are left for persistence.
    pub fn new(title: impl Into<String>, text: impl Into<String>, tags: BTreeSet<Tag>) -> Self {
        Self {
            id: None,
            title: title.into(),
            text: text.into(),
            tags,
            created_at: None,
            last_modified_at: None,
        }
    }

    /// Returns whether this note was already persisted.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Checks record invariants before persistence.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        require_title_or_text(&self.title, &self.text)
    }
}

/// List projection. Never carries the note body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub id: NoteId,
    pub title: String,
    pub created_at: i64,
}

/// Typed create/update payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    /// Empty on update means "keep the stored tags".
    #[serde(default)]
    pub tags: BTreeSet<Tag>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, text: impl Into<String>, tags: BTreeSet<Tag>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            tags,
        }
    }

    /// Applies the title/text presence rule.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        require_title_or_text(&self.title, &self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::{has_title_or_text, parse_tags, Note, NoteDraft, NoteValidationError, Tag};
    use std::collections::BTreeSet;

    #[test]
    fn presence_rule_needs_one_non_empty_field() {
        assert!(has_title_or_text("title", ""));
        assert!(has_title_or_text("", "text"));
        assert!(!has_title_or_text("", ""));
    }

    #[test]
    fn draft_and_note_share_the_presence_rule() {
        let draft = NoteDraft::new("", "", BTreeSet::new());
        assert_eq!(
            draft.validate(),
            Err(NoteValidationError::MissingTitleAndText)
        );

        let note = Note::new("", "body", BTreeSet::new());
        assert!(note.validate().is_ok());
        assert!(!note.is_persisted());

        let blank = Note::new("", "", BTreeSet::new());
        assert_eq!(blank.validate(), draft.validate());
    }

    #[test]
    fn parse_tags_accepts_known_names_and_dedupes() {
        let tags = parse_tags(&["PERSONAL", "BUSINESS", "PERSONAL"]).expect("known tags");
        assert_eq!(
            tags.into_iter().collect::<Vec<_>>(),
            vec![Tag::Business, Tag::Personal]
        );
    }

    #[test]
    fn parse_tags_rejects_unknown_or_lowercase_names() {
        let err = parse_tags(&["personal"]).expect_err("lowercase is not a tag");
        assert_eq!(err, NoteValidationError::UnknownTag("personal".to_string()));
        assert!(err.to_string().contains("BUSINESS, PERSONAL or IMPORTANT"));
    }

    #[test]
    fn tags_serialize_in_upper_case() {
        let json = serde_json::to_string(&Tag::Important).expect("serialize tag");
        assert_eq!(json, "\"IMPORTANT\"");
        let parsed: Tag = serde_json::from_str("\"BUSINESS\"").expect("deserialize tag");
        assert_eq!(parsed, Tag::Business);
    }
}
