//! Domain model for notes.
//!
//! # Responsibility
//! - Define the persisted `Note` record, its list projection and the typed
//!   request payload consumed by the service.
//!
//! # Invariants
//! - A note is identified by a stable `NoteId` assigned on first save.
//! - Deletion removes the note; ids are never reused.

pub mod note;
