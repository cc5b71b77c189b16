pub mod action;
pub mod store;
pub mod title;

pub use action::{NoteAction, apply};
pub use store::{NotesStore, SharedNotesStore};
pub use title::{MAX_TITLE_CHARS, derive_title};
