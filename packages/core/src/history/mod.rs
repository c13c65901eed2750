//! Local undo/redo history
//!
//! History is per session and never synchronized: remote mutations bypass it
//! entirely.

mod undo_manager;

pub use undo_manager::{UndoManager, DEFAULT_UNDO_CAPACITY};
