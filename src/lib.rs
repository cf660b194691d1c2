//! # Pinboard Core
//!
//! Board state engine for a single-user kanban editor.
//!
//! Boards hold ordered lists, lists hold ordered cards. The [`BoardStore`]
//! owns the tree and the card selection and is the only thing that mutates
//! them; the [`DragCoordinator`] and [`KeyboardController`] turn pointer and
//! key gestures into store calls. Every committed change is queued for the
//! [`Storage`] backend in commit order.

pub mod config;
pub mod domain;
pub mod drag;
pub mod error;
pub mod keyboard;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use config::{BoardConfig, Config, StorageConfig};
pub use domain::{
    board::{Board, CardLocation, List},
    card::{Card, CardPatch, ChecklistItem, LabelColor},
    id::{IdGenerator, Identifier},
    selection::{Direction, Selection, SelectionCursor, Step},
};
pub use drag::{DragCoordinator, DragKind, DragPayload, DropOutcome, DropTarget};
pub use error::{PinboardError, Result};
pub use keyboard::{Key, KeyEvent, KeyOutcome, KeyboardController};
pub use storage::{PersistenceAdapter, Storage};
pub use store::BoardStore;
