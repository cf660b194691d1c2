pub mod board;
pub mod card;
pub mod id;
pub mod selection;

pub use board::{Board, CardLocation, List};
pub use card::{Card, CardPatch, ChecklistItem, LabelColor};
pub use id::{IdGenerator, Identifier};
pub use selection::{Direction, Selection, SelectionCursor, Step};
