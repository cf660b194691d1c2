//! Keyboard navigation over the selection cursor.
//!
//! Each key event produces at most one store mutation or one local mode
//! change, never both.

use crate::domain::{CardPatch, Direction, Identifier};
use crate::error::{PinboardError, Result};
use crate::store::BoardStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Char(char),
    Backspace,
    Enter,
    Escape,
}

impl Key {
    fn direction(self) -> Option<Direction> {
        match self {
            Self::Left => Some(Direction::Left),
            Self::Right => Some(Direction::Right),
            Self::Up => Some(Direction::Up),
            Self::Down => Some(Direction::Down),
            _ => None,
        }
    }

    /// Text a typing key seeds an edit with; `None` for non-typing keys
    fn seed(self) -> Option<String> {
        match self {
            Self::Char(c) => Some(c.to_string()),
            Self::Backspace => Some(String::new()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    /// Focus is inside some text input outside the controller's own editor
    pub in_input: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            in_input: false,
        }
    }

    pub fn in_input(key: Key) -> Self {
        Self {
            key,
            in_input: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    /// Renaming an existing card, wherever it sits when the edit commits
    Card {
        board_id: Identifier,
        card_id: Identifier,
    },
    /// Typing the title of a new card for a lane
    QuickAdd {
        board_id: Identifier,
        list_id: Identifier,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub target: EditTarget,
    pub buffer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Browsing,
    Editing(EditSession),
}

/// What a key press did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    Selected,
    Navigated,
    SelectionCleared,
    EditStarted,
    BufferChanged,
    Committed(Identifier),
    Discarded,
    Rejected,
}

#[derive(Debug, Default)]
pub struct KeyboardController {
    mode: Mode,
    attached: bool,
}

impl KeyboardController {
    /// A detached controller; call [`attach`](Self::attach) on mount
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Stops listening and drops any open editor
    pub fn detach(&mut self) {
        self.attached = false;
        self.mode = Mode::Browsing;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Editing(_))
    }

    /// Click or tap on a card. The first activation selects it; activating
    /// the already-selected card opens the rename editor seeded with its title.
    pub fn activate(&mut self, store: &mut BoardStore, list_id: &Identifier, card_index: usize) -> KeyOutcome {
        if !self.attached {
            return KeyOutcome::Ignored;
        }

        let already_selected = store
            .selection()
            .cursor()
            .is_some_and(|cursor| &cursor.list_id == list_id && cursor.card_index == card_index);

        if !already_selected {
            return match store.select_card(list_id, card_index) {
                Ok(()) => {
                    self.mode = Mode::Browsing;
                    KeyOutcome::Selected
                }
                Err(_) => KeyOutcome::Rejected,
            };
        }

        match store.selected_card().map(|card| card.title.clone()) {
            Some(title) => self.begin_card_edit(store, title),
            None => KeyOutcome::Rejected,
        }
    }

    pub fn handle_key(&mut self, store: &mut BoardStore, event: KeyEvent) -> KeyOutcome {
        if !self.attached {
            return KeyOutcome::Ignored;
        }
        match self.mode {
            Mode::Editing(_) => self.handle_editing(store, event.key),
            Mode::Browsing => self.handle_browsing(store, event),
        }
    }

    fn handle_browsing(&mut self, store: &mut BoardStore, event: KeyEvent) -> KeyOutcome {
        if event.in_input {
            return KeyOutcome::Ignored;
        }
        let has_cursor = store.selection().cursor().is_some();

        if let Some(direction) = event.key.direction() {
            if !has_cursor {
                return KeyOutcome::Ignored;
            }
            return match store.navigate(direction) {
                Ok(_) => KeyOutcome::Navigated,
                Err(_) => KeyOutcome::Rejected,
            };
        }

        if let Some(seed) = event.key.seed() {
            if has_cursor {
                return self.begin_card_edit(store, seed);
            }
            return self.begin_quick_add(store, seed);
        }

        match event.key {
            Key::Escape if has_cursor => {
                store.clear_selection();
                KeyOutcome::SelectionCleared
            }
            _ => KeyOutcome::Ignored,
        }
    }

    fn begin_card_edit(&mut self, store: &BoardStore, seed: String) -> KeyOutcome {
        let Some(cursor) = store.selection().cursor() else {
            return KeyOutcome::Ignored;
        };
        let (Some((board, _)), Some(card)) = (store.locate_list(&cursor.list_id), store.selected_card())
        else {
            return KeyOutcome::Rejected;
        };

        self.mode = Mode::Editing(EditSession {
            target: EditTarget::Card {
                board_id: board.id.clone(),
                card_id: card.id.clone(),
            },
            buffer: seed,
        });
        KeyOutcome::EditStarted
    }

    fn begin_quick_add(&mut self, store: &BoardStore, seed: String) -> KeyOutcome {
        let Some(list_id) = store.selection().active_list() else {
            return KeyOutcome::Ignored;
        };
        let Some((board, _)) = store.locate_list(list_id) else {
            return KeyOutcome::Rejected;
        };

        self.mode = Mode::Editing(EditSession {
            target: EditTarget::QuickAdd {
                board_id: board.id.clone(),
                list_id: list_id.clone(),
            },
            buffer: seed,
        });
        KeyOutcome::EditStarted
    }

    fn handle_editing(&mut self, store: &mut BoardStore, key: Key) -> KeyOutcome {
        let Mode::Editing(session) = &mut self.mode else {
            return KeyOutcome::Ignored;
        };

        match key {
            Key::Char(c) => {
                session.buffer.push(c);
                KeyOutcome::BufferChanged
            }
            Key::Backspace => {
                session.buffer.pop();
                KeyOutcome::BufferChanged
            }
            Key::Escape => {
                self.mode = Mode::Browsing;
                KeyOutcome::Discarded
            }
            Key::Enter => self.commit(store),
            Key::Left | Key::Right | Key::Up | Key::Down => KeyOutcome::Ignored,
        }
    }

    fn commit(&mut self, store: &mut BoardStore) -> KeyOutcome {
        let Mode::Editing(session) = &self.mode else {
            return KeyOutcome::Ignored;
        };

        let result = match &session.target {
            EditTarget::Card { board_id, card_id } => {
                rename_card(store, board_id, card_id, &session.buffer)
            }
            EditTarget::QuickAdd { board_id, list_id } => {
                store.add_card(board_id, list_id, &session.buffer)
            }
        };

        match result {
            Ok(id) => {
                self.mode = Mode::Browsing;
                KeyOutcome::Committed(id)
            }
            // Keep the editor open so the title can be corrected.
            Err(PinboardError::EmptyTitle) => KeyOutcome::Rejected,
            Err(e) => {
                tracing::debug!(error = %e, "edit target vanished, closing editor");
                self.mode = Mode::Browsing;
                KeyOutcome::Rejected
            }
        }
    }
}

/// Renames a card in whichever list currently holds it, since the card may
/// have been dragged while its editor was open.
fn rename_card(
    store: &mut BoardStore,
    board_id: &Identifier,
    card_id: &Identifier,
    title: &str,
) -> Result<Identifier> {
    let board = store
        .board(board_id)
        .ok_or_else(|| PinboardError::BoardNotFound(board_id.to_string()))?;
    let location = board
        .find_card(card_id)
        .ok_or_else(|| PinboardError::CardNotFound(card_id.to_string()))?;
    let list_id = board.lists[location.list_index].id.clone();

    store.edit_card(board_id, &list_id, card_id, CardPatch::new().title(title))?;
    Ok(card_id.clone())
}
