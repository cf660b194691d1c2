//! The board store: sole owner of the board tree and the selection.
//!
//! Every mutation validates its references before touching anything, so an
//! `Err` always means the tree, the selection and the persistence queue are
//! exactly as they were. A successful mutation re-resolves the selected card
//! by identity and then queues a snapshot for saving.

use crate::config::BoardConfig;
use crate::domain::card::normalize_title;
use crate::domain::{
    Board, Card, CardLocation, CardPatch, Direction, IdGenerator, Identifier, List, Selection,
    SelectionCursor, Step,
};
use crate::error::{PinboardError, Result};
use crate::storage::{PersistenceAdapter, Storage};
use std::sync::Arc;

/// What an arrow key does to the selected card
enum NavPlan {
    Reorder {
        board_id: Identifier,
        list_id: Identifier,
        card_index: usize,
    },
    Cross {
        board_id: Identifier,
        card_id: Identifier,
        to_list_id: Identifier,
    },
}

pub struct BoardStore {
    boards: Vec<Board>,
    selection: Selection,
    ids: IdGenerator,
    persistence: PersistenceAdapter,
}

impl BoardStore {
    /// Loads saved boards, seeding a default board when there are none.
    /// Must be called inside a tokio runtime.
    pub async fn open(storage: Arc<dyn Storage>, config: &BoardConfig) -> Self {
        let persistence = PersistenceAdapter::spawn(storage);
        let mut ids = IdGenerator::new();
        let mut boards = persistence.load().await;

        if boards.is_empty() {
            tracing::info!(title = %config.title, "no saved boards, creating default board");
            boards.push(Board::seeded(config, &mut ids));
            persistence.save(&boards);
        }

        Self {
            boards,
            selection: Selection::default(),
            ids,
            persistence,
        }
    }

    /// All boards in display order
    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn board(&self, board_id: &Identifier) -> Option<&Board> {
        self.boards.iter().find(|board| &board.id == board_id)
    }

    /// Total cards across a board's lists
    pub fn card_count(&self, board_id: &Identifier) -> Option<usize> {
        self.board(board_id).map(Board::card_count)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The card under the cursor, if any
    pub fn selected_card(&self) -> Option<&Card> {
        let cursor = self.selection.cursor()?;
        let (board, list_index) = self.locate_list(&cursor.list_id)?;
        board.lists[list_index].cards.get(cursor.card_index)
    }

    /// Finds the board owning a list, with the list's index in it
    pub fn locate_list(&self, list_id: &Identifier) -> Option<(&Board, usize)> {
        self.boards
            .iter()
            .find_map(|board| board.list_index(list_id).map(|index| (board, index)))
    }

    pub fn persistence(&self) -> &PersistenceAdapter {
        &self.persistence
    }

    /// Waits for every queued snapshot to reach storage
    pub async fn flush(&self) {
        self.persistence.flush().await;
    }

    /// Writes every queued snapshot and stops the writer. Dropping the store
    /// without calling this or [`flush`](Self::flush) may lose the last saves.
    pub async fn close(self) {
        self.persistence.close().await;
    }

    // Boards

    /// Appends an empty board with a trimmed, non-blank title
    pub fn add_board(&mut self, title: &str) -> Result<Identifier> {
        self.commit("add_board", |boards, ids| {
            let title = normalize_title(title)?;
            let id = ids.next_id();
            boards.push(Board::new(id.clone(), title));
            Ok(id)
        })
    }

    /// Renames a board
    pub fn edit_board(&mut self, board_id: &Identifier, title: &str) -> Result<()> {
        self.commit("edit_board", |boards, _| {
            find_board(boards, board_id)?.rename(title)
        })
    }

    /// Removes a board with all of its lists and cards
    pub fn delete_board(&mut self, board_id: &Identifier) -> Result<Board> {
        self.commit("delete_board", |boards, _| {
            let index = boards
                .iter()
                .position(|board| &board.id == board_id)
                .ok_or_else(|| PinboardError::BoardNotFound(board_id.to_string()))?;
            Ok(boards.remove(index))
        })
    }

    // Lists

    /// Appends an empty list to a board
    pub fn add_list(&mut self, board_id: &Identifier, title: &str) -> Result<Identifier> {
        self.commit("add_list", |boards, ids| {
            let board = find_board(boards, board_id)?;
            let list = board.add_list(ids.next_id(), title)?;
            Ok(list.id.clone())
        })
    }

    /// Renames a list
    pub fn edit_list(&mut self, board_id: &Identifier, list_id: &Identifier, title: &str) -> Result<()> {
        self.commit("edit_list", |boards, _| {
            find_board(boards, board_id)?.rename_list(list_id, title)
        })
    }

    /// Removes a list and every card in it
    pub fn delete_list(&mut self, board_id: &Identifier, list_id: &Identifier) -> Result<List> {
        self.commit("delete_list", |boards, _| {
            find_board(boards, board_id)?.remove_list(list_id)
        })
    }

    /// Swaps a list with its neighbour; rejected at either end
    pub fn move_list(&mut self, board_id: &Identifier, list_id: &Identifier, step: Step) -> Result<usize> {
        self.commit("move_list", |boards, _| {
            find_board(boards, board_id)?.move_list(list_id, step)
        })
    }

    /// Moves a list to `to_index`, clamped to the last position
    pub fn move_list_to(
        &mut self,
        board_id: &Identifier,
        list_id: &Identifier,
        to_index: usize,
    ) -> Result<usize> {
        self.commit("move_list_to", |boards, _| {
            find_board(boards, board_id)?.move_list_to(list_id, to_index)
        })
    }

    // Cards

    /// Appends a new card with no description, labels, checklist or due date
    pub fn add_card(&mut self, board_id: &Identifier, list_id: &Identifier, title: &str) -> Result<Identifier> {
        self.commit("add_card", |boards, ids| {
            let board = find_board(boards, board_id)?;
            let id = ids.next_id();
            board.add_card(list_id, id.clone(), title)?;
            Ok(id)
        })
    }

    /// Applies a partial update; a blank title rejects the whole patch
    pub fn edit_card(
        &mut self,
        board_id: &Identifier,
        list_id: &Identifier,
        card_id: &Identifier,
        patch: CardPatch,
    ) -> Result<()> {
        self.commit("edit_card", |boards, _| {
            find_board(boards, board_id)?.edit_card(list_id, card_id, patch)
        })
    }

    /// Removes a card. A selection later in the same list shifts down with
    /// its card; a selection on the removed card is cleared.
    pub fn delete_card(
        &mut self,
        board_id: &Identifier,
        list_id: &Identifier,
        card_id: &Identifier,
    ) -> Result<Card> {
        self.commit("delete_card", |boards, _| {
            find_board(boards, board_id)?.remove_card(list_id, card_id)
        })
    }

    /// Moves a card to `to_list_id`. See [`Board::move_card`] for how
    /// `to_index` is interpreted.
    pub fn move_card(
        &mut self,
        board_id: &Identifier,
        card_id: &Identifier,
        to_list_id: &Identifier,
        to_index: Option<usize>,
    ) -> Result<CardLocation> {
        self.commit("move_card", |boards, _| {
            find_board(boards, board_id)?.move_card(card_id, to_list_id, to_index)
        })
    }

    /// Swaps the card at `card_index` with its neighbour in the same list
    pub fn reorder_card_in_list(
        &mut self,
        board_id: &Identifier,
        list_id: &Identifier,
        card_index: usize,
        step: Step,
    ) -> Result<usize> {
        self.commit("reorder_card_in_list", |boards, _| {
            find_board(boards, board_id)?.reorder_card(list_id, card_index, step)
        })
    }

    // Selection

    /// Selects a card and makes its list the active lane
    pub fn select_card(&mut self, list_id: &Identifier, card_index: usize) -> Result<()> {
        let (board, list_index) = self
            .locate_list(list_id)
            .ok_or_else(|| PinboardError::ListNotFound(list_id.to_string()))?;
        let len = board.lists[list_index].cards.len();
        if card_index >= len {
            return Err(PinboardError::IndexOutOfRange {
                index: card_index,
                len,
            });
        }
        self.selection
            .select(SelectionCursor::new(list_id.clone(), card_index));
        Ok(())
    }

    /// Drops the card selection; the active lane stays
    pub fn clear_selection(&mut self) {
        self.selection.clear_cursor();
    }

    /// Sets or clears the lane that quick-add targets
    pub fn set_active_lane(&mut self, list_id: Option<&Identifier>) -> Result<()> {
        if let Some(list_id) = list_id {
            if self.locate_list(list_id).is_none() {
                return Err(PinboardError::ListNotFound(list_id.to_string()));
            }
        }
        self.selection.set_active_list(list_id.cloned());
        Ok(())
    }

    /// Moves the selected card: up/down within its list, left/right to the
    /// end of the neighbouring list. The cursor follows the card.
    pub fn navigate(&mut self, direction: Direction) -> Result<SelectionCursor> {
        let plan = match self.navigation_plan(direction) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::debug!(operation = "navigate", %direction, error = %e, "rejected");
                return Err(e);
            }
        };

        match plan {
            NavPlan::Reorder {
                board_id,
                list_id,
                card_index,
            } => {
                self.reorder_card_in_list(&board_id, &list_id, card_index, direction.step())?;
            }
            NavPlan::Cross {
                board_id,
                card_id,
                to_list_id,
            } => {
                self.move_card(&board_id, &card_id, &to_list_id, None)?;
            }
        }

        self.selection.cursor().cloned().ok_or(PinboardError::NoSelection)
    }

    fn navigation_plan(&self, direction: Direction) -> Result<NavPlan> {
        let cursor = self.selection.cursor().ok_or(PinboardError::NoSelection)?;
        let (board, list_index) = self
            .locate_list(&cursor.list_id)
            .ok_or_else(|| PinboardError::ListNotFound(cursor.list_id.to_string()))?;

        if direction.is_vertical() {
            return Ok(NavPlan::Reorder {
                board_id: board.id.clone(),
                list_id: cursor.list_id.clone(),
                card_index: cursor.card_index,
            });
        }

        let card = board.lists[list_index]
            .cards
            .get(cursor.card_index)
            .ok_or(PinboardError::IndexOutOfRange {
                index: cursor.card_index,
                len: board.lists[list_index].cards.len(),
            })?;
        let target = direction
            .step()
            .apply(list_index, board.lists.len())
            .ok_or(PinboardError::AtBoundary)?;

        Ok(NavPlan::Cross {
            board_id: board.id.clone(),
            card_id: card.id.clone(),
            to_list_id: board.lists[target].id.clone(),
        })
    }

    fn commit<T>(
        &mut self,
        operation: &'static str,
        mutate: impl FnOnce(&mut Vec<Board>, &mut IdGenerator) -> Result<T>,
    ) -> Result<T> {
        let anchor = self.selected_card_id();

        match mutate(&mut self.boards, &mut self.ids) {
            Ok(value) => {
                self.reconcile_selection(anchor);
                self.persistence.save(&self.boards);
                tracing::trace!(operation, "committed");
                Ok(value)
            }
            Err(e) if e.is_rejection() => {
                tracing::debug!(operation, error = %e, "rejected");
                Err(e)
            }
            Err(e) => {
                tracing::warn!(operation, error = %e, "failed");
                Err(e)
            }
        }
    }

    fn selected_card_id(&self) -> Option<Identifier> {
        self.selected_card().map(|card| card.id.clone())
    }

    /// Points the cursor back at the card it referred to before a mutation,
    /// or clears it if that card is gone.
    fn reconcile_selection(&mut self, anchor: Option<Identifier>) {
        match anchor.and_then(|card_id| locate_card(&self.boards, &card_id)) {
            Some(cursor) => self.selection.select(cursor),
            None => self.selection.clear_cursor(),
        }

        let stale_lane = self
            .selection
            .active_list()
            .is_some_and(|list_id| self.locate_list(list_id).is_none());
        if stale_lane {
            self.selection.set_active_list(None);
        }
    }
}

fn find_board<'a>(boards: &'a mut [Board], board_id: &Identifier) -> Result<&'a mut Board> {
    boards
        .iter_mut()
        .find(|board| &board.id == board_id)
        .ok_or_else(|| PinboardError::BoardNotFound(board_id.to_string()))
}

fn locate_card(boards: &[Board], card_id: &Identifier) -> Option<SelectionCursor> {
    boards.iter().find_map(|board| {
        board.find_card(card_id).map(|loc| {
            SelectionCursor::new(board.lists[loc.list_index].id.clone(), loc.card_index)
        })
    })
}
