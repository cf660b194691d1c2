//! Drag-and-drop coordination.
//!
//! One [`DragCoordinator`] tracks one pointer interaction at a time. It never
//! touches the board tree itself; a drop is resolved into a single
//! [`BoardStore`] call.

use crate::domain::{Board, CardLocation, Identifier};
use crate::error::{PinboardError, Result};
use crate::store::BoardStore;
use serde::{Deserialize, Serialize};

/// What is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Card,
    List,
}

/// Structured data carried with a card drag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    pub card_id: Identifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_list_id: Option<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_index: Option<usize>,
}

impl DragPayload {
    pub fn new(card_id: Identifier, source_list_id: Identifier, source_index: usize) -> Self {
        Self {
            card_id,
            source_list_id: Some(source_list_id),
            source_index: Some(source_index),
        }
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reads the payload back from a drop. The JSON form wins; the plain-text
    /// card ID is the fallback.
    pub fn decode(plain: Option<&str>, json: Option<&str>) -> Option<Self> {
        if let Some(payload) = json.and_then(|raw| serde_json::from_str::<DragPayload>(raw).ok()) {
            return Some(payload);
        }
        let card_id = plain?.parse::<Identifier>().ok()?;
        Some(Self {
            card_id,
            source_list_id: None,
            source_index: None,
        })
    }

    /// Whether the recorded source slot still holds the card. A payload
    /// without source details always matches.
    pub fn source_matches(&self, board: &Board) -> bool {
        let (Some(list_id), Some(index)) = (&self.source_list_id, self.source_index) else {
            return true;
        };
        board
            .list(list_id)
            .and_then(|list| list.cards.get(index))
            .is_some_and(|card| card.id == self.card_id)
    }
}

/// Where the pointer is over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// A list's background: append semantics
    ListBody { list_id: Identifier },
    /// A specific card position inside a list
    CardSlot { list_id: Identifier, index: usize },
}

impl DropTarget {
    pub fn list_id(&self) -> &Identifier {
        match self {
            Self::ListBody { list_id } | Self::CardSlot { list_id, .. } => list_id,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Self::ListBody { .. } => None,
            Self::CardSlot { index, .. } => Some(*index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub board_id: Identifier,
    pub kind: DragKind,
    pub entity_id: Identifier,
    pub payload: Option<DragPayload>,
    pub hover: Option<DropTarget>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Result of a completed drop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    CardMoved(CardLocation),
    ListMoved(usize),
}

#[derive(Debug, Default)]
pub struct DragCoordinator {
    state: DragState,
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Idle -> Dragging. A stale session, if any, is discarded.
    pub fn start(&mut self, board_id: Identifier, kind: DragKind, entity_id: Identifier) {
        self.begin(DragSession {
            board_id,
            kind,
            entity_id,
            payload: None,
            hover: None,
        });
    }

    /// Starts a card drag from the transfer data of a drag-start event
    pub fn start_card(&mut self, board_id: Identifier, payload: DragPayload) {
        self.begin(DragSession {
            board_id,
            kind: DragKind::Card,
            entity_id: payload.card_id.clone(),
            payload: Some(payload),
            hover: None,
        });
    }

    fn begin(&mut self, session: DragSession) {
        if let DragState::Dragging(stale) = &self.state {
            tracing::debug!(entity = %stale.entity_id, "discarding unfinished drag");
        }
        tracing::trace!(entity = %session.entity_id, kind = ?session.kind, "drag started");
        self.state = DragState::Dragging(session);
    }

    /// Records the hovered target for previewing. Returns false when idle.
    pub fn hover(&mut self, target: DropTarget) -> bool {
        match &mut self.state {
            DragState::Dragging(session) => {
                session.hover = Some(target);
                true
            }
            DragState::Idle => false,
        }
    }

    /// Dragging -> Idle without touching the store
    pub fn cancel(&mut self) -> Option<DragSession> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => {
                tracing::trace!(entity = %session.entity_id, "drag cancelled");
                Some(session)
            }
            DragState::Idle => None,
        }
    }

    /// Dragging -> Idle, applying the move to the store.
    ///
    /// A card dropped on a card slot is inserted at that slot's index, taken
    /// after the card has left its source list; on a list body it is
    /// appended. A list dropped anywhere in another list takes that list's
    /// position. The coordinator is idle afterwards even if the store rejects
    /// the move.
    pub fn drop_on(&mut self, target: DropTarget, store: &mut BoardStore) -> Result<DropOutcome> {
        let session = match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => session,
            DragState::Idle => return Err(PinboardError::NoActiveDrag),
        };

        match session.kind {
            DragKind::Card => {
                // The store finds the card by ID, so a stale source only gets logged.
                if let (Some(payload), Some(board)) = (&session.payload, store.board(&session.board_id)) {
                    if !payload.source_matches(board) {
                        tracing::debug!(card = %payload.card_id, "drag source moved since drag start");
                    }
                }
                store
                    .move_card(
                        &session.board_id,
                        &session.entity_id,
                        target.list_id(),
                        target.index(),
                    )
                    .map(DropOutcome::CardMoved)
            }
            DragKind::List => {
                let to_index = store
                    .board(&session.board_id)
                    .ok_or_else(|| PinboardError::BoardNotFound(session.board_id.to_string()))?
                    .list_index(target.list_id())
                    .ok_or_else(|| PinboardError::ListNotFound(target.list_id().to_string()))?;
                store
                    .move_list_to(&session.board_id, &session.entity_id, to_index)
                    .map(DropOutcome::ListMoved)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    async fn open_store() -> BoardStore {
        BoardStore::open(Arc::new(MemoryStorage::new()), &BoardConfig::default()).await
    }

    fn board_ids(store: &BoardStore) -> (Identifier, Vec<Identifier>) {
        let board = &store.boards()[0];
        (
            board.id.clone(),
            board.lists.iter().map(|l| l.id.clone()).collect(),
        )
    }

    fn titles(store: &BoardStore, list_index: usize) -> Vec<String> {
        store.boards()[0].lists[list_index]
            .cards
            .iter()
            .map(|c| c.title.clone())
            .collect()
    }

    #[test]
    fn test_payload_decode_prefers_json() {
        let payload = DragPayload::new("c1".parse().unwrap(), "l1".parse().unwrap(), 3);
        let json = payload.encode().unwrap();
        assert!(json.contains("\"sourceListId\""));

        let decoded = DragPayload::decode(Some("other"), Some(&json)).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_payload_decode_falls_back_to_plain_text() {
        let decoded = DragPayload::decode(Some("c9"), Some("{garbage")).unwrap();
        assert_eq!(decoded.card_id.as_str(), "c9");
        assert!(decoded.source_list_id.is_none());

        assert!(DragPayload::decode(None, None).is_none());
        assert!(DragPayload::decode(Some("  "), None).is_none());
    }

    #[test]
    fn test_hover_and_cancel() {
        let mut dnd = DragCoordinator::new();
        let list: Identifier = "l1".parse().unwrap();
        assert!(!dnd.hover(DropTarget::ListBody { list_id: list.clone() }));

        dnd.start("b".parse().unwrap(), DragKind::Card, "c".parse().unwrap());
        assert!(dnd.hover(DropTarget::CardSlot { list_id: list.clone(), index: 0 }));
        match dnd.state() {
            DragState::Dragging(session) => {
                assert_eq!(session.hover.as_ref().unwrap().index(), Some(0))
            }
            DragState::Idle => panic!("expected an active drag"),
        }

        assert!(dnd.cancel().is_some());
        assert!(!dnd.is_dragging());
        assert!(dnd.cancel().is_none());
    }

    #[tokio::test]
    async fn test_drop_on_list_body_appends() {
        let mut store = open_store().await;
        let (board, lists) = board_ids(&store);
        let card = store.add_card(&board, &lists[0], "A").unwrap();
        store.add_card(&board, &lists[1], "X").unwrap();

        let mut dnd = DragCoordinator::new();
        dnd.start_card(board.clone(), DragPayload::new(card, lists[0].clone(), 0));
        let outcome = dnd
            .drop_on(DropTarget::ListBody { list_id: lists[1].clone() }, &mut store)
            .unwrap();

        assert_eq!(
            outcome,
            DropOutcome::CardMoved(CardLocation { list_index: 1, card_index: 1 })
        );
        assert_eq!(titles(&store, 1), vec!["X", "A"]);
        assert!(!dnd.is_dragging());
    }

    #[tokio::test]
    async fn test_stale_source_still_moves_by_id() {
        let mut store = open_store().await;
        let (board, lists) = board_ids(&store);
        let card = store.add_card(&board, &lists[0], "A").unwrap();
        let payload = DragPayload::new(card.clone(), lists[0].clone(), 0);
        assert!(payload.source_matches(&store.boards()[0]));

        // Moved by another gesture while the drag was in flight.
        store.move_card(&board, &card, &lists[2], None).unwrap();
        assert!(!payload.source_matches(&store.boards()[0]));

        let mut dnd = DragCoordinator::new();
        dnd.start_card(board.clone(), payload);
        let outcome = dnd
            .drop_on(DropTarget::ListBody { list_id: lists[1].clone() }, &mut store)
            .unwrap();

        assert_eq!(
            outcome,
            DropOutcome::CardMoved(CardLocation { list_index: 1, card_index: 0 })
        );
        assert!(titles(&store, 2).is_empty());
        assert_eq!(titles(&store, 1), vec!["A"]);
    }

    #[test]
    fn test_payload_without_source_always_matches() {
        let mut ids = crate::domain::IdGenerator::new();
        let board = Board::seeded(&BoardConfig::default(), &mut ids);
        let payload = DragPayload::decode(Some("c1"), None).unwrap();
        assert!(payload.source_matches(&board));
    }

    #[tokio::test]
    async fn test_drop_on_card_slot_inserts() {
        let mut store = open_store().await;
        let (board, lists) = board_ids(&store);
        let card = store.add_card(&board, &lists[0], "A").unwrap();
        store.add_card(&board, &lists[1], "X").unwrap();
        store.add_card(&board, &lists[1], "Y").unwrap();

        let mut dnd = DragCoordinator::new();
        dnd.start(board.clone(), DragKind::Card, card);
        dnd.drop_on(
            DropTarget::CardSlot { list_id: lists[1].clone(), index: 1 },
            &mut store,
        )
        .unwrap();

        assert_eq!(titles(&store, 1), vec!["X", "A", "Y"]);
    }

    #[tokio::test]
    async fn test_same_list_drop_index_is_post_removal() {
        let mut store = open_store().await;
        let (board, lists) = board_ids(&store);
        let a = store.add_card(&board, &lists[0], "A").unwrap();
        store.add_card(&board, &lists[0], "B").unwrap();
        store.add_card(&board, &lists[0], "C").unwrap();

        let mut dnd = DragCoordinator::new();
        dnd.start(board.clone(), DragKind::Card, a);
        dnd.drop_on(
            DropTarget::CardSlot { list_id: lists[0].clone(), index: 1 },
            &mut store,
        )
        .unwrap();

        // [B, C] after removal, then A goes to index 1.
        assert_eq!(titles(&store, 0), vec!["B", "A", "C"]);
    }

    #[tokio::test]
    async fn test_drop_onto_itself_is_idempotent() {
        let mut store = open_store().await;
        let (board, lists) = board_ids(&store);
        store.add_card(&board, &lists[0], "A").unwrap();
        let b = store.add_card(&board, &lists[0], "B").unwrap();
        store.add_card(&board, &lists[0], "C").unwrap();
        let before = store.boards().to_vec();

        let mut dnd = DragCoordinator::new();
        dnd.start(board.clone(), DragKind::Card, b);
        dnd.drop_on(
            DropTarget::CardSlot { list_id: lists[0].clone(), index: 1 },
            &mut store,
        )
        .unwrap();

        assert_eq!(store.boards(), before.as_slice());
    }

    #[tokio::test]
    async fn test_cancelled_drag_does_not_mutate() {
        let mut store = open_store().await;
        let (board, lists) = board_ids(&store);
        let card = store.add_card(&board, &lists[0], "A").unwrap();
        let before = store.boards().to_vec();

        let mut dnd = DragCoordinator::new();
        dnd.start(board, DragKind::Card, card);
        dnd.hover(DropTarget::ListBody { list_id: lists[2].clone() });
        dnd.cancel();

        assert!(matches!(
            dnd.drop_on(DropTarget::ListBody { list_id: lists[2].clone() }, &mut store),
            Err(PinboardError::NoActiveDrag)
        ));
        assert_eq!(store.boards(), before.as_slice());
    }

    #[tokio::test]
    async fn test_drop_of_deleted_card_is_noop() {
        let mut store = open_store().await;
        let (board, lists) = board_ids(&store);
        let card = store.add_card(&board, &lists[0], "A").unwrap();

        let mut dnd = DragCoordinator::new();
        dnd.start(board.clone(), DragKind::Card, card.clone());
        store.delete_card(&board, &lists[0], &card).unwrap();
        let before = store.boards().to_vec();

        assert!(matches!(
            dnd.drop_on(DropTarget::ListBody { list_id: lists[1].clone() }, &mut store),
            Err(PinboardError::CardNotFound(_))
        ));
        assert_eq!(store.boards(), before.as_slice());
        assert!(!dnd.is_dragging());
    }

    #[tokio::test]
    async fn test_list_drag_reorders_lists() {
        let mut store = open_store().await;
        let (board, lists) = board_ids(&store);

        let mut dnd = DragCoordinator::new();
        dnd.start(board.clone(), DragKind::List, lists[2].clone());
        let outcome = dnd
            .drop_on(DropTarget::ListBody { list_id: lists[0].clone() }, &mut store)
            .unwrap();

        assert_eq!(outcome, DropOutcome::ListMoved(0));
        let order: Vec<Identifier> = store.boards()[0].lists.iter().map(|l| l.id.clone()).collect();
        assert_eq!(order, vec![lists[2].clone(), lists[0].clone(), lists[1].clone()]);
    }
}
