use crate::config::BoardConfig;
use crate::domain::card::{normalize_title, Card, CardPatch};
use crate::domain::id::{IdGenerator, Identifier};
use crate::domain::selection::Step;
use crate::error::{PinboardError, Result};
use serde::{Deserialize, Serialize};

/// An ordered column of cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: Identifier,
    pub title: String,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl List {
    pub fn new(id: Identifier, title: String) -> Self {
        Self {
            id,
            title,
            cards: Vec::new(),
        }
    }

    /// Position of a card in this list
    pub fn card_index(&self, card_id: &Identifier) -> Option<usize> {
        self.cards.iter().position(|card| &card.id == card_id)
    }
}

/// Where a card sits inside a board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardLocation {
    pub list_index: usize,
    pub card_index: usize,
}

/// A kanban board: the unit of persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: Identifier,
    pub title: String,
    #[serde(default)]
    pub lists: Vec<List>,
}

impl Board {
    pub fn new(id: Identifier, title: String) -> Self {
        Self {
            id,
            title,
            lists: Vec::new(),
        }
    }

    /// Builds the board used when nothing has been saved yet
    pub fn seeded(config: &BoardConfig, ids: &mut IdGenerator) -> Self {
        let mut board = Self::new(ids.next_id(), config.title.clone());
        board.lists = config
            .lists
            .iter()
            .map(|title| List::new(ids.next_id(), title.clone()))
            .collect();
        board
    }

    pub fn list(&self, list_id: &Identifier) -> Option<&List> {
        self.lists.iter().find(|list| &list.id == list_id)
    }

    pub fn list_index(&self, list_id: &Identifier) -> Option<usize> {
        self.lists.iter().position(|list| &list.id == list_id)
    }

    fn list_mut(&mut self, list_id: &Identifier) -> Result<&mut List> {
        self.lists
            .iter_mut()
            .find(|list| &list.id == list_id)
            .ok_or_else(|| PinboardError::ListNotFound(list_id.to_string()))
    }

    /// Scans every list for the card
    pub fn find_card(&self, card_id: &Identifier) -> Option<CardLocation> {
        self.lists
            .iter()
            .enumerate()
            .find_map(|(list_index, list)| {
                list.card_index(card_id).map(|card_index| CardLocation {
                    list_index,
                    card_index,
                })
            })
    }

    pub fn card(&self, card_id: &Identifier) -> Option<&Card> {
        self.find_card(card_id)
            .map(|loc| &self.lists[loc.list_index].cards[loc.card_index])
    }

    pub fn card_count(&self) -> usize {
        self.lists.iter().map(|list| list.cards.len()).sum()
    }

    pub fn rename(&mut self, title: &str) -> Result<()> {
        self.title = normalize_title(title)?;
        Ok(())
    }

    pub fn add_list(&mut self, id: Identifier, title: &str) -> Result<&List> {
        let title = normalize_title(title)?;
        self.lists.push(List::new(id, title));
        Ok(&self.lists[self.lists.len() - 1])
    }

    pub fn rename_list(&mut self, list_id: &Identifier, title: &str) -> Result<()> {
        let title = normalize_title(title)?;
        self.list_mut(list_id)?.title = title;
        Ok(())
    }

    /// Removes a list together with all of its cards
    pub fn remove_list(&mut self, list_id: &Identifier) -> Result<List> {
        let index = self
            .list_index(list_id)
            .ok_or_else(|| PinboardError::ListNotFound(list_id.to_string()))?;
        Ok(self.lists.remove(index))
    }

    /// Swaps a list with its neighbour; returns the new index
    pub fn move_list(&mut self, list_id: &Identifier, step: Step) -> Result<usize> {
        let index = self
            .list_index(list_id)
            .ok_or_else(|| PinboardError::ListNotFound(list_id.to_string()))?;
        let target = step
            .apply(index, self.lists.len())
            .ok_or(PinboardError::AtBoundary)?;
        self.lists.swap(index, target);
        Ok(target)
    }

    /// Moves a list to an absolute position, clamped to the end
    pub fn move_list_to(&mut self, list_id: &Identifier, to_index: usize) -> Result<usize> {
        let index = self
            .list_index(list_id)
            .ok_or_else(|| PinboardError::ListNotFound(list_id.to_string()))?;
        let list = self.lists.remove(index);
        let target = to_index.min(self.lists.len());
        self.lists.insert(target, list);
        Ok(target)
    }

    /// Appends a card to a list; returns its index
    pub fn add_card(&mut self, list_id: &Identifier, id: Identifier, title: &str) -> Result<usize> {
        let title = normalize_title(title)?;
        let list = self.list_mut(list_id)?;
        list.cards.push(Card::new(id, title));
        Ok(list.cards.len() - 1)
    }

    pub fn edit_card(
        &mut self,
        list_id: &Identifier,
        card_id: &Identifier,
        patch: CardPatch,
    ) -> Result<()> {
        let card = self
            .list_mut(list_id)?
            .cards
            .iter_mut()
            .find(|card| &card.id == card_id)
            .ok_or_else(|| PinboardError::CardNotFound(card_id.to_string()))?;
        card.apply(patch)
    }

    pub fn remove_card(&mut self, list_id: &Identifier, card_id: &Identifier) -> Result<Card> {
        let list = self.list_mut(list_id)?;
        let index = list
            .card_index(card_id)
            .ok_or_else(|| PinboardError::CardNotFound(card_id.to_string()))?;
        Ok(list.cards.remove(index))
    }

    /// Moves a card to another (or the same) list.
    ///
    /// `to_index` is a position in the destination list *after* the card has
    /// been taken out of its source. An index past the end, or `None`,
    /// appends. Both references are checked before anything changes.
    pub fn move_card(
        &mut self,
        card_id: &Identifier,
        to_list_id: &Identifier,
        to_index: Option<usize>,
    ) -> Result<CardLocation> {
        let from = self
            .find_card(card_id)
            .ok_or_else(|| PinboardError::CardNotFound(card_id.to_string()))?;
        let to_list_index = self
            .list_index(to_list_id)
            .ok_or_else(|| PinboardError::ListNotFound(to_list_id.to_string()))?;

        let card = self.lists[from.list_index].cards.remove(from.card_index);
        let cards = &mut self.lists[to_list_index].cards;
        let card_index = match to_index {
            Some(index) if index <= cards.len() => index,
            _ => cards.len(),
        };
        cards.insert(card_index, card);

        Ok(CardLocation {
            list_index: to_list_index,
            card_index,
        })
    }

    /// Swaps a card with its neighbour in the same list; returns the new index
    pub fn reorder_card(&mut self, list_id: &Identifier, card_index: usize, step: Step) -> Result<usize> {
        let cards = &mut self.list_mut(list_id)?.cards;
        if card_index >= cards.len() {
            return Err(PinboardError::IndexOutOfRange {
                index: card_index,
                len: cards.len(),
            });
        }
        let target = step
            .apply(card_index, cards.len())
            .ok_or(PinboardError::AtBoundary)?;
        cards.swap(card_index, target);
        Ok(target)
    }
}
