use crate::domain::id::Identifier;
use std::{fmt, str::FromStr};

/// One-step shift used by list and card reordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Towards index 0 (-1)
    Previous,
    /// Towards the end (+1)
    Next,
}

impl Step {
    /// Maps -1 / +1 onto a step; anything else is rejected
    pub fn from_offset(offset: i32) -> Option<Self> {
        match offset {
            -1 => Some(Self::Previous),
            1 => Some(Self::Next),
            _ => None,
        }
    }

    /// Index one step away from `index`, or `None` past either boundary
    pub fn apply(self, index: usize, len: usize) -> Option<usize> {
        match self {
            Self::Previous => index.checked_sub(1),
            Self::Next => index.checked_add(1).filter(|next| *next < len),
        }
    }
}

/// Arrow-key direction used by keyboard navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Up/down reorder inside a list, left/right cross to a neighbouring list
    pub fn step(self) -> Step {
        match self {
            Self::Left | Self::Up => Step::Previous,
            Self::Right | Self::Down => Step::Next,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(format!(
                "Invalid direction '{}'. Valid directions: left, right, up, down",
                s
            )),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// Position of the selected card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCursor {
    pub list_id: Identifier,
    pub card_index: usize,
}

impl SelectionCursor {
    pub fn new(list_id: Identifier, card_index: usize) -> Self {
        Self {
            list_id,
            card_index,
        }
    }
}

/// Transient UI selection: the selected card and the active lane.
///
/// Whenever a cursor is set, the active lane is the cursor's list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    cursor: Option<SelectionCursor>,
    active_list: Option<Identifier>,
}

impl Selection {
    pub fn cursor(&self) -> Option<&SelectionCursor> {
        self.cursor.as_ref()
    }

    pub fn active_list(&self) -> Option<&Identifier> {
        self.active_list.as_ref()
    }

    /// Selects a card and makes its list the active lane
    pub fn select(&mut self, cursor: SelectionCursor) {
        self.active_list = Some(cursor.list_id.clone());
        self.cursor = Some(cursor);
    }

    /// Drops the card cursor but keeps the active lane
    pub fn clear_cursor(&mut self) {
        self.cursor = None;
    }

    /// Changes the active lane. A cursor in another list is dropped.
    pub fn set_active_list(&mut self, list_id: Option<Identifier>) {
        if self
            .cursor
            .as_ref()
            .is_some_and(|cursor| Some(&cursor.list_id) != list_id.as_ref())
        {
            self.cursor = None;
        }
        self.active_list = list_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identifier {
        s.parse().unwrap()
    }

    #[test]
    fn test_step_boundaries() {
        assert_eq!(Step::Previous.apply(0, 3), None);
        assert_eq!(Step::Previous.apply(2, 3), Some(1));
        assert_eq!(Step::Next.apply(2, 3), None);
        assert_eq!(Step::Next.apply(0, 3), Some(1));
        assert_eq!(Step::Next.apply(0, 0), None);
    }

    #[test]
    fn test_step_from_offset() {
        assert_eq!(Step::from_offset(-1), Some(Step::Previous));
        assert_eq!(Step::from_offset(1), Some(Step::Next));
        assert_eq!(Step::from_offset(0), None);
        assert_eq!(Step::from_offset(2), None);
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("LEFT".parse::<Direction>().unwrap(), Direction::Left);
        assert_eq!("down".parse::<Direction>().unwrap(), Direction::Down);
        assert!("sideways".parse::<Direction>().is_err());
        assert!(Direction::Up.is_vertical());
        assert!(!Direction::Right.is_vertical());
    }

    #[test]
    fn test_select_sets_active_lane() {
        let mut selection = Selection::default();
        selection.select(SelectionCursor::new(id("L1"), 2));

        assert_eq!(selection.active_list(), Some(&id("L1")));
        assert_eq!(selection.cursor().unwrap().card_index, 2);
    }

    #[test]
    fn test_clear_cursor_keeps_active_lane() {
        let mut selection = Selection::default();
        selection.select(SelectionCursor::new(id("L1"), 0));
        selection.clear_cursor();

        assert!(selection.cursor().is_none());
        assert_eq!(selection.active_list(), Some(&id("L1")));
    }

    #[test]
    fn test_switching_lane_drops_foreign_cursor() {
        let mut selection = Selection::default();
        selection.select(SelectionCursor::new(id("L1"), 0));

        selection.set_active_list(Some(id("L1")));
        assert!(selection.cursor().is_some());

        selection.set_active_list(Some(id("L2")));
        assert!(selection.cursor().is_none());
        assert_eq!(selection.active_list(), Some(&id("L2")));
    }
}
