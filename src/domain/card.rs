use crate::domain::id::Identifier;
use crate::error::{PinboardError, Result};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};

/// Colors available for card labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LabelColor {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Pink,
    Gray,
}

impl LabelColor {
    /// The full palette, in display order
    pub const ALL: [LabelColor; 7] = [
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Yellow,
        Self::Purple,
        Self::Pink,
        Self::Gray,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Pink => "pink",
            Self::Gray => "gray",
        }
    }
}

impl FromStr for LabelColor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        // Older data stored the stylesheet class, e.g. "bg-red-500".
        let name = s
            .trim()
            .strip_prefix("bg-")
            .and_then(|rest| rest.strip_suffix("-500"))
            .unwrap_or(s.trim());

        Self::ALL
            .into_iter()
            .find(|color| color.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("Unknown label color '{}'", s))
    }
}

impl TryFrom<String> for LabelColor {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for LabelColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of a card's checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            done: false,
        }
    }
}

/// A card: the unit of work that moves between lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: Identifier,
    pub title: String,
    #[serde(default, alias = "desc", deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_labels")]
    pub labels: BTreeSet<LabelColor>,
    #[serde(
        default,
        deserialize_with = "lenient_due",
        skip_serializing_if = "Option::is_none"
    )]
    pub due: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub checklist: Vec<ChecklistItem>,
}

impl Card {
    /// Creates a card with empty description, labels and checklist and no due date
    pub fn new(id: Identifier, title: String) -> Self {
        Self {
            id,
            title,
            description: String::new(),
            labels: BTreeSet::new(),
            due: None,
            checklist: Vec::new(),
        }
    }

    /// Applies a partial update. The title is validated before anything is
    /// written, so a rejected patch leaves the card untouched.
    pub fn apply(&mut self, patch: CardPatch) -> Result<()> {
        let title = match patch.title {
            Some(title) => Some(normalize_title(&title)?),
            None => None,
        };

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(labels) = patch.labels {
            self.labels = labels;
        }
        if let Some(due) = patch.due {
            self.due = due;
        }
        if let Some(checklist) = patch.checklist {
            self.checklist = checklist;
        }
        Ok(())
    }

    /// Adds the label if absent, removes it if present
    pub fn toggle_label(&mut self, color: LabelColor) {
        if !self.labels.remove(&color) {
            self.labels.insert(color);
        }
    }

    pub fn add_checklist_item(&mut self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(PinboardError::EmptyChecklistText);
        }
        self.checklist.push(ChecklistItem::new(text));
        Ok(())
    }

    pub fn toggle_checklist_item(&mut self, index: usize) -> Result<()> {
        let len = self.checklist.len();
        let item = self
            .checklist
            .get_mut(index)
            .ok_or(PinboardError::IndexOutOfRange { index, len })?;
        item.done = !item.done;
        Ok(())
    }

    pub fn remove_checklist_item(&mut self, index: usize) -> Result<ChecklistItem> {
        if index >= self.checklist.len() {
            return Err(PinboardError::IndexOutOfRange {
                index,
                len: self.checklist.len(),
            });
        }
        Ok(self.checklist.remove(index))
    }

    /// Returns (completed, total) checklist counts
    pub fn checklist_progress(&self) -> (usize, usize) {
        let done = self.checklist.iter().filter(|item| item.done).count();
        (done, self.checklist.len())
    }

    /// A card is overdue when its due date has passed and its checklist is
    /// not complete. An empty checklist never counts as complete.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        let Some(due) = self.due else {
            return false;
        };
        let (done, total) = self.checklist_progress();
        due < today && !(total > 0 && done == total)
    }
}

/// Partial update for a card. Unset fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub labels: Option<BTreeSet<LabelColor>>,
    /// `Some(None)` clears the due date
    pub due: Option<Option<NaiveDate>>,
    pub checklist: Option<Vec<ChecklistItem>>,
}

impl CardPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn labels(mut self, labels: impl IntoIterator<Item = LabelColor>) -> Self {
        self.labels = Some(labels.into_iter().collect());
        self
    }

    pub fn due(mut self, due: Option<NaiveDate>) -> Self {
        self.due = Some(due);
        self
    }

    pub fn checklist(mut self, checklist: Vec<ChecklistItem>) -> Self {
        self.checklist = Some(checklist);
        self
    }
}

/// Trims a user-supplied title, rejecting one that is blank
pub(crate) fn normalize_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(PinboardError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_labels<'de, D>(deserializer: D) -> std::result::Result<BTreeSet<LabelColor>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|name| match name.parse::<LabelColor>() {
            Ok(color) => Some(color),
            Err(reason) => {
                tracing::debug!(%reason, "dropping unknown label");
                None
            }
        })
        .collect())
}

fn lenient_due<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(stamp.date_naive()));
    }
    tracing::debug!(due = raw, "dropping unparseable due date");
    Ok(None)
}
