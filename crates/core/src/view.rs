use crate::Card;
use serde::{Deserialize, Serialize};

/// Render-neutral picture of a modus' storage, handed to the display surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryView {
    pub title: String,
    pub groups: Vec<CardGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardGroup {
    pub label: String,
    pub cards: Vec<Card>,
}

impl InventoryView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            groups: Vec::new(),
        }
    }

    pub fn with_group(mut self, label: impl Into<String>, cards: Vec<Card>) -> Self {
        self.groups.push(CardGroup {
            label: label.into(),
            cards,
        });
        self
    }

    pub fn card_count(&self) -> usize {
        self.groups.iter().map(|group| group.cards.len()).sum()
    }

    /// Plain-text rendering used by line-oriented hosts.
    pub fn render_text(&self) -> String {
        let mut out = format!("== {} ==\n", self.title);
        for group in &self.groups {
            out.push_str(&format!("[{}]\n", group.label));
            for (idx, card) in group.cards.iter().enumerate() {
                out.push_str(&format!("  {:>2}. {}\n", idx + 1, card));
            }
        }
        out
    }
}
