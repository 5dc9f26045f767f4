use crate::Card;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The ordered card collection shared between the host and the active modus.
///
/// Every access goes through one mutex so a snapshot taken for persistence
/// always sees the state between two commands, never a half-applied one.
#[derive(Debug, Clone, Default)]
pub struct SharedDeck {
    cards: Arc<Mutex<Vec<Card>>>,
}

impl SharedDeck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self {
            cards: Arc::new(Mutex::new(cards)),
        }
    }

    pub fn snapshot(&self) -> Vec<Card> {
        lock(&self.cards).clone()
    }

    pub fn replace(&self, cards: Vec<Card>) {
        *lock(&self.cards) = cards;
    }

    pub fn clear(&self) {
        lock(&self.cards).clear();
    }

    pub fn len(&self) -> usize {
        lock(&self.cards).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.cards).is_empty()
    }

    pub fn in_use_count(&self) -> usize {
        lock(&self.cards).iter().filter(|card| card.in_use()).count()
    }

    pub fn with_lock<R>(&self, f: impl FnOnce(&mut Vec<Card>) -> R) -> R {
        f(&mut lock(&self.cards))
    }
}

/// Item names ejected from the deck and not yet captured again.
#[derive(Debug, Clone, Default)]
pub struct OpenHand {
    items: Arc<Mutex<Vec<String>>>,
}

impl OpenHand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, item: impl Into<String>) {
        lock(&self.items).push(item.into());
    }

    /// Removes one occurrence of `item` (case-insensitive). Returns false when absent.
    pub fn take(&self, item: &str) -> bool {
        let mut items = lock(&self.items);
        match items
            .iter()
            .position(|held| held.eq_ignore_ascii_case(item))
        {
            Some(idx) => {
                items.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        lock(&self.items).clone()
    }

    pub fn clear(&self) {
        lock(&self.items).clear();
    }

    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.items).is_empty()
    }
}
