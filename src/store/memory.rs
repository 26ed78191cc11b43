//! メモリ上のストア

use super::{merge_into, CardStore, UpsertOutcome};
use crate::card::Card;
use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct MemoryCardStore {
    cards: Vec<Card>,
}

impl MemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl CardStore for MemoryCardStore {
    fn upsert(&mut self, card: Card) -> Result<UpsertOutcome> {
        Ok(merge_into(&mut self.cards, card))
    }

    fn cards(&mut self) -> Result<Vec<Card>> {
        Ok(self.cards.clone())
    }
}
