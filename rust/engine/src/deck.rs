use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};
use crate::errors::GameError;

/// 52-card deck drawn from the end. Refilled and reshuffled at the start of each hand.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    rng: ChaCha20Rng,
}

impl Deck {
    pub fn new_with_seed(seed: u64) -> Self {
        Self::with_rng(ChaCha20Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(ChaCha20Rng::from_os_rng())
    }

    fn with_rng(rng: ChaCha20Rng) -> Self {
        // Keep initial order until shuffle is called explicitly
        Self {
            cards: full_deck(),
            rng,
        }
    }

    /// Refills the deck and runs a full Fisher–Yates pass.
    pub fn shuffle(&mut self) {
        self.cards = full_deck();
        for i in (1..self.cards.len()).rev() {
            let j = self.rng.random_range(0..=i);
            self.cards.swap(i, j);
        }
    }

    /// Same shuffle as [`Deck::shuffle`], split into steps of `chunk` swaps.
    ///
    /// Each call to `next` performs one chunk and yields the fraction of the
    /// pass completed, ending at `1.0`. Hosts that must stay responsive can
    /// interleave other work between chunks; the resulting order is identical
    /// to driving the iterator to completion in one go.
    pub fn shuffle_in_chunks(&mut self, chunk: usize) -> ChunkedShuffle<'_> {
        self.cards = full_deck();
        let next = self.cards.len().saturating_sub(1);
        ChunkedShuffle {
            deck: self,
            next,
            chunk: chunk.max(1),
        }
    }

    /// Pops the top card. An empty deck is an error, never a placeholder card.
    pub fn draw(&mut self) -> Result<Card, GameError> {
        self.cards.pop().ok_or(GameError::DeckExhausted)
    }

    pub fn draw_n(&mut self, n: usize) -> Result<Vec<Card>, GameError> {
        (0..n).map(|_| self.draw()).collect()
    }

    pub fn reset(&mut self) {
        self.cards = full_deck();
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Remaining cards, bottom first (the last element is drawn next).
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

/// Progress iterator returned by [`Deck::shuffle_in_chunks`].
#[derive(Debug)]
pub struct ChunkedShuffle<'a> {
    deck: &'a mut Deck,
    next: usize,
    chunk: usize,
}

impl Iterator for ChunkedShuffle<'_> {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let total = self.deck.cards.len().saturating_sub(1);
        if self.next == 0 {
            return None;
        }
        for _ in 0..self.chunk {
            if self.next == 0 {
                break;
            }
            let i = self.next;
            let j = self.deck.rng.random_range(0..=i);
            self.deck.cards.swap(i, j);
            self.next -= 1;
        }
        Some((total - self.next) as f32 / total as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunked_shuffle_matches_synchronous_shuffle() {
        let mut a = Deck::new_with_seed(9);
        let mut b = Deck::new_with_seed(9);
        a.shuffle();
        let progress: Vec<f32> = b.shuffle_in_chunks(10).collect();
        assert_eq!(a.cards(), b.cards());
        assert_eq!(progress.len(), 6);
        assert_eq!(progress.last().copied(), Some(1.0));
        assert!(progress.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn draw_on_empty_deck_is_an_error() {
        let mut deck = Deck::new_with_seed(1);
        deck.draw_n(52).unwrap();
        assert_eq!(deck.draw(), Err(GameError::DeckExhausted));
    }
}
