use thiserror::Error;

use crate::cards::Card;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("It's not player {actual}'s turn (expected player {expected})")]
    InvalidTurn { expected: usize, actual: usize },
    #[error("Malformed action: {0}")]
    MalformedAction(String),
    #[error("Deck exhausted while dealing")]
    DeckExhausted,
    #[error("No hand in progress")]
    NoHandInProgress,
    #[error("A hand is already in progress")]
    HandInProgress,
    #[error("At least two players with chips are required, found {found}")]
    NotEnoughPlayers { found: usize },
    #[error("Unknown player {0}")]
    UnknownPlayer(usize),
    #[error("Hand evaluation needs 5 to 7 cards, got {0}")]
    InvalidHandSize(usize),
    #[error("Card {0} appears more than once")]
    DuplicateCard(Card),
    #[error("Hole cards already full")]
    HoleCardsFull,
    #[error("Chip conservation violated: expected {expected}, found {actual}")]
    ChipConservation { expected: u64, actual: u64 },
    #[error("Invalid card: {0}")]
    InvalidCard(String),
    #[error("Invalid table configuration: {0}")]
    InvalidConfig(String),
}
