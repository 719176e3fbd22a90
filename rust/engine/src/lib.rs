//! # holdem-engine: Texas Hold'em Table Core
//!
//! A deterministic multi-seat Texas Hold'em engine. Evaluates 5 to 7 card
//! hands, tracks contributions in a pot ledger with main and side pots, and
//! drives a hand from the deal to showdown settlement with reproducible RNG.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and parsing
//! - [`deck`] - Seeded Fisher–Yates shuffling with ChaCha20 RNG
//! - [`engine`] - Table orchestration: blinds, turns, rounds and showdown
//! - [`game`] - Phases, public snapshots and hand results
//! - [`hand`] - Hand evaluation and strength comparison
//! - [`player`] - Seats, personalities, actions and chip stacks
//! - [`pot`] - Contribution ledger, side pots and settlement
//! - [`rules`] - Action validation against stacks and the raise level
//! - [`logger`] - Action records and JSONL hand history
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use holdem_engine::cards::parse_cards;
//! use holdem_engine::hand::{evaluate_hand, Category};
//!
//! let cards = parse_cards("Ah Kh Qh Jh Th 2c 3d").unwrap();
//! let eval = evaluate_hand(&cards).unwrap();
//! assert_eq!(eval.category, Category::RoyalFlush);
//! ```
//!
//! ## Deterministic Gameplay
//!
//! Tables and decks seeded with the same value deal the same cards:
//!
//! ```rust
//! use holdem_engine::deck::Deck;
//!
//! let mut a = Deck::new_with_seed(42);
//! let mut b = Deck::new_with_seed(42);
//! a.shuffle();
//! b.shuffle();
//! assert_eq!(a.cards(), b.cards());
//! ```
//!
//! ## Side Pots
//!
//! ```rust
//! use holdem_engine::pot::PotLedger;
//!
//! // C is all-in for 50, A and B put in 100 each
//! let ledger = PotLedger::from_contributions(&[100, 100, 50], &[false; 3]);
//! assert_eq!(ledger.main_pot().amount, 150);
//! assert_eq!(ledger.main_pot().eligible, vec![0, 1, 2]);
//! assert_eq!(ledger.side_pots()[0].amount, 100);
//! ```

pub mod cards;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod game;
pub mod hand;
pub mod logger;
pub mod player;
pub mod pot;
pub mod rules;

pub use engine::{ActionProvider, Table, TableConfig};
pub use errors::GameError;
