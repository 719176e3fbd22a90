//! # holdem-ai: AI Opponents for Texas Hold'em
//!
//! Personality-driven decision making for AI seats at a
//! [`holdem_engine::engine::Table`].
//!
//! ## Core Components
//!
//! - [`decision`] - [`DecisionEngine`], the table-facing entry point
//! - [`strategy`] - Conservative, aggressive, deceptive and mathematician rules
//! - [`strength`] - Preflop chart and evaluator-based hand strength
//! - [`odds`] - Pot odds, win probability, raise sizing and EV
//! - [`cache`] - Memoized hand strengths
//! - [`history`] - Recent human actions and win streaks
//! - [`external`] - Optional learned-strategy provider with a time budget
//!
//! ## Quick Start
//!
//! ```rust
//! use holdem_ai::{DecisionConfig, DecisionEngine};
//! use holdem_engine::engine::{Table, TableConfig};
//! use holdem_engine::player::{Controller, Personality};
//!
//! let seats = [
//!     Controller::Ai(Personality::Conservative),
//!     Controller::Ai(Personality::Deceptive),
//!     Controller::Ai(Personality::Mathematician),
//! ];
//! let mut table = Table::seated(TableConfig::default(), &seats, Some(1)).unwrap();
//! let mut ai = DecisionEngine::new(DecisionConfig::default(), Some(1));
//!
//! table.start_hand().unwrap();
//! let seat = table.current_bettor().unwrap();
//! let decision = ai.decide(&table, seat);
//! table.submit_action(seat, decision.action).unwrap();
//! ```

pub mod cache;
pub mod decision;
pub mod external;
pub mod history;
pub mod odds;
pub mod strategy;
pub mod strength;

pub use decision::{
    Decision, DecisionConfig, DecisionEngine, DecisionError, DecisionSource, SeatView,
};
pub use external::{Prediction, StrategyError, StrategyProvider};
