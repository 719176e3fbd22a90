use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::hand::{Category, HandEvaluation};
use crate::logger::ActionRecord;
use crate::player::PlayerId;
use crate::pot::{Payout, Pot};

/// Phases of a hand. Transitions are linear and never go back.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Phase {
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Preflop => Some(Phase::Flop),
            Phase::Flop => Some(Phase::Turn),
            Phase::Turn => Some(Phase::River),
            Phase::River => Some(Phase::Showdown),
            Phase::Showdown => None,
        }
    }

    /// Community cards dealt on entering this phase.
    pub fn cards_to_deal(self) -> usize {
        match self {
            Phase::Flop => 3,
            Phase::Turn | Phase::River => 1,
            Phase::Preflop | Phase::Showdown => 0,
        }
    }

    /// Community cards on the board once this phase is reached.
    pub fn cards_on_board(self) -> usize {
        match self {
            Phase::Preflop => 0,
            Phase::Flop => 3,
            Phase::Turn => 4,
            Phase::River | Phase::Showdown => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Preflop => "preflop",
            Phase::Flop => "flop",
            Phase::Turn => "turn",
            Phase::River => "river",
            Phase::Showdown => "showdown",
        }
    }
}

/// Where the table is in its hand lifecycle.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandStatus {
    /// No hand has been started yet
    Idle,
    /// Betting is under way
    InProgress,
    /// The hand was settled
    Complete,
    /// The hand was abandoned and every contribution refunded
    Aborted,
}

/// Read-only snapshot for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicState {
    pub hand_number: u64,
    pub status: HandStatus,
    pub community_cards: Vec<Card>,
    pub pot: u32,
    pub main_pot: Pot,
    pub side_pots: Vec<Pot>,
    pub current_phase: Phase,
    pub current_bettor: Option<PlayerId>,
    pub raise_level: u32,
    pub stacks: Vec<u32>,
    pub folded: Vec<bool>,
}

/// A player's cards and evaluation at showdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowdownEntry {
    pub player: PlayerId,
    pub hole: [Card; 2],
    pub evaluation: HandEvaluation,
}

/// Emitted once per settled hand for progression and history consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandComplete {
    pub hand_number: u64,
    /// Holders of the best hand; the sole survivor when uncontested.
    pub winners: Vec<PlayerId>,
    /// Category of the winning hand; `None` when nobody had to show.
    pub hand_rank: Option<Category>,
    pub payouts: Vec<Payout>,
    /// Chips retained for the next hand under the retain policy.
    pub unclaimed: u32,
    /// Every evaluated hand; `None` when the hand ended uncontested.
    pub showdown: Option<Vec<ShowdownEntry>>,
    pub board: Vec<Card>,
    /// Every action of the hand in order.
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
}

impl HandComplete {
    pub fn is_uncontested(&self) -> bool {
        self.showdown.is_none()
    }

    pub fn payout_for(&self, player: PlayerId) -> u32 {
        self.payouts
            .iter()
            .find(|p| p.player == player)
            .map_or(0, |p| p.amount)
    }
}
