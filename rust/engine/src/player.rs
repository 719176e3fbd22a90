use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::errors::GameError;

/// Seat identifier. Players are addressed by their seat index at the table.
pub type PlayerId = usize;

/// Behavioral profile driving an AI seat.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    /// Folds weak hands, calls marginal ones, raises small with strong ones
    Conservative,
    /// Raises most of the time
    Aggressive,
    /// Slow-plays strong hands and bluffs weak ones
    Deceptive,
    /// Plays pot odds against estimated win probability
    Mathematician,
}

impl Personality {
    pub const ALL: [Personality; 4] = [
        Personality::Conservative,
        Personality::Aggressive,
        Personality::Deceptive,
        Personality::Mathematician,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Personality::Conservative => "conservative",
            Personality::Aggressive => "aggressive",
            Personality::Deceptive => "deceptive",
            Personality::Mathematician => "mathematician",
        }
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Personality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Personality::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown personality: {s}"))
    }
}

/// Who controls a seat.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum Controller {
    Human,
    Ai(Personality),
}

/// A betting action as submitted by a player or chosen by the AI.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Fold and forfeit the hand
    Fold,
    /// Match the current raise level (a check when nothing is owed)
    Call,
    /// Put this many additional chips in and lift the raise level to the new total
    Raise(u32),
}

impl PlayerAction {
    /// Builds an action from its wire name and optional amount.
    ///
    /// `"check"` is accepted as a call. A raise needs a positive amount.
    ///
    /// ```
    /// use holdem_engine::player::PlayerAction;
    ///
    /// assert_eq!(PlayerAction::parse("raise", Some(40)).unwrap(), PlayerAction::Raise(40));
    /// assert!(PlayerAction::parse("bet-the-farm", None).is_err());
    /// ```
    pub fn parse(kind: &str, amount: Option<u32>) -> Result<Self, GameError> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "fold" => Ok(PlayerAction::Fold),
            "call" | "check" => Ok(PlayerAction::Call),
            "raise" => match amount {
                Some(a) if a > 0 => Ok(PlayerAction::Raise(a)),
                _ => Err(GameError::MalformedAction(
                    "raise requires a positive amount".to_string(),
                )),
            },
            other => Err(GameError::MalformedAction(format!(
                "unknown action type: {other}"
            ))),
        }
    }
}

/// Default starting stack size for each player in chips
pub const STARTING_STACK: u32 = 1_000;

/// A seated player: chip stack, hole cards and fold state.
/// Chips persist across hands; cards and fold state reset at each hand start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    name: String,
    chips: u32,
    hole: [Option<Card>; 2],
    folded: bool,
    controller: Controller,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, chips: u32, controller: Controller) -> Self {
        Self {
            id,
            name: name.into(),
            chips,
            hole: [None, None],
            folded: false,
            controller,
        }
    }

    pub fn human(id: PlayerId, chips: u32) -> Self {
        Self::new(id, format!("Player {id}"), chips, Controller::Human)
    }

    pub fn ai(id: PlayerId, chips: u32, personality: Personality) -> Self {
        Self::new(
            id,
            format!("{personality} #{id}"),
            chips,
            Controller::Ai(personality),
        )
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }
    pub(crate) fn set_id(&mut self, id: PlayerId) {
        self.id = id;
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn chips(&self) -> u32 {
        self.chips
    }
    pub fn controller(&self) -> Controller {
        self.controller
    }
    pub fn is_ai(&self) -> bool {
        matches!(self.controller, Controller::Ai(_))
    }
    pub fn personality(&self) -> Option<Personality> {
        match self.controller {
            Controller::Ai(p) => Some(p),
            Controller::Human => None,
        }
    }
    pub fn is_folded(&self) -> bool {
        self.folded
    }
    pub fn fold(&mut self) {
        self.folded = true;
    }

    pub fn hole_cards(&self) -> [Option<Card>; 2] {
        self.hole
    }

    /// Both hole cards, if dealt.
    pub fn hand(&self) -> Option<[Card; 2]> {
        match self.hole {
            [Some(a), Some(b)] => Some([a, b]),
            _ => None,
        }
    }

    pub fn give_card(&mut self, c: Card) -> Result<(), GameError> {
        match self.hole.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(c);
                Ok(())
            }
            None => Err(GameError::HoleCardsFull),
        }
    }

    /// Clears per-hand state; players without chips sit the hand out folded.
    pub fn reset_for_hand(&mut self) {
        self.hole = [None, None];
        self.folded = self.chips == 0;
    }

    /// Credits `amount`; a stack that would overflow is left untouched.
    pub fn add_chips(&mut self, amount: u32) -> Result<(), GameError> {
        match self.chips.checked_add(amount) {
            Some(chips) => {
                self.chips = chips;
                Ok(())
            }
            None => Err(GameError::ChipConservation {
                expected: u64::from(self.chips) + u64::from(amount),
                actual: u64::from(self.chips),
            }),
        }
    }

    /// Removes up to `amount` chips and returns how many were actually taken.
    pub fn take_chips(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.chips);
        self.chips -= taken;
        taken
    }
}
