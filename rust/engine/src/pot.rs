//! Contribution ledger, main/side pot layering and showdown settlement.
//!
//! Pots are rebuilt from lifetime-in-hand contributions after every change.
//! Each distinct contribution level of a non-folded player closes one layer:
//! the first layer is the main pot, every higher one a side pot holding the
//! excess above the previous level. Folded players' chips stay in the layers
//! they reached but folded players are never eligible to win them.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::GameError;
use crate::hand::HandEvaluation;
use crate::player::{Player, PlayerAction, PlayerId};
use crate::rules::{validate_action, ValidatedAction};

/// One layer of the pot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pot {
    pub amount: u32,
    /// Lifetime contribution a player needs to be eligible for this layer.
    pub threshold: u32,
    /// Non-folded players entitled to win this layer, in seat order.
    pub eligible: Vec<PlayerId>,
}

/// What happens to a pot none of whose eligible players holds the overall best hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnclaimedPotPolicy {
    /// Award the pot to the best hand among its own eligible players.
    #[default]
    AwardNextBest,
    /// Leave it undistributed; the table carries it into the next hand.
    Retain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub player: PlayerId,
    pub amount: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// One entry per paid player, in seat order.
    pub payouts: Vec<Payout>,
    /// Chips left undistributed under [`UnclaimedPotPolicy::Retain`].
    pub unclaimed: u32,
}

impl Settlement {
    fn credit(&mut self, player: PlayerId, amount: u32) {
        if amount == 0 {
            return;
        }
        match self.payouts.iter_mut().find(|p| p.player == player) {
            Some(p) => p.amount += amount,
            None => {
                self.payouts.push(Payout { player, amount });
                self.payouts.sort_by_key(|p| p.player);
            }
        }
    }

    pub fn amount_for(&self, player: PlayerId) -> u32 {
        self.payouts
            .iter()
            .find(|p| p.player == player)
            .map_or(0, |p| p.amount)
    }

    pub fn distributed(&self) -> u64 {
        self.payouts.iter().map(|p| u64::from(p.amount)).sum()
    }
}

/// Outcome of applying one action to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub action: ValidatedAction,
    /// The action lifted the raise level, reopening the betting.
    pub raised: bool,
}

/// Per-hand betting ledger, indexed by seat.
#[derive(Debug, Clone, Default)]
pub struct PotLedger {
    round_bets: Vec<u32>,
    totals: Vec<u32>,
    folded: Vec<bool>,
    raise_level: u32,
    dead_money: u32,
    pot: u32,
    main_pot: Pot,
    side_pots: Vec<Pot>,
}

impl PotLedger {
    pub fn new(seats: usize) -> Self {
        Self {
            round_bets: vec![0; seats],
            totals: vec![0; seats],
            folded: vec![false; seats],
            ..Self::default()
        }
    }

    /// Builds a ledger straight from lifetime contributions.
    ///
    /// ```
    /// use holdem_engine::pot::PotLedger;
    ///
    /// let pm = PotLedger::from_contributions(&[100, 100, 50], &[false, false, false]);
    /// assert_eq!(pm.main_pot().amount, 150);
    /// assert_eq!(pm.side_pots()[0].amount, 100);
    /// assert_eq!(pm.side_pots()[0].eligible, vec![0, 1]);
    /// ```
    pub fn from_contributions(contributions: &[u32], folded: &[bool]) -> Self {
        let mut ledger = Self::new(contributions.len());
        ledger.totals.copy_from_slice(contributions);
        ledger.round_bets.copy_from_slice(contributions);
        for (slot, &f) in ledger.folded.iter_mut().zip(folded) {
            *slot = f;
        }
        ledger.pot = contributions.iter().sum();
        ledger.raise_level = contributions.iter().copied().max().unwrap_or(0);
        ledger.recompute();
        ledger
    }

    /// Clears everything for a new hand; `folded` marks players sitting out.
    pub fn reset(&mut self, folded: Vec<bool>) {
        let seats = folded.len();
        *self = Self::new(seats);
        self.folded = folded;
    }

    /// Chips that belong to the pot without belonging to any seat.
    pub fn add_dead_money(&mut self, amount: u32) {
        self.dead_money += amount;
        self.pot += amount;
        self.recompute();
    }

    /// Opens a betting round: round contributions cleared, raise level zero.
    pub fn start_round(&mut self) {
        self.round_bets.iter_mut().for_each(|b| *b = 0);
        self.raise_level = 0;
    }

    /// Forced bet. Capped at the stack; lifts the raise level to cover it.
    pub fn post_blind(&mut self, player: &mut Player, amount: u32) -> u32 {
        let id = player.id();
        let posted = self.place(player, amount);
        self.raise_level = self.raise_level.max(self.round_bets[id]);
        self.recompute();
        posted
    }

    pub fn apply(&mut self, player: &mut Player, action: PlayerAction) -> Result<Applied, GameError> {
        let id = player.id();
        if id >= self.totals.len() {
            return Err(GameError::UnknownPlayer(id));
        }
        let validated = validate_action(
            player.chips(),
            self.round_bets[id],
            self.raise_level,
            action,
        )?;
        if validated == ValidatedAction::Fold {
            player.fold();
            self.folded[id] = true;
        }
        self.place(player, validated.chips());
        let raised = self.round_bets[id] > self.raise_level;
        if raised {
            self.raise_level = self.round_bets[id];
        }
        self.recompute();
        Ok(Applied {
            action: validated,
            raised,
        })
    }

    fn place(&mut self, player: &mut Player, amount: u32) -> u32 {
        let id = player.id();
        let taken = player.take_chips(amount);
        self.round_bets[id] += taken;
        self.totals[id] += taken;
        self.pot += taken;
        taken
    }

    fn recompute(&mut self) {
        let live: Vec<PlayerId> = (0..self.totals.len()).filter(|&i| !self.folded[i]).collect();
        let mut levels: Vec<u32> = live
            .iter()
            .map(|&i| self.totals[i])
            .filter(|&t| t > 0)
            .collect();
        levels.sort_unstable();
        levels.dedup();

        let mut pots = Vec::with_capacity(levels.len());
        let mut prev = 0;
        for level in levels {
            let amount = self
                .totals
                .iter()
                .map(|&t| t.min(level) - t.min(prev))
                .sum();
            let eligible = live
                .iter()
                .copied()
                .filter(|&i| self.totals[i] >= level)
                .collect();
            pots.push(Pot {
                amount,
                threshold: level,
                eligible,
            });
            prev = level;
        }

        let layered: u32 = pots.iter().map(|p| p.amount).sum();
        // dead money plus chips folded players put in above the top live level
        let overflow = self.pot - layered - self.dead_money;
        if pots.is_empty() {
            self.main_pot = Pot {
                amount: self.pot,
                threshold: 0,
                eligible: live,
            };
            self.side_pots.clear();
            return;
        }
        pots[0].amount += self.dead_money;
        if let Some(top) = pots.last_mut() {
            top.amount += overflow;
        }
        self.side_pots = pots.split_off(1);
        self.main_pot = pots.remove(0);
    }

    pub fn to_call(&self, id: PlayerId) -> u32 {
        self.raise_level.saturating_sub(self.round_bet(id))
    }
    pub fn round_bet(&self, id: PlayerId) -> u32 {
        self.round_bets.get(id).copied().unwrap_or(0)
    }
    pub fn total_contribution(&self, id: PlayerId) -> u32 {
        self.totals.get(id).copied().unwrap_or(0)
    }
    pub fn raise_level(&self) -> u32 {
        self.raise_level
    }
    /// Every chip wagered this hand, dead money included.
    pub fn pot(&self) -> u32 {
        self.pot
    }
    pub fn main_pot(&self) -> &Pot {
        &self.main_pot
    }
    pub fn side_pots(&self) -> &[Pot] {
        &self.side_pots
    }
    /// Main pot followed by side pots in ascending threshold order.
    pub fn pots(&self) -> impl Iterator<Item = &Pot> {
        std::iter::once(&self.main_pot).chain(self.side_pots.iter())
    }

    /// Splits every pot among its winners.
    ///
    /// `showdown` holds the evaluation of each non-folded player. Winners of a
    /// pot are chosen per `policy`; odd chips go to the first winner by seat.
    pub fn settle(
        &self,
        showdown: &[(PlayerId, HandEvaluation)],
        policy: UnclaimedPotPolicy,
    ) -> Settlement {
        let contenders: Vec<(PlayerId, u32)> = showdown
            .iter()
            .filter(|(id, _)| !self.folded.get(*id).copied().unwrap_or(true))
            .map(|(id, eval)| (*id, eval.score))
            .collect();
        let best = contenders.iter().map(|&(_, s)| s).max();
        let overall: Vec<PlayerId> = contenders
            .iter()
            .filter(|&&(_, s)| Some(s) == best)
            .map(|&(id, _)| id)
            .collect();

        let mut settlement = Settlement::default();
        for pot in self.pots().filter(|p| p.amount > 0) {
            let winners: Vec<PlayerId> = match policy {
                UnclaimedPotPolicy::AwardNextBest => {
                    let in_pot: Vec<(PlayerId, u32)> = contenders
                        .iter()
                        .copied()
                        .filter(|(id, _)| pot.eligible.contains(id))
                        .collect();
                    let top = in_pot.iter().map(|&(_, s)| s).max();
                    in_pot
                        .into_iter()
                        .filter(|&(_, s)| Some(s) == top)
                        .map(|(id, _)| id)
                        .collect()
                }
                UnclaimedPotPolicy::Retain => overall
                    .iter()
                    .copied()
                    .filter(|id| pot.eligible.contains(id))
                    .collect(),
            };
            if winners.is_empty() {
                warn!(
                    amount = pot.amount,
                    threshold = pot.threshold,
                    "pot has no eligible winner, left unclaimed"
                );
                settlement.unclaimed += pot.amount;
                continue;
            }
            split_evenly(&mut settlement, winners, pot.amount);
        }
        settlement
    }

    /// Uncontested hand: the whole pot goes to `winner` without evaluation.
    pub fn award_all(&self, winner: PlayerId) -> Settlement {
        let mut settlement = Settlement::default();
        settlement.credit(winner, self.pot);
        settlement
    }

    /// Returns every seat's contribution; dead money is reported as unclaimed.
    pub fn refund(&self) -> Settlement {
        let mut settlement = Settlement {
            unclaimed: self.dead_money,
            ..Settlement::default()
        };
        for (id, &total) in self.totals.iter().enumerate() {
            settlement.credit(id, total);
        }
        settlement
    }
}

fn split_evenly(settlement: &mut Settlement, mut winners: Vec<PlayerId>, amount: u32) {
    winners.sort_unstable();
    let n = winners.len() as u32;
    let share = amount / n;
    let remainder = amount % n;
    for (i, &w) in winners.iter().enumerate() {
        let extra = if i == 0 { remainder } else { 0 };
        settlement.credit(w, share + extra);
    }
}
