use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace};

use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::GameError;
use crate::game::{HandComplete, HandStatus, Phase, PublicState, ShowdownEntry};
use crate::hand::{evaluate_hand, Category};
use crate::logger::ActionRecord;
use crate::player::{Controller, Player, PlayerAction, PlayerId, STARTING_STACK};
use crate::pot::{PotLedger, Settlement, UnclaimedPotPolicy};
use crate::rules::ValidatedAction;

/// Stakes and settlement policy of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub starting_stack: u32,
    pub small_blind: u32,
    pub big_blind: u32,
    #[serde(default)]
    pub unclaimed_pot_policy: UnclaimedPotPolicy,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            starting_stack: STARTING_STACK,
            small_blind: 5,
            big_blind: 10,
            unclaimed_pot_policy: UnclaimedPotPolicy::default(),
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.starting_stack == 0 {
            return Err(GameError::InvalidConfig(
                "starting_stack must be positive".to_string(),
            ));
        }
        if self.big_blind == 0 {
            return Err(GameError::InvalidConfig(
                "big_blind must be positive".to_string(),
            ));
        }
        if self.small_blind > self.big_blind {
            return Err(GameError::InvalidConfig(format!(
                "small_blind {} exceeds big_blind {}",
                self.small_blind, self.big_blind
            )));
        }
        Ok(())
    }

    /// [`validate`](Self::validate) plus a bound on the chips `seats`
    /// starting stacks put into play, which must fit a single pot.
    pub fn validate_for(&self, seats: usize) -> Result<(), GameError> {
        self.validate()?;
        let total = u64::from(self.starting_stack) * seats as u64;
        if total > u64::from(MAX_CHIPS_IN_PLAY) {
            return Err(GameError::InvalidConfig(format!(
                "{} seats of {} chips exceed the table limit of {}",
                seats, self.starting_stack, MAX_CHIPS_IN_PLAY
            )));
        }
        Ok(())
    }
}

/// Most chips a table may hold across stacks, pot and carry-over.
pub const MAX_CHIPS_IN_PLAY: u32 = u32::MAX;

/// Supplies actions for AI-controlled seats.
pub trait ActionProvider {
    fn next_action(&mut self, table: &Table, player: PlayerId) -> PlayerAction;
}

type HandObserver = Box<dyn FnMut(&HandComplete)>;
type ShuffleObserver = Box<dyn FnMut(f32)>;

/// Swaps per shuffle step between progress reports.
const SHUFFLE_CHUNK: usize = 13;

/// A poker table: seats, deck, board and the betting ledger of the current hand.
///
/// The table drives one hand at a time through
/// `preflop → flop → turn → river → showdown`. Actions are accepted only from
/// the current bettor; every other submission is rejected without touching
/// the state.
///
/// # Examples
///
/// ```
/// use holdem_engine::engine::{Table, TableConfig};
/// use holdem_engine::player::{Controller, PlayerAction};
///
/// let mut table = Table::seated(
///     TableConfig::default(),
///     &[Controller::Human, Controller::Human],
///     Some(7),
/// )
/// .unwrap();
/// table.start_hand().unwrap();
///
/// // heads-up: the button posts the small blind and acts first preflop
/// let first = table.current_bettor().unwrap();
/// table.submit_action(first, PlayerAction::Fold).unwrap();
///
/// let result = table.last_result().unwrap();
/// assert!(result.is_uncontested());
/// assert_eq!(result.payout_for(1 - first), 15);
/// ```
pub struct Table {
    config: TableConfig,
    seed: Option<u64>,
    deck: Deck,
    players: Vec<Player>,
    board: Vec<Card>,
    ledger: PotLedger,
    phase: Phase,
    status: HandStatus,
    current: Option<PlayerId>,
    button: Option<PlayerId>,
    acted: Vec<bool>,
    hand_number: u64,
    actions: Vec<ActionRecord>,
    last_result: Option<HandComplete>,
    /// Unclaimed chips waiting to be added to the next hand's pot
    carry_over: u32,
    chips_in_play: u64,
    observers: Vec<HandObserver>,
    shuffle_observer: Option<ShuffleObserver>,
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("hand_number", &self.hand_number)
            .field("status", &self.status)
            .field("phase", &self.phase)
            .field("players", &self.players)
            .field("board", &self.board)
            .field("current", &self.current)
            .field("button", &self.button)
            .finish_non_exhaustive()
    }
}

impl Table {
    /// Seats `players` in the given order; seat index becomes the player id.
    pub fn new(
        config: TableConfig,
        mut players: Vec<Player>,
        seed: Option<u64>,
    ) -> Result<Self, GameError> {
        config.validate()?;
        if players.len() < 2 {
            return Err(GameError::NotEnoughPlayers {
                found: players.len(),
            });
        }
        for (seat, p) in players.iter_mut().enumerate() {
            p.set_id(seat);
        }
        let deck = match seed {
            Some(s) => Deck::new_with_seed(s),
            None => Deck::from_entropy(),
        };
        let chips_in_play: u64 = players.iter().map(|p| u64::from(p.chips())).sum();
        if chips_in_play > u64::from(MAX_CHIPS_IN_PLAY) {
            return Err(GameError::InvalidConfig(format!(
                "{} chips in play exceed the table limit of {}",
                chips_in_play, MAX_CHIPS_IN_PLAY
            )));
        }
        let seats = players.len();
        Ok(Self {
            config,
            seed,
            deck,
            players,
            board: Vec::with_capacity(5),
            ledger: PotLedger::new(seats),
            phase: Phase::Preflop,
            status: HandStatus::Idle,
            current: None,
            button: None,
            acted: vec![false; seats],
            hand_number: 0,
            actions: Vec::new(),
            last_result: None,
            carry_over: 0,
            chips_in_play,
            observers: Vec::new(),
            shuffle_observer: None,
        })
    }

    /// One player per controller, each with the configured starting stack.
    pub fn seated(
        config: TableConfig,
        controllers: &[Controller],
        seed: Option<u64>,
    ) -> Result<Self, GameError> {
        let players = controllers
            .iter()
            .enumerate()
            .map(|(seat, &c)| match c {
                Controller::Human => Player::human(seat, config.starting_stack),
                Controller::Ai(p) => Player::ai(seat, config.starting_stack, p),
            })
            .collect();
        Self::new(config, players, seed)
    }

    /// Registers a callback invoked once per settled hand.
    pub fn on_hand_complete(&mut self, observer: impl FnMut(&HandComplete) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Registers a callback fed the shuffle's progress in `(0, 1]` at the
    /// start of every hand. Replaces any earlier one.
    pub fn on_shuffle_progress(&mut self, observer: impl FnMut(f32) + 'static) {
        self.shuffle_observer = Some(Box::new(observer));
    }

    /// Resets per-hand state, shuffles, posts blinds and deals hole cards.
    ///
    /// # Errors
    ///
    /// * [`GameError::HandInProgress`] if the previous hand is still running
    /// * [`GameError::NotEnoughPlayers`] if fewer than two seats have chips
    /// * [`GameError::DeckExhausted`] if the table has more seats than the
    ///   deck can serve; the hand is aborted and the blinds refunded
    pub fn start_hand(&mut self) -> Result<(), GameError> {
        if self.status == HandStatus::InProgress {
            return Err(GameError::HandInProgress);
        }
        let found = self.players.iter().filter(|p| p.chips() > 0).count();
        if found < 2 {
            return Err(GameError::NotEnoughPlayers { found });
        }

        self.hand_number += 1;
        for progress in self.deck.shuffle_in_chunks(SHUFFLE_CHUNK) {
            trace!(hand = self.hand_number, progress, "shuffling");
            if let Some(observer) = self.shuffle_observer.as_mut() {
                observer(progress);
            }
        }
        self.board.clear();
        self.actions.clear();
        for p in &mut self.players {
            p.reset_for_hand();
        }
        self.ledger
            .reset(self.players.iter().map(Player::is_folded).collect());
        let carry = std::mem::take(&mut self.carry_over);
        if carry > 0 {
            self.ledger.add_dead_money(carry);
        }
        self.acted.iter_mut().for_each(|a| *a = false);
        self.phase = Phase::Preflop;
        self.status = HandStatus::InProgress;
        self.current = None;

        let n = self.players.len();
        let button = self
            .seat_after(self.button.unwrap_or(n - 1), |p| p.chips() > 0)
            .ok_or(GameError::NotEnoughPlayers { found })?;
        self.button = Some(button);

        // heads-up the button posts the small blind
        let sb = if found == 2 {
            button
        } else {
            self.seat_after(button, |p| !p.is_folded()).unwrap_or(button)
        };
        let bb = self.seat_after(sb, |p| !p.is_folded()).unwrap_or(sb);
        self.ledger.start_round();
        let small = self
            .ledger
            .post_blind(&mut self.players[sb], self.config.small_blind);
        let big = self
            .ledger
            .post_blind(&mut self.players[bb], self.config.big_blind);
        info!(
            hand = self.hand_number,
            button,
            small_blind = small,
            big_blind = big,
            dead_money = carry,
            "hand started"
        );

        for _ in 0..2 {
            for k in 1..=n {
                let seat = (button + k) % n;
                if self.players[seat].is_folded() {
                    continue;
                }
                let card = match self.deck.draw() {
                    Ok(c) => c,
                    Err(e) => return self.abort(e),
                };
                if let Err(e) = self.players[seat].give_card(card) {
                    return self.abort(e);
                }
            }
        }

        self.advance(bb)
    }

    /// Applies an action for `player_id`, who must be the current bettor.
    ///
    /// Returns the action as resolved against the player's stack. A rejected
    /// action leaves the table untouched.
    pub fn submit_action(
        &mut self,
        player_id: PlayerId,
        action: PlayerAction,
    ) -> Result<ValidatedAction, GameError> {
        if self.status != HandStatus::InProgress {
            return Err(GameError::NoHandInProgress);
        }
        let expected = self.current.ok_or(GameError::NoHandInProgress)?;
        if player_id != expected {
            return Err(GameError::InvalidTurn {
                expected,
                actual: player_id,
            });
        }

        let applied = self.ledger.apply(&mut self.players[player_id], action)?;
        self.acted[player_id] = true;
        if applied.raised {
            for (seat, a) in self.acted.iter_mut().enumerate() {
                if seat != player_id {
                    *a = false;
                }
            }
        }
        debug!(
            hand = self.hand_number,
            player = player_id,
            phase = self.phase.as_str(),
            action = ?applied.action,
            pot = self.ledger.pot(),
            "action applied"
        );
        self.actions.push(ActionRecord {
            player_id,
            phase: self.phase,
            action: applied.action,
        });
        self.check_conservation()?;
        self.advance(player_id)?;
        Ok(applied.action)
    }

    /// Lets `provider` act for every AI seat until a human is to act or the
    /// hand is over. Returns the number of actions taken.
    pub fn play_ai_turns(&mut self, provider: &mut dyn ActionProvider) -> Result<usize, GameError> {
        let mut taken = 0;
        while let Some(id) = self.current {
            if !self.players[id].is_ai() {
                break;
            }
            let action = provider.next_action(self, id);
            match self.submit_action(id, action) {
                Ok(_) => {}
                Err(GameError::MalformedAction(reason)) => {
                    debug!(player = id, %reason, "provider action rejected, folding");
                    self.submit_action(id, PlayerAction::Fold)?;
                }
                Err(e) => return Err(e),
            }
            taken += 1;
        }
        Ok(taken)
    }

    /// Moves the turn past `from`, closing rounds and the hand as needed.
    fn advance(&mut self, from: PlayerId) -> Result<(), GameError> {
        let mut from = from;
        loop {
            let live: Vec<PlayerId> = self
                .players
                .iter()
                .filter(|p| !p.is_folded())
                .map(Player::id)
                .collect();
            if live.len() == 1 {
                let settlement = self.ledger.award_all(live[0]);
                return self.complete(settlement, vec![live[0]], None, None);
            }
            if let Some(next) = self.next_to_act(from) {
                self.current = Some(next);
                return Ok(());
            }
            match self.phase.next() {
                Some(Phase::Showdown) | None => return self.showdown(),
                Some(next) => {
                    for _ in 0..next.cards_to_deal() {
                        match self.deck.draw() {
                            Ok(c) => self.board.push(c),
                            Err(e) => return self.abort(e),
                        }
                    }
                    debug!(
                        hand = self.hand_number,
                        phase = next.as_str(),
                        board = self.board.len(),
                        "phase advanced"
                    );
                    self.phase = next;
                    self.ledger.start_round();
                    self.acted.iter_mut().for_each(|a| *a = false);
                    from = self.button.unwrap_or(0);
                }
            }
        }
    }

    fn next_to_act(&self, from: PlayerId) -> Option<PlayerId> {
        let n = self.players.len();
        (1..=n)
            .map(|k| (from + k) % n)
            .find(|&seat| self.needs_action(seat))
    }

    fn needs_action(&self, seat: PlayerId) -> bool {
        let p = &self.players[seat];
        if p.is_folded() || p.chips() == 0 {
            return false;
        }
        let owes = self.ledger.to_call(seat) > 0;
        let can_act = self
            .players
            .iter()
            .filter(|p| !p.is_folded() && p.chips() > 0)
            .count();
        if can_act < 2 && !owes {
            return false;
        }
        owes || !self.acted[seat]
    }

    fn seat_after(&self, from: PlayerId, pred: impl Fn(&Player) -> bool) -> Option<PlayerId> {
        let n = self.players.len();
        (1..=n)
            .map(|k| (from + k) % n)
            .find(|&seat| pred(&self.players[seat]))
    }

    fn showdown(&mut self) -> Result<(), GameError> {
        self.phase = Phase::Showdown;
        let mut entries = Vec::new();
        let mut failure = None;
        for p in self.players.iter().filter(|p| !p.is_folded()) {
            let Some(hole) = p.hand() else {
                continue;
            };
            let mut cards = Vec::with_capacity(7);
            cards.extend_from_slice(&hole);
            cards.extend_from_slice(&self.board);
            match evaluate_hand(&cards) {
                Ok(evaluation) => entries.push(ShowdownEntry {
                    player: p.id(),
                    hole,
                    evaluation,
                }),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        if let Some(e) = failure {
            return self.abort(e);
        }

        let scores: Vec<_> = entries.iter().map(|e| (e.player, e.evaluation)).collect();
        let settlement = self
            .ledger
            .settle(&scores, self.config.unclaimed_pot_policy);
        let best = entries.iter().map(|e| e.evaluation).max();
        let winners = entries
            .iter()
            .filter(|e| Some(e.evaluation.score) == best.map(|b| b.score))
            .map(|e| e.player)
            .collect();
        let hand_rank = best.map(|b| b.category);
        self.complete(settlement, winners, hand_rank, Some(entries))
    }

    fn complete(
        &mut self,
        settlement: Settlement,
        winners: Vec<PlayerId>,
        hand_rank: Option<Category>,
        showdown: Option<Vec<ShowdownEntry>>,
    ) -> Result<(), GameError> {
        for payout in &settlement.payouts {
            if let Err(e) = self.players[payout.player].add_chips(payout.amount) {
                error!(hand = self.hand_number, error = %e, "payout rejected");
                self.status = HandStatus::Aborted;
                self.current = None;
                return Err(e);
            }
        }
        self.carry_over += settlement.unclaimed;
        self.status = HandStatus::Complete;
        self.current = None;
        self.check_conservation()?;

        let result = HandComplete {
            hand_number: self.hand_number,
            winners,
            hand_rank,
            payouts: settlement.payouts,
            unclaimed: settlement.unclaimed,
            showdown,
            board: self.board.clone(),
            actions: self.actions.clone(),
        };
        info!(
            hand = self.hand_number,
            winners = ?result.winners,
            payouts = ?result.payouts,
            unclaimed = result.unclaimed,
            "hand complete"
        );
        for observer in &mut self.observers {
            observer(&result);
        }
        self.last_result = Some(result);
        Ok(())
    }

    /// Refunds every contribution and surfaces `err`.
    fn abort(&mut self, err: GameError) -> Result<(), GameError> {
        error!(hand = self.hand_number, error = %err, "hand aborted");
        let refund = self.ledger.refund();
        for payout in &refund.payouts {
            if let Err(e) = self.players[payout.player].add_chips(payout.amount) {
                error!(hand = self.hand_number, error = %e, "refund rejected");
            }
        }
        self.carry_over += refund.unclaimed;
        self.status = HandStatus::Aborted;
        self.current = None;
        Err(err)
    }

    fn check_conservation(&mut self) -> Result<(), GameError> {
        let stacks: u64 = self.players.iter().map(|p| u64::from(p.chips())).sum();
        let in_pot = if self.status == HandStatus::InProgress {
            u64::from(self.ledger.pot())
        } else {
            0
        };
        let actual = stacks + in_pot + u64::from(self.carry_over);
        if actual != self.chips_in_play {
            error!(
                expected = self.chips_in_play,
                actual, "chip conservation violated"
            );
            self.status = HandStatus::Aborted;
            self.current = None;
            return Err(GameError::ChipConservation {
                expected: self.chips_in_play,
                actual,
            });
        }
        Ok(())
    }

    /// Read-only snapshot of what every seat may see.
    pub fn public_state(&self) -> PublicState {
        PublicState {
            hand_number: self.hand_number,
            status: self.status,
            community_cards: self.board.clone(),
            pot: self.ledger.pot(),
            main_pot: self.ledger.main_pot().clone(),
            side_pots: self.ledger.side_pots().to_vec(),
            current_phase: self.phase,
            current_bettor: self.current,
            raise_level: self.ledger.raise_level(),
            stacks: self.players.iter().map(Player::chips).collect(),
            folded: self.players.iter().map(Player::is_folded).collect(),
        }
    }

    pub fn current_bettor(&self) -> Option<PlayerId> {
        self.current
    }
    pub fn status(&self) -> HandStatus {
        self.status
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn board(&self) -> &[Card] {
        &self.board
    }
    pub fn players(&self) -> &[Player] {
        &self.players
    }
    pub fn player(&self, id: PlayerId) -> Result<&Player, GameError> {
        self.players.get(id).ok_or(GameError::UnknownPlayer(id))
    }
    pub fn ledger(&self) -> &PotLedger {
        &self.ledger
    }
    pub fn config(&self) -> &TableConfig {
        &self.config
    }
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
    pub fn button(&self) -> Option<PlayerId> {
        self.button
    }
    pub fn hand_number(&self) -> u64 {
        self.hand_number
    }
    /// Actions of the current (or last) hand in order.
    pub fn action_log(&self) -> &[ActionRecord] {
        &self.actions
    }
    pub fn last_result(&self) -> Option<&HandComplete> {
        self.last_result.as_ref()
    }
    /// Chips retained from earlier hands that will seed the next pot.
    pub fn carried_over(&self) -> u32 {
        self.carry_over
    }
    pub fn chips_in_play(&self) -> u64 {
        self.chips_in_play
    }
    pub fn to_call(&self, id: PlayerId) -> u32 {
        self.ledger.to_call(id)
    }
}
