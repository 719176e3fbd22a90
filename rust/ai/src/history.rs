use std::collections::{HashMap, VecDeque};

use holdem_engine::engine::Table;
use holdem_engine::game::HandComplete;
use holdem_engine::logger::ActionRecord;
use holdem_engine::player::PlayerId;
use holdem_engine::rules::ValidatedAction;

/// A human action seen at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservedAction {
    pub hand_number: u64,
    pub player: PlayerId,
    pub action: ValidatedAction,
}

/// Rolling window of human actions plus per-seat win streaks.
///
/// Synced incrementally from the table's action log and hand results, so the
/// same table can be observed any number of times per turn. Finished hands
/// are folded in whole, including actions taken after the last observation.
#[derive(Debug, Clone)]
pub struct OpponentHistory {
    window: VecDeque<ObservedAction>,
    capacity: usize,
    synced_hand: u64,
    synced_actions: usize,
    settled_hand: u64,
    streaks: HashMap<PlayerId, u32>,
}

impl OpponentHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            synced_hand: 0,
            synced_actions: 0,
            settled_hand: 0,
            streaks: HashMap::new(),
        }
    }

    /// Catches up with `table`: the tail of its last finished hand, then the
    /// actions of the hand in progress.
    pub fn observe(&mut self, table: &Table) {
        let humans = human_seats(table);
        if let Some(result) = table.last_result() {
            self.record_hand(result, &humans);
        }
        if table.hand_number() <= self.settled_hand {
            return;
        }
        if table.hand_number() != self.synced_hand {
            self.synced_hand = table.hand_number();
            self.synced_actions = 0;
        }
        self.sync_actions(table.action_log(), &humans);
    }

    /// Folds in a finished hand: human actions not yet seen and win streaks.
    /// Hands already settled are ignored.
    pub fn record_hand(&mut self, result: &HandComplete, humans: &[bool]) {
        if result.hand_number <= self.settled_hand {
            return;
        }
        if result.hand_number != self.synced_hand {
            self.synced_hand = result.hand_number;
            self.synced_actions = 0;
        }
        self.sync_actions(&result.actions, humans);
        self.settled_hand = result.hand_number;

        for seat in 0..humans.len() {
            let streak = self.streaks.entry(seat).or_insert(0);
            if result.winners.contains(&seat) {
                *streak += 1;
            } else {
                *streak = 0;
            }
        }
    }

    fn sync_actions(&mut self, log: &[ActionRecord], humans: &[bool]) {
        for rec in log.iter().skip(self.synced_actions) {
            if humans.get(rec.player_id).copied().unwrap_or(false) {
                self.record(ObservedAction {
                    hand_number: self.synced_hand,
                    player: rec.player_id,
                    action: rec.action,
                });
            }
        }
        self.synced_actions = self.synced_actions.max(log.len());
    }

    pub fn record(&mut self, action: ObservedAction) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(action);
    }

    /// Raises among the recent human actions.
    pub fn human_raises(&self) -> usize {
        self.window
            .iter()
            .filter(|a| matches!(a.action, ValidatedAction::Raise(_)))
            .count()
    }

    pub fn win_streak(&self, player: PlayerId) -> u32 {
        self.streaks.get(&player).copied().unwrap_or(0)
    }

    pub fn recent(&self) -> impl Iterator<Item = &ObservedAction> {
        self.window.iter()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

/// Human flag per seat, indexed by player id.
pub fn human_seats(table: &Table) -> Vec<bool> {
    table.players().iter().map(|p| !p.is_ai()).collect()
}
