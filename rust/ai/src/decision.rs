use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use holdem_engine::cards::Card;
use holdem_engine::engine::{ActionProvider, Table};
use holdem_engine::errors::GameError;
use holdem_engine::game::{HandComplete, Phase};
use holdem_engine::player::{Personality, PlayerAction, PlayerId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{DecisionCache, HandSignature};
use crate::external::{PlayerFeatures, Prediction, StrategyProvider, StrategyWorker, fuse};
use crate::history::{OpponentHistory, human_seats};
use crate::odds::raise_amount;
use crate::strategy::{Situation, mathematician, rule_intent};
use crate::strength::hand_strength;

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionConfig {
    /// Strength entries kept before the cache is cleared
    pub cache_capacity: usize,
    /// Half-width of the uniform noise added to hand strength
    pub strength_jitter: f64,
    /// Human actions kept for dynamic adjustment
    pub history_window: usize,
    /// Maximum weight of an external prediction
    pub trust_weight: f64,
    pub strategy_budget: Duration,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 1024,
            strength_jitter: 0.05,
            history_window: 12,
            trust_weight: 0.35,
            strategy_budget: Duration::from_millis(150),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecisionError {
    #[error("player {0} has no hole cards")]
    MissingHoleCards(PlayerId),
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error("player {0} is not controlled by the AI")]
    HumanSeat(PlayerId),
    #[error("hand evaluation failed: {0}")]
    Evaluation(#[from] GameError),
}

/// Where a decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    Rules,
    /// Rules blended with an external prediction
    Fused,
    /// Reading the table failed; folded
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub action: PlayerAction,
    pub source: DecisionSource,
    pub strength: Option<f64>,
}

/// What one seat sees when it is asked to act.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatView {
    pub player: PlayerId,
    /// `None` for a human seat
    pub personality: Option<Personality>,
    pub hole: Option<[Card; 2]>,
    pub board: Vec<Card>,
    pub phase: Phase,
    pub pot: u32,
    pub to_call: u32,
    pub chips: u32,
    /// Other players still holding cards
    pub opponents: usize,
}

impl SeatView {
    pub fn read(table: &Table, player: PlayerId) -> Result<Self, DecisionError> {
        let seat = table
            .players()
            .get(player)
            .ok_or(DecisionError::UnknownPlayer(player))?;
        let opponents = table
            .players()
            .iter()
            .filter(|p| p.id() != player && !p.is_folded())
            .count();
        Ok(Self {
            player,
            personality: seat.personality(),
            hole: seat.hand(),
            board: table.board().to_vec(),
            phase: table.phase(),
            pot: table.ledger().pot(),
            to_call: table.to_call(player),
            chips: seat.chips(),
            opponents,
        })
    }
}

/// Chooses actions for AI seats.
///
/// Owns its RNG, strength cache and opponent history; one engine serves one
/// table. Errors never escape: a seat that cannot be read folds.
///
/// # Example
///
/// ```rust
/// use holdem_ai::decision::{DecisionConfig, DecisionEngine};
/// use holdem_engine::engine::{Table, TableConfig};
/// use holdem_engine::player::{Controller, Personality};
///
/// let mut table = Table::seated(
///     TableConfig::default(),
///     &[Controller::Ai(Personality::Mathematician), Controller::Ai(Personality::Aggressive)],
///     Some(42),
/// )
/// .unwrap();
/// let mut ai = DecisionEngine::new(DecisionConfig::default(), Some(42));
///
/// table.start_hand().unwrap();
/// table.play_ai_turns(&mut ai).unwrap();
/// assert!(table.last_result().is_some());
/// ```
pub struct DecisionEngine {
    config: DecisionConfig,
    rng: ChaCha20Rng,
    cache: DecisionCache,
    history: OpponentHistory,
    provider: Option<StrategyWorker>,
    /// Hands reported by attached tables, not yet folded into `history`
    finished: Arc<Mutex<Vec<HandComplete>>>,
}

impl DecisionEngine {
    pub fn new(config: DecisionConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha20Rng::seed_from_u64(s),
            None => ChaCha20Rng::from_os_rng(),
        };
        Self {
            cache: DecisionCache::new(config.cache_capacity),
            history: OpponentHistory::new(config.history_window),
            config,
            rng,
            provider: None,
            finished: Arc::default(),
        }
    }

    /// Consults `provider` on every decision from a dedicated worker thread.
    pub fn with_provider(mut self, provider: Arc<dyn StrategyProvider>) -> Self {
        match StrategyWorker::spawn(provider) {
            Ok(worker) => self.provider = Some(worker),
            Err(e) => warn!(error = %e, "strategy provider disabled"),
        }
        self
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }
    pub fn cache(&self) -> &DecisionCache {
        &self.cache
    }
    pub fn history(&self) -> &OpponentHistory {
        &self.history
    }

    /// Subscribes to the hands `table` finishes, so hands this engine never
    /// acted in still reach the opponent history.
    pub fn attach(&self, table: &mut Table) {
        let inbox = Arc::clone(&self.finished);
        table.on_hand_complete(move |result| {
            inbox
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(result.clone());
        });
    }

    /// Decides for `player`, folding if the table cannot be read.
    pub fn decide(&mut self, table: &Table, player: PlayerId) -> Decision {
        self.drain_finished(table);
        self.history.observe(table);
        let situation = SeatView::read(table, player).and_then(|view| self.situation(&view));
        self.decide_or_fold(player, situation)
    }

    /// Decides from a seat view built outside a [`Table`].
    pub fn decide_view(&mut self, view: &SeatView) -> Decision {
        let situation = self.situation(view);
        self.decide_or_fold(view.player, situation)
    }

    fn drain_finished(&mut self, table: &Table) {
        let finished = std::mem::take(
            &mut *self
                .finished
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        if finished.is_empty() {
            return;
        }
        let humans = human_seats(table);
        for result in &finished {
            self.history.record_hand(result, &humans);
        }
    }

    fn decide_or_fold(
        &mut self,
        player: PlayerId,
        situation: Result<Situation, DecisionError>,
    ) -> Decision {
        match situation {
            Ok(s) => self.decide_situation(&s),
            Err(e) => {
                warn!(player, error = %e, "decision failed, folding");
                Decision {
                    action: PlayerAction::Fold,
                    source: DecisionSource::Fallback,
                    strength: None,
                }
            }
        }
    }

    /// Everything the rules need: cached strength plus noise, and history.
    pub fn situation(&mut self, view: &SeatView) -> Result<Situation, DecisionError> {
        let personality = view
            .personality
            .ok_or(DecisionError::HumanSeat(view.player))?;
        let hole = view
            .hole
            .ok_or(DecisionError::MissingHoleCards(view.player))?;

        let key = HandSignature::of(&hole, &view.board);
        let base = self
            .cache
            .get_or_try_insert(key, || hand_strength(hole, &view.board))?;
        let jitter = self.config.strength_jitter;
        let strength = if jitter > 0.0 {
            (base + self.rng.random_range(-jitter..=jitter)).clamp(0.0, 1.0)
        } else {
            base
        };

        Ok(Situation {
            personality,
            phase: view.phase,
            strength,
            pot: view.pot,
            to_call: view.to_call,
            chips: view.chips,
            opponents: view.opponents,
            win_streak: self.history.win_streak(view.player),
            human_raises: self.history.human_raises(),
        })
    }

    /// Applies the personality rules and, when configured, the provider.
    pub fn decide_situation(&mut self, s: &Situation) -> Decision {
        let rule = rule_intent(s, &mut self.rng);
        let (intent, source) = match self.consult_provider(s) {
            Some(prediction) => {
                let default_raise = raise_amount(s.pot, s.chips, 0.5);
                let fused = fuse(rule, &prediction, self.config.trust_weight, default_raise);
                (fused, DecisionSource::Fused)
            }
            None => (rule, DecisionSource::Rules),
        };
        let action = intent.to_action(s.to_call);

        let verdict = mathematician(s.pot_odds(), s.win_probability(), s.pot, s.chips);
        debug!(
            personality = %s.personality,
            strength = s.strength,
            pot_odds = verdict.pot_odds,
            ev = verdict.expected_value,
            ?action,
            ?source,
            "ai decision"
        );
        Decision {
            action,
            source,
            strength: Some(s.strength),
        }
    }

    fn consult_provider(&self, s: &Situation) -> Option<Prediction> {
        let provider = self.provider.as_ref()?;
        let features = PlayerFeatures {
            personality: s.personality,
            phase: s.phase,
            strength: s.strength,
            pot_odds: s.pot_odds(),
            pot: s.pot,
            to_call: s.to_call,
            chips: s.chips,
            opponents: s.opponents,
            board_cards: s.phase.cards_on_board(),
            win_streak: s.win_streak,
            human_raises: s.human_raises,
        };
        match provider.predict_within(features, self.config.strategy_budget) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "strategy provider ignored");
                None
            }
        }
    }
}

impl ActionProvider for DecisionEngine {
    fn next_action(&mut self, table: &Table, player: PlayerId) -> PlayerAction {
        self.decide(table, player).action
    }
}
