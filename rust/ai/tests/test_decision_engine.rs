use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use holdem_ai::external::{PlayerFeatures, PredictedAction};
use holdem_ai::strategy::{Intent, Situation, mathematician};
use holdem_ai::{
    DecisionConfig, DecisionEngine, DecisionError, DecisionSource, Prediction, SeatView,
    StrategyError, StrategyProvider,
};
use holdem_engine::cards::parse_cards;
use holdem_engine::engine::{Table, TableConfig};
use holdem_engine::errors::GameError;
use holdem_engine::game::{HandStatus, Phase};
use holdem_engine::player::{Controller, Personality, PlayerAction};

struct Sleepy(Duration);

impl StrategyProvider for Sleepy {
    fn name(&self) -> &str {
        "sleepy"
    }
    fn predict(&self, _: &PlayerFeatures) -> Result<Prediction, StrategyError> {
        thread::sleep(self.0);
        Ok(Prediction {
            action: PredictedAction::Fold,
            confidence: 1.0,
        })
    }
}

#[derive(Default)]
struct Hung {
    calls: AtomicUsize,
}

impl StrategyProvider for Hung {
    fn name(&self) -> &str {
        "hung"
    }
    fn predict(&self, _: &PlayerFeatures) -> Result<Prediction, StrategyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_secs(2));
        Err(StrategyError::Unavailable("gave up".to_string()))
    }
}

struct Broken;

impl StrategyProvider for Broken {
    fn name(&self) -> &str {
        "broken"
    }
    fn predict(&self, _: &PlayerFeatures) -> Result<Prediction, StrategyError> {
        Err(StrategyError::Failed("model not loaded".to_string()))
    }
}

struct AlwaysFold;

impl StrategyProvider for AlwaysFold {
    fn name(&self) -> &str {
        "always-fold"
    }
    fn predict(&self, _: &PlayerFeatures) -> Result<Prediction, StrategyError> {
        Ok(Prediction {
            action: PredictedAction::Fold,
            confidence: 1.0,
        })
    }
}

fn situation() -> Situation {
    Situation {
        personality: Personality::Mathematician,
        phase: Phase::Turn,
        strength: 0.6,
        pot: 300,
        to_call: 60,
        chips: 800,
        opponents: 1,
        win_streak: 0,
        human_raises: 0,
    }
}

fn quiet_config() -> DecisionConfig {
    DecisionConfig {
        strength_jitter: 0.0,
        strategy_budget: Duration::from_millis(25),
        ..DecisionConfig::default()
    }
}

#[test]
fn mathematician_raises_with_edge_and_folds_without() {
    assert!(matches!(
        mathematician(0.2, 0.5, 100, 1000).intent,
        Intent::Raise(_)
    ));
    assert_eq!(mathematician(0.2, 0.1, 100, 1000).intent, Intent::Fold);
}

#[test]
fn timed_out_provider_leaves_rule_decision_untouched() {
    let s = situation();
    let mut plain = DecisionEngine::new(quiet_config(), Some(4));
    let mut slow = DecisionEngine::new(quiet_config(), Some(4))
        .with_provider(Arc::new(Sleepy(Duration::from_millis(400))));

    let a = plain.decide_situation(&s);
    let b = slow.decide_situation(&s);
    assert_eq!(a.action, b.action);
    assert_eq!(b.source, DecisionSource::Rules);
}

#[test]
fn hung_provider_is_skipped_while_still_running() {
    let hung = Arc::new(Hung::default());
    let config = DecisionConfig {
        strategy_budget: Duration::from_millis(1),
        ..quiet_config()
    };
    let mut engine = DecisionEngine::new(config, Some(6)).with_provider(hung.clone());
    for _ in 0..50 {
        assert_eq!(
            engine.decide_situation(&situation()).source,
            DecisionSource::Rules
        );
    }
    assert_eq!(hung.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn failing_provider_leaves_rule_decision_untouched() {
    let s = situation();
    let mut plain = DecisionEngine::new(quiet_config(), Some(8));
    let mut broken = DecisionEngine::new(quiet_config(), Some(8)).with_provider(Arc::new(Broken));
    assert_eq!(
        plain.decide_situation(&s).action,
        broken.decide_situation(&s).action
    );
}

#[test]
fn trusted_provider_is_fused() {
    let config = DecisionConfig {
        trust_weight: 1.0,
        strategy_budget: Duration::from_secs(2),
        ..quiet_config()
    };
    let mut engine = DecisionEngine::new(config, Some(1)).with_provider(Arc::new(AlwaysFold));
    let d = engine.decide_situation(&situation());
    assert_eq!(d.source, DecisionSource::Fused);
    assert_eq!(d.action, PlayerAction::Fold);
}

#[test]
fn human_seat_falls_back_to_fold() {
    let mut table = Table::seated(
        TableConfig::default(),
        &[Controller::Human, Controller::Ai(Personality::Aggressive)],
        Some(2),
    )
    .unwrap();
    table.start_hand().unwrap();
    let mut engine = DecisionEngine::new(DecisionConfig::default(), Some(2));
    let d = engine.decide(&table, 0);
    assert_eq!(d.source, DecisionSource::Fallback);
    assert_eq!(d.action, PlayerAction::Fold);
}

#[test]
fn attached_engine_sees_hands_it_never_acted_in() {
    let seats = [Controller::Human, Controller::Ai(Personality::Aggressive)];
    let mut attached = DecisionEngine::new(quiet_config(), Some(3));
    let mut detached = DecisionEngine::new(quiet_config(), Some(3));
    let mut table = Table::seated(TableConfig::default(), &seats, Some(3)).unwrap();
    attached.attach(&mut table);

    // the AI seat wins three hands; only the second needs an AI action
    table.start_hand().unwrap();
    table.submit_action(0, PlayerAction::Fold).unwrap();
    table.start_hand().unwrap();
    table.submit_action(1, PlayerAction::Call).unwrap();
    table.submit_action(0, PlayerAction::Fold).unwrap();
    table.start_hand().unwrap();
    table.submit_action(0, PlayerAction::Fold).unwrap();

    table.start_hand().unwrap();
    assert_eq!(table.current_bettor(), Some(1));
    attached.decide(&table, 1);
    detached.decide(&table, 1);
    assert_eq!(attached.history().win_streak(1), 3);
    assert_eq!(detached.history().win_streak(1), 1);
    assert_eq!(attached.history().len(), 3);
}

#[test]
fn unreadable_cards_fall_back_to_fold() {
    let hole = parse_cards("As Kd").unwrap();
    let view = SeatView {
        player: 1,
        personality: Some(Personality::Aggressive),
        hole: Some([hole[0], hole[1]]),
        board: parse_cards("As 7c 2h").unwrap(),
        phase: Phase::Flop,
        pot: 40,
        to_call: 10,
        chips: 990,
        opponents: 1,
    };
    let mut engine = DecisionEngine::new(quiet_config(), Some(5));
    assert!(matches!(
        engine.situation(&view),
        Err(DecisionError::Evaluation(GameError::DuplicateCard(_)))
    ));

    let d = engine.decide_view(&view);
    assert_eq!(d.source, DecisionSource::Fallback);
    assert_eq!(d.action, PlayerAction::Fold);
    assert_eq!(d.strength, None);
}

#[test]
fn strengths_are_cached_per_card_set() {
    let mut table = Table::seated(
        TableConfig::default(),
        &[
            Controller::Ai(Personality::Mathematician),
            Controller::Ai(Personality::Conservative),
        ],
        Some(3),
    )
    .unwrap();
    table.start_hand().unwrap();
    let seat = table.current_bettor().unwrap();
    let mut engine = DecisionEngine::new(quiet_config(), Some(3));
    let first = engine.decide(&table, seat);
    let second = engine.decide(&table, seat);
    assert_eq!(first.strength, second.strength);
    assert_eq!(engine.cache().misses(), 1);
    assert_eq!(engine.cache().hits(), 1);
}

#[test]
fn ai_sessions_conserve_chips() {
    let seats = [
        Controller::Ai(Personality::Conservative),
        Controller::Ai(Personality::Aggressive),
        Controller::Ai(Personality::Deceptive),
        Controller::Ai(Personality::Mathematician),
    ];
    for seed in 0..3u64 {
        let mut table = Table::seated(TableConfig::default(), &seats, Some(seed)).unwrap();
        let mut ai = DecisionEngine::new(DecisionConfig::default(), Some(seed));
        for _ in 0..100 {
            if table.start_hand().is_err() {
                break;
            }
            table.play_ai_turns(&mut ai).unwrap();
            assert_eq!(table.status(), HandStatus::Complete);
            let stacks: u64 = table.players().iter().map(|p| u64::from(p.chips())).sum();
            assert_eq!(stacks + u64::from(table.carried_over()), table.chips_in_play());
        }
    }
}
