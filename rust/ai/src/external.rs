//! Optional learned-strategy provider consulted under a time budget.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use holdem_engine::game::Phase;
use holdem_engine::player::Personality;
use thiserror::Error;

use crate::strategy::Intent;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("strategy provider timed out after {0:?}")]
    Timeout(Duration),
    #[error("strategy provider unavailable: {0}")]
    Unavailable(String),
    #[error("strategy provider failed: {0}")]
    Failed(String),
    #[error("strategy provider still busy with an earlier request")]
    Busy,
}

/// Features handed to a strategy provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerFeatures {
    pub personality: Personality,
    pub phase: Phase,
    pub strength: f64,
    pub pot_odds: f64,
    pub pot: u32,
    pub to_call: u32,
    pub chips: u32,
    pub opponents: usize,
    pub board_cards: usize,
    pub win_streak: u32,
    pub human_raises: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictedAction {
    Fold,
    Call,
    Raise,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub action: PredictedAction,
    /// In `[0, 1]`; scales how much the prediction is trusted.
    pub confidence: f64,
}

impl Prediction {
    fn aggressiveness(&self) -> f64 {
        match self.action {
            PredictedAction::Fold => 0.0,
            PredictedAction::Call => 0.5,
            PredictedAction::Raise => 1.0,
        }
    }
}

pub trait StrategyProvider: Send + Sync {
    fn name(&self) -> &str;

    fn predict(&self, features: &PlayerFeatures) -> Result<Prediction, StrategyError>;
}

type Job = (
    PlayerFeatures,
    mpsc::Sender<Result<Prediction, StrategyError>>,
);

/// Serves a [`StrategyProvider`] from a single long-lived thread.
///
/// At most one prediction is in flight. A request whose caller gave up keeps
/// the worker busy until the provider returns, and every request made in the
/// meantime is refused with [`StrategyError::Busy`] instead of queueing.
/// Dropping the worker lets its thread exit after the current prediction.
pub struct StrategyWorker {
    name: String,
    jobs: mpsc::Sender<Job>,
    busy: Arc<AtomicBool>,
}

impl StrategyWorker {
    pub fn spawn(provider: Arc<dyn StrategyProvider>) -> Result<Self, StrategyError> {
        let (jobs, queue) = mpsc::channel::<Job>();
        let busy = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&busy);
        let name = provider.name().to_string();
        thread::Builder::new()
            .name(format!("strategy-{}", name))
            .spawn(move || {
                for (features, reply) in queue {
                    let result = provider.predict(&features);
                    flag.store(false, Ordering::Release);
                    // the caller may have timed out already
                    let _ = reply.send(result);
                }
            })
            .map_err(|e| StrategyError::Unavailable(e.to_string()))?;
        Ok(Self { name, jobs, busy })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a prediction, possibly an abandoned one, is still running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Asks for a prediction and waits at most `budget`; a late answer is discarded.
    pub fn predict_within(
        &self,
        features: PlayerFeatures,
        budget: Duration,
    ) -> Result<Prediction, StrategyError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(StrategyError::Busy);
        }
        let (tx, rx) = mpsc::channel();
        if self.jobs.send((features, tx)).is_err() {
            self.busy.store(false, Ordering::Release);
            return Err(StrategyError::Unavailable(
                "worker thread has exited".to_string(),
            ));
        }

        match rx.recv_timeout(budget) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(StrategyError::Timeout(budget)),
            Err(RecvTimeoutError::Disconnected) => Err(StrategyError::Failed(
                "worker exited without an answer".to_string(),
            )),
        }
    }
}

/// Blends the rule intent with a prediction on the fold/call/raise scale.
///
/// The prediction's weight is `trust × confidence`. Below 0.25 folds, from
/// 0.75 raises (keeping the rule's size, or `default_raise`), calls between.
pub fn fuse(rule: Intent, prediction: &Prediction, trust: f64, default_raise: u32) -> Intent {
    let weight = (trust * prediction.confidence).clamp(0.0, 1.0);
    let score = rule.aggressiveness() * (1.0 - weight) + prediction.aggressiveness() * weight;
    if score < 0.25 {
        Intent::Fold
    } else if score < 0.75 {
        Intent::Call
    } else {
        match rule {
            Intent::Raise(n) => Intent::Raise(n),
            _ => Intent::Raise(default_raise),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct Fixed(Prediction);

    impl StrategyProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn predict(&self, _: &PlayerFeatures) -> Result<Prediction, StrategyError> {
            Ok(self.0)
        }
    }

    #[derive(Default)]
    struct Slow {
        calls: AtomicUsize,
    }

    impl StrategyProvider for Slow {
        fn name(&self) -> &str {
            "slow"
        }
        fn predict(&self, _: &PlayerFeatures) -> Result<Prediction, StrategyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(300));
            Ok(Prediction {
                action: PredictedAction::Raise,
                confidence: 1.0,
            })
        }
    }

    fn features() -> PlayerFeatures {
        PlayerFeatures {
            personality: Personality::Mathematician,
            phase: Phase::Turn,
            strength: 0.5,
            pot_odds: 0.2,
            pot: 100,
            to_call: 25,
            chips: 500,
            opponents: 1,
            board_cards: 4,
            win_streak: 0,
            human_raises: 0,
        }
    }

    #[test]
    fn answer_within_budget_is_returned() {
        let worker = StrategyWorker::spawn(Arc::new(Fixed(Prediction {
            action: PredictedAction::Call,
            confidence: 0.8,
        })))
        .unwrap();
        for _ in 0..3 {
            let got = worker
                .predict_within(features(), Duration::from_secs(2))
                .unwrap();
            assert_eq!(got.action, PredictedAction::Call);
        }
    }

    #[test]
    fn slow_provider_times_out() {
        let worker = StrategyWorker::spawn(Arc::new(Slow::default())).unwrap();
        let budget = Duration::from_millis(20);
        assert_eq!(
            worker.predict_within(features(), budget),
            Err(StrategyError::Timeout(budget))
        );
    }

    #[test]
    fn abandoned_calls_do_not_pile_up() {
        let slow = Arc::new(Slow::default());
        let worker = StrategyWorker::spawn(slow.clone()).unwrap();
        let budget = Duration::from_millis(1);

        assert_eq!(
            worker.predict_within(features(), budget),
            Err(StrategyError::Timeout(budget))
        );
        for _ in 0..100 {
            assert_eq!(
                worker.predict_within(features(), budget),
                Err(StrategyError::Busy)
            );
        }
        assert_eq!(slow.calls.load(Ordering::SeqCst), 1);

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while worker.is_busy() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        let got = worker
            .predict_within(features(), Duration::from_secs(2))
            .unwrap();
        assert_eq!(got.action, PredictedAction::Raise);
        assert_eq!(slow.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn low_trust_keeps_rule_intent() {
        let fold = Prediction {
            action: PredictedAction::Fold,
            confidence: 1.0,
        };
        assert_eq!(fuse(Intent::Call, &fold, 0.35, 10), Intent::Call);
        assert_eq!(fuse(Intent::Call, &fold, 0.0, 10), Intent::Call);
    }

    #[test]
    fn full_trust_follows_prediction() {
        let raise = Prediction {
            action: PredictedAction::Raise,
            confidence: 1.0,
        };
        assert_eq!(fuse(Intent::Fold, &raise, 1.0, 40), Intent::Raise(40));
        assert_eq!(fuse(Intent::Raise(15), &raise, 1.0, 40), Intent::Raise(15));
    }
}
