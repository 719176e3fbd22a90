//! Rule-based play for each personality.

use holdem_engine::game::Phase;
use holdem_engine::player::{Personality, PlayerAction};
use rand::Rng;

use crate::odds::{expected_value, pot_odds, raise_amount, win_probability};

/// Everything a personality looks at when choosing an action.
#[derive(Debug, Clone, PartialEq)]
pub struct Situation {
    pub personality: Personality,
    pub phase: Phase,
    /// Hand strength in `[0, 1]`, perturbed
    pub strength: f64,
    pub pot: u32,
    pub to_call: u32,
    pub chips: u32,
    /// Live opponents still in the hand
    pub opponents: usize,
    pub win_streak: u32,
    /// Raises among recent human actions
    pub human_raises: usize,
}

impl Situation {
    pub fn pot_odds(&self) -> f64 {
        pot_odds(self.to_call, self.pot)
    }

    pub fn win_probability(&self) -> f64 {
        win_probability(self.strength, self.opponents)
    }

    fn raise_by(&self, factor: f64) -> Intent {
        Intent::Raise(raise_amount(self.pot, self.chips, factor))
    }
}

/// What a strategy wants to do. Raise amounts are on top of the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Fold,
    Call,
    Raise(u32),
}

impl Intent {
    /// Converts to a table action; the cost to call is added to raises.
    pub fn to_action(self, to_call: u32) -> PlayerAction {
        match self {
            // never fold when checking is free
            Intent::Fold if to_call == 0 => PlayerAction::Call,
            Intent::Fold => PlayerAction::Fold,
            Intent::Call | Intent::Raise(0) => PlayerAction::Call,
            Intent::Raise(n) => PlayerAction::Raise(to_call.saturating_add(n)),
        }
    }

    /// Fold 0, call 0.5, raise 1.
    pub fn aggressiveness(self) -> f64 {
        match self {
            Intent::Fold => 0.0,
            Intent::Call => 0.5,
            Intent::Raise(_) => 1.0,
        }
    }
}

/// The mathematician's reasoning, kept for logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MathVerdict {
    pub intent: Intent,
    pub pot_odds: f64,
    pub win_probability: f64,
    pub expected_value: f64,
}

pub fn conservative(s: &Situation, rng: &mut impl Rng) -> Intent {
    if s.strength < 0.3 && rng.random_bool(0.4) {
        return Intent::Fold;
    }
    if s.strength < 0.6 || s.phase == Phase::Preflop {
        return Intent::Call;
    }
    s.raise_by(0.1)
}

pub fn aggressive(s: &Situation, rng: &mut impl Rng) -> Intent {
    if rng.random::<f64>() < 0.7 {
        let factor = 0.3 + rng.random::<f64>() * 0.3;
        let streak = f64::from(s.win_streak.min(5));
        return s.raise_by(factor * (1.0 + 0.1 * streak));
    }
    Intent::Call
}

pub fn deceptive(s: &Situation, rng: &mut impl Rng) -> Intent {
    // slow-play
    if s.strength > 0.7 && rng.random_bool(0.6) {
        return Intent::Call;
    }
    // bluff
    if s.strength < 0.4 && rng.random_bool(0.5) {
        return s.raise_by(0.4);
    }
    conservative(s, rng)
}

/// Raises when the edge over the pot odds exceeds 0.15, calls on any
/// positive edge, folds otherwise.
///
/// ```
/// use holdem_ai::strategy::{mathematician, Intent};
///
/// assert!(matches!(mathematician(0.2, 0.5, 100, 1000).intent, Intent::Raise(_)));
/// assert_eq!(mathematician(0.2, 0.1, 100, 1000).intent, Intent::Fold);
/// ```
pub fn mathematician(pot_odds: f64, win_probability: f64, pot: u32, chips: u32) -> MathVerdict {
    let edge = win_probability - pot_odds;
    let intent = if edge > 0.15 {
        Intent::Raise(raise_amount(pot, chips, win_probability / 2.0))
    } else if edge > 0.0 {
        Intent::Call
    } else {
        Intent::Fold
    };
    // cost = pot_odds * pot / (1 - pot_odds)
    let cost = if pot_odds < 1.0 {
        (pot_odds * f64::from(pot) / (1.0 - pot_odds)).round() as u32
    } else {
        0
    };
    MathVerdict {
        intent,
        pot_odds,
        win_probability,
        expected_value: expected_value(win_probability, pot, cost),
    }
}

/// Answers a human opponent raising often: aggressive raises grow by 20%.
pub fn apply_dynamic_adjustment(personality: Personality, intent: Intent, human_raises: usize) -> Intent {
    match intent {
        Intent::Raise(n) if human_raises > 2 && personality == Personality::Aggressive => {
            Intent::Raise((f64::from(n) * 1.2).ceil() as u32)
        }
        other => other,
    }
}

/// Rule-based intent for the situation's personality, after adjustment.
pub fn rule_intent(s: &Situation, rng: &mut impl Rng) -> Intent {
    let intent = match s.personality {
        Personality::Conservative => conservative(s, rng),
        Personality::Aggressive => aggressive(s, rng),
        Personality::Deceptive => deceptive(s, rng),
        Personality::Mathematician => {
            mathematician(s.pot_odds(), s.win_probability(), s.pot, s.chips).intent
        }
    };
    apply_dynamic_adjustment(s.personality, intent, s.human_raises)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn situation(personality: Personality, strength: f64) -> Situation {
        Situation {
            personality,
            phase: Phase::Flop,
            strength,
            pot: 200,
            to_call: 20,
            chips: 1000,
            opponents: 1,
            win_streak: 0,
            human_raises: 0,
        }
    }

    #[test]
    fn mathematician_sizes_raise_by_half_win_probability() {
        let v = mathematician(0.2, 0.5, 200, 1000);
        assert_eq!(v.intent, Intent::Raise(50));
        assert!(v.expected_value > 0.0);
    }

    #[test]
    fn mathematician_calls_on_thin_edge() {
        assert_eq!(mathematician(0.2, 0.3, 200, 1000).intent, Intent::Call);
    }

    #[test]
    fn conservative_calls_preflop_with_strong_hand() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let mut s = situation(Personality::Conservative, 0.9);
        s.phase = Phase::Preflop;
        assert_eq!(conservative(&s, &mut rng), Intent::Call);
        s.phase = Phase::River;
        assert_eq!(conservative(&s, &mut rng), Intent::Raise(20));
    }

    #[test]
    fn conservative_never_raises_weak_hands() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let s = situation(Personality::Conservative, 0.1);
        let mut folds = 0;
        for _ in 0..1_000 {
            match conservative(&s, &mut rng) {
                Intent::Fold => folds += 1,
                Intent::Call => {}
                Intent::Raise(_) => panic!("weak hand raised"),
            }
        }
        assert!((300..500).contains(&folds), "folds = {folds}");
    }

    #[test]
    fn aggressive_raises_most_of_the_time() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let s = situation(Personality::Aggressive, 0.2);
        let raises = (0..1_000)
            .filter(|_| matches!(aggressive(&s, &mut rng), Intent::Raise(_)))
            .count();
        assert!((630..770).contains(&raises), "raises = {raises}");
    }

    #[test]
    fn win_streak_grows_aggressive_sizing() {
        let cold = situation(Personality::Aggressive, 0.5);
        let hot = Situation {
            win_streak: 3,
            ..cold.clone()
        };
        // same seed, same draws
        let a = aggressive(&cold, &mut ChaCha20Rng::seed_from_u64(11));
        let b = aggressive(&hot, &mut ChaCha20Rng::seed_from_u64(11));
        match (a, b) {
            (Intent::Raise(x), Intent::Raise(y)) => assert!(y > x),
            (x, y) => assert_eq!(x, y),
        }
    }

    #[test]
    fn frequent_human_raises_amplify_aggressive_raises_only() {
        assert_eq!(
            apply_dynamic_adjustment(Personality::Aggressive, Intent::Raise(100), 3),
            Intent::Raise(120)
        );
        assert_eq!(
            apply_dynamic_adjustment(Personality::Aggressive, Intent::Raise(100), 2),
            Intent::Raise(100)
        );
        assert_eq!(
            apply_dynamic_adjustment(Personality::Conservative, Intent::Raise(100), 5),
            Intent::Raise(100)
        );
    }

    #[test]
    fn intent_adds_cost_to_call_and_checks_instead_of_folding() {
        assert_eq!(Intent::Raise(30).to_action(20), PlayerAction::Raise(50));
        assert_eq!(Intent::Fold.to_action(0), PlayerAction::Call);
        assert_eq!(Intent::Fold.to_action(10), PlayerAction::Fold);
    }
}
