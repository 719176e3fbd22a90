//! Hand strength on a `[0, 1]` scale.
//!
//! Preflop there is nothing to evaluate beyond the two hole cards, so a
//! starting-hand chart is used. From the flop on, the evaluator's category
//! sets a base value and the primary rank moves it toward the next category.

use holdem_engine::cards::Card;
use holdem_engine::errors::GameError;
use holdem_engine::hand::{Category, HandEvaluation, evaluate_hand};

/// Starting-hand chart, 0 to 10:
/// - 9-10: Premium hands (AA, KK, QQ, JJ, AKs)
/// - 7-8: Strong hands (TT-99, AK, AQ, KQs)
/// - 5-6: Medium hands (88-77, AJ, suited broadway connectors)
/// - 3-4: Marginal hands (66-22, Ax, suited connectors)
/// - 0-2: Weak hands (offsuit low cards)
fn preflop_chart(hole: [Card; 2]) -> u8 {
    let r1 = hole[0].rank.value();
    let r2 = hole[1].rank.value();
    let (high, low) = if r1 > r2 { (r1, r2) } else { (r2, r1) };
    let suited = hole[0].suit == hole[1].suit;
    let pick = |s: u8, o: u8| if suited { s } else { o };

    if r1 == r2 {
        return match high {
            13..=14 => 10,
            11..=12 => 9,
            10 => 8,
            9 => 7,
            8 => 6,
            7 => 5,
            _ => 4,
        };
    }

    match (high, low) {
        (14, 13) => pick(10, 8),
        (14, 12) => pick(8, 7),
        (14, 11) => pick(7, 6),
        (14, 10) => pick(6, 5),
        (14, _) => pick(5, 4),
        (13, 12) => pick(7, 6),
        (13, 11) => pick(6, 5),
        (13, 10) => pick(5, 4),
        (12, 11) => pick(6, 5),
        (12, 10) => pick(5, 4),
        _ if suited && high - low <= 2 => {
            if high >= 9 {
                5
            } else {
                4
            }
        }
        // broadway
        _ if high >= 11 && low >= 9 => 4,
        _ => 2,
    }
}

pub fn preflop_strength(hole: [Card; 2]) -> f64 {
    f64::from(preflop_chart(hole)) / 10.0
}

/// Base value of each category before rank interpolation.
pub fn category_base(category: Category) -> f64 {
    match category {
        Category::HighCard => 0.1,
        Category::OnePair => 0.3,
        Category::TwoPair => 0.5,
        Category::ThreeOfAKind => 0.7,
        Category::Straight => 0.8,
        Category::Flush => 0.85,
        Category::FullHouse => 0.9,
        Category::FourOfAKind => 0.97,
        Category::StraightFlush | Category::RoyalFlush => 1.0,
    }
}

fn next_base(category: Category) -> f64 {
    match category {
        Category::HighCard => category_base(Category::OnePair),
        Category::OnePair => category_base(Category::TwoPair),
        Category::TwoPair => category_base(Category::ThreeOfAKind),
        Category::ThreeOfAKind => category_base(Category::Straight),
        Category::Straight => category_base(Category::Flush),
        Category::Flush => category_base(Category::FullHouse),
        Category::FullHouse => category_base(Category::FourOfAKind),
        _ => 1.0,
    }
}

pub fn postflop_strength(eval: &HandEvaluation) -> f64 {
    let base = category_base(eval.category);
    let top = f64::from(eval.kickers[0].saturating_sub(2)) / 12.0;
    // stay strictly below the next category
    base + (next_base(eval.category) - base) * top * 0.9
}

/// Deterministic strength of `hole` against `board` (0, 3, 4 or 5 cards).
pub fn hand_strength(hole: [Card; 2], board: &[Card]) -> Result<f64, GameError> {
    if board.is_empty() {
        return Ok(preflop_strength(hole));
    }
    let mut cards = Vec::with_capacity(2 + board.len());
    cards.extend_from_slice(&hole);
    cards.extend_from_slice(board);
    let eval = evaluate_hand(&cards)?;
    Ok(postflop_strength(&eval))
}
