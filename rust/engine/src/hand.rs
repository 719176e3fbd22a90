use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank};
use crate::errors::GameError;

/// Hand categories, weakest first. Discriminants form the most significant
/// part of [`HandEvaluation::score`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    /// Ace-high straight flush. Only a display label: it is simply the best
    /// straight flush and would rank the same as `StraightFlush` with an ace.
    RoyalFlush = 9,
}

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::HighCard => "High Card",
            Category::OnePair => "One Pair",
            Category::TwoPair => "Two Pair",
            Category::ThreeOfAKind => "Three of a Kind",
            Category::Straight => "Straight",
            Category::Flush => "Flush",
            Category::FullHouse => "Full House",
            Category::FourOfAKind => "Four of a Kind",
            Category::StraightFlush => "Straight Flush",
            Category::RoyalFlush => "Royal Flush",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of ranking 5 to 7 cards.
///
/// `score` packs the category into bits 20.. and the five tie-break ranks
/// into 4-bit nibbles below it, most significant first, so comparing scores
/// compares category and then kickers lexicographically.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct HandEvaluation {
    pub category: Category,
    /// Tie-break ranks ordered high -> low; unused slots are 0.
    /// Straights carry only their effective high card (5 for the wheel).
    pub kickers: [u8; 5],
    pub score: u32,
}

impl HandEvaluation {
    fn new(category: Category, kickers: [u8; 5]) -> Self {
        let score = kickers
            .iter()
            .fold(category as u32, |acc, &k| (acc << 4) | u32::from(k));
        Self {
            category,
            kickers,
            score,
        }
    }

    /// Short human description, e.g. "Straight, Five high".
    pub fn describe(&self) -> String {
        let rank_name = |v: u8| {
            Rank::from_u8(v)
                .map(|r| format!("{r:?}"))
                .unwrap_or_else(|| "?".to_string())
        };
        match self.category {
            Category::RoyalFlush => self.category.name().to_string(),
            Category::Straight | Category::StraightFlush | Category::HighCard | Category::Flush => {
                format!("{}, {} high", self.category, rank_name(self.kickers[0]))
            }
            Category::FullHouse => format!(
                "{}, {}s over {}s",
                self.category,
                rank_name(self.kickers[0]),
                rank_name(self.kickers[1])
            ),
            Category::TwoPair => format!(
                "{}, {}s and {}s",
                self.category,
                rank_name(self.kickers[0]),
                rank_name(self.kickers[1])
            ),
            _ => format!("{}, {}s", self.category, rank_name(self.kickers[0])),
        }
    }
}

impl Ord for HandEvaluation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.cmp(&other.score)
    }
}

impl PartialOrd for HandEvaluation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub fn compare_hands(a: &HandEvaluation, b: &HandEvaluation) -> Ordering {
    a.cmp(b)
}

/// Ranks the best five-card hand contained in `cards`.
///
/// Accepts 5, 6 or 7 distinct cards. The best subset is selected from rank
/// and suit histograms rather than by enumerating combinations.
///
/// # Errors
///
/// [`GameError::InvalidHandSize`] outside 5..=7 cards and
/// [`GameError::DuplicateCard`] if the same card appears twice.
///
/// # Examples
///
/// ```
/// use holdem_engine::cards::parse_cards;
/// use holdem_engine::hand::{evaluate_hand, Category};
///
/// let wheel = evaluate_hand(&parse_cards("As 2d 3c 4h 5s").unwrap()).unwrap();
/// let six_high = evaluate_hand(&parse_cards("2d 3c 4h 5s 6c").unwrap()).unwrap();
/// assert_eq!(wheel.category, Category::Straight);
/// assert_eq!(wheel.kickers[0], 5);
/// assert!(wheel < six_high);
/// ```
pub fn evaluate_hand(cards: &[Card]) -> Result<HandEvaluation, GameError> {
    if !(5..=7).contains(&cards.len()) {
        return Err(GameError::InvalidHandSize(cards.len()));
    }

    let mut seen: u64 = 0;
    let mut rank_counts = [0u8; 15]; // 2..14 used
    let mut rank_mask: u16 = 0;
    let mut by_suit_mask = [0u16; 4];
    for &c in cards {
        let bit = 1u64 << c.index();
        if seen & bit != 0 {
            return Err(GameError::DuplicateCard(c));
        }
        seen |= bit;
        let r = c.rank.value();
        rank_counts[r as usize] += 1;
        rank_mask |= 1 << r;
        by_suit_mask[c.suit.index()] |= 1 << r;
    }

    let flush_mask = by_suit_mask
        .iter()
        .copied()
        .find(|m| m.count_ones() >= 5);

    if let Some(mask) = flush_mask {
        if let Some(high) = straight_high_from_mask(mask) {
            let category = if high == Rank::Ace.value() {
                Category::RoyalFlush
            } else {
                Category::StraightFlush
            };
            return Ok(HandEvaluation::new(category, [high, 0, 0, 0, 0]));
        }
    }

    let of_count = |n: u8| -> Vec<u8> {
        (2..=14u8)
            .rev()
            .filter(|&r| rank_counts[r as usize] >= n)
            .collect()
    };
    let kickers_excluding = |skip: &[u8], n: usize| -> Vec<u8> {
        ranks_desc(rank_mask)
            .filter(|r| !skip.contains(r))
            .take(n)
            .collect()
    };

    let quads = of_count(4);
    if let Some(&quad) = quads.first() {
        let kick = kickers_excluding(&[quad], 1);
        return Ok(HandEvaluation::new(
            Category::FourOfAKind,
            pack(&[quad], &kick),
        ));
    }

    let trips = of_count(3);
    if let Some(&trip) = trips.first() {
        // a second triple counts as the pair
        if let Some(&pair) = of_count(2).iter().find(|&&r| r != trip) {
            return Ok(HandEvaluation::new(
                Category::FullHouse,
                [trip, pair, 0, 0, 0],
            ));
        }
    }

    if let Some(mask) = flush_mask {
        let top: Vec<u8> = ranks_desc(mask).take(5).collect();
        return Ok(HandEvaluation::new(Category::Flush, pack(&top, &[])));
    }

    if let Some(high) = straight_high_from_mask(rank_mask) {
        return Ok(HandEvaluation::new(Category::Straight, [high, 0, 0, 0, 0]));
    }

    if let Some(&trip) = trips.first() {
        let kick = kickers_excluding(&[trip], 2);
        return Ok(HandEvaluation::new(
            Category::ThreeOfAKind,
            pack(&[trip], &kick),
        ));
    }

    let pairs = of_count(2);
    if pairs.len() >= 2 {
        let (high, low) = (pairs[0], pairs[1]);
        // a third pair is eligible as the kicker
        let kick = kickers_excluding(&[high, low], 1);
        return Ok(HandEvaluation::new(
            Category::TwoPair,
            pack(&[high, low], &kick),
        ));
    }
    if let Some(&pair) = pairs.first() {
        let kick = kickers_excluding(&[pair], 3);
        return Ok(HandEvaluation::new(
            Category::OnePair,
            pack(&[pair], &kick),
        ));
    }

    let top: Vec<u8> = ranks_desc(rank_mask).take(5).collect();
    Ok(HandEvaluation::new(Category::HighCard, pack(&top, &[])))
}

fn pack(made: &[u8], kickers: &[u8]) -> [u8; 5] {
    let mut k = [0u8; 5];
    for (slot, &r) in k.iter_mut().zip(made.iter().chain(kickers)) {
        *slot = r;
    }
    k
}

fn ranks_desc(mask: u16) -> impl Iterator<Item = u8> {
    (2..=14u8).rev().filter(move |r| mask & (1 << r) != 0)
}

fn straight_high_from_mask(mask: u16) -> Option<u8> {
    // Treat Ace as 14 and additionally as 1 for the wheel
    let mut m = mask;
    if (m & (1 << 14)) != 0 {
        m |= 1 << 1;
    }
    // Sliding 5-bit window from Ace(14) down to 5
    (5..=14u8).rev().find(|&high| {
        let window = 0b1_1111u16 << (high - 4);
        (m & window) == window
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn eval(s: &str) -> HandEvaluation {
        evaluate_hand(&parse_cards(s).unwrap()).unwrap()
    }

    #[test]
    fn mask_straight_detection_prefers_highest_run() {
        // 2..=9 present: best run is 9-high
        let mask: u16 = (2..=9).fold(0, |m, r| m | (1 << r));
        assert_eq!(straight_high_from_mask(mask), Some(9));
        let wheel = (1 << 14) | (1 << 2) | (1 << 3) | (1 << 4) | (1 << 5);
        assert_eq!(straight_high_from_mask(wheel), Some(5));
        let broken = (1 << 14) | (1 << 13) | (1 << 12) | (1 << 11) | (1 << 9);
        assert_eq!(straight_high_from_mask(broken), None);
    }

    #[test]
    fn score_packs_category_above_kickers() {
        let quads = eval("2c 2d 2h 2s 3c");
        let full = eval("Ac Ad Ah Kc Kd");
        assert_eq!(quads.score >> 20, Category::FourOfAKind as u32);
        assert!(quads > full);
    }

    #[test]
    fn third_pair_can_play_as_kicker() {
        // KK QQ 99 + 2: kicker must be the nine, not the deuce
        let h = eval("Kc Kd Qc Qd 9h 9s 2c");
        assert_eq!(h.category, Category::TwoPair);
        assert_eq!(h.kickers, [13, 12, 9, 0, 0]);
    }

    #[test]
    fn two_triples_make_a_full_house() {
        let h = eval("7c 7d 7h 4c 4d 4h As");
        assert_eq!(h.category, Category::FullHouse);
        assert_eq!(h.kickers[..2], [7, 4]);
    }

    #[test]
    fn rejects_bad_input_without_panicking() {
        let four = parse_cards("As Ks Qs Js").unwrap();
        assert_eq!(evaluate_hand(&four), Err(GameError::InvalidHandSize(4)));
        let dup = parse_cards("As As Qs Js Ts").unwrap();
        assert!(matches!(
            evaluate_hand(&dup),
            Err(GameError::DuplicateCard(_))
        ));
    }

    #[test]
    fn describe_names_the_hand() {
        assert_eq!(eval("Ah Kh Qh Jh Th").describe(), "Royal Flush");
        assert_eq!(eval("As 2d 3c 4h 5s").describe(), "Straight, Five high");
        assert_eq!(eval("Kc Kd Qc Qd 9h").describe(), "Two Pair, Kings and Queens");
    }
}
