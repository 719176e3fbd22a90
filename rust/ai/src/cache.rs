use std::collections::HashMap;

use holdem_engine::cards::Card;
use tracing::trace;

/// Order-independent identity of a set of cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandSignature(u64);

impl HandSignature {
    pub fn of(hole: &[Card], board: &[Card]) -> Self {
        let bits = hole
            .iter()
            .chain(board)
            .fold(0u64, |acc, c| acc | 1u64 << c.index());
        Self(bits)
    }

    pub fn bits(self) -> u64 {
        self.0
    }
}

/// Memoized deterministic hand strengths. Cleared wholesale once full.
#[derive(Debug, Clone)]
pub struct DecisionCache {
    entries: HashMap<HandSignature, f64>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl DecisionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(4096)),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get_or_try_insert<E>(
        &mut self,
        key: HandSignature,
        compute: impl FnOnce() -> Result<f64, E>,
    ) -> Result<f64, E> {
        if let Some(&v) = self.entries.get(&key) {
            self.hits += 1;
            trace!(key = key.bits(), "strength cache hit");
            return Ok(v);
        }
        self.misses += 1;
        let value = compute()?;
        if self.entries.len() >= self.capacity {
            trace!(entries = self.entries.len(), "strength cache cleared");
            self.entries.clear();
        }
        self.entries.insert(key, value);
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    pub fn hits(&self) -> u64 {
        self.hits
    }
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdem_engine::cards::parse_cards;
    use std::convert::Infallible;

    #[test]
    fn signature_ignores_order() {
        let a = parse_cards("As Kd 7c").unwrap();
        let b = parse_cards("7c As Kd").unwrap();
        assert_eq!(HandSignature::of(&a[..2], &a[2..]), HandSignature::of(&b, &[]));
    }

    #[test]
    fn second_lookup_is_a_hit() {
        let mut cache = DecisionCache::new(8);
        let key = HandSignature::of(&parse_cards("As Kd").unwrap(), &[]);
        let mut calls = 0;
        for _ in 0..3 {
            let v = cache
                .get_or_try_insert(key, || {
                    calls += 1;
                    Ok::<_, Infallible>(0.5)
                })
                .unwrap();
            assert_eq!(v, 0.5);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.hits(), 2);
    }

    #[test]
    fn clears_when_full() {
        let mut cache = DecisionCache::new(3);
        let deck = holdem_engine::cards::full_deck();
        for c in &deck[..3] {
            cache
                .get_or_try_insert(HandSignature::of(&[*c], &[]), || Ok::<_, Infallible>(0.1))
                .unwrap();
        }
        assert_eq!(cache.len(), 3);
        cache
            .get_or_try_insert(HandSignature::of(&[deck[3]], &[]), || {
                Ok::<_, Infallible>(0.1)
            })
            .unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_compute_is_not_cached() {
        let mut cache = DecisionCache::new(4);
        let key = HandSignature::of(&parse_cards("As").unwrap(), &[]);
        assert!(cache.get_or_try_insert(key, || Err("boom")).is_err());
        assert!(cache.is_empty());
    }
}
