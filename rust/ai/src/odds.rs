//! Pot odds, win probability, raise sizing and expected value.

/// Share of the final pot a call costs: `cost / (pot + cost)`. Zero when free.
pub fn pot_odds(cost_to_call: u32, pot: u32) -> f64 {
    if cost_to_call == 0 {
        return 0.0;
    }
    f64::from(cost_to_call) / (f64::from(pot) + f64::from(cost_to_call))
}

/// Win probability from strength, discounted for each extra live opponent.
pub fn win_probability(strength: f64, opponents: usize) -> f64 {
    let extra = opponents.saturating_sub(1) as f64;
    strength.clamp(0.0, 1.0).powf(1.0 + 0.25 * extra)
}

/// Chips to raise on top of the call: `min(ceil(pot × factor), chips / 2)`,
/// at least one chip and never more than `chips`.
///
/// ```
/// use holdem_ai::odds::raise_amount;
///
/// assert_eq!(raise_amount(100, 1000, 0.25), 25);
/// assert_eq!(raise_amount(1000, 300, 0.5), 150);
/// assert_eq!(raise_amount(0, 300, 0.5), 1);
/// ```
pub fn raise_amount(pot: u32, chips: u32, factor: f64) -> u32 {
    let wanted = (f64::from(pot) * factor.max(0.0)).ceil();
    let wanted = if wanted >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        wanted as u32
    };
    wanted.min(chips / 2).max(1).min(chips)
}

/// `p · (pot + cost) − cost`
pub fn expected_value(win_probability: f64, pot: u32, cost_to_call: u32) -> f64 {
    win_probability * (f64::from(pot) + f64::from(cost_to_call)) - f64::from(cost_to_call)
}
