//! Deal command handler.
//!
//! Deals hole cards to each seat and a full board from one shuffled deck,
//! ranks every seven-card hand and names the winner or the split.

use crate::error::CliError;
use crate::formatters::{format_board, format_card};
use holdem_engine::cards::Card;
use holdem_engine::deck::Deck;
use holdem_engine::hand::evaluate_hand;
use std::io::Write;

/// Handle the deal command.
///
/// Output is one `Seed:` line, one `Board:` line, a `Hole Pn:` line per seat
/// and a final `Winner:` or `Split:` line. The same seed always yields the
/// same output.
pub fn handle_deal_command(
    seed: Option<u64>,
    players: u8,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    if players < 2 {
        return Err(CliError::InvalidInput("at least 2 players required".into()));
    }
    let base_seed = seed.unwrap_or_else(rand::random);
    let mut deck = Deck::new_with_seed(base_seed);
    deck.shuffle();

    let n = usize::from(players);
    let mut holes: Vec<Vec<Card>> = vec![Vec::with_capacity(2); n];
    for _ in 0..2 {
        for hole in holes.iter_mut() {
            hole.push(deck.draw()?);
        }
    }
    let board = deck.draw_n(5)?;

    writeln!(out, "Seed: {}", base_seed)?;
    writeln!(out, "Board: {}", format_board(&board))?;

    let mut scores = Vec::with_capacity(n);
    for (seat, hole) in holes.iter().enumerate() {
        let mut cards = hole.clone();
        cards.extend_from_slice(&board);
        let eval = evaluate_hand(&cards)?;
        writeln!(
            out,
            "Hole P{}: {} {}  {}",
            seat + 1,
            format_card(&hole[0]),
            format_card(&hole[1]),
            eval.describe()
        )?;
        scores.push(eval.score);
    }

    let best = scores.iter().copied().max().unwrap_or_default();
    let winners: Vec<String> = scores
        .iter()
        .enumerate()
        .filter(|&(_, &s)| s == best)
        .map(|(seat, _)| format!("P{}", seat + 1))
        .collect();
    if winners.len() == 1 {
        writeln!(out, "Winner: {}", winners[0])?;
    } else {
        writeln!(out, "Split: {}", winners.join(", "))?;
    }
    Ok(())
}
