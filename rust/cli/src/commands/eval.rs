//! Eval command handler: ranks the cards given on the command line.

use crate::error::CliError;
use crate::formatters::format_board;
use holdem_engine::cards::{Card, parse_cards};
use holdem_engine::hand::{HandEvaluation, compare_hands, evaluate_hand};
use std::cmp::Ordering;
use std::io::Write;

/// Handle the eval command.
///
/// `cards` may be separate tokens (`As Ks`) or one quoted list (`"As,Ks"`).
/// With `against`, both hands are ranked and the better one is named.
///
/// # Errors
///
/// `CliError::Engine` for an unparsable card, a duplicate card or a hand
/// outside 5 to 7 cards.
pub fn handle_eval_command(
    cards: &[String],
    against: Option<&[String]>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let (hand, eval) = rank(cards)?;
    writeln!(out, "Hand: {}", format_board(&hand))?;
    writeln!(out, "Rank: {}", eval.describe())?;
    writeln!(out, "Score: {:#08x}", eval.score)?;

    if let Some(other) = against {
        let (other_hand, other_eval) = rank(other)?;
        writeln!(out, "Against: {}", format_board(&other_hand))?;
        writeln!(out, "Rank: {}", other_eval.describe())?;
        let verdict = match compare_hands(&eval, &other_eval) {
            Ordering::Greater => "first hand wins",
            Ordering::Less => "second hand wins",
            Ordering::Equal => "tie",
        };
        writeln!(out, "Result: {}", verdict)?;
    }
    Ok(())
}

fn rank(tokens: &[String]) -> Result<(Vec<Card>, HandEvaluation), CliError> {
    let cards = parse_cards(&tokens.join(" "))?;
    let eval = evaluate_hand(&cards)?;
    Ok((cards, eval))
}
