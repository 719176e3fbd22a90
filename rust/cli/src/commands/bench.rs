//! Bench command handler for hand evaluation throughput.
//!
//! Evaluates seven-card draws from a seeded deck, reshuffling whenever fewer
//! than seven cards remain, and reports the elapsed time and rate.

use crate::error::CliError;
use holdem_engine::deck::Deck;
use holdem_engine::hand::evaluate_hand;
use std::io::Write;

pub fn handle_bench_command(iterations: u64, seed: u64, out: &mut dyn Write) -> Result<(), CliError> {
    if iterations == 0 {
        return Err(CliError::InvalidInput("iterations must be >= 1".to_string()));
    }
    let start = std::time::Instant::now();
    let mut cnt = 0u64;
    let mut deck = Deck::new_with_seed(seed);
    deck.shuffle();
    for _ in 0..iterations {
        if deck.remaining() < 7 {
            deck.shuffle();
        }
        let cards = deck.draw_n(7)?;
        std::hint::black_box(evaluate_hand(&cards)?);
        cnt += 1;
    }
    let dur = start.elapsed();
    let rate = cnt as f64 / dur.as_secs_f64().max(f64::EPSILON);
    writeln!(out, "Benchmark: {} iters in {:?} ({:.0} hands/sec)", cnt, dur, rate)?;
    Ok(())
}
