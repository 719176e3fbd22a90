//! Simulation command handler.
//!
//! Seats one AI per configured personality and plays up to `hands` hands,
//! stopping early once fewer than two seats have chips. After every hand the
//! table's chips are recounted against the chips the session started with;
//! any drift aborts the run. With `--output`, each hand is appended to a
//! JSON Lines history.

use crate::config::{self, Overrides};
use crate::error::CliError;
use crate::ui;
use holdem_ai::DecisionEngine;
use holdem_engine::engine::Table;
use holdem_engine::errors::GameError;
use holdem_engine::game::HandStatus;
use holdem_engine::logger::{HandLogger, HandRecord};
use holdem_engine::player::Controller;
use std::io::Write;

/// Handle the sim command.
///
/// The AI's RNG is seeded from the table seed, so a seeded run is fully
/// reproducible.
///
/// # Errors
///
/// * `CliError::InvalidInput` when `hands` is zero
/// * `CliError::Config` for an invalid configuration
/// * `CliError::Engine` when a hand aborts or chips are not conserved
/// * `CliError::Io` when the history file cannot be written
pub fn handle_sim_command(
    hands: u64,
    output: Option<String>,
    overrides: &Overrides,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if hands == 0 {
        return Err(CliError::InvalidInput("hands must be >= 1".to_string()));
    }
    let cfg = config::resolve(overrides)?.config;
    let base_seed = cfg.seed.unwrap_or_else(rand::random);

    let seats: Vec<Controller> = cfg
        .personalities
        .iter()
        .map(|&p| Controller::Ai(p))
        .collect();
    let mut table = Table::seated(cfg.table_config(), &seats, Some(base_seed))?;
    let mut ai = DecisionEngine::new(cfg.decision_config(), Some(base_seed.wrapping_add(1)));
    ai.attach(&mut table);
    let mut logger = match &output {
        Some(path) => HandLogger::create(path)?,
        None => HandLogger::detached(&chrono::Utc::now().format("%Y%m%d").to_string()),
    };

    let mut wins = vec![0u64; seats.len()];
    let mut played = 0u64;
    for _ in 0..hands {
        match table.start_hand() {
            Err(GameError::NotEnoughPlayers { .. }) => {
                ui::display_warning(
                    err,
                    &format!(
                        "table ended after {} of {} hands: fewer than two players have chips",
                        played, hands
                    ),
                )?;
                break;
            }
            other => other?,
        }
        table.play_ai_turns(&mut ai)?;
        if table.status() != HandStatus::Complete {
            return Err(GameError::HandInProgress.into());
        }
        let result = table
            .last_result()
            .ok_or(CliError::Engine(GameError::NoHandInProgress))?;

        let counted: u64 = table
            .players()
            .iter()
            .map(|p| u64::from(p.chips()))
            .sum::<u64>()
            + u64::from(table.carried_over());
        if counted != table.chips_in_play() {
            return Err(GameError::ChipConservation {
                expected: table.chips_in_play(),
                actual: counted,
            }
            .into());
        }

        for &w in &result.winners {
            wins[w] += 1;
        }
        let record = HandRecord::from_hand(
            logger.next_id(),
            table.seed(),
            table.action_log(),
            result,
        );
        logger.write(&record)?;
        played += 1;
    }

    writeln!(out, "Simulated: {} hands (seed {})", played, base_seed)?;
    writeln!(out, "{:<5} {:<14} {:>8} {:>6}", "Seat", "Personality", "Stack", "Wins")?;
    for (player, won) in table.players().iter().zip(&wins) {
        let personality = player.personality().map_or("human", |p| p.as_str());
        writeln!(
            out,
            "{:<5} {:<14} {:>8} {:>6}",
            format!("P{}", player.id() + 1),
            personality,
            player.chips(),
            won
        )?;
    }
    if table.carried_over() > 0 {
        writeln!(out, "Carried over: {}", table.carried_over())?;
    }
    writeln!(
        out,
        "Decision cache: {} hits, {} misses",
        ai.cache().hits(),
        ai.cache().misses()
    )?;
    writeln!(out, "Chip conservation: ok ({} chips)", table.chips_in_play())?;
    if let Some(path) = output {
        writeln!(out, "History: {}", path)?;
    }
    Ok(())
}
