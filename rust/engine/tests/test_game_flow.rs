use std::cell::RefCell;
use std::rc::Rc;

use holdem_engine::engine::{ActionProvider, Table, TableConfig};
use holdem_engine::errors::GameError;
use holdem_engine::game::{HandStatus, Phase};
use holdem_engine::player::{Controller, Personality, Player, PlayerAction, PlayerId};
use holdem_engine::pot::UnclaimedPotPolicy;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn humans(stacks: &[u32]) -> Table {
    let players = stacks
        .iter()
        .enumerate()
        .map(|(i, &chips)| Player::human(i, chips))
        .collect();
    Table::new(TableConfig::default(), players, Some(11)).unwrap()
}

fn call_down(table: &mut Table) {
    while let Some(id) = table.current_bettor() {
        table.submit_action(id, PlayerAction::Call).unwrap();
    }
}

struct RandomActions(ChaCha20Rng);

impl ActionProvider for RandomActions {
    fn next_action(&mut self, table: &Table, _player: PlayerId) -> PlayerAction {
        match self.0.random_range(0..10) {
            0 => PlayerAction::Fold,
            1..=6 => PlayerAction::Call,
            _ => PlayerAction::Raise(self.0.random_range(1..=table.ledger().pot().max(2))),
        }
    }
}

#[test]
fn calling_down_reaches_showdown_with_full_board() {
    let mut table = humans(&[1000, 1000, 1000]);
    table.start_hand().unwrap();
    call_down(&mut table);

    assert_eq!(table.status(), HandStatus::Complete);
    assert_eq!(table.phase(), Phase::Showdown);
    assert_eq!(table.board().len(), 5);
    let result = table.last_result().unwrap();
    assert_eq!(result.showdown.as_ref().map(Vec::len), Some(3));
    assert!(result.hand_rank.is_some());
    let paid: u32 = result.payouts.iter().map(|p| p.amount).sum();
    assert_eq!(paid, 30);
    assert_eq!(table.players().iter().map(|p| p.chips()).sum::<u32>(), 3000);
}

#[test]
fn last_player_standing_wins_without_evaluation() {
    let mut table = humans(&[1000, 1000, 1000]);
    table.start_hand().unwrap();
    // button 0, blinds on 1 and 2; seat 0 opens
    assert_eq!(table.current_bettor(), Some(0));
    table.submit_action(0, PlayerAction::Fold).unwrap();
    table.submit_action(1, PlayerAction::Fold).unwrap();

    let result = table.last_result().unwrap();
    assert!(result.is_uncontested());
    assert_eq!(result.winners, vec![2]);
    assert_eq!(result.hand_rank, None);
    assert_eq!(result.payout_for(2), 15);
    assert_eq!(table.players()[2].chips(), 1005);
    assert!(table.board().is_empty());
}

#[test]
fn short_stack_all_in_builds_side_pot() {
    let mut table = humans(&[1000, 1000, 50]);
    table.start_hand().unwrap();
    table.submit_action(0, PlayerAction::Raise(100)).unwrap();
    table.submit_action(1, PlayerAction::Call).unwrap();
    let allin = table.submit_action(2, PlayerAction::Call).unwrap();
    assert_eq!(allin.chips(), 40);

    let state = table.public_state();
    assert_eq!(state.current_phase, Phase::Flop);
    assert_eq!(state.main_pot.amount, 150);
    assert_eq!(state.main_pot.eligible, vec![0, 1, 2]);
    assert_eq!(state.side_pots.len(), 1);
    assert_eq!(state.side_pots[0].amount, 100);
    assert_eq!(state.side_pots[0].eligible, vec![0, 1]);

    call_down(&mut table);
    let result = table.last_result().unwrap();
    assert!(result.payout_for(2) <= 150);
    assert_eq!(table.players().iter().map(|p| p.chips()).sum::<u32>(), 2050);
}

#[test]
fn out_of_turn_action_leaves_state_unchanged() {
    let mut table = humans(&[1000, 1000, 1000]);
    table.start_hand().unwrap();
    let before = table.public_state();
    assert_eq!(
        table.submit_action(2, PlayerAction::Call),
        Err(GameError::InvalidTurn {
            expected: 0,
            actual: 2
        })
    );
    assert!(matches!(
        table.submit_action(0, PlayerAction::Raise(0)),
        Err(GameError::MalformedAction(_))
    ));
    assert_eq!(table.public_state(), before);
    assert!(table.action_log().is_empty());
}

#[test]
fn public_state_is_idempotent() {
    let mut table = humans(&[1000, 1000]);
    table.start_hand().unwrap();
    assert_eq!(table.public_state(), table.public_state());
}

#[test]
fn busted_player_is_not_dealt_in() {
    let mut table = humans(&[1000, 0, 1000]);
    table.start_hand().unwrap();
    assert!(table.players()[1].is_folded());
    assert!(table.players()[1].hand().is_none());
    assert!(table.players()[0].hand().is_some());

    let mut lonely = humans(&[1000, 0]);
    assert_eq!(
        lonely.start_hand(),
        Err(GameError::NotEnoughPlayers { found: 1 })
    );
}

#[test]
fn exhausted_deck_aborts_and_refunds() {
    let mut table = humans(&[1000; 27]);
    assert_eq!(table.start_hand(), Err(GameError::DeckExhausted));
    assert_eq!(table.status(), HandStatus::Aborted);
    assert!(table.players().iter().all(|p| p.chips() == 1000));
    assert!(table.last_result().is_none());
}

#[test]
fn stacks_beyond_table_limit_are_rejected() {
    let players = vec![
        Player::human(0, 3_000_000_000),
        Player::human(1, 3_000_000_000),
    ];
    assert!(matches!(
        Table::new(TableConfig::default(), players, Some(1)),
        Err(GameError::InvalidConfig(_))
    ));

    let config = TableConfig {
        starting_stack: 3_000_000_000,
        ..TableConfig::default()
    };
    assert!(matches!(
        config.validate_for(2),
        Err(GameError::InvalidConfig(_))
    ));
    assert!(config.validate_for(1).is_ok());
}

#[test]
fn all_in_at_table_limit_settles_every_chip() {
    let half = u32::MAX / 2;
    let mut table = humans(&[half, half]);
    table.start_hand().unwrap();
    let first = table.current_bettor().unwrap();
    table
        .submit_action(first, PlayerAction::Raise(u32::MAX))
        .unwrap();
    let second = table.current_bettor().unwrap();
    table.submit_action(second, PlayerAction::Call).unwrap();
    call_down(&mut table);

    assert_eq!(table.status(), HandStatus::Complete);
    let stacks: u64 = table.players().iter().map(|p| u64::from(p.chips())).sum();
    assert_eq!(stacks + u64::from(table.carried_over()), u64::from(half) * 2);
}

#[test]
fn shuffle_progress_is_reported_without_changing_the_deal() {
    let mut plain = humans(&[1000, 1000]);
    let mut watched = humans(&[1000, 1000]);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    watched.on_shuffle_progress(move |p| sink.borrow_mut().push(p));

    plain.start_hand().unwrap();
    watched.start_hand().unwrap();
    call_down(&mut plain);
    call_down(&mut watched);

    let progress = seen.borrow();
    assert!(progress.len() > 1);
    assert!(progress.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(progress.last().copied(), Some(1.0));
    assert_eq!(plain.board(), watched.board());
    assert_eq!(plain.last_result(), watched.last_result());
}

#[test]
fn observers_fire_once_per_hand() {
    let mut table = humans(&[1000, 1000]);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    table.on_hand_complete(move |r| sink.borrow_mut().push(r.hand_number));

    for _ in 0..3 {
        table.start_hand().unwrap();
        let id = table.current_bettor().unwrap();
        table.submit_action(id, PlayerAction::Fold).unwrap();
    }
    assert_eq!(*seen.borrow(), vec![1, 2, 3]);
}

fn play_session(policy: UnclaimedPotPolicy, seed: u64) {
    let config = TableConfig {
        unclaimed_pot_policy: policy,
        ..TableConfig::default()
    };
    let controllers = [
        Controller::Ai(Personality::Aggressive),
        Controller::Ai(Personality::Conservative),
        Controller::Ai(Personality::Deceptive),
        Controller::Ai(Personality::Mathematician),
    ];
    let mut table = Table::seated(config, &controllers, Some(seed)).unwrap();
    let mut provider = RandomActions(ChaCha20Rng::seed_from_u64(seed));
    for _ in 0..200 {
        match table.start_hand() {
            Ok(()) => {}
            Err(GameError::NotEnoughPlayers { .. }) => break,
            Err(e) => panic!("unexpected error: {e}"),
        }
        table.play_ai_turns(&mut provider).unwrap();
        assert_eq!(table.status(), HandStatus::Complete);
        let stacks: u64 = table.players().iter().map(|p| u64::from(p.chips())).sum();
        assert_eq!(
            stacks + u64::from(table.carried_over()),
            table.chips_in_play()
        );
    }
}

#[test]
fn chips_are_conserved_across_random_sessions() {
    for seed in 0..5 {
        play_session(UnclaimedPotPolicy::AwardNextBest, seed);
        play_session(UnclaimedPotPolicy::Retain, seed);
    }
}
