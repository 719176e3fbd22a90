use serde::{Deserialize, Serialize};

use crate::errors::GameError;
use crate::player::PlayerAction as A;

/// An action after capping against the player's stack. Amounts are the
/// chips moved by this action alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidatedAction {
    Fold,
    Check,
    Call(u32),
    Raise(u32),
    AllIn(u32),
}

impl ValidatedAction {
    pub fn chips(&self) -> u32 {
        match *self {
            ValidatedAction::Fold | ValidatedAction::Check => 0,
            ValidatedAction::Call(n) | ValidatedAction::Raise(n) | ValidatedAction::AllIn(n) => n,
        }
    }
}

/// Resolves a player action against the betting state.
///
/// Insufficient chips never make an action fail: calls and raises are capped
/// at the stack and become [`ValidatedAction::AllIn`] when they use it up.
///
/// # Arguments
///
/// * `stack` - Player's remaining chip stack
/// * `already` - Chips the player has put in during this betting round
/// * `raise_level` - Round contribution every player must match
/// * `action` - The action the player wishes to perform
///
/// # Errors
///
/// [`GameError::MalformedAction`] for a raise of zero chips.
///
/// # Examples
///
/// ```
/// use holdem_engine::rules::{validate_action, ValidatedAction};
/// use holdem_engine::player::PlayerAction;
///
/// // Short call: 60 chips facing 100 goes all-in
/// assert_eq!(
///     validate_action(60, 0, 100, PlayerAction::Call),
///     Ok(ValidatedAction::AllIn(60))
/// );
///
/// // Over-stack raise is capped, not rejected
/// assert_eq!(
///     validate_action(80, 20, 50, PlayerAction::Raise(500)),
///     Ok(ValidatedAction::AllIn(80))
/// );
/// ```
pub fn validate_action(
    stack: u32,
    already: u32,
    raise_level: u32,
    action: A,
) -> Result<ValidatedAction, GameError> {
    match action {
        A::Fold => Ok(ValidatedAction::Fold),
        A::Call => {
            let to_call = raise_level.saturating_sub(already);
            if to_call == 0 || stack == 0 {
                Ok(ValidatedAction::Check)
            } else if to_call >= stack {
                Ok(ValidatedAction::AllIn(stack))
            } else {
                Ok(ValidatedAction::Call(to_call))
            }
        }
        A::Raise(0) => Err(GameError::MalformedAction(
            "raise requires a positive amount".to_string(),
        )),
        A::Raise(amount) => {
            if stack == 0 {
                Ok(ValidatedAction::Check)
            } else if amount >= stack {
                Ok(ValidatedAction::AllIn(stack))
            } else if amount <= raise_level.saturating_sub(already) {
                // does not lift the level: a (short) call for that many chips
                Ok(ValidatedAction::Call(amount))
            } else {
                Ok(ValidatedAction::Raise(amount))
            }
        }
    }
}
