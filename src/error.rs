use crate::domain::account::{AccountId, Credits};
use crate::domain::reservation::{ReservationId, ReservationState};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SettlementError>;

#[derive(Error, Debug)]
pub enum SettlementError {
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Credits,
        available: Credits,
    },
    #[error("reservation {0} not found")]
    ReservationNotFound(ReservationId),
    #[error("reservation {id} is {state}, not held")]
    InvalidState {
        id: ReservationId,
        state: ReservationState,
    },
    #[error("invalid breakdown input: {0}")]
    InvalidBreakdownInput(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("credit balance overflow for account {0}")]
    BalanceOverflow(AccountId),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}
