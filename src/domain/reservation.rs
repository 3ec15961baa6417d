use crate::domain::account::{AccountId, Credits};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a reservation, allocated by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservationId(pub u64);

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationState {
    Held,
    Committed,
    Released,
    Expired,
}

impl fmt::Display for ReservationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReservationState::Held => "held",
            ReservationState::Committed => "committed",
            ReservationState::Released => "released",
            ReservationState::Expired => "expired",
        };
        write!(f, "{s}")
    }
}

/// A temporary hold against an account's available credits.
///
/// Transitions exactly once from `Held` to one of the terminal states
/// (`Committed`, `Released`, `Expired`) and is immutable thereafter.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Reservation {
    pub id: ReservationId,
    pub account_id: AccountId,
    pub amount: Credits,
    pub state: ReservationState,
    pub created_at: DateTime<Utc>,
    /// `None` means the hold never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Reservation {
    pub fn held(
        id: ReservationId,
        account_id: AccountId,
        amount: Credits,
        now: DateTime<Utc>,
        ttl: Option<Duration>,
    ) -> Self {
        Self {
            id,
            account_id,
            amount,
            state: ReservationState::Held,
            created_at: now,
            expires_at: ttl.map(|ttl| now + ttl),
        }
    }

    /// Whether this hold is past its deadline and still unsettled.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.state == ReservationState::Held
            && self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}
