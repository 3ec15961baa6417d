use crate::error::SettlementError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A quantity of shift credits in the smallest credit unit.
///
/// This is a wrapper around `u64` to enforce domain-specific rules and
/// provide type safety for ledger arithmetic. Balances can never go
/// negative by construction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Credits(pub u64);

/// A strictly positive credit amount for ledger operations.
///
/// Ensures that reserve and top-up amounts are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(Credits);

impl Amount {
    pub fn new(value: u64) -> Result<Self, SettlementError> {
        if value > 0 {
            Ok(Self(Credits(value)))
        } else {
            Err(SettlementError::Validation(
                "amount must be positive".to_string(),
            ))
        }
    }

    pub fn credits(&self) -> Credits {
        self.0
    }

    pub fn value(&self) -> u64 {
        self.0.0
    }
}

impl TryFrom<u64> for Amount {
    type Error = SettlementError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Credits {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Credits {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Add for Credits {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Credits {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Credits {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Credits {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of a balance-holding entity (worker or client).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The credit-ledger state of a single account.
///
/// Tracks the total balance and the portion earmarked by open reservations.
/// Invariant: `reserved <= balance` at all times, so `available` is never
/// negative.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Account {
    /// The unique identifier for the account.
    pub id: AccountId,
    /// Total credits owned by the account.
    pub balance: Credits,
    /// Credits earmarked by reservations still in the held state.
    pub reserved: Credits,
}

impl Account {
    pub fn new(id: AccountId) -> Self {
        Self {
            id,
            balance: Credits::ZERO,
            reserved: Credits::ZERO,
        }
    }

    /// Credits the account may newly reserve.
    pub fn available(&self) -> Credits {
        self.balance - self.reserved
    }

    /// Earmarks credits for a reservation if enough are available.
    pub fn hold(&mut self, amount: Amount) -> Result<(), SettlementError> {
        let amount = amount.credits();
        if self.available() >= amount {
            self.reserved += amount;
            Ok(())
        } else {
            Err(SettlementError::InsufficientFunds {
                requested: amount,
                available: self.available(),
            })
        }
    }

    /// Consumes a held amount: both balance and reserved drop by `amount`.
    pub fn consume_hold(&mut self, amount: Credits) {
        debug_assert!(self.reserved >= amount && self.balance >= amount);
        self.balance = self.balance.saturating_sub(amount);
        self.reserved = self.reserved.saturating_sub(amount);
    }

    /// Returns a held amount to available: only reserved drops.
    pub fn release_hold(&mut self, amount: Credits) {
        debug_assert!(self.reserved >= amount);
        self.reserved = self.reserved.saturating_sub(amount);
    }

    /// Adds purchased credits to the balance. Never touches `reserved`.
    pub fn top_up(&mut self, amount: Amount) -> Result<(), SettlementError> {
        self.balance = self
            .balance
            .checked_add(amount.credits())
            .ok_or_else(|| SettlementError::BalanceOverflow(self.id.clone()))?;
        Ok(())
    }

    pub fn snapshot(&self) -> BalanceSnapshot {
        BalanceSnapshot {
            balance: self.balance,
            reserved: self.reserved,
            available: self.available(),
        }
    }
}

/// Point-in-time view of an account's balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceSnapshot {
    pub balance: Credits,
    pub reserved: Credits,
    pub available: Credits,
}
