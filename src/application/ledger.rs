use crate::domain::account::{Account, AccountId, Amount, BalanceSnapshot};
use crate::domain::config::ConfigSnapshot;
use crate::domain::reservation::{Reservation, ReservationId, ReservationState};
use crate::error::{Result, SettlementError};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Ledger tuning derived from the resolved platform configuration.
#[derive(Debug, Clone, Copy)]
pub struct LedgerConfig {
    /// How long a hold stays reservable before it expires. `None` disables
    /// expiry entirely.
    pub reservation_ttl: Option<Duration>,
}

impl LedgerConfig {
    pub fn from_snapshot(snapshot: &ConfigSnapshot) -> Self {
        Self {
            reservation_ttl: Some(snapshot.reservation_ttl()),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            reservation_ttl: Some(Duration::minutes(15)),
        }
    }
}

/// An account record together with its reservations, guarded by one mutex
/// so every ledger operation on the account applies as a single unit.
struct AccountSlot {
    account: Account,
    reservations: HashMap<ReservationId, Reservation>,
}

impl AccountSlot {
    fn new(id: AccountId) -> Self {
        Self {
            account: Account::new(id),
            reservations: HashMap::new(),
        }
    }
}

/// The shift-credits ledger: per-account balances, reserved amounts, and
/// the reserve -> commit/release/expire lifecycle.
///
/// Concurrency model: each account lives behind its own `Mutex`, so
/// operations on different accounts never block one another. The outer map
/// lock is held only long enough to fetch or insert a slot, and the
/// reservation index guard is always dropped before an account mutex is
/// taken. No interleaving can push `reserved` past `balance`.
pub struct CreditsLedger {
    accounts: RwLock<HashMap<AccountId, Arc<Mutex<AccountSlot>>>>,
    /// Maps reservation ids to the account that owns them.
    index: RwLock<HashMap<ReservationId, AccountId>>,
    next_id: AtomicU64,
    reservation_ttl: Option<Duration>,
}

impl CreditsLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            index: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            reservation_ttl: config.reservation_ttl,
        }
    }

    /// Places a hold of `amount` against the account's available credits.
    ///
    /// Fails with `InsufficientFunds` when `amount` exceeds
    /// `balance - reserved`; a failed reserve leaves the account unchanged.
    pub async fn reserve(&self, account_id: &AccountId, amount: Amount) -> Result<ReservationId> {
        let slot = self.slot(account_id).await;
        let id = ReservationId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        {
            let mut slot = slot.lock().await;
            slot.account.hold(amount)?;
            let now = Utc::now();
            let reservation = Reservation::held(
                id,
                account_id.clone(),
                amount.credits(),
                now,
                self.reservation_ttl,
            );
            slot.reservations.insert(id, reservation);
        }
        // The caller only learns the id after this insert, so no commit or
        // release can race the index update.
        self.index.write().await.insert(id, account_id.clone());
        Ok(id)
    }

    /// Consumes a held reservation: balance and reserved both drop by the
    /// held amount and the reservation becomes `Committed`.
    ///
    /// A hold past its deadline cannot be committed; it is expired on the
    /// spot (funds released) and reported as `InvalidState`.
    pub async fn commit(&self, id: ReservationId) -> Result<()> {
        let slot = self.slot_of(id).await?;
        let mut slot = slot.lock().await;
        let AccountSlot {
            account,
            reservations,
        } = &mut *slot;
        let reservation = reservations
            .get_mut(&id)
            .ok_or(SettlementError::ReservationNotFound(id))?;

        match reservation.state {
            ReservationState::Held if reservation.is_due(Utc::now()) => {
                reservation.state = ReservationState::Expired;
                account.release_hold(reservation.amount);
                debug!(reservation = %id, account = %account.id, "late commit on expired hold");
                Err(SettlementError::InvalidState {
                    id,
                    state: ReservationState::Expired,
                })
            }
            ReservationState::Held => {
                reservation.state = ReservationState::Committed;
                account.consume_hold(reservation.amount);
                Ok(())
            }
            state => Err(SettlementError::InvalidState { id, state }),
        }
    }

    /// Returns a held reservation's credits to available: only reserved
    /// drops and the reservation becomes `Released`.
    ///
    /// Racing the expiry sweeper, whichever observes the held state first
    /// wins; the funds effect is identical either way.
    pub async fn release(&self, id: ReservationId) -> Result<()> {
        let slot = self.slot_of(id).await?;
        let mut slot = slot.lock().await;
        let AccountSlot {
            account,
            reservations,
        } = &mut *slot;
        let reservation = reservations
            .get_mut(&id)
            .ok_or(SettlementError::ReservationNotFound(id))?;

        match reservation.state {
            ReservationState::Held => {
                reservation.state = ReservationState::Released;
                account.release_hold(reservation.amount);
                Ok(())
            }
            state => Err(SettlementError::InvalidState { id, state }),
        }
    }

    /// Expires every hold past its deadline, releasing the earmarked
    /// credits. Idempotent and safe to re-run; returns how many holds were
    /// expired.
    pub async fn expire_due(&self, now: DateTime<Utc>) -> usize {
        let slots: Vec<_> = self.accounts.read().await.values().cloned().collect();
        let mut expired = 0;
        for slot in slots {
            let mut slot = slot.lock().await;
            let AccountSlot {
                account,
                reservations,
            } = &mut *slot;
            for reservation in reservations.values_mut() {
                if reservation.is_due(now) {
                    reservation.state = ReservationState::Expired;
                    account.release_hold(reservation.amount);
                    expired += 1;
                    debug!(
                        reservation = %reservation.id,
                        account = %account.id,
                        amount = %reservation.amount,
                        "expired stale credit hold"
                    );
                }
            }
        }
        expired
    }

    /// Spawns the background expiry sweep at the given cadence. The cadence
    /// is a tuning knob, not a correctness requirement: the commit path
    /// refuses expired holds on its own.
    pub fn spawn_expiry_sweeper(
        self: Arc<Self>,
        every: std::time::Duration,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(every);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                let expired = self.expire_due(Utc::now()).await;
                if expired > 0 {
                    debug!(expired, "expiry sweep released stale holds");
                }
            }
        })
    }

    /// Credits the account's balance after an externally confirmed package
    /// purchase. Never touches `reserved`.
    pub async fn top_up(&self, account_id: &AccountId, amount: Amount) -> Result<()> {
        let slot = self.slot(account_id).await;
        let mut slot = slot.lock().await;
        slot.account.top_up(amount)
    }

    /// A consistent point-in-time view of the account's balances, taken
    /// under the account lock so no half-applied update is ever observed.
    pub async fn get_balance(&self, account_id: &AccountId) -> BalanceSnapshot {
        let slot = self.slot(account_id).await;
        let slot = slot.lock().await;
        slot.account.snapshot()
    }

    /// Read-only reservation lookup, for callers that audit settlements or
    /// map outcomes onto transport errors.
    pub async fn reservation(&self, id: ReservationId) -> Option<Reservation> {
        let account_id = self.index.read().await.get(&id).cloned()?;
        let slot = self.accounts.read().await.get(&account_id).cloned()?;
        let slot = slot.lock().await;
        slot.reservations.get(&id).cloned()
    }

    /// Fetches the slot for an account, creating it on first interaction.
    async fn slot(&self, account_id: &AccountId) -> Arc<Mutex<AccountSlot>> {
        if let Some(slot) = self.accounts.read().await.get(account_id) {
            return Arc::clone(slot);
        }
        let mut accounts = self.accounts.write().await;
        Arc::clone(
            accounts
                .entry(account_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(AccountSlot::new(account_id.clone())))),
        )
    }

    /// Resolves a reservation id to its owning account's slot.
    async fn slot_of(&self, id: ReservationId) -> Result<Arc<Mutex<AccountSlot>>> {
        let account_id = self
            .index
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(SettlementError::ReservationNotFound(id))?;
        self.accounts
            .read()
            .await
            .get(&account_id)
            .cloned()
            .ok_or(SettlementError::ReservationNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::Credits;

    fn ledger() -> CreditsLedger {
        CreditsLedger::new(LedgerConfig::default())
    }

    fn amount(value: u64) -> Amount {
        Amount::new(value).unwrap()
    }

    async fn funded(ledger: &CreditsLedger, id: &str, balance: u64) -> AccountId {
        let account = AccountId::from(id);
        ledger.top_up(&account, amount(balance)).await.unwrap();
        account
    }

    #[tokio::test]
    async fn test_reserve_then_commit_consumes_balance() {
        let ledger = ledger();
        let account = funded(&ledger, "w-1", 100).await;

        let id = ledger.reserve(&account, amount(30)).await.unwrap();
        let snapshot = ledger.get_balance(&account).await;
        assert_eq!(snapshot.balance, Credits::new(100));
        assert_eq!(snapshot.reserved, Credits::new(30));
        assert_eq!(snapshot.available, Credits::new(70));

        ledger.commit(id).await.unwrap();
        let snapshot = ledger.get_balance(&account).await;
        assert_eq!(snapshot.balance, Credits::new(70));
        assert_eq!(snapshot.reserved, Credits::ZERO);
        assert_eq!(snapshot.available, Credits::new(70));

        let reservation = ledger.reservation(id).await.unwrap();
        assert_eq!(reservation.state, ReservationState::Committed);
    }

    #[tokio::test]
    async fn test_reserve_then_release_keeps_balance() {
        let ledger = ledger();
        let account = funded(&ledger, "w-1", 100).await;

        let id = ledger.reserve(&account, amount(30)).await.unwrap();
        ledger.release(id).await.unwrap();

        let snapshot = ledger.get_balance(&account).await;
        assert_eq!(snapshot.balance, Credits::new(100));
        assert_eq!(snapshot.reserved, Credits::ZERO);
        assert_eq!(
            ledger.reservation(id).await.unwrap().state,
            ReservationState::Released
        );
    }

    #[tokio::test]
    async fn test_reserve_insufficient_funds_changes_nothing() {
        let ledger = ledger();
        let account = funded(&ledger, "w-1", 20).await;
        ledger.reserve(&account, amount(15)).await.unwrap();

        let result = ledger.reserve(&account, amount(6)).await;
        assert!(matches!(
            result,
            Err(SettlementError::InsufficientFunds {
                requested: Credits(6),
                available: Credits(5),
            })
        ));

        let snapshot = ledger.get_balance(&account).await;
        assert_eq!(snapshot.balance, Credits::new(20));
        assert_eq!(snapshot.reserved, Credits::new(15));
    }

    #[tokio::test]
    async fn test_double_commit_fails_and_mutates_once() {
        let ledger = ledger();
        let account = funded(&ledger, "w-1", 100).await;
        let id = ledger.reserve(&account, amount(40)).await.unwrap();

        ledger.commit(id).await.unwrap();
        let result = ledger.commit(id).await;
        assert!(matches!(
            result,
            Err(SettlementError::InvalidState {
                state: ReservationState::Committed,
                ..
            })
        ));

        let snapshot = ledger.get_balance(&account).await;
        assert_eq!(snapshot.balance, Credits::new(60));
        assert_eq!(snapshot.reserved, Credits::ZERO);
    }

    #[tokio::test]
    async fn test_release_after_commit_fails() {
        let ledger = ledger();
        let account = funded(&ledger, "w-1", 100).await;
        let id = ledger.reserve(&account, amount(40)).await.unwrap();
        ledger.commit(id).await.unwrap();

        assert!(matches!(
            ledger.release(id).await,
            Err(SettlementError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_reservation() {
        let ledger = ledger();
        assert!(matches!(
            ledger.commit(ReservationId(999)).await,
            Err(SettlementError::ReservationNotFound(ReservationId(999)))
        ));
        assert!(matches!(
            ledger.release(ReservationId(999)).await,
            Err(SettlementError::ReservationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_hold_cannot_be_committed() {
        let ledger = CreditsLedger::new(LedgerConfig {
            reservation_ttl: Some(Duration::zero()),
        });
        let account = funded(&ledger, "w-1", 100).await;
        let id = ledger.reserve(&account, amount(30)).await.unwrap();

        let result = ledger.commit(id).await;
        assert!(matches!(
            result,
            Err(SettlementError::InvalidState {
                state: ReservationState::Expired,
                ..
            })
        ));

        // The hold was released, not consumed.
        let snapshot = ledger.get_balance(&account).await;
        assert_eq!(snapshot.balance, Credits::new(100));
        assert_eq!(snapshot.reserved, Credits::ZERO);
    }

    #[tokio::test]
    async fn test_expiry_sweep_releases_due_holds() {
        let ledger = ledger();
        let account = funded(&ledger, "w-1", 100).await;
        let id = ledger.reserve(&account, amount(30)).await.unwrap();

        // Nothing is due yet.
        assert_eq!(ledger.expire_due(Utc::now()).await, 0);

        let later = Utc::now() + Duration::minutes(16);
        assert_eq!(ledger.expire_due(later).await, 1);
        // Re-running is a no-op.
        assert_eq!(ledger.expire_due(later).await, 0);

        let snapshot = ledger.get_balance(&account).await;
        assert_eq!(snapshot.reserved, Credits::ZERO);
        assert_eq!(
            ledger.reservation(id).await.unwrap().state,
            ReservationState::Expired
        );
        assert!(matches!(
            ledger.commit(id).await,
            Err(SettlementError::InvalidState {
                state: ReservationState::Expired,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_top_up_never_touches_reserved() {
        let ledger = ledger();
        let account = funded(&ledger, "w-1", 50).await;
        ledger.reserve(&account, amount(20)).await.unwrap();

        ledger.top_up(&account, amount(25)).await.unwrap();
        let snapshot = ledger.get_balance(&account).await;
        assert_eq!(snapshot.balance, Credits::new(75));
        assert_eq!(snapshot.reserved, Credits::new(20));
        assert_eq!(snapshot.available, Credits::new(55));
    }

    #[tokio::test]
    async fn test_balance_of_fresh_account_is_zero() {
        let ledger = ledger();
        let snapshot = ledger.get_balance(&AccountId::from("new")).await;
        assert_eq!(snapshot.balance, Credits::ZERO);
        assert_eq!(snapshot.reserved, Credits::ZERO);
        assert_eq!(snapshot.available, Credits::ZERO);
    }

    #[tokio::test]
    async fn test_reservation_ids_are_unique() {
        let ledger = ledger();
        let account = funded(&ledger, "w-1", 100).await;
        let a = ledger.reserve(&account, amount(10)).await.unwrap();
        let b = ledger.reserve(&account, amount(10)).await.unwrap();
        assert_ne!(a, b);
    }
}
