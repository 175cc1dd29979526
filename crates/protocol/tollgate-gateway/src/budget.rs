//! Session spending cap.
//!
//! A request reserves its price before payment. The reservation becomes
//! spending when the receipt confirms, and is released when the payment
//! definitely did not happen. A payment that is still pending keeps its
//! reservation.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tollgate_types::{Amount, Currency, PaymentReceipt, RequestId, TransactionId};

#[derive(Debug, Default)]
struct Ledger {
    spent: Amount,
    reserved: HashMap<RequestId, Amount>,
    settled: HashSet<TransactionId>,
}

impl Ledger {
    fn reserved_total(&self) -> Amount {
        self.reserved
            .values()
            .fold(Amount::ZERO, |acc, a| acc.checked_add(*a).unwrap_or(acc))
    }
}

/// The price did not fit in the remaining budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverBudget {
    /// Remaining budget at the time of the check
    pub remaining: Amount,
}

/// Budget tracker for a gateway session.
#[derive(Debug)]
pub struct BudgetTracker {
    limit: Amount,
    currency: Currency,
    ledger: Mutex<Ledger>,
}

impl BudgetTracker {
    /// Create a tracker capping spending at `limit`.
    pub fn new(limit: Amount, currency: Currency) -> Self {
        Self {
            limit,
            currency,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Total budget.
    pub fn limit(&self) -> Amount {
        self.limit
    }

    /// Budget currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Amount spent on confirmed payments.
    pub fn spent(&self) -> Amount {
        self.ledger().spent
    }

    /// Amount held by payments not yet confirmed.
    pub fn reserved(&self) -> Amount {
        self.ledger().reserved_total()
    }

    /// What is left after spending and reservations.
    pub fn remaining(&self) -> Amount {
        let ledger = self.ledger();
        self.limit
            .saturating_sub(ledger.spent)
            .saturating_sub(ledger.reserved_total())
    }

    /// Reserve `price` for `request_id`.
    ///
    /// Idempotent per request: a request that already holds a reservation
    /// is not charged twice.
    pub fn reserve(
        &self,
        request_id: RequestId,
        price: Amount,
        currency: Currency,
    ) -> Result<(), OverBudget> {
        let mut ledger = self.ledger();
        if ledger.reserved.contains_key(&request_id) {
            return Ok(());
        }

        let remaining = self
            .limit
            .saturating_sub(ledger.spent)
            .saturating_sub(ledger.reserved_total());
        if currency != self.currency || price > remaining {
            return Err(OverBudget { remaining });
        }

        ledger.reserved.insert(request_id, price);
        Ok(())
    }

    /// Turn the reservation for a confirmed receipt into spending.
    ///
    /// Returns `false` if the receipt is not confirmed or was already counted.
    pub fn settle(&self, receipt: &PaymentReceipt) -> bool {
        if !receipt.is_confirmed() {
            return false;
        }
        let mut ledger = self.ledger();
        if !ledger.settled.insert(receipt.transaction_id.clone()) {
            return false;
        }
        ledger.reserved.remove(&receipt.request_id);
        ledger.spent = ledger
            .spent
            .checked_add(receipt.amount)
            .unwrap_or(ledger.spent);
        true
    }

    /// Drop the reservation of a request whose payment did not happen.
    pub fn release(&self, request_id: &RequestId) {
        self.ledger().reserved.remove(request_id);
    }

    /// Snapshot for display.
    pub fn status(&self) -> BudgetStatus {
        let ledger = self.ledger();
        let reserved = ledger.reserved_total();
        BudgetStatus {
            limit: self.limit,
            spent: ledger.spent,
            reserved,
            remaining: self.limit.saturating_sub(ledger.spent).saturating_sub(reserved),
            currency: self.currency,
        }
    }
}

/// Structured budget status for JSON serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetStatus {
    /// Total session budget
    pub limit: Amount,
    /// Spent on confirmed payments
    pub spent: Amount,
    /// Held by pending payments
    pub reserved: Amount,
    /// Left to spend
    pub remaining: Amount,
    /// Budget currency
    pub currency: Currency,
}

impl std::fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Budget: {} {} remaining ({} / {} {} spent)",
            self.remaining, self.currency, self.spent, self.limit, self.currency
        )
    }
}
