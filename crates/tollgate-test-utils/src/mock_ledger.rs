//! In-memory settlement network and ledger.
//!
//! Implements both [`SettlementNetwork`] and [`BalanceSource`], so one
//! instance can back an account and a settlement engine at the same time.
//! Failures and confirmation timing are scripted per test.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tollgate_account::{AccountError, AccountResult, BalanceSource, SignedTransfer};
use tollgate_settle::{SettleError, SettleResult, SettlementNetwork, TransactionStatus};
use tollgate_types::{Address, Amount, Currency, TransactionId};

struct TxRecord {
    transfer: SignedTransfer,
    status: TransactionStatus,
    polls: u32,
}

#[derive(Default)]
struct MockLedgerInner {
    /// Balances per account (single currency).
    balances: HashMap<Address, Amount>,
    /// Next expected nonce per account.
    nonces: HashMap<Address, u64>,
    /// Every transaction the ledger has accepted.
    transactions: HashMap<TransactionId, TxRecord>,
    /// Accepted transaction ids, in order.
    accepted: Vec<TransactionId>,
    /// Calls to `submit`, including re-broadcasts and failures.
    submit_calls: u32,
    /// Calls to `transaction_status`.
    status_calls: u32,
    /// Calls to `balance`.
    balance_calls: u32,
    /// Polls answered `pending` before a transaction confirms.
    pending_polls: u32,
    /// Confirm in the submit acknowledgement.
    confirm_on_submit: bool,
    /// Submissions that fail before reaching the ledger.
    lost_submits: u32,
    /// Submissions that land but whose acknowledgement is lost.
    lost_acks: u32,
    /// Status polls that fail with a network error.
    failed_polls: u32,
    /// When set, every new submission is rejected.
    reject_reason: Option<String>,
    /// When set, pending transactions fail on their next poll.
    revert_reason: Option<String>,
    /// When true, balance and nonce queries fail.
    offline: bool,
}

impl MockLedgerInner {
    fn apply(&mut self, transfer: &SignedTransfer) {
        let payer = self.balances.entry(transfer.payer).or_default();
        *payer = payer.saturating_sub(transfer.amount);
        let payee = self.balances.entry(transfer.payee).or_default();
        *payee = payee.checked_add(transfer.amount).unwrap_or(*payee);
    }
}

/// A mock settlement network with an in-memory ledger.
///
/// Uses `Arc<RwLock<...>>` internally, so it is cheap to clone and all
/// clones share the same state.
#[derive(Clone, Default)]
pub struct MockLedger {
    inner: Arc<RwLock<MockLedgerInner>>,
}

impl MockLedger {
    /// Create an empty ledger that confirms on the first poll.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the balance of `address`.
    pub fn with_balance(self, address: Address, balance: Amount) -> Self {
        self.set_balance(address, balance);
        self
    }

    /// Answer `pending` to the first `polls` status queries of each transaction.
    pub fn confirm_after_polls(self, polls: u32) -> Self {
        self.inner.write().unwrap().pending_polls = polls;
        self
    }

    /// Confirm transactions in the submit acknowledgement.
    pub fn confirm_on_submit(self) -> Self {
        self.inner.write().unwrap().confirm_on_submit = true;
        self
    }

    /// Never confirm: every poll answers `pending`.
    pub fn never_confirm(self) -> Self {
        self.confirm_after_polls(u32::MAX)
    }

    /// Set the balance of `address` at runtime.
    pub fn set_balance(&self, address: Address, balance: Amount) {
        self.inner.write().unwrap().balances.insert(address, balance);
    }

    /// Fail the next `n` submissions before they reach the ledger.
    pub fn lose_next_submits(&self, n: u32) {
        self.inner.write().unwrap().lost_submits = n;
    }

    /// Accept the next `n` submissions but report a network error.
    pub fn lose_next_acks(&self, n: u32) {
        self.inner.write().unwrap().lost_acks = n;
    }

    /// Fail the next `n` status polls with a network error.
    pub fn fail_next_polls(&self, n: u32) {
        self.inner.write().unwrap().failed_polls = n;
    }

    /// Reject every new submission with `reason`.
    pub fn reject_submissions(&self, reason: impl Into<String>) {
        self.inner.write().unwrap().reject_reason = Some(reason.into());
    }

    /// Fail pending transactions on their next poll with `reason`.
    pub fn revert_pending(&self, reason: impl Into<String>) {
        self.inner.write().unwrap().revert_reason = Some(reason.into());
    }

    /// Make balance and nonce queries fail.
    pub fn set_offline(&self, offline: bool) {
        self.inner.write().unwrap().offline = offline;
    }

    // =========================================================================
    // Assertion Helpers
    // =========================================================================

    /// Current balance of `address`.
    pub fn balance_of(&self, address: &Address) -> Amount {
        self.inner
            .read()
            .unwrap()
            .balances
            .get(address)
            .copied()
            .unwrap_or_default()
    }

    /// Number of distinct transfers the ledger accepted.
    pub fn submission_count(&self) -> usize {
        self.inner.read().unwrap().accepted.len()
    }

    /// Accepted transaction ids, in order.
    pub fn accepted_transactions(&self) -> Vec<TransactionId> {
        self.inner.read().unwrap().accepted.clone()
    }

    /// Accepted transfers, in order.
    pub fn accepted_transfers(&self) -> Vec<SignedTransfer> {
        let inner = self.inner.read().unwrap();
        inner
            .accepted
            .iter()
            .filter_map(|id| inner.transactions.get(id).map(|r| r.transfer.clone()))
            .collect()
    }

    /// Calls to `submit`, including re-broadcasts and failed attempts.
    pub fn submit_calls(&self) -> u32 {
        self.inner.read().unwrap().submit_calls
    }

    /// Calls to `transaction_status`.
    pub fn status_calls(&self) -> u32 {
        self.inner.read().unwrap().status_calls
    }

    /// Calls to `balance`.
    pub fn balance_calls(&self) -> u32 {
        self.inner.read().unwrap().balance_calls
    }

    /// Ledger view of a transaction.
    pub fn status_of(&self, id: &TransactionId) -> TransactionStatus {
        self.inner
            .read()
            .unwrap()
            .transactions
            .get(id)
            .map(|r| r.status.clone())
            .unwrap_or(TransactionStatus::Unknown)
    }
}

#[async_trait]
impl SettlementNetwork for MockLedger {
    async fn submit(&self, transfer: &SignedTransfer) -> SettleResult<TransactionStatus> {
        let mut inner = self.inner.write().unwrap();
        inner.submit_calls += 1;

        if inner.lost_submits > 0 {
            inner.lost_submits -= 1;
            return Err(SettleError::network("injected: submission lost"));
        }

        let id = transfer.transaction_id();
        if let Some(record) = inner.transactions.get(&id) {
            return Ok(record.status.clone());
        }

        if let Some(reason) = &inner.reject_reason {
            return Err(SettleError::rejected(reason.clone()));
        }
        if !transfer.verify() {
            return Err(SettleError::rejected("invalid signature"));
        }
        let expected = inner.nonces.get(&transfer.payer).copied().unwrap_or(0);
        if transfer.nonce < expected {
            return Err(SettleError::rejected(format!(
                "nonce {} already used, next is {}",
                transfer.nonce, expected
            )));
        }
        inner.nonces.insert(transfer.payer, transfer.nonce + 1);

        let status = if inner.confirm_on_submit {
            inner.apply(transfer);
            TransactionStatus::Confirmed
        } else {
            TransactionStatus::Pending
        };
        inner.transactions.insert(
            id.clone(),
            TxRecord {
                transfer: transfer.clone(),
                status: status.clone(),
                polls: 0,
            },
        );
        inner.accepted.push(id);

        if inner.lost_acks > 0 {
            inner.lost_acks -= 1;
            return Err(SettleError::network("injected: acknowledgement lost"));
        }
        Ok(status)
    }

    async fn transaction_status(&self, id: &TransactionId) -> SettleResult<TransactionStatus> {
        let mut inner = self.inner.write().unwrap();
        inner.status_calls += 1;

        if inner.failed_polls > 0 {
            inner.failed_polls -= 1;
            return Err(SettleError::network("injected: status poll failed"));
        }

        let pending_polls = inner.pending_polls;
        let revert = inner.revert_reason.clone();
        let Some(record) = inner.transactions.get_mut(id) else {
            return Ok(TransactionStatus::Unknown);
        };
        if record.status != TransactionStatus::Pending {
            return Ok(record.status.clone());
        }

        record.polls += 1;
        if let Some(reason) = revert {
            record.status = TransactionStatus::Failed { reason };
            return Ok(record.status.clone());
        }
        if record.polls <= pending_polls {
            return Ok(TransactionStatus::Pending);
        }

        record.status = TransactionStatus::Confirmed;
        let transfer = record.transfer.clone();
        inner.apply(&transfer);
        Ok(TransactionStatus::Confirmed)
    }
}

#[async_trait]
impl BalanceSource for MockLedger {
    async fn balance(&self, address: &Address, _currency: Currency) -> AccountResult<Amount> {
        let mut inner = self.inner.write().unwrap();
        inner.balance_calls += 1;
        if inner.offline {
            return Err(AccountError::network_unavailable("injected: ledger offline"));
        }
        Ok(inner.balances.get(address).copied().unwrap_or_default())
    }

    async fn next_nonce(&self, address: &Address) -> AccountResult<u64> {
        let inner = self.inner.read().unwrap();
        if inner.offline {
            return Err(AccountError::network_unavailable("injected: ledger offline"));
        }
        Ok(inner.nonces.get(address).copied().unwrap_or(0))
    }
}
