//! The payment settlement engine.
//!
//! Payments are at-most-once per [`RequestId`]. The engine keeps a receipt
//! book keyed by request id, each entry behind its own async lock:
//!
//! ```text
//! fresh      -> balance check -> sign -> record pending -> submit -> poll
//! pending    -> poll (re-broadcast the identical transfer if unknown)
//! confirmed  -> returned as is
//! failed     -> SettlementRejected
//! ```
//!
//! The pending receipt is recorded before the network acknowledges the
//! submission, so neither a timeout nor a dropped future can lead to a
//! second transfer for the same request.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};
use tollgate_account::{AccountManager, SignedTransfer, TransferIntent};
use tollgate_types::{PaymentReceipt, ReceiptStatus, RequestId, ServiceDescriptor};

use crate::config::SettleConfig;
use crate::error::{SettleError, SettleResult};
use crate::retry::RetryPolicy;
use crate::traits::{SettlementNetwork, TransactionStatus};

/// A recorded payment and the exact transfer that backs it.
#[derive(Debug, Clone)]
struct BookEntry {
    receipt: PaymentReceipt,
    transfer: SignedTransfer,
}

type Slot = Arc<Mutex<Option<BookEntry>>>;

/// A caller's hold on a book slot. Releasing it after an early error or a
/// dropped future removes the slot if no receipt was ever recorded.
struct HeldSlot<'a> {
    engine: &'a SettlementEngine,
    request_id: RequestId,
    slot: Slot,
}

impl Drop for HeldSlot<'_> {
    fn drop(&mut self) {
        self.engine.discard_if_empty(&self.request_id);
    }
}

/// Pays for service requests on a settlement network.
pub struct SettlementEngine {
    network: Arc<dyn SettlementNetwork>,
    book: DashMap<RequestId, Slot>,
    submit_policy: RetryPolicy,
    poll_policy: RetryPolicy,
    confirmation_timeout: Duration,
}

impl SettlementEngine {
    /// Create an engine over `network`.
    pub fn new(network: Arc<dyn SettlementNetwork>, config: &SettleConfig) -> Self {
        Self {
            network,
            book: DashMap::new(),
            submit_policy: RetryPolicy::from_config(&config.submit_retry),
            poll_policy: RetryPolicy::from_config(&config.poll),
            confirmation_timeout: config.confirmation_timeout,
        }
    }

    /// Default confirmation wait of one [`pay`](Self::pay) call.
    pub fn confirmation_timeout(&self) -> Duration {
        self.confirmation_timeout
    }

    /// Pay for `request_id`, waiting up to the configured confirmation timeout.
    pub async fn pay(
        &self,
        payer: &AccountManager,
        request_id: RequestId,
        descriptor: &ServiceDescriptor,
    ) -> SettleResult<PaymentReceipt> {
        self.pay_within(payer, request_id, descriptor, self.confirmation_timeout)
            .await
    }

    /// Pay for `request_id`, waiting up to `timeout` for confirmation.
    ///
    /// On [`SettleError::Timeout`] the receipt stays pending in the book;
    /// calling again with the same request id resumes it.
    #[instrument(
        skip(self, payer, descriptor),
        fields(service = %descriptor.service_id, price = %descriptor.price)
    )]
    pub async fn pay_within(
        &self,
        payer: &AccountManager,
        request_id: RequestId,
        descriptor: &ServiceDescriptor,
        timeout: Duration,
    ) -> SettleResult<PaymentReceipt> {
        let held = HeldSlot {
            engine: self,
            request_id,
            slot: self.slot(request_id),
        };
        self.pay_in_slot(&held.slot, payer, request_id, descriptor, timeout)
            .await
    }

    async fn pay_in_slot(
        &self,
        slot: &Slot,
        payer: &AccountManager,
        request_id: RequestId,
        descriptor: &ServiceDescriptor,
        timeout: Duration,
    ) -> SettleResult<PaymentReceipt> {
        let mut guard = slot.lock().await;
        let deadline = Instant::now() + timeout;

        if let Some(entry) = guard.as_mut() {
            if entry.receipt.is_confirmed() {
                debug!(tx = %entry.receipt.transaction_id, "Already confirmed");
                return Ok(entry.receipt.clone());
            }
            if let ReceiptStatus::Failed { reason } = entry.receipt.status() {
                return Err(SettleError::rejected_with(reason.clone(), entry.receipt.clone()));
            }
            info!(tx = %entry.receipt.transaction_id, "Resuming pending payment");
            return self.await_confirmation(payer, entry, deadline).await;
        }

        let available = payer.get_balance(descriptor.currency).await?;
        if available < descriptor.price {
            warn!(%available, "Insufficient funds, not submitting");
            return Err(SettleError::insufficient_funds(
                available,
                descriptor.price,
                descriptor.currency,
            ));
        }

        let intent = TransferIntent {
            payee: descriptor.payee,
            amount: descriptor.price,
            currency: descriptor.currency,
            reference: request_id,
        };
        let mut reservation = payer.reserve_nonce().await?;
        let transfer = payer.sign_transfer(&reservation, &intent);
        let receipt = PaymentReceipt::pending(
            transfer.transaction_id(),
            request_id,
            *payer.address(),
            descriptor.payee,
            descriptor.price,
            descriptor.currency,
        );
        info!(
            tx = %receipt.transaction_id,
            nonce = transfer.nonce,
            payee = %descriptor.payee,
            "Recorded pending payment"
        );
        let entry = guard.insert(BookEntry { receipt, transfer });
        // The transfer may reach the network from here on; its nonce must not
        // be offered to another payment if this future is dropped.
        reservation.in_flight();

        let transfer = &entry.transfer;
        let submitted = self
            .submit_policy
            .execute(|| self.network.submit(transfer))
            .await;

        match submitted {
            Ok(TransactionStatus::Failed { reason }) | Err(SettleError::Rejected { reason, .. }) => {
                // Not consumed; the next reservation re-reads it from the ledger.
                drop(reservation);
                entry.receipt.fail(reason.clone())?;
                warn!(tx = %entry.receipt.transaction_id, reason = %reason, "Payment rejected");
                Err(SettleError::rejected_with(reason, entry.receipt.clone()))
            }
            Ok(TransactionStatus::Confirmed) => {
                reservation.commit();
                entry.receipt.confirm()?;
                info!(tx = %entry.receipt.transaction_id, "Payment confirmed on submission");
                Ok(entry.receipt.clone())
            }
            Ok(status) => {
                reservation.commit();
                debug!(status = status.label(), "Submission acknowledged");
                self.await_confirmation(payer, entry, deadline).await
            }
            Err(e) => {
                // The transfer may have landed; keep its nonce and let polling
                // re-broadcast if the network never saw it.
                reservation.commit();
                warn!(
                    tx = %entry.receipt.transaction_id,
                    error = %e,
                    "Submission outcome unknown, polling"
                );
                self.await_confirmation(payer, entry, deadline).await
            }
        }
    }

    /// Poll until the receipt is final or `deadline` passes.
    ///
    /// Every round waits one backoff step (bounded by the deadline) before
    /// asking the network.
    async fn await_confirmation(
        &self,
        payer: &AccountManager,
        entry: &mut BookEntry,
        deadline: Instant,
    ) -> SettleResult<PaymentReceipt> {
        let tx = entry.receipt.transaction_id.clone();
        let mut attempt = 1;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let delay = self.poll_policy.delay_for_attempt(attempt).min(remaining);
            if !delay.is_zero() {
                sleep(delay).await;
            }

            let status = match self.network.transaction_status(&tx).await {
                Ok(TransactionStatus::Unknown) => {
                    info!(tx = %tx, "Network has not seen transfer, re-broadcasting");
                    self.network.submit(&entry.transfer).await
                }
                other => other,
            };

            match status {
                Ok(TransactionStatus::Confirmed) => {
                    entry.receipt.confirm()?;
                    info!(tx = %tx, polls = attempt, "Payment confirmed");
                    return Ok(entry.receipt.clone());
                }
                Ok(TransactionStatus::Failed { reason })
                | Err(SettleError::Rejected { reason, .. }) => {
                    entry.receipt.fail(reason.clone())?;
                    payer.reset_nonce().await;
                    warn!(tx = %tx, reason = %reason, "Payment failed");
                    return Err(SettleError::rejected_with(reason, entry.receipt.clone()));
                }
                Ok(status) => {
                    debug!(tx = %tx, attempt, status = status.label(), "Still pending");
                }
                Err(e) => {
                    warn!(tx = %tx, attempt, error = %e, "Status poll failed");
                }
            }

            if Instant::now() >= deadline {
                info!(tx = %tx, "Confirmation deadline reached, receipt stays pending");
                return Err(SettleError::timeout(entry.receipt.clone()));
            }
            attempt += 1;
        }
    }

    fn slot(&self, request_id: RequestId) -> Slot {
        self.book.entry(request_id).or_default().clone()
    }

    /// Drop a slot that never got a receipt, unless another caller holds it.
    fn discard_if_empty(&self, request_id: &RequestId) {
        // One reference in the book, one in the caller's HeldSlot.
        let removed = self.book.remove_if(request_id, |_, s| {
            Arc::strong_count(s) == 2 && s.try_lock().is_ok_and(|entry| entry.is_none())
        });
        if removed.is_some() {
            debug!(request = %request_id, "Discarded empty payment slot");
        }
    }

    /// Receipt recorded for `request_id`, if any.
    ///
    /// Waits while a payment for that request is in flight.
    pub async fn receipt(&self, request_id: &RequestId) -> Option<PaymentReceipt> {
        let slot = self.book.get(request_id).map(|s| s.value().clone())?;
        let guard = slot.lock().await;
        guard.as_ref().map(|entry| entry.receipt.clone())
    }

    /// Number of request ids the engine has been asked to pay for.
    pub fn len(&self) -> usize {
        self.book.len()
    }

    /// Check if the engine has not been asked to pay yet.
    pub fn is_empty(&self) -> bool {
        self.book.is_empty()
    }
}

impl std::fmt::Debug for SettlementEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettlementEngine")
            .field("requests", &self.book.len())
            .field("confirmation_timeout", &self.confirmation_timeout)
            .finish_non_exhaustive()
    }
}
