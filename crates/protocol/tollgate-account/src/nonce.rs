//! Per-account nonce allocation.
//!
//! One async mutex guards the counter. A [`NonceReservation`] holds that
//! mutex for as long as it lives, so at most one outgoing payment per account
//! is between "nonce chosen" and "nonce consumed" at any time.

use std::future::Future;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, trace};

use crate::error::AccountResult;

/// Serialized nonce counter for a single account.
#[derive(Debug, Default)]
pub struct NonceAllocator {
    /// Next unused nonce; `None` until seeded from the ledger.
    next: Mutex<Option<u64>>,
}

impl NonceAllocator {
    /// Create a cold allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the mutual-exclusion region and pick the next nonce.
    ///
    /// `seed` is awaited only when the counter is cold.
    pub async fn reserve<F>(&self, seed: F) -> AccountResult<NonceReservation<'_>>
    where
        F: Future<Output = AccountResult<u64>>,
    {
        let mut guard = self.next.lock().await;
        let nonce = match *guard {
            Some(next) => {
                trace!(nonce = next, "reusing cached nonce");
                next
            }
            None => {
                let seeded = seed.await?;
                debug!(nonce = seeded, "seeded nonce from ledger");
                *guard = Some(seeded);
                seeded
            }
        };
        Ok(NonceReservation {
            guard,
            nonce,
            in_flight: false,
        })
    }

    /// Forget the cached counter so the next reservation re-reads the ledger.
    pub async fn reset(&self) {
        *self.next.lock().await = None;
        debug!("reset nonce cache, will requery on next use");
    }

    /// The cached next nonce, if seeded.
    pub async fn peek(&self) -> Option<u64> {
        *self.next.lock().await
    }
}

/// Exclusive hold on an account's next nonce.
///
/// Dropping without [`commit`](Self::commit) leaves the counter unchanged,
/// so the same nonce is offered to the next payment. Once marked
/// [`in_flight`](Self::in_flight), a drop forgets the counter instead and the
/// next reservation re-reads the ledger.
#[derive(Debug)]
pub struct NonceReservation<'a> {
    guard: MutexGuard<'a, Option<u64>>,
    nonce: u64,
    in_flight: bool,
}

impl NonceReservation<'_> {
    /// The reserved nonce.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Mark the nonce as possibly used by a transfer the network may have seen.
    pub fn in_flight(&mut self) {
        self.in_flight = true;
    }

    /// Consume the nonce and release the region.
    pub fn commit(mut self) {
        *self.guard = Some(self.nonce + 1);
        self.in_flight = false;
    }
}

impl Drop for NonceReservation<'_> {
    fn drop(&mut self) {
        if self.in_flight {
            *self.guard = None;
            debug!(nonce = self.nonce, "in-flight nonce released, will requery");
        }
    }
}
