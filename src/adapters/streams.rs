//! Ledger Streams Adapter - In-Process Payment Stream Transport
//!
//! Implements the `PaymentStream` port over an in-memory ledger of
//! deposit-backed accounts and open streams. Stands in for a real
//! streaming-payment network: the same failure surface
//! (`InsufficientFunds`, `AlreadyExists`, `NotFound`), opaque handles,
//! and redirect/stop semantics, without a chain in the loop.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::error::StreamError;
use crate::domain::offer::{Account, StreamHandle};
use crate::ports::payment_stream::PaymentStream;

/// One open stream.
#[derive(Debug, Clone)]
struct StreamRecord {
    payer: Account,
    payee: Account,
    rate: Decimal,
}

#[derive(Default)]
struct Ledger {
    /// Funds deposited per account. A stream needs a positive deposit.
    deposits: HashMap<Account, Decimal>,
    /// Open streams by handle. Stopped streams are removed.
    streams: HashMap<StreamHandle, StreamRecord>,
}

/// Deposit-backed in-memory stream transport.
#[derive(Default)]
pub struct LedgerStreams {
    ledger: RwLock<Ledger>,
}

impl LedgerStreams {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger pre-funded with account deposits.
    pub async fn with_deposits(accounts: impl IntoIterator<Item = (Account, Decimal)>) -> Self {
        let streams = Self::new();
        for (account, amount) in accounts {
            streams.fund(account, amount).await;
        }
        streams
    }

    /// Add `amount` to an account's deposit.
    pub async fn fund(&self, account: Account, amount: Decimal) {
        let mut ledger = self.ledger.write().await;
        let deposit = ledger.deposits.entry(account.clone()).or_default();
        *deposit += amount;
        debug!(account = %account, deposit = %deposit, "Account funded");
    }

    /// Current payee of an open stream, if any.
    ///
    /// A stream whose payee equals its payer has been redirected back
    /// to the payer and accrues nothing.
    pub async fn payee_of(&self, handle: &StreamHandle) -> Option<Account> {
        self.ledger
            .read()
            .await
            .streams
            .get(handle)
            .map(|s| s.payee.clone())
    }

    /// Number of open streams.
    pub async fn open_count(&self) -> usize {
        self.ledger.read().await.streams.len()
    }
}

#[async_trait]
impl PaymentStream for LedgerStreams {
    async fn open_stream(
        &self,
        payer: &Account,
        payee: &Account,
        rate: Decimal,
    ) -> Result<StreamHandle, StreamError> {
        let mut ledger = self.ledger.write().await;

        let funded = ledger
            .deposits
            .get(payer)
            .is_some_and(|d| *d > Decimal::ZERO);
        if !funded {
            return Err(StreamError::InsufficientFunds {
                payer: payer.clone(),
                rate,
            });
        }
        let duplicate = ledger
            .streams
            .values()
            .any(|s| s.payer == *payer && s.payee == *payee);
        if duplicate {
            return Err(StreamError::AlreadyExists {
                payer: payer.clone(),
                payee: payee.clone(),
            });
        }

        let handle = Uuid::new_v4().to_string();
        ledger.streams.insert(
            handle.clone(),
            StreamRecord {
                payer: payer.clone(),
                payee: payee.clone(),
                rate,
            },
        );
        info!(handle = %handle, payer = %payer, payee = %payee, rate = %rate, "Stream opened");
        Ok(handle)
    }

    async fn redirect_stream(
        &self,
        handle: &StreamHandle,
        new_payee: &Account,
    ) -> Result<(), StreamError> {
        let mut ledger = self.ledger.write().await;
        let record = ledger
            .streams
            .get_mut(handle)
            .ok_or_else(|| StreamError::NotFound {
                handle: handle.clone(),
            })?;
        record.payee = new_payee.clone();
        info!(handle = %handle, payee = %new_payee, "Stream redirected");
        Ok(())
    }

    async fn stop_stream(&self, handle: &StreamHandle) -> Result<(), StreamError> {
        let mut ledger = self.ledger.write().await;
        let record = ledger
            .streams
            .remove(handle)
            .ok_or_else(|| StreamError::NotFound {
                handle: handle.clone(),
            })?;
        info!(handle = %handle, payer = %record.payer, payee = %record.payee, "Stream stopped");
        Ok(())
    }
}
