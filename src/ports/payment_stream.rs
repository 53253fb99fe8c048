//! Payment Stream Port - Continuous Transfer Interface
//!
//! Defines the trait for the streaming-payment capability an offer
//! consumes: open a flow at a rate from payer to payee, redirect it to a
//! new payee, or stop it. The transport (on-chain framework, in-process
//! ledger) is an adapter concern.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::error::StreamError;
use crate::domain::offer::{Account, StreamHandle};

/// Trait for payment-stream transports.
///
/// Handles are opaque; the offer state machine stores the handle it got
/// from `open_stream` and hands it back for redirect/stop. At most one
/// stream exists per (payer, payee) pair.
#[async_trait]
pub trait PaymentStream: Send + Sync + 'static {
  /// Open a continuous stream from `payer` to `payee` at `rate` per second.
  ///
  /// # Errors
  /// `InsufficientFunds` if the payer cannot fund the rate,
  /// `AlreadyExists` if a stream between the pair is already open.
  async fn open_stream(
    &self,
    payer: &Account,
    payee: &Account,
    rate: Decimal,
  ) -> Result<StreamHandle, StreamError>;

  /// Point an existing stream at a new payee.
  ///
  /// Redirecting a stream back to its own payer halts accrual; the
  /// payer is simply paying themselves from then on.
  ///
  /// # Errors
  /// `NotFound` if the handle does not name an open stream.
  async fn redirect_stream(
    &self,
    handle: &StreamHandle,
    new_payee: &Account,
  ) -> Result<(), StreamError>;

  /// Stop an existing stream. No further funds move after this returns.
  ///
  /// # Errors
  /// `NotFound` if the handle does not name an open stream.
  async fn stop_stream(&self, handle: &StreamHandle) -> Result<(), StreamError>;
}
