//! Payments: gateway client, reconciliation and background retry
//!
//! - **gateway**: [`PaymentGateway`] trait (initialize / verify)
//! - **paystack**: [`PaystackClient`] over the Paystack REST API
//! - **webhook**: signature check + event parsing
//! - **reconciler**: [`PaymentReconciler`] drives orders from gateway results
//! - **worker**: [`ReconciliationWorker`] bounded auto-retry of pending references

mod error;
pub mod gateway;
pub mod paystack;
pub mod reconciler;
pub mod webhook;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{PaymentError, PaymentResult};
pub use gateway::{Checkout, GatewayStatus, InitializeTransaction, PaymentGateway, Verification};
pub use paystack::PaystackClient;
pub use reconciler::{PaymentInitialization, PaymentReconciler, ReconcileOutcome};
pub use worker::{ReconciliationWorker, SweepStats};
