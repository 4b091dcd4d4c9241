//! Payment attempt entity and the settlement rules shared by every store.

use serde::{Deserialize, Serialize};

use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::foundation::{BookingId, PaymentId, StateMachine, Timestamp};

use super::{GatewayCallback, GatewayKind, PaymentStatus};

/// One attempt to settle a booking through one gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub booking_id: BookingId,
    /// Correlation key sent to the provider (the booking code).
    pub order_id: String,
    /// Per-attempt request id, when the provider uses one.
    pub request_id: Option<String>,
    /// Amount requested, in whole currency units.
    pub amount: i64,
    pub provider: GatewayKind,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub result_code: Option<i32>,
    pub message: Option<String>,
    pub signature: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Payment {
    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::Pending
    }

    /// Records a verified provider outcome.
    ///
    /// Returns `false` and changes nothing when the payment is already settled.
    pub fn record_outcome(&mut self, callback: &GatewayCallback, now: Timestamp) -> bool {
        let target = if callback.succeeded {
            PaymentStatus::Success
        } else {
            PaymentStatus::Failed
        };
        let Ok(next) = self.status.transition_to(target) else {
            return false;
        };

        self.status = next;
        self.transaction_id = callback.transaction_id.clone();
        self.result_code = Some(callback.result_code);
        self.message = Some(callback.message.clone());
        self.signature = Some(callback.signature.clone());
        self.updated_at = now;
        true
    }
}

/// A payment attempt about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub booking_id: BookingId,
    pub order_id: String,
    pub request_id: Option<String>,
    pub amount: i64,
    pub provider: GatewayKind,
    pub created_at: Timestamp,
}

impl NewPayment {
    pub fn into_payment(self, id: PaymentId) -> Payment {
        Payment {
            id,
            booking_id: self.booking_id,
            order_id: self.order_id,
            request_id: self.request_id,
            amount: self.amount,
            provider: self.provider,
            status: PaymentStatus::Pending,
            transaction_id: None,
            result_code: None,
            message: None,
            signature: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// What happened to the booking when a payment settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingTransition {
    Confirmed,
    Cancelled,
    /// The booking had already left `Pending` (e.g. expired before a late success).
    Unchanged,
}

/// Result of applying a verified callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Settlement {
    /// The payment was already terminal; nothing was written.
    AlreadySettled { status: PaymentStatus },
    Applied {
        status: PaymentStatus,
        booking: BookingTransition,
    },
}

impl Settlement {
    pub fn payment_status(&self) -> PaymentStatus {
        match self {
            Settlement::AlreadySettled { status } | Settlement::Applied { status, .. } => *status,
        }
    }

    pub fn is_replay(&self) -> bool {
        matches!(self, Settlement::AlreadySettled { .. })
    }
}

/// Applies a verified callback to a payment and its booking.
///
/// Stores call this inside the same atomic unit that persists both rows, so
/// every adapter shares one set of transition rules.
pub fn settle(
    payment: &mut Payment,
    booking: &mut Booking,
    callback: &GatewayCallback,
    now: Timestamp,
) -> Settlement {
    if !payment.record_outcome(callback, now) {
        return Settlement::AlreadySettled {
            status: payment.status,
        };
    }

    let transition = if booking.status != BookingStatus::Pending {
        BookingTransition::Unchanged
    } else if payment.status == PaymentStatus::Success {
        match booking.confirm(callback.gateway.payment_method(), now) {
            Ok(()) => BookingTransition::Confirmed,
            Err(_) => BookingTransition::Unchanged,
        }
    } else {
        match booking.cancel(now) {
            Ok(true) => BookingTransition::Cancelled,
            _ => BookingTransition::Unchanged,
        }
    };

    Settlement::Applied {
        status: payment.status,
        booking: transition,
    }
}
