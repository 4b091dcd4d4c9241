//! Forward-only status lifecycles.
//!
//! Booking, booking-seat and payment statuses each start in one open state
//! and settle into a terminal one. Implementors list their successors; the
//! checks and the transition error come from the provided methods.

use super::ValidationError;

pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug + 'static {
    /// Field name reported when a transition is refused.
    const FIELD: &'static str;

    /// States reachable in one step from `self`.
    fn successors(&self) -> &'static [Self];

    fn can_transition_to(&self, target: &Self) -> bool {
        self.successors().contains(target)
    }

    /// Moves to `target`, or explains why the move is not allowed.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            return Ok(target);
        }
        let reason = if self.is_terminal() {
            format!("{:?} is final, cannot become {:?}", self, target)
        } else {
            format!("{:?} cannot become {:?}", self, target)
        };
        Err(ValidationError::invalid_format(Self::FIELD, reason))
    }

    fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }
}
