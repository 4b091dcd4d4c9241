//! Booking listing queries: per user and administrative pages.

use std::sync::Arc;

use crate::domain::booking::{Booking, BookingError};
use crate::domain::foundation::UserId;
use crate::ports::{BookingPage, BookingRepository, PageRequest, UserDirectory};

/// Query for a user's bookings.
#[derive(Debug, Clone)]
pub struct ListUserBookingsQuery {
    pub user_id: UserId,
}

pub type ListUserBookingsResult = Vec<Booking>;

/// Handler returning a user's bookings, newest first.
pub struct ListUserBookingsHandler {
    bookings: Arc<dyn BookingRepository>,
    users: Arc<dyn UserDirectory>,
}

impl ListUserBookingsHandler {
    pub fn new(bookings: Arc<dyn BookingRepository>, users: Arc<dyn UserDirectory>) -> Self {
        Self { bookings, users }
    }

    pub async fn handle(
        &self,
        query: ListUserBookingsQuery,
    ) -> Result<ListUserBookingsResult, BookingError> {
        if self.users.find_user(query.user_id).await?.is_none() {
            return Err(BookingError::UserNotFound(query.user_id));
        }
        Ok(self.bookings.list_by_user(query.user_id).await?)
    }
}

/// Query for one page of all bookings.
#[derive(Debug, Clone, Default)]
pub struct ListBookingsQuery {
    pub page: PageRequest,
}

pub type ListBookingsResult = BookingPage;

/// Handler for the administrative booking listing.
pub struct ListBookingsHandler {
    bookings: Arc<dyn BookingRepository>,
}

impl ListBookingsHandler {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn handle(&self, query: ListBookingsQuery) -> Result<ListBookingsResult, BookingError> {
        Ok(self.bookings.list(query.page).await?)
    }
}
