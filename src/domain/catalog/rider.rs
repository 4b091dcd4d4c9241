//! The user directory's view of the person booking.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

/// Discount eligibility, resolved once from the directory role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiderClass {
    Standard,
    Student,
}

impl RiderClass {
    /// Classifies a directory role. Unknown roles pay the standard price.
    pub fn from_role(role: &str) -> Self {
        if role.trim().eq_ignore_ascii_case("student") {
            RiderClass::Student
        } else {
            RiderClass::Standard
        }
    }
}

/// A user as returned by the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rider {
    pub id: UserId,
    pub role: String,
    pub class: RiderClass,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl Rider {
    pub fn new(
        id: UserId,
        role: impl Into<String>,
        email: Option<String>,
        name: Option<String>,
    ) -> Self {
        let role = role.into();
        let class = RiderClass::from_role(&role);
        Self {
            id,
            role,
            class,
            email,
            name,
        }
    }
}
