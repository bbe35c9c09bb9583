pub mod user;

use serde::{Deserialize, Serialize};

pub use self::user::User;

/// Human-readable outcome or failure description.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Detail {
    pub detail: String,
}

impl Detail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
