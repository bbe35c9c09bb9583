use serde::{Deserialize, Serialize};

use crate::db;

pub use crate::db::user::Id;

/// Public view of a user. Deliberately has no password field.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct User {
    pub id: Id,
    pub login: String,
}

impl From<db::User> for User {
    fn from(user: db::User) -> Self {
        Self {
            id: user.id,
            login: user.login,
        }
    }
}

/// Body of both `POST /user` and `PUT /user/{id}`.
#[derive(Clone, Deserialize)]
pub struct Input {
    pub login: String,
    pub password: String,
}
