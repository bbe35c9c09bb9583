use std::{error::Error as StdError, fmt};

use async_trait::async_trait;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tokio_postgres::{
    types::{
        accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql,
        Type,
    },
    Row,
};

use super::{Client, Error, Store};

#[derive(Clone, Debug)]
pub struct User {
    pub id: Id,
    pub login: String,
    pub pass_hash: PasswordHash,
}

impl From<Row> for User {
    fn from(row: Row) -> Self {
        Self {
            id: row.get("id"),
            login: row.get("login"),
            pass_hash: row.get("pass_hash"),
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Id(i64);

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Id> for i64 {
    fn from(id: Id) -> Self {
        id.0
    }
}

impl FromSql<'_> for Id {
    accepts!(INT8);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        i64::from_sql(ty, raw).map(Self)
    }
}

impl ToSql for Id {
    accepts!(INT8);

    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, out)
    }
}

/// Longest secret bcrypt hashes without truncation.
pub const MAX_SECRET_LEN: usize = 72;

/// bcrypt hash of a user's password. Never leaves the process in a response.
#[derive(Clone, Eq, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(secret: &str, cost: u32) -> Result<Self, bcrypt::BcryptError> {
        bcrypt::hash(secret, cost).map(Self)
    }

    /// Checks `secret` against this hash. A malformed hash never matches,
    /// and neither does a secret bcrypt would have to truncate.
    pub fn verify(&self, secret: &str) -> bool {
        secret.len() <= MAX_SECRET_LEN
            && bcrypt::verify(secret, &self.0).unwrap_or(false)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

impl FromSql<'_> for PasswordHash {
    accepts!(TEXT);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        String::from_sql(ty, raw).map(Self)
    }
}

impl ToSql for PasswordHash {
    accepts!(TEXT);

    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, out)
    }
}

#[async_trait]
impl Store for Client {
    async fn create_user(
        &self,
        login: &str,
        pass_hash: &PasswordHash,
    ) -> Result<User, Error> {
        const SQL: &str = "INSERT INTO users (login, pass_hash) \
                           VALUES ($1, $2) \
                           RETURNING id, login, pass_hash";
        Ok(self.0.query_one(SQL, &[&login, pass_hash]).await?.into())
    }

    async fn get_user(&self, id: Id) -> Result<Option<User>, Error> {
        const SQL: &str = "SELECT id, login, pass_hash \
                           FROM users \
                           WHERE id = $1 \
                           LIMIT 1";
        Ok(self.0.query_opt(SQL, &[&id]).await?.map(User::from))
    }

    async fn update_user(
        &self,
        id: Id,
        login: &str,
        pass_hash: &PasswordHash,
    ) -> Result<Option<User>, Error> {
        const SQL: &str = "UPDATE users \
                           SET login = $2, pass_hash = $3 \
                           WHERE id = $1 \
                           RETURNING id, login, pass_hash";
        Ok(self
            .0
            .query_opt(SQL, &[&id, &login, pass_hash])
            .await?
            .map(User::from))
    }

    async fn delete_user(&self, id: Id) -> Result<Option<User>, Error> {
        const SQL: &str = "DELETE FROM users \
                           WHERE id = $1 \
                           RETURNING id, login, pass_hash";
        Ok(self.0.query_opt(SQL, &[&id]).await?.map(User::from))
    }
}
