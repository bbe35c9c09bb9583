//! Salted one-way password hashing.

use derive_more::{Display, From};
use tokio::task;

use crate::db::user::{PasswordHash, MAX_SECRET_LEN};

/// Work factors bcrypt accepts.
const COSTS: std::ops::RangeInclusive<u32> = 4..=31;

/// Produces bcrypt hashes with a fixed work factor.
#[derive(Clone, Copy, Debug)]
pub struct Hasher {
    cost: u32,
}

impl Hasher {
    pub fn new(cost: u32) -> Result<Self, Error> {
        if !COSTS.contains(&cost) {
            return Err(Error::InvalidCost(cost));
        }
        Ok(Self { cost })
    }

    /// Hashes `secret` on the blocking pool, since bcrypt is CPU bound by
    /// construction.
    ///
    /// bcrypt ignores everything past [`MAX_SECRET_LEN`] bytes, so longer
    /// secrets are refused rather than silently truncated.
    pub async fn hash(&self, secret: String) -> Result<PasswordHash, Error> {
        if secret.len() > MAX_SECRET_LEN {
            return Err(Error::TooLong);
        }
        let cost = self.cost;
        task::spawn_blocking(move || PasswordHash::new(&secret, cost))
            .await?
            .map_err(Into::into)
    }
}

#[derive(Debug, Display, derive_more::Error, From)]
pub enum Error {
    #[display("bcrypt cost {_0} is outside 4..=31")]
    #[from(ignore)]
    InvalidCost(#[error(not(source))] u32),
    #[display("password is longer than 72 bytes")]
    #[from(ignore)]
    TooLong,
    #[display("bcrypt failure: {_0}")]
    Bcrypt(bcrypt::BcryptError),
    #[display("hashing task failed: {_0}")]
    Join(task::JoinError),
}
