pub mod user;

use async_trait::async_trait;
use derive_more::Display;
use tokio_postgres::{error::SqlState, tls::NoTlsStream, NoTls, Socket};

use crate::config;

pub use self::user::{Id, PasswordHash, User};

pub type Connection = tokio_postgres::Connection<Socket, NoTlsStream>;

pub async fn connect(
    config: config::Db,
) -> Result<(Client, Connection), Error> {
    tokio_postgres::connect(&config.url, NoTls)
        .await
        .map(|(client, connection)| (Client(client), connection))
        .map_err(Into::into)
}

/// Persistence of [`User`] rows.
///
/// Every operation is its own implicitly committed unit of work. A missing
/// row is reported as `None`, not as an error.
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts a new user, assigning a fresh [`Id`].
    ///
    /// Fails with [`Error::ConstraintViolation`] if `login` is taken.
    async fn create_user(
        &self,
        login: &str,
        pass_hash: &PasswordHash,
    ) -> Result<User, Error>;

    async fn get_user(&self, id: Id) -> Result<Option<User>, Error>;

    /// Replaces both `login` and `pass_hash` of an existing user.
    async fn update_user(
        &self,
        id: Id,
        login: &str,
        pass_hash: &PasswordHash,
    ) -> Result<Option<User>, Error>;

    /// Removes the user, returning the removed row.
    async fn delete_user(&self, id: Id) -> Result<Option<User>, Error>;
}

pub struct Client(tokio_postgres::Client);

impl Client {
    /// Creates the `users` table unless it already exists.
    pub async fn ensure_schema(&self) -> Result<(), Error> {
        const SQL: &str = "CREATE TABLE IF NOT EXISTS users ( \
                               id BIGSERIAL PRIMARY KEY, \
                               login TEXT NOT NULL UNIQUE, \
                               pass_hash TEXT NOT NULL \
                           )";
        self.0.batch_execute(SQL).await.map_err(Into::into)
    }
}

#[derive(Debug, Display, derive_more::Error)]
pub enum Error {
    #[display("login is already taken")]
    ConstraintViolation,
    #[display("database error: {_0}")]
    Backend(tokio_postgres::Error),
}

impl From<tokio_postgres::Error> for Error {
    fn from(e: tokio_postgres::Error) -> Self {
        if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
            Self::ConstraintViolation
        } else {
            Self::Backend(e)
        }
    }
}
