use std::net;

use serde::Deserialize;

#[derive(Deserialize)]
pub struct Config {
    pub db: Db,
    pub http: Http,
    #[serde(default)]
    pub password: Password,
}

#[derive(Deserialize)]
pub struct Db {
    pub url: String,
}

#[derive(Deserialize)]
pub struct Http {
    pub server: Server,
    pub cors: Cors,
}

#[derive(Deserialize)]
pub struct Server {
    pub addr: net::SocketAddr,
}

#[derive(Deserialize)]
pub struct Cors {
    pub allowed_origins: Vec<String>,
}

#[derive(Deserialize)]
pub struct Password {
    /// bcrypt work factor, `4..=31`; checked by `password::Hasher::new`.
    #[serde(default = "default_cost")]
    pub cost: u32,
}

impl Default for Password {
    fn default() -> Self {
        Self {
            cost: default_cost(),
        }
    }
}

fn default_cost() -> u32 {
    bcrypt::DEFAULT_COST
}
