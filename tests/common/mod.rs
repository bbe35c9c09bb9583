#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::{net, task};
use user_service::{
    api,
    db::{self, Id, PasswordHash, Store},
    http, password,
};

/// Lowest cost bcrypt accepts, to keep tests fast.
pub const HASH_COST: u32 = 4;

/// In-process [`Store`] with auto-increment ids that are never reused.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    last_id: i64,
    users: BTreeMap<Id, db::User>,
}

impl MemoryStore {
    pub fn user(&self, id: Id) -> Option<db::User> {
        self.inner.lock().unwrap().users.get(&id).cloned()
    }
}

impl Tables {
    fn login_taken(&self, login: &str, except: Option<Id>) -> bool {
        self.users
            .values()
            .any(|u| u.login == login && Some(u.id) != except)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(
        &self,
        login: &str,
        pass_hash: &PasswordHash,
    ) -> Result<db::User, db::Error> {
        let mut tables = self.inner.lock().unwrap();
        if tables.login_taken(login, None) {
            return Err(db::Error::ConstraintViolation);
        }
        tables.last_id += 1;
        let user = db::User {
            id: Id::from(tables.last_id),
            login: login.to_owned(),
            pass_hash: pass_hash.clone(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Id) -> Result<Option<db::User>, db::Error> {
        Ok(self.user(id))
    }

    async fn update_user(
        &self,
        id: Id,
        login: &str,
        pass_hash: &PasswordHash,
    ) -> Result<Option<db::User>, db::Error> {
        let mut tables = self.inner.lock().unwrap();
        if !tables.users.contains_key(&id) {
            return Ok(None);
        }
        if tables.login_taken(login, Some(id)) {
            return Err(db::Error::ConstraintViolation);
        }
        let user = db::User {
            id,
            login: login.to_owned(),
            pass_hash: pass_hash.clone(),
        };
        tables.users.insert(id, user.clone());
        Ok(Some(user))
    }

    async fn delete_user(&self, id: Id) -> Result<Option<db::User>, db::Error> {
        Ok(self.inner.lock().unwrap().users.remove(&id))
    }
}

/// Router served on an ephemeral port, backed by a fresh [`MemoryStore`].
pub struct App {
    pub client: Client,
    pub store: Arc<MemoryStore>,
}

pub async fn spawn_app() -> App {
    let store = Arc::new(MemoryStore::default());
    let app = http::router(Arc::new(http::AppState {
        store: store.clone(),
        hasher: password::Hasher::new(HASH_COST).expect("invalid cost"),
    }));

    let listener = net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind a listener");
    let addr = listener.local_addr().expect("no local address");
    task::spawn(async move {
        axum::serve(listener, app).await.expect("server failed");
    });

    App {
        client: Client::new(format!("http://{addr}")),
        store,
    }
}

pub struct Client {
    inner: reqwest::Client,
    base_url: String,
}

/// Failed response: its status and decoded JSON body.
#[derive(Debug)]
pub struct Failure {
    pub status: StatusCode,
    pub body: Value,
}

impl Client {
    pub fn new(base_url: String) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn raw(&self) -> &reqwest::Client {
        &self.inner
    }

    pub async fn create_user(
        &self,
        login: &str,
        password: &str,
    ) -> Result<api::User, Failure> {
        let req = self.inner.post(self.url("/user")).json(&json!({
            "login": login,
            "password": password,
        }));
        send(req).await
    }

    pub async fn get_user(
        &self,
        id: api::user::Id,
    ) -> Result<api::User, Failure> {
        send(self.inner.get(self.url(&format!("/user/{id}")))).await
    }

    pub async fn update_user(
        &self,
        id: api::user::Id,
        login: &str,
        password: &str,
    ) -> Result<api::User, Failure> {
        let req = self
            .inner
            .put(self.url(&format!("/user/{id}")))
            .json(&json!({
                "login": login,
                "password": password,
            }));
        send(req).await
    }

    pub async fn delete_user(
        &self,
        id: api::user::Id,
    ) -> Result<api::Detail, Failure> {
        send(self.inner.delete(self.url(&format!("/user/{id}")))).await
    }
}

pub async fn send<T: serde::de::DeserializeOwned>(
    req: reqwest::RequestBuilder,
) -> Result<T, Failure> {
    let resp = req.send().await.expect("failed to send a request");
    let status = resp.status();
    if status.is_success() {
        Ok(resp.json::<T>().await.expect("failed to get a response"))
    } else {
        let body = resp.json::<Value>().await.unwrap_or(Value::Null);
        Err(Failure { status, body })
    }
}
