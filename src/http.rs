//! HTTP surface: one route per store operation.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use derive_more::From;
use tower_http::trace::TraceLayer;

use crate::{api, db, password};

const USER_NOT_FOUND: &str = "User not found";
const LOGIN_TAKEN: &str = "Login already taken";
const INTERNAL_ERROR: &str = "Internal server error";
const PASSWORD_TOO_LONG: &str = "Password must be at most 72 bytes";

pub type SharedAppState = Arc<AppState>;

pub struct AppState {
    pub store: Arc<dyn db::Store>,
    pub hasher: password::Hasher,
}

pub fn router(state: SharedAppState) -> Router {
    Router::new()
        .route("/user", post(create_user))
        .route(
            "/user/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

type Input = WithRejection<Json<api::user::Input>, ValidationError>;

async fn create_user(
    State(state): State<SharedAppState>,
    WithRejection(Json(api::user::Input { login, password }), _): Input,
) -> Result<Json<api::User>, CreateUserError> {
    let pass_hash = state.hasher.hash(password).await?;
    let user = state.store.create_user(&login, &pass_hash).await?;
    tracing::info!(id = %user.id, "user created");
    Ok(Json(user.into()))
}

#[derive(Debug, From)]
pub enum CreateUserError {
    #[from]
    DbError(db::Error),
    #[from]
    HashError(password::Error),
}

impl IntoResponse for CreateUserError {
    fn into_response(self) -> Response {
        match self {
            Self::DbError(db::Error::ConstraintViolation) => {
                detail(StatusCode::CONFLICT, LOGIN_TAKEN)
            }
            Self::DbError(e) => internal_error("create user", &e),
            Self::HashError(password::Error::TooLong) => {
                detail(StatusCode::UNPROCESSABLE_ENTITY, PASSWORD_TOO_LONG)
            }
            Self::HashError(e) => internal_error("create user", &e),
        }
    }
}

async fn get_user(
    State(state): State<SharedAppState>,
    Path(id): Path<api::user::Id>,
) -> Result<Json<api::User>, GetUserError> {
    use GetUserError as E;

    let user = state.store.get_user(id).await?.ok_or(E::UserNotFound)?;
    Ok(Json(user.into()))
}

#[derive(Debug, From)]
pub enum GetUserError {
    #[from]
    DbError(db::Error),
    UserNotFound,
}

impl IntoResponse for GetUserError {
    fn into_response(self) -> Response {
        match self {
            Self::UserNotFound => detail(StatusCode::NOT_FOUND, USER_NOT_FOUND),
            Self::DbError(e) => internal_error("get user", &e),
        }
    }
}

async fn update_user(
    State(state): State<SharedAppState>,
    Path(id): Path<api::user::Id>,
    WithRejection(Json(api::user::Input { login, password }), _): Input,
) -> Result<Json<api::User>, UpdateUserError> {
    use UpdateUserError as E;

    let pass_hash = state.hasher.hash(password).await?;
    let user = state
        .store
        .update_user(id, &login, &pass_hash)
        .await?
        .ok_or(E::UserNotFound)?;
    tracing::info!(%id, "user updated");
    Ok(Json(user.into()))
}

#[derive(Debug, From)]
pub enum UpdateUserError {
    #[from]
    DbError(db::Error),
    #[from]
    HashError(password::Error),
    UserNotFound,
}

impl IntoResponse for UpdateUserError {
    fn into_response(self) -> Response {
        match self {
            Self::UserNotFound => detail(StatusCode::NOT_FOUND, USER_NOT_FOUND),
            Self::DbError(db::Error::ConstraintViolation) => {
                detail(StatusCode::CONFLICT, LOGIN_TAKEN)
            }
            Self::DbError(e) => internal_error("update user", &e),
            Self::HashError(password::Error::TooLong) => {
                detail(StatusCode::UNPROCESSABLE_ENTITY, PASSWORD_TOO_LONG)
            }
            Self::HashError(e) => internal_error("update user", &e),
        }
    }
}

async fn delete_user(
    State(state): State<SharedAppState>,
    Path(id): Path<api::user::Id>,
) -> Result<Json<api::Detail>, DeleteUserError> {
    use DeleteUserError as E;

    state.store.delete_user(id).await?.ok_or(E::UserNotFound)?;
    tracing::info!(%id, "user deleted");
    Ok(Json(api::Detail::new("User deleted")))
}

#[derive(Debug, From)]
pub enum DeleteUserError {
    #[from]
    DbError(db::Error),
    UserNotFound,
}

impl IntoResponse for DeleteUserError {
    fn into_response(self) -> Response {
        match self {
            Self::UserNotFound => detail(StatusCode::NOT_FOUND, USER_NOT_FOUND),
            Self::DbError(e) => internal_error("delete user", &e),
        }
    }
}

/// Request body that failed to parse as JSON or to match the input shape.
#[derive(Debug, From)]
pub struct ValidationError(JsonRejection);

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        detail(self.0.status(), &self.0.body_text())
    }
}

fn detail(status: StatusCode, detail: &str) -> Response {
    (status, Json(api::Detail::new(detail))).into_response()
}

fn internal_error(op: &str, e: &dyn std::error::Error) -> Response {
    tracing::error!(error = %e, "failed to {op}");
    detail(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
}
