mod login;
mod logout;
mod password;
mod register;

use axum::{
    Router, debug_handler,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    AppResult, AppState,
    appresult::{ApiJson, Reply},
    session,
};

pub use register::Account;

pub(crate) use login::authenticate;
pub(crate) use register::create_user;

pub fn pages() -> Router<AppState> {
    Router::new()
        .route("/login", get(login::login_page))
        .route("/logout", get(logout::logout))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(auth))
}

#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub(crate) enum AuthRequest {
    Login {
        email: String,
        password: String,
    },
    Register {
        full_name: String,
        email: String,
        password: String,
    },
    Logout,
}

#[debug_handler(state = AppState)]
pub(crate) async fn auth(
    State(db_pool): State<SqlitePool>,
    session: Session,
    ApiJson(request): ApiJson<AuthRequest>,
) -> AppResult<Reply<Option<Account>>> {
    match request {
        AuthRequest::Login { email, password } => {
            let account = authenticate(&db_pool, &email, &password).await?;
            session::sign_in(&session, account.id).await?;
            tracing::info!(user_id = account.id, "logged in");
            Ok(Reply::data(Some(account)).with_message("Login successful"))
        }
        AuthRequest::Register { full_name, email, password } => {
            let account = create_user(&db_pool, &full_name, &email, &password).await?;
            session::sign_in(&session, account.id).await?;
            Ok(Reply::data(Some(account)).with_message("Registration successful"))
        }
        AuthRequest::Logout => {
            session::sign_out(&session).await?;
            Ok(Reply::data(None).with_message("Logged out"))
        }
    }
}
