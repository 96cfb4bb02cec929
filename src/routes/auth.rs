//! Auth routes for registration, login, logout and the current user

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::auth::jwt::IssuedToken;
use crate::auth::middleware::ACCESS_TOKEN_COOKIE;
use crate::auth::models::{AuthUser, CredentialsRequest, TokenResponse};
use crate::routes::error::ApiError;
use crate::routes::extract::ApiJson;
use crate::server::AppState;

/// Attach the token as a cookie that expires together with it
fn with_token_cookie(jar: CookieJar, issued: &IssuedToken) -> CookieJar {
    let remaining = (issued.expires_at - chrono::Utc::now()).num_seconds().max(0);
    let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, issued.token.clone()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(remaining));
    jar.add(cookie)
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), ApiError> {
    let issued = state.auth.register(&payload.email, &payload.password).await?;
    let jar = with_token_cookie(jar, &issued);
    Ok((jar, Json(issued.into())))
}

/// Single login handler, mounted on both login paths
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(payload): ApiJson<CredentialsRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), ApiError> {
    let issued = state.auth.login(&payload.email, &payload.password).await?;
    let jar = with_token_cookie(jar, &issued);
    Ok((jar, Json(issued.into())))
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    // Tokens are stateless; dropping the cookie is all there is to do
    let mut cookie = Cookie::from(ACCESS_TOKEN_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), StatusCode::NO_CONTENT)
}

pub async fn me(Extension(user): Extension<AuthUser>) -> Json<AuthUser> {
    Json(user)
}

/// Routes that do not require a token
pub fn create_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}

/// Routes that expect the auth middleware to have run
pub fn create_protected_auth_routes() -> Router<AppState> {
    Router::new().route("/api/auth/me", get(me))
}
