//! HTTP handlers for the sync API.
//!
//! Every failure is answered with `{"success": false, "error": "..."}`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use routlin_core::sync::{
    normalize_username, AuthResponse, ChangePasswordRequest, Credentials, DeleteAccountRequest,
    ErrorResponse, HealthResponse, MessageResponse, SyncRequest, MIN_PASSWORD_LEN,
    MIN_USERNAME_LEN,
};
use routlin_core::UserData;

use super::auth::{generate_session_token, hash_password, verify_password, SESSION_TTL_MS};
use super::storage::{ServerStorageError, UserRow};
use super::{now_ms, AppState};

/// An error response with its status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

impl From<ServerStorageError> for ApiError {
    fn from(err: ServerStorageError) -> Self {
        match err {
            ServerStorageError::UsernameTaken(_) => {
                ApiError::new(StatusCode::CONFLICT, "Username already exists")
            }
            other => {
                tracing::error!("Storage error: {}", other);
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Server error: {}", other),
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        ApiError::bad_request("Invalid request")
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: now_ms(),
    })
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<AuthResponse> {
    let Json(body) = payload?;
    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request("Username and password required"));
    }

    let username = normalize_username(&body.username);
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Username must be at least {} characters",
            MIN_USERNAME_LEN
        )));
    }
    if body.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let now = now_ms();
    let user_id = state
        .storage
        .create_user(&username, &hash_password(&body.password), now)
        .await?;
    let session_token = open_session(&state, user_id, now).await?;
    tracing::info!(%username, "account created");

    Ok(Json(AuthResponse {
        success: true,
        message: "Account created successfully".to_string(),
        username,
        session_token,
        user_data: UserData::new(),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<AuthResponse> {
    let Json(body) = payload?;
    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request("Username and password required"));
    }

    let username = normalize_username(&body.username);
    let user = match state.storage.find_user(&username).await? {
        Some(user) if verify_password(&body.password, &user.password_hash) => user,
        _ => return Err(ApiError::unauthorized("Invalid username or password")),
    };

    let now = now_ms();
    state.storage.record_login(user.id, now).await?;
    let session_token = open_session(&state, user.id, now).await?;
    let user_data = state.storage.load_user_data(user.id).await?;
    tracing::info!(username = %user.username, "login");

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        username: user.username,
        session_token,
        user_data,
    }))
}

pub async fn sync(
    State(state): State<AppState>,
    payload: Result<Json<SyncRequest>, JsonRejection>,
) -> ApiResult<MessageResponse> {
    let Json(body) = payload?;
    let user = require_user(&state, &body.username).await?;
    require_session(&state, &user, &body.session_token).await?;

    state
        .storage
        .apply_sync(user.id, &body.user_data, now_ms())
        .await?;
    tracing::info!(
        username = %user.username,
        tags = body.user_data.tags.len(),
        days = body.user_data.entries.len(),
        goals = body.user_data.goals.len(),
        "synced"
    );

    Ok(Json(MessageResponse::ok("Data synced successfully")))
}

pub async fn change_password(
    State(state): State<AppState>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<MessageResponse> {
    let Json(body) = payload?;
    if body.username.trim().is_empty()
        || body.current_password.is_empty()
        || body.new_password.is_empty()
    {
        return Err(ApiError::bad_request("All fields required"));
    }
    if body.new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "New password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let user = require_user(&state, &body.username).await?;
    if !verify_password(&body.current_password, &user.password_hash) {
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }

    state
        .storage
        .update_password(user.id, &hash_password(&body.new_password))
        .await?;
    tracing::info!(username = %user.username, "password changed");

    Ok(Json(MessageResponse::ok("Password changed successfully")))
}

pub async fn delete_account(
    State(state): State<AppState>,
    payload: Result<Json<DeleteAccountRequest>, JsonRejection>,
) -> ApiResult<MessageResponse> {
    let Json(body) = payload?;
    let user = require_user(&state, &body.username).await?;
    require_session(&state, &user, &body.session_token).await?;

    state.storage.delete_user(user.id).await?;
    tracing::info!(username = %user.username, "account deleted");

    Ok(Json(MessageResponse::ok(
        "Account permanently deleted from cloud storage",
    )))
}

async fn open_session(state: &AppState, user_id: i64, now: i64) -> Result<String, ApiError> {
    let token = generate_session_token();
    state
        .storage
        .create_session(user_id, &token, now, now + SESSION_TTL_MS)
        .await?;
    Ok(token)
}

async fn require_user(state: &AppState, username: &str) -> Result<UserRow, ApiError> {
    let username = normalize_username(username);
    if username.is_empty() {
        return Err(ApiError::bad_request("Username required"));
    }
    state
        .storage
        .find_user(&username)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

async fn require_session(state: &AppState, user: &UserRow, token: &str) -> Result<(), ApiError> {
    match state.storage.session_user(token, now_ms()).await? {
        Some(id) if id == user.id => Ok(()),
        _ => Err(ApiError::unauthorized("Invalid or expired session")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{router, ServerStorage};
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use routlin_core::{GoalPeriod, Tag};
    use serde::de::DeserializeOwned;
    use serde_json::json;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn test_app() -> (TempDir, axum::Router) {
        let temp_dir = TempDir::new().unwrap();
        let storage = ServerStorage::open(&temp_dir.path().join("routlin.db"))
            .await
            .unwrap();
        (temp_dir, router(AppState { storage }))
    }

    async fn post<T: DeserializeOwned>(
        app: &axum::Router,
        path: &str,
        body: serde_json::Value,
    ) -> (StatusCode, T) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn signup(app: &axum::Router, username: &str, password: &str) -> AuthResponse {
        let (status, body) = post::<AuthResponse>(
            app,
            "/api/signup",
            json!({"username": username, "password": password}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, app) = test_app().await;
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(health.status, "ok");
        assert!(health.timestamp > 0);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (_dir, app) = test_app().await;
        let (status, body) = post::<ErrorResponse>(&app, "/api/nope", json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!body.success);
        assert_eq!(body.error, "Not found");
    }

    #[tokio::test]
    async fn test_signup_normalizes_and_rejects_duplicates() {
        let (_dir, app) = test_app().await;
        let auth = signup(&app, "  Alice ", "pass").await;
        assert!(auth.success);
        assert_eq!(auth.username, "alice");
        assert!(!auth.session_token.is_empty());
        assert_eq!(auth.user_data, UserData::new());

        let (status, body) = post::<ErrorResponse>(
            &app,
            "/api/signup",
            json!({"username": "ALICE", "password": "other"}),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.error, "Username already exists");
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let (_dir, app) = test_app().await;
        let cases = [
            (json!({"username": "al", "password": "pass"}), "Username must be"),
            (json!({"username": "alice", "password": "abc"}), "Password must be"),
            (json!({"username": "", "password": "pass"}), "required"),
            (json!({"username": "alice"}), "Invalid request"),
        ];
        for (body, expected) in cases {
            let (status, err) = post::<ErrorResponse>(&app, "/api/signup", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(err.error.contains(expected), "{}", err.error);
        }
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let (_dir, app) = test_app().await;
        signup(&app, "alice", "pass").await;

        for (username, password) in [("alice", "wrong"), ("nobody", "pass")] {
            let (status, body) = post::<ErrorResponse>(
                &app,
                "/api/login",
                json!({"username": username, "password": password}),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body.error, "Invalid username or password");
        }
    }

    #[tokio::test]
    async fn test_sync_then_login_returns_record() {
        let (_dir, app) = test_app().await;
        let auth = signup(&app, "alice", "pass").await;

        let mut data = UserData::new();
        data.tags.push(Tag::new("Run", "#FF5252").with_id("t1"));
        data.entries.set(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            vec!["t1".to_string()],
        );
        data.save_goal("t1", 3, GoalPeriod::Week).unwrap();

        let (status, body) = post::<MessageResponse>(
            &app,
            "/api/sync",
            serde_json::to_value(SyncRequest {
                username: "alice".to_string(),
                session_token: auth.session_token.clone(),
                user_data: data.clone(),
            })
            .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);

        let (status, login) = post::<AuthResponse>(
            &app,
            "/api/login",
            json!({"username": "Alice", "password": "pass"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(login.session_token, auth.session_token);
        assert_eq!(login.user_data, data);
    }

    #[tokio::test]
    async fn test_sync_requires_valid_session() {
        let (_dir, app) = test_app().await;
        signup(&app, "alice", "pass").await;
        let bob = signup(&app, "bob", "pass").await;

        let (status, body) = post::<ErrorResponse>(
            &app,
            "/api/sync",
            json!({"username": "alice", "sessionToken": bob.session_token, "userData": {}}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error, "Invalid or expired session");

        let (status, _) = post::<ErrorResponse>(
            &app,
            "/api/sync",
            json!({"username": "carol", "sessionToken": "x", "userData": {}}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_change_password() {
        let (_dir, app) = test_app().await;
        signup(&app, "alice", "pass").await;

        let (status, _) = post::<ErrorResponse>(
            &app,
            "/api/change-password",
            json!({"username": "alice", "currentPassword": "nope", "newPassword": "newpass"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = post::<MessageResponse>(
            &app,
            "/api/change-password",
            json!({"username": "alice", "currentPassword": "pass", "newPassword": "newpass"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);

        let (status, _) = post::<AuthResponse>(
            &app,
            "/api/login",
            json!({"username": "alice", "password": "newpass"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_delete_account() {
        let (_dir, app) = test_app().await;
        let auth = signup(&app, "alice", "pass").await;

        let (status, _) = post::<MessageResponse>(
            &app,
            "/api/delete-account",
            json!({"username": "alice", "sessionToken": auth.session_token}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = post::<ErrorResponse>(
            &app,
            "/api/login",
            json!({"username": "alice", "password": "pass"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // The name is free again.
        signup(&app, "alice", "pass2").await;
    }
}
