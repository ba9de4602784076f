//! Loopback callback server for the MusicKit consent flow
//!
//! Hosts exactly two routes for the duration of one authorization
//! attempt: `GET /login` serves the consent page with a freshly minted
//! developer token substituted in, and `POST /callback` persists the
//! Music user token the page delivers. The listener binds loopback only,
//! so the unauthenticated callback route is not reachable off-machine.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use tracing::{info, warn};

use crate::credentials::DeveloperCredentials;
use crate::developer_token;
use crate::error::{Error, Result};
use crate::store::TokenStore;

/// Placeholder in the consent page replaced with the developer token.
pub const TOKEN_PLACEHOLDER: &str = "{{DEVELOPER_TOKEN}}";

/// Consent page template, loaded once per authorization attempt.
///
/// A missing or unreadable template is fatal for the attempt, so it is
/// loaded before the listener starts rather than per request.
#[derive(Debug, Clone)]
pub struct ConsentPage {
    template: String,
}

impl ConsentPage {
    /// Load the template from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let template = std::fs::read_to_string(path)
            .map_err(|e| Error::PageTemplateMissing(format!("{}: {e}", path.display())))?;
        Self::from_template(template)
    }

    /// Build from an in-memory template. Must contain [`TOKEN_PLACEHOLDER`].
    pub fn from_template(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(TOKEN_PLACEHOLDER) {
            return Err(Error::PageTemplateMissing(format!(
                "template has no {TOKEN_PLACEHOLDER} placeholder"
            )));
        }
        Ok(Self { template })
    }

    fn render(&self, developer_token: &str) -> String {
        self.template.replace(TOKEN_PLACEHOLDER, developer_token)
    }
}

/// Shared state for the two callback routes.
#[derive(Clone)]
struct ServerState {
    credentials: Arc<DeveloperCredentials>,
    store: Arc<TokenStore>,
    page: Arc<ConsentPage>,
}

/// Build the two-route callback router for one authorization attempt.
pub fn build_router(
    credentials: Arc<DeveloperCredentials>,
    store: Arc<TokenStore>,
    page: ConsentPage,
) -> Router {
    let state = ServerState {
        credentials,
        store,
        page: Arc::new(page),
    };
    Router::new()
        .route("/login", get(login))
        .route("/callback", post(callback))
        .with_state(state)
}

/// GET /login — the consent page with a fresh developer token embedded.
async fn login(State(state): State<ServerState>) -> Response {
    match developer_token::sign(&state.credentials) {
        Ok(token) => Html(state.page.render(&token)).into_response(),
        Err(e) => {
            warn!(error = %e, "developer token signing failed while serving consent page");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallbackPayload {
    token: String,
}

/// POST /callback — persist the Music user token delivered by the page.
///
/// A malformed body is rejected by the `Json` extractor with a client
/// error before this handler runs. A persistence failure is reported as
/// a 500 so the page never claims success for a token that was not
/// actually stored.
async fn callback(
    State(state): State<ServerState>,
    Json(payload): Json<CallbackPayload>,
) -> Response {
    if payload.token.trim().is_empty() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "token must be a non-empty string",
        );
    }

    match state.store.write(&payload.token).await {
        Ok(()) => {
            info!("user token received and persisted");
            (
                StatusCode::OK,
                [(CONTENT_TYPE, "application/json")],
                r#"{"status":"ok"}"#,
            )
                .into_response()
        }
        Err(e) => {
            warn!(error = %e, "failed to persist user token from callback");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        [(CONTENT_TYPE, "application/json")],
        serde_json::json!({ "status": "error", "message": message }).to_string(),
    )
        .into_response()
}
