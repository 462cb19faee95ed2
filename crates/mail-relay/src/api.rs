use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use investor_tracker_core::mail::templates::{EmailKind, EmailRequest};
use serde_json::Value;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::{RelayError, RelayResponse, RelayResult};
use crate::main_lib::AppState;

/// Health probe; also names the active mail provider.
async fn health(State(state): State<Arc<AppState>>) -> Json<RelayResponse> {
    Json(RelayResponse::ok(format!(
        "Mail relay is running ({})",
        state.mailer.name()
    )))
}

/// Resolve the route to an email kind, validate the body, render the email
/// and hand it to the provider.
async fn send_email(
    State(state): State<Arc<AppState>>,
    Path(route): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> RelayResult<Json<RelayResponse>> {
    let kind = EmailKind::from_route(&route)
        .ok_or_else(|| RelayError::UnknownRoute(format!("No email is sent from /api/{route}")))?;
    let Json(body) = body.map_err(|e| RelayError::BadRequest(format!("Invalid JSON body: {}", e.body_text())))?;
    let Value::Object(fields) = body else {
        return Err(RelayError::BadRequest("Request body must be a JSON object".into()));
    };

    let email = EmailRequest::new(kind, fields).render().map_err(|e| {
        tracing::warn!(route = kind.route(), "Rejected email request: {e}");
        RelayError::from(e)
    })?;

    state.mailer.send(&email).await.map_err(|e| {
        tracing::error!(route = kind.route(), provider = state.mailer.name(), "Email delivery failed: {e}");
        RelayError::from(e)
    })?;

    tracing::info!(route = kind.route(), "{kind} email sent");
    Ok(Json(RelayResponse::ok(format!("{kind} email sent successfully"))))
}

pub fn app_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/{route}", post(send_email));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
