use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use mailbox_core::{DelayedAction, Identities, ListFilter, MailboxSnapshot, NewAction, Registration};

use crate::context::RequestContext;
use crate::error::AppError;
use crate::state::AppState;

/// Turn a JSON extraction failure into a 400 instead of axum's default 422.
fn bind<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::error!("invalid JSON payload, aborting request: {rejection}");
            Err(AppError::bad_request(rejection.body_text()))
        }
    }
}

// ---------------------------------------------------------------------------
// register
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterActionBody {
    /// Caller-side event tag; logged, never interpreted.
    #[serde(default, rename = "type")]
    pub event_type: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    pub action: NewAction,
}

/// POST /registerDelayedAction — queue an action for a user or device.
pub async fn register_action(
    State(app): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<RegisterActionBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Registration>), AppError> {
    let body = bind(payload)?;
    body.action.validate()?;

    let tenant_id = ctx.resolve_tenant(body.tenant_id.as_deref());
    let identities = Identities::new(body.uuid, body.device_id);
    let action_type = body.action.action_type.clone();
    let action_url = body.action.action_url.clone();

    let registration = app.mailbox.register(tenant_id, &identities, body.action)?;

    match (&registration.scope, &registration.id) {
        (Some(scope), Some(id)) => {
            let identity = match scope {
                mailbox_core::Scope::User => identities.user_id(),
                mailbox_core::Scope::Device => identities.device_id(),
            }
            .unwrap_or_default();
            tracing::info!(
                event_type = body.event_type.as_deref().unwrap_or_default(),
                "adding {} action for {identity} - {id} ({action_type} -> {action_url})",
                scope.as_str().to_uppercase(),
            );
        }
        _ => tracing::warn!("no uuid or deviceId supplied, nothing registered"),
    }

    Ok((StatusCode::CREATED, Json(registration)))
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

#[derive(Debug, Default, serde::Deserialize)]
pub struct ListQuery {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// GET /actions?type=user|device — diagnostic dump of pending actions.
pub async fn list_actions(
    State(app): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<MailboxSnapshot> {
    let filter = query
        .kind
        .as_deref()
        .and_then(|k| k.parse::<ListFilter>().ok())
        .unwrap_or_default();
    Json(app.mailbox.list(filter))
}

// ---------------------------------------------------------------------------
// query (consume)
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryActionsBody {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub app_version: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

/// Matched actions; an empty match is reported as 404.
#[derive(Debug)]
pub struct Consumed(pub Vec<DelayedAction>);

impl IntoResponse for Consumed {
    fn into_response(self) -> Response {
        let status = if self.0.is_empty() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::OK
        };
        (status, Json(serde_json::json!({ "actions": self.0 }))).into_response()
    }
}

/// POST /queryDelayedActions — hand out (and forget) every action the
/// caller's app version qualifies for.
pub async fn query_actions(
    State(app): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<QueryActionsBody>, JsonRejection>,
) -> Result<Consumed, AppError> {
    let body = bind(payload)?;
    let app_version = body
        .app_version
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request("missing required field: appVersion"))?;

    let tenant_id = ctx.resolve_tenant(body.tenant_id.as_deref());
    let identities = Identities::new(body.uuid, body.device_id);
    let matched = app
        .mailbox
        .consume_matching(tenant_id, &identities, &app_version);

    tracing::info!(
        user = identities.user_id().unwrap_or_default(),
        device = identities.device_id().unwrap_or_default(),
        app_version = %app_version,
        "delivering {} delayed action(s)",
        matched.len()
    );
    Ok(Consumed(matched))
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

/// DELETE /delayedActions/:id — not supported.
pub async fn delete_action(Path(id): Path<String>) -> Result<StatusCode, AppError> {
    Err(AppError::not_implemented(format!(
        "deleting delayed action '{id}' is not implemented"
    )))
}
