use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use mailbox_core::config::ServiceConfig;
use tracing::Instrument;

use crate::state::AppState;

/// Tenant and correlation identifiers for a single request.
///
/// Built once per request by [`request_context`] and handed to handlers as a
/// request extension, so concurrent requests never see each other's ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub tenant_id: String,
    pub correlation_id: String,
    /// True when `tenant_id` came from the configured fallback.
    pub default_tenant: bool,
    /// True when `correlation_id` was generated here.
    pub generated_correlation: bool,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap, config: &ServiceConfig) -> Self {
        let (tenant_id, default_tenant) = match header_str(headers, &config.tenant_header) {
            Some(t) => (t.to_string(), false),
            None => (config.default_tenant.clone(), true),
        };
        let (correlation_id, generated_correlation) =
            match header_str(headers, &config.correlation_header) {
                Some(c) => (c.to_string(), false),
                None => (uuid::Uuid::new_v4().to_string(), true),
            };
        Self {
            tenant_id,
            correlation_id,
            default_tenant,
            generated_correlation,
        }
    }

    /// Tenant to use for a request body that may name its own tenant.
    pub fn tenant_for<'a>(&'a self, body_tenant: Option<&'a str>) -> &'a str {
        body_tenant
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.tenant_id)
    }

    /// True when neither the body nor the headers named a tenant.
    pub fn falls_back_to_default(&self, body_tenant: Option<&str>) -> bool {
        self.default_tenant && body_tenant.map_or(true, str::is_empty)
    }

    /// Like [`tenant_for`](Self::tenant_for), and records the chosen tenant
    /// on the current request span.
    pub fn resolve_tenant<'a>(&'a self, body_tenant: Option<&'a str>) -> &'a str {
        let tenant_id = self.tenant_for(body_tenant);
        tracing::Span::current().record("tenant_id", tenant_id);
        if self.falls_back_to_default(body_tenant) {
            tracing::warn!("no tenant id specified, defaulting to '{tenant_id}'");
        }
        tenant_id
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Axum middleware that resolves the [`RequestContext`], runs the rest of
/// the request inside a span carrying its correlation id, and echoes that
/// id on the response.
pub async fn request_context(State(app): State<AppState>, mut req: Request, next: Next) -> Response {
    let ctx = RequestContext::from_headers(req.headers(), &app.config);
    // Handlers that act on a tenant fill `tenant_id` via `resolve_tenant`.
    let span = tracing::info_span!(
        "request",
        tenant_id = tracing::field::Empty,
        correlation_id = %ctx.correlation_id,
    );

    if ctx.generated_correlation {
        span.in_scope(|| tracing::trace!("no correlation id detected, generated one"));
    }

    let correlation = HeaderValue::from_str(&ctx.correlation_id).ok();
    req.extensions_mut().insert(ctx);
    let mut response = next.run(req).instrument(span).await;

    if let (Ok(name), Some(value)) = (
        HeaderName::from_bytes(app.config.correlation_header.as_bytes()),
        correlation,
    ) {
        response.headers_mut().insert(name, value);
    }
    response
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::{body::Body, http::Request, middleware, routing::get, Extension, Router};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn echo(Extension(ctx): Extension<RequestContext>) -> String {
        format!("{}|{}", ctx.tenant_id, ctx.correlation_id)
    }

    fn test_app() -> Router {
        let state = AppState::new(ServiceConfig::default());
        Router::new()
            .route("/", get(echo))
            .layer(middleware::from_fn_with_state(state, request_context))
    }

    async fn body_text(resp: Response) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn headers_are_used_when_present() {
        let resp = test_app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("X-MTT-Tenant-ID", "acme")
                    .header("X-MTT-Correlation-ID", "corr-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["x-mtt-correlation-id"], "corr-1");
        assert_eq!(body_text(resp).await, "acme|corr-1");
    }

    #[tokio::test]
    async fn missing_headers_fall_back() {
        let resp = test_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let echoed = resp.headers()["x-mtt-correlation-id"]
            .to_str()
            .unwrap()
            .to_string();
        assert!(uuid::Uuid::parse_str(&echoed).is_ok());
        assert_eq!(body_text(resp).await, format!("tripassist|{echoed}"));
    }

    #[tokio::test]
    async fn each_request_gets_its_own_correlation_id() {
        let app = test_app();
        let a = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let b = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_ne!(
            a.headers()["x-mtt-correlation-id"],
            b.headers()["x-mtt-correlation-id"]
        );
    }

    #[test]
    fn empty_header_counts_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert("x-mtt-tenant-id", HeaderValue::from_static(""));
        let ctx = RequestContext::from_headers(&headers, &ServiceConfig::default());
        assert_eq!(ctx.tenant_id, "tripassist");
        assert!(ctx.default_tenant);
        assert!(ctx.generated_correlation);
    }

    #[test]
    fn body_tenant_overrides_header_tenant() {
        let ctx = RequestContext::from_headers(&HeaderMap::new(), &ServiceConfig::default());
        assert_eq!(ctx.tenant_for(Some("acme")), "acme");
        assert_eq!(ctx.tenant_for(Some("")), "tripassist");
        assert_eq!(ctx.tenant_for(None), "tripassist");
    }

    #[test]
    fn default_fallback_only_when_no_tenant_anywhere() {
        let defaulted = RequestContext::from_headers(&HeaderMap::new(), &ServiceConfig::default());
        assert!(defaulted.falls_back_to_default(None));
        assert!(defaulted.falls_back_to_default(Some("")));
        assert!(!defaulted.falls_back_to_default(Some("acme")));
        assert_eq!(defaulted.resolve_tenant(Some("acme")), "acme");

        let mut headers = HeaderMap::new();
        headers.insert("x-mtt-tenant-id", HeaderValue::from_static("t1"));
        let from_header = RequestContext::from_headers(&headers, &ServiceConfig::default());
        assert!(!from_header.falls_back_to_default(None));
        assert_eq!(from_header.resolve_tenant(None), "t1");
    }
}
