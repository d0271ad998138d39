use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use tracing::debug;

use crate::infra::{AppState, GuardRejection, TenantContext};
use eventflow::lifecycle::{
    AuditStore, EmailLogStore, LifecycleError, LifecycleService, ProposalStore, SubjectId,
    SubjectKind, SubjectStore,
};

/// Router exposing the manager lifecycle endpoints plus the operational
/// health/readiness/metrics routes.
pub(crate) fn with_lifecycle_routes<S, P, A, E>(
    service: Arc<LifecycleService<S, P, A, E>>,
) -> Router
where
    S: SubjectStore + 'static,
    P: ProposalStore + 'static,
    A: AuditStore + 'static,
    E: EmailLogStore + 'static,
{
    lifecycle_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) fn lifecycle_router<S, P, A, E>(service: Arc<LifecycleService<S, P, A, E>>) -> Router
where
    S: SubjectStore + 'static,
    P: ProposalStore + 'static,
    A: AuditStore + 'static,
    E: EmailLogStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/manager/events/:subject_id/lifecycle",
            get(event_lifecycle_handler::<S, P, A, E>),
        )
        .route(
            "/api/v1/manager/companies/:subject_id/lifecycle",
            get(company_lifecycle_handler::<S, P, A, E>),
        )
        .with_state(service)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn event_lifecycle_handler<S, P, A, E>(
    State(service): State<Arc<LifecycleService<S, P, A, E>>>,
    Path(subject_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: SubjectStore + 'static,
    P: ProposalStore + 'static,
    A: AuditStore + 'static,
    E: EmailLogStore + 'static,
{
    lifecycle_response(service, SubjectKind::Event, &subject_id, &headers).await
}

pub(crate) async fn company_lifecycle_handler<S, P, A, E>(
    State(service): State<Arc<LifecycleService<S, P, A, E>>>,
    Path(subject_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: SubjectStore + 'static,
    P: ProposalStore + 'static,
    A: AuditStore + 'static,
    E: EmailLogStore + 'static,
{
    lifecycle_response(service, SubjectKind::Company, &subject_id, &headers).await
}

async fn lifecycle_response<S, P, A, E>(
    service: Arc<LifecycleService<S, P, A, E>>,
    kind: SubjectKind,
    raw_subject_id: &str,
    headers: &HeaderMap,
) -> Response
where
    S: SubjectStore + 'static,
    P: ProposalStore + 'static,
    A: AuditStore + 'static,
    E: EmailLogStore + 'static,
{
    let context = match TenantContext::from_headers(headers) {
        Ok(context) => context,
        Err(GuardRejection::MissingTenant) => {
            let payload = json!({ "error": "tenant context missing" });
            return (StatusCode::UNAUTHORIZED, Json(payload)).into_response();
        }
        Err(GuardRejection::ForbiddenRole) => {
            let payload = json!({ "error": "manager role required" });
            return (StatusCode::FORBIDDEN, Json(payload)).into_response();
        }
    };

    debug!(
        role = %context.role,
        kind = kind.label(),
        "manager lifecycle request authorized"
    );

    let subject_id = match SubjectId::parse(raw_subject_id) {
        Ok(id) => id,
        Err(err) => {
            return LifecycleError::InvalidArgument(err.to_string()).into_response();
        }
    };

    match service.aggregate(&context.tenant_id, kind, &subject_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => err.into_response(),
    }
}
