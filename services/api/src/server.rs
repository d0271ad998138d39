use crate::cli::ServeArgs;
use crate::demo::seed_demo_tenant;
use crate::infra::{lifecycle_service, AppState, InMemoryLifecycleStore};
use crate::routes::with_lifecycle_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use eventflow::config::AppConfig;
use eventflow::error::AppError;
use eventflow::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = InMemoryLifecycleStore::default();
    if args.seed_demo {
        seed_demo_tenant(&store);
        info!("seeded demo tenant fixtures");
    }
    let service = lifecycle_service(&store);

    let app = with_lifecycle_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "lifecycle dashboard backend ready");

    axum::serve(listener, app).await?;
    Ok(())
}
