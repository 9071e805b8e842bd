use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryChangeRequestRepository, LoggingNotifier};
use crate::routes::with_change_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tenant_changes::config::AppConfig;
use tenant_changes::error::AppError;
use tenant_changes::telemetry;
use tenant_changes::workflows::changes::ChangeRequestService;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(public_url) = args.public_url.take() {
        config.links.public_url = public_url;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryChangeRequestRepository::default());
    let notifier = Arc::new(LoggingNotifier);
    let change_service = Arc::new(ChangeRequestService::new(
        repository,
        notifier,
        config.links.public_url.clone(),
    ));

    let app = with_change_routes(change_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        public_url = %config.links.public_url,
        "tenant change request service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
