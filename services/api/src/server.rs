use crate::cli::ServeArgs;
use crate::infra::{seeded_store, AppState};
use crate::routes::with_reading_routes;
use aquatac::config::AppConfig;
use aquatac::error::AppError;
use aquatac::monitoring::ReadingQueryService;
use aquatac::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
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
    if let Some(seed) = args.seed.take() {
        config.store.seed_path = Some(seed);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(seeded_store(config.store.seed_path.as_deref())?);
    let reading_service = Arc::new(ReadingQueryService::new(store));

    let app = with_reading_routes(reading_service, config.query.top_limit)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        top_limit = config.query.top_limit,
        "water-quality reading service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
