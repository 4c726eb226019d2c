use crate::cli::ServeArgs;
use crate::infra::{load_catalog, AppState, InMemoryApplicationRepository};
use crate::routes::with_lending_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use loan_desk::config::AppConfig;
use loan_desk::error::AppError;
use loan_desk::lending::{LoanApplicationService, ProductCatalog};
use loan_desk::telemetry;
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

    let approval_config = config.lending.approval_config()?;
    let catalog = load_catalog(&config.lending)?;
    let active_products = catalog
        .active_products()
        .map_err(|err| AppError::Lending(err.into()))?
        .len();
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let service = Arc::new(
        LoanApplicationService::new(repository, Arc::new(catalog), approval_config)
            .with_max_quote_term(config.lending.max_quote_term),
    );

    let app = with_lending_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        active_products,
        max_quote_term = config.lending.max_quote_term,
        "loan desk ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
