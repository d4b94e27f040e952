use crate::cli::ServeArgs;
use crate::infra::{load_data, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use civi::case_studies::CaseStudyIndex;
use civi::config::AppConfig;
use civi::error::AppError;
use civi::vitals::VitalsService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut config: AppConfig, mut args: ServeArgs) -> Result<(), AppError> {
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let data = load_data(&config.data.root)?;
    let vitals = Arc::new(VitalsService::new(
        Arc::new(data.store),
        config.analysis.default_timeframe,
    ));
    let case_studies: Arc<CaseStudyIndex> = Arc::new(data.case_studies);

    let app = with_service_routes(vitals, case_studies)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        data_dir = %config.data.root.display(),
        "vitals index service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
