use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, Uri};
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::data::{DatasetKind, DatasetLoader, FeatureService, FsStore};

pub mod api;
pub mod routes;
pub mod static_files;

/// Service backed by the configured data directory.
pub fn build_service(config: &ServerConfig) -> FeatureService {
    let store = FsStore::new(config.data_dir.clone());
    let loader = DatasetLoader::new(Arc::new(store)).with_fetch_timeout(config.fetch_timeout);
    FeatureService::new(loader)
}

/// Dataset paths go through [`routes::route_request`]; everything else is a static asset.
pub fn build_router(service: Arc<FeatureService>, static_dir: &Path) -> Router {
    DatasetKind::ALL
        .into_iter()
        .fold(Router::new(), |router, kind| {
            router.route(kind.path(), any(api_handler))
        })
        .fallback_service(static_files::static_service(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn api_handler(
    State(service): State<Arc<FeatureService>>,
    method: Method,
    uri: Uri,
) -> routes::HttpResponse {
    let target = uri
        .path_and_query()
        .map(|path_and_query| path_and_query.as_str())
        .unwrap_or_else(|| uri.path());
    routes::route_request(&service, method.as_str(), target).await
}

pub async fn run_server(config: &ServerConfig) -> std::io::Result<()> {
    let service = Arc::new(build_service(config));

    let keys = DatasetKind::ALL.map(DatasetKind::storage_key);
    service.loader().warm(&keys).await;

    let app = build_router(Arc::clone(&service), &config.static_dir);
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        data_dir = %config.data_dir.display(),
        static_dir = %config.static_dir.display(),
        "rail_timeline server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
