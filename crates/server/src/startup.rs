use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tracing::info;

use client::HttpDataApi;
use content::ContentStore;
use service::notify::LoggingMailer;

use crate::routes;
use crate::state::AppState;

/// Public entry: load config, build the app and run the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_default();

    let cfg = configs::AppConfig::load_and_validate()?;
    let content = ContentStore::load(&cfg.content.root)?;
    let api = HttpDataApi::new(&cfg.data_api)?;

    let state = AppState {
        api: Arc::new(api),
        content: Arc::new(content),
        mailer: Arc::new(LoggingMailer),
        session_secret: cfg.session.secret.clone(),
    };
    let app: Router = routes::build_router(state);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, data_api = %cfg.data_api.base_url, "starting admin frontend");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
