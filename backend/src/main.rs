//! Backend entry-point: validates the environment, connects the database and
//! broker, then serves the REST API until the process is signalled.

mod server;

use actix_web::web;
use serde_json::json;

use recipe_backend::config::ProcessEnv;
use recipe_backend::container::AppContext;
use recipe_backend::inbound::http::health::HealthState;
use recipe_backend::inbound::http::state::HttpState;
use recipe_backend::outbound::PostgresAmqpInfrastructure;

const DEFAULT_PORT: u16 = 3000;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let context = AppContext::new(ProcessEnv::new(), PostgresAmqpInfrastructure::new());
    let (config, logger) = context.init_configuration().await?;

    if let Err(e) = logger.install_tracing() {
        logger.warn("Tracing init failed", Some(&json!({ "error": e.to_string() })));
    }
    if config.validation_skipped() {
        logger.warn("Environment validation skipped", None);
    }

    let services = context.init_services().await?;

    let port = config.port_or(DEFAULT_PORT);
    let mode = config.execution_mode().unwrap_or_default();
    let health_state = web::Data::new(HealthState::new());
    let http_state = web::Data::new(HttpState::from(services.as_ref()));
    let server = server::create_server(health_state.clone(), http_state, port)?;

    logger.info(
        &format!("Server listening at http://localhost:{port} as {mode}"),
        Some(&json!({ "port": port, "mode": mode.as_str() })),
    );
    health_state.mark_ready();
    let served = server.await;

    health_state.mark_draining();
    context.shutdown().await;
    logger.info("Shutdown complete", None);
    served.map_err(Into::into)
}
