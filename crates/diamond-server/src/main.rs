//! Main entry point for the Diamond workflow server.

use std::sync::Arc;

use tracing::info;

use diamond_server::model::{AppState, Configuration};
use diamond_server::startup;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let configuration = Configuration::new();

    // USE_TZ=false semantics: pin the process clock to the configured
    // zone so naive local timestamps are consistent everywhere.
    unsafe {
        std::env::set_var("TZ", configuration.time_zone());
    }

    let _logging_guard = startup::init_logging(&configuration);

    info!(
        environment = %configuration.environment(),
        time_zone = %configuration.time_zone(),
        driver = %configuration.db_driver(),
        "starting diamond server"
    );

    let db = configuration.database_connection().await?;
    if configuration.db_bootstrap() {
        diamond_persistence::create_schema(&db).await?;
        info!("database schema ensured");
    }

    let address = configuration.server_address();
    let port = configuration.server_port();
    let context_path = configuration.context_path();

    let app_state = Arc::new(AppState::new(configuration, db));

    info!(address = %address, port, context_path = %context_path, "binding HTTP server");
    startup::http_server(app_state, context_path, address, port)?.await?;

    Ok(())
}
