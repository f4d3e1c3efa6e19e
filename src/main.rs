use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;

use medimate_backend::config::settings::{get_config, get_jwt_settings};
use medimate_backend::services::llm::build_client;
use medimate_backend::telemetry::{get_subscriber, init_subscriber};
use medimate_backend::{run, AppServices, Repositories};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Panic if we can't read the config
    let config = get_config().expect("Failed to read the config.");

    let subscriber = get_subscriber(
        "medimate-backend".into(),
        config.application.log_level.clone(),
        std::io::stdout,
    );
    init_subscriber(subscriber);

    let jwt_settings = Arc::new(get_jwt_settings(&config));

    // Only try to establish connection when actually used
    let connection_pool = PgPoolOptions::new()
        .max_connections(16)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect_lazy(config.database.connection_string().expose_secret())
        .expect("Failed to create Postgres connection pool");

    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");

    let llm = build_client(&config.llm).expect("Failed to build the LLM client");
    let services = AppServices::new(
        Repositories::postgres(connection_pool),
        llm,
        jwt_settings,
        &config,
    )
    .expect("Failed to initialise services");

    let address = format!("{}:{}", config.application.host, config.application.port);
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Listening on {}", address);

    run(listener, services, config.application.allowed_origins.clone())?.await
}
