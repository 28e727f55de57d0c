use gofit::{
    build_router,
    token::repository::{InMemoryTokenRepository, PostgresTokenRepository},
    user::repository::{InMemoryUserRepository, PostgresUserRepository},
    workout::repository::{InMemoryWorkoutRepository, PostgresWorkoutRepository},
    AppState, Config,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn build_state(config: &Config) -> Result<AppState, Box<dyn std::error::Error>> {
    let database_url = match &config.database_url {
        Some(url) => url,
        None => {
            warn!("DATABASE_URL not set, using in-memory storage (data is lost on restart)");
            let tokens = Arc::new(InMemoryTokenRepository::new());
            return Ok(AppState::new(
                Arc::new(InMemoryUserRepository::new(tokens.clone())),
                tokens,
                Arc::new(InMemoryWorkoutRepository::new()),
                config.token_ttl,
            ));
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    info!("Database connection opened");

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrated");
    }

    Ok(AppState::new(
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(PostgresTokenRepository::new(pool.clone())),
        Arc::new(PostgresWorkoutRepository::new(pool)),
        config.token_ttl,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gofit=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().inspect_err(|e| error!(error = %e, "Invalid configuration"))?;

    info!("Starting workout tracking server");

    let app_state = build_state(&config)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to initialise storage"))?;
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Server running on http://{}", config.bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}
