use migration::{Migrator, MigratorTrait};
use sea_orm::ConnectOptions;
use settings::Database;

mod settings;

const DEFAULT_POSTGRES_CONNECTIONS: u32 = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ninco={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let Some(server) = settings.server else {
        tracing::warn!("no server settings found, nothing to run");
        return Ok(());
    };

    tracing::info!("Found server settings...");
    let db = parse_database(&server.database, server.database_max_connections).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    let bind = server.bind.as_deref().unwrap_or("127.0.0.1");
    let addr = format!("{bind}:{}", server.port).parse()?;
    let state = server::ServerState::new(engine, server::JwtVerifier::new(&server.jwt_secret));
    server::run(state, addr).await?;

    Ok(())
}

async fn parse_database(
    config: &Database,
    max_connections: Option<u32>,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    // Every in-memory SQLite connection is its own database.
    let (url, pool) = match config {
        Database::Memory => (String::from("sqlite::memory:"), 1),
        Database::Sqlite(path) => (
            format!("sqlite:{path}?mode=rwc"),
            max_connections.unwrap_or(1),
        ),
        Database::Postgres(url) => (
            url.clone(),
            max_connections.unwrap_or(DEFAULT_POSTGRES_CONNECTIONS),
        ),
    };

    let mut options = ConnectOptions::new(url);
    options.max_connections(pool);
    let database = sea_orm::Database::connect(options).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
