use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use pizzeria::input::StdinSource;
use pizzeria::session::SessionController;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting pizzeria order management service");

    // Initialize database connection pool
    let db_config = common::database::DatabaseConfig::from_env()?;
    let pool = common::database::init_pool(&db_config).await?;

    // Check database connectivity; startup is the only place a store
    // failure terminates the process
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    common::database::run_migrations(&pool, &sqlx::migrate!("./migrations")).await?;

    info!("Pizzeria service initialized successfully");

    let mut session = SessionController::new(pool, StdinSource::new());
    session.run().await?;

    println!("Bye!");
    Ok(())
}
