use mindwell::api::routes::create_routes;
use mindwell::api::AppState;
use mindwell::config::{AppConfig, DatabaseConfig, SmtpConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mindwell=debug,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = AppConfig::from_env()?;
    let db_config = DatabaseConfig::from_env()?;
    let smtp_config = SmtpConfig::from_env()?;

    let db = db_config.create_pool().await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let address = config.server_address();
    let state = AppState::new(db, config, smtp_config);
    let app = create_routes(state);

    let listener = TcpListener::bind(&address).await?;
    info!("MindWell server listening on http://{}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
