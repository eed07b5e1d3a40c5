//! Entry point: load config, load the user store, and run the server.

use authstore::config::Config;
use authstore::{create_app, AppState, JwtSecret, UserStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.has_weak_secret() {
        tracing::warn!(
            min_len = authstore::config::MIN_JWT_SECRET_LEN,
            "JWT_SECRET is shorter than recommended"
        );
    }

    let store = UserStore::load(&config.users_file)
        .await
        .map_err(|e| anyhow::anyhow!("user store: {}", e))?;
    let jwt_secret = JwtSecret::new(config.jwt_secret.clone(), config.jwt_ttl_minutes);

    let app = create_app(AppState::new(store, jwt_secret));

    tracing::info!(addr = %config.server_addr, users_file = %config.users_file.display(), "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
