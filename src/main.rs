use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use gazette::config::Config;
use gazette::{App, Error, Server, SqliteStore, routes};

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let store = SqliteStore::connect(&config.database_url).await?;
    info!(database = %config.database_url, "store ready");

    let app = App::new(Arc::new(store), config.patch_merges_content);
    Server::bind(config.listen_addr).serve(routes(app)).await
}
