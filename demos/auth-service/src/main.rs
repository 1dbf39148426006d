//! Warden as a standalone service: in-memory store, Argon2 hashing,
//! configuration from the environment.

mod config;

use tracing_subscriber::EnvFilter;
use warden::prelude::*;

use crate::config::ServiceConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServiceConfig::from_env()?;
    tracing::info!(
        port = config.port,
        session_lifetime_secs = config.session.lifetime_secs,
        "starting auth service"
    );

    let server = WardenServer::builder()
        .bind(&config.bind_addr())
        .service_key(config.service_key)
        .session_config(config.session)
        .build(MemoryStore::new(), Argon2Verifier::default())
        .await?;

    server.run().await?;
    Ok(())
}
