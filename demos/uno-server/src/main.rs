//! Runnable Cardforge server with the development authenticator.
//!
//! Binds on `0.0.0.0:8080` (override with `BIND_ADDR`) and trusts any
//! non-empty token as a player id — wire up a real [`Authenticator`]
//! before putting this anywhere near the internet.

use cardforge::{PassthroughAuth, ServerBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let server = ServerBuilder::new()
        .bind(&addr)
        .build(PassthroughAuth)
        .await?;

    tracing::info!(%addr, "uno server listening");
    server.run().await?;
    Ok(())
}
