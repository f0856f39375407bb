pub mod models;
pub mod queries;

use anyhow::{Context, Result};
use mongodb::{Client, bson::doc, error::ErrorKind, options::ClientOptions};

use crate::config::AppConfig;
use crate::store::StoreError;

/// Create the process-wide MongoDB client.
///
/// The client owns the connection pool. An unreachable server is logged but
/// does not abort startup: the pool keeps retrying and requests made in the
/// meantime fail with a connection error.
pub async fn connect(config: &AppConfig) -> Result<Client> {
    let mut options = ClientOptions::parse(&config.mongodb_uri)
        .await
        .context("Invalid MONGODB_URLSTRING")?;
    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
    options.max_pool_size = Some(config.max_pool_size);
    options.server_selection_timeout = Some(config.server_selection_timeout);

    let client = Client::with_options(options).context("Failed to create MongoDB client")?;

    // Ping to verify connection
    match client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
    {
        Ok(_) => tracing::info!("Successfully connected to MongoDB"),
        Err(e) => tracing::error!("Failed to connect to MongoDB: {}", e),
    }

    Ok(client)
}

/// Close every pooled connection. Best effort; never fails.
pub async fn disconnect(client: Client) {
    client.shutdown().await;
    tracing::info!("Disconnected from MongoDB");
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. }
            | ErrorKind::Authentication { .. }
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::ConnectionPoolCleared { .. }
            | ErrorKind::Io(_) => StoreError::Connection(err.to_string()),
            _ => StoreError::Operation(err.to_string()),
        }
    }
}
