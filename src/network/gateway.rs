//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds the configured address and spawns a Connection task
//! for each incoming client.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info, instrument};

use super::connection::{Connection, ConnectionSettings};
use super::resolve::HostResolver;
use crate::config::Config;
use crate::handlers::Registry;
use crate::metrics;
use crate::state::Matrix;

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    matrix: Arc<Matrix>,
    registry: Arc<Registry>,
    settings: Arc<ConnectionSettings>,
    resolver: HostResolver,
}

impl Gateway {
    /// Bind the gateway to the configured listen address.
    pub async fn bind(config: &Config, matrix: Arc<Matrix>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(config.listen.address).await?;
        info!(address = %listener.local_addr()?, "Listener bound");

        Ok(Self {
            listener,
            matrix,
            registry: Arc::new(Registry::new()),
            settings: Arc::new(ConnectionSettings::from_config(config)),
            resolver: HostResolver::from_flag(config.server.resolve_hostnames),
        })
    }

    /// Run the gateway, accepting connections forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        error!(%addr, error = %e, "Failed to set TCP_NODELAY");
                    }
                    metrics::inc_counter(&metrics::CONNECTIONS_ACCEPTED);

                    let uid = self.matrix.uid_gen.next();
                    info!(%uid, %addr, "Connection accepted");

                    let connection = Connection::new(
                        uid,
                        stream,
                        addr,
                        Arc::clone(&self.matrix),
                        Arc::clone(&self.registry),
                        Arc::clone(&self.settings),
                        self.resolver.clone(),
                    );
                    tokio::spawn(connection.run());
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}
