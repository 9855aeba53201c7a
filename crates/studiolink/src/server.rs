//! `StudioServer` builder and accept loop.
//!
//! This is the entry point for running a Studiolink coordinator. It ties
//! together all the layers: transport → protocol → gate → router.

use std::sync::Arc;

use studiolink_auth::{GateConfig, IdentityGate, IdentityProvider};
use studiolink_protocol::{Codec, JsonCodec};
use studiolink_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::router::RouterHandle;
use crate::StudiolinkError;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. No
/// interior mutability: room state lives behind the router's channel,
/// and the gate and codec are read-only.
pub(crate) struct ServerState<P, C> {
    pub(crate) gate: IdentityGate<P>,
    pub(crate) codec: C,
    pub(crate) router: RouterHandle,
}

/// Builder for configuring and starting a Studiolink server.
///
/// # Example
///
/// ```rust,ignore
/// use studiolink::prelude::*;
///
/// let server = StudioServer::builder()
///     .bind("0.0.0.0:8080")
///     .gate_config(GateConfig::from_env())
///     .build(my_provider)
///     .await?;
/// server.run().await
/// ```
pub struct StudioServerBuilder {
    bind_addr: String,
    gate_config: GateConfig,
}

impl StudioServerBuilder {
    /// Creates a new builder with default settings: local bind address
    /// and the verified identity mode.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            gate_config: GateConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the identity gate configuration.
    pub fn gate_config(mut self, config: GateConfig) -> Self {
        self.gate_config = config;
        self
    }

    /// Builds and starts the server with the given identity provider.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`; the presence router
    /// task is spawned here.
    pub async fn build<P: IdentityProvider>(
        self,
        provider: P,
    ) -> Result<StudioServer<P, JsonCodec>, StudiolinkError> {
        let transport =
            WebSocketTransport::bind(&self.bind_addr).await?;

        let gate = IdentityGate::new(self.gate_config, provider);
        tracing::info!(mode = gate.mode().as_str(), "identity gate ready");

        let state = Arc::new(ServerState {
            gate,
            codec: JsonCodec,
            router: RouterHandle::spawn(),
        });

        Ok(StudioServer { transport, state })
    }
}

impl Default for StudioServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Studiolink coordinator.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct StudioServer<P, C> {
    transport: WebSocketTransport,
    state: Arc<ServerState<P, C>>,
}

impl<P, C> StudioServer<P, C>
where
    P: IdentityProvider,
    C: Codec + Clone + 'static,
{
    /// Creates a new builder.
    pub fn builder() -> StudioServerBuilder {
        StudioServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns a handle to the presence router, for roster queries from
    /// outside the connection path.
    pub fn router(&self) -> RouterHandle {
        self.state.router.clone()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), StudiolinkError> {
        tracing::info!("Studiolink server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, state).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
