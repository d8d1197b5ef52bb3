//! Server builder and accept loop.
//!
//! Ties the layers together: transport → protocol → sessions → rooms. The
//! registry and session manager are owned here — created at startup, gone
//! at shutdown — and handed to each connection handler behind an `Arc`.

use std::sync::Arc;

use cardforge_protocol::{Codec, JsonCodec};
use cardforge_room::{GameConfig, RoomRegistry};
use cardforge_session::{Authenticator, SessionConfig, SessionManager};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::ws::WsListener;
use crate::{GatewayError, MatchStore, NoopStore};

/// The current protocol version. A `hello` carrying anything else is
/// rejected.
pub const PROTOCOL_VERSION: u32 = 1;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<A, C, S> {
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) registry: Mutex<RoomRegistry>,
    pub(crate) auth: A,
    pub(crate) codec: C,
    pub(crate) store: S,
}

/// Builder for configuring and starting a Cardforge server.
pub struct ServerBuilder {
    bind_addr: String,
    session_config: SessionConfig,
    game_config: GameConfig,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            session_config: SessionConfig::default(),
            game_config: GameConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets the per-room game configuration.
    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    /// Builds the server with the given authenticator and no durable
    /// store. Uses `JsonCodec`.
    pub async fn build<A: Authenticator>(
        self,
        auth: A,
    ) -> Result<Server<A, JsonCodec, NoopStore>, GatewayError> {
        self.build_with_store(auth, NoopStore).await
    }

    /// Builds the server with the given authenticator and durable-store
    /// boundary.
    pub async fn build_with_store<A: Authenticator, S: MatchStore>(
        self,
        auth: A,
        store: S,
    ) -> Result<Server<A, JsonCodec, S>, GatewayError> {
        let listener = WsListener::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionManager::new(self.session_config)),
            registry: Mutex::new(RoomRegistry::new(self.game_config)),
            auth,
            codec: JsonCodec,
            store,
        });

        Ok(Server { listener, state })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Cardforge server. Call [`run`](Self::run) to start accepting
/// connections.
pub struct Server<A, C, S> {
    listener: WsListener,
    state: Arc<ServerState<A, C, S>>,
}

impl<A, C, S> Server<A, C, S>
where
    A: Authenticator,
    C: Codec,
    S: MatchStore,
{
    /// Creates a new builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop: one handler task per connection, until the
    /// process terminates.
    pub async fn run(mut self) -> Result<(), GatewayError> {
        tracing::info!("Cardforge server running");

        loop {
            match self.listener.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
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
