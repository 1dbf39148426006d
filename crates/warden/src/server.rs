//! `WardenServer` builder and server loop.
//!
//! This is the entry point for running Warden. It ties the layers
//! together: HTTP gateway → protocol → authorization → session / store.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use warden_protocol::{Codec, JsonCodec};
use warden_session::{
    Clock, CredentialVerifier, SessionConfig, SessionRegistry, SystemClock,
};
use warden_store::CapabilityStore;

use crate::WardenError;
use crate::handler;

/// Header every caller must send, carrying the shared service key.
pub const SERVICE_KEY_HEADER: &str = "HARMONY_MICRO_SERVICES";

/// Shared server state passed to each request handler.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// registry does its own locking; store and verifier are `Sync`.
pub(crate) struct ServerState<S, V, C> {
    pub(crate) registry: SessionRegistry,
    pub(crate) store: S,
    pub(crate) verifier: V,
    pub(crate) codec: C,
    service_key: String,
}

/// Builder for configuring and starting a Warden server.
///
/// # Example
///
/// ```rust,ignore
/// use warden::prelude::*;
///
/// let server = WardenServer::builder()
///     .bind("0.0.0.0:8080")
///     .service_key(key)
///     .session_config(SessionConfig { lifetime_secs: 600 })
///     .build(MemoryStore::new(), Argon2Verifier::default())
///     .await?;
/// server.run().await
/// ```
pub struct WardenServerBuilder {
    bind_addr: String,
    service_key: String,
    session_config: SessionConfig,
    clock: Arc<dyn Clock>,
}

impl WardenServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            service_key: String::new(),
            session_config: SessionConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the key callers must present in [`SERVICE_KEY_HEADER`].
    ///
    /// An empty key rejects every request.
    pub fn service_key(mut self, key: impl Into<String>) -> Self {
        self.service_key = key.into();
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Replaces the wall clock the session registry reads.
    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Binds the listener and assembles the server around `store` and
    /// `verifier`.
    ///
    /// Uses `JsonCodec` for request bodies.
    ///
    /// # Errors
    /// [`WardenError::Bind`] if the address can't be bound.
    pub async fn build<S, V>(
        self,
        store: S,
        verifier: V,
    ) -> Result<WardenServer<S, V, JsonCodec>, WardenError>
    where
        S: CapabilityStore,
        V: CredentialVerifier,
    {
        let listener = TcpListener::bind(&self.bind_addr).await.map_err(
            |source| WardenError::Bind {
                addr: self.bind_addr.clone(),
                source,
            },
        )?;

        let state = Arc::new(ServerState {
            registry: SessionRegistry::with_clock(
                self.session_config,
                self.clock,
            ),
            store,
            verifier,
            codec: JsonCodec,
            service_key: self.service_key,
        });

        Ok(WardenServer { listener, state })
    }
}

impl Default for WardenServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Warden server.
///
/// Call [`run()`](Self::run) to start serving, or [`router()`](Self::router)
/// to drive the routes directly.
pub struct WardenServer<S, V, C> {
    listener: TcpListener,
    state: Arc<ServerState<S, V, C>>,
}

impl WardenServer<(), (), ()> {
    /// Creates a new builder.
    pub fn builder() -> WardenServerBuilder {
        WardenServerBuilder::new()
    }
}

impl<S, V, C> WardenServer<S, V, C>
where
    S: CapabilityStore,
    V: CredentialVerifier,
    C: Codec,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The full route table with the service-key gate, CORS, and request
    /// tracing applied.
    pub fn router(&self) -> Router {
        let state = Arc::clone(&self.state);

        Router::new()
            .route("/status", get(handler::status))
            .route("/sessions", get(handler::sessions::<S, V, C>))
            .route("/roles", get(handler::roles::<S, V, C>))
            .route("/roles/{email}", get(handler::user_role::<S, V, C>))
            .route(
                "/has-role/{role}/{email}",
                get(handler::has_role::<S, V, C>),
            )
            .route("/users", get(handler::users::<S, V, C>))
            .route("/login", post(handler::login::<S, V, C>))
            .route("/create-user", post(handler::create_user::<S, V, C>))
            .route(
                "/validate-session",
                post(handler::validate_session::<S, V, C>),
            )
            .route("/add-role", post(handler::add_role::<S, V, C>))
            .route("/config-role", post(handler::config_role::<S, V, C>))
            .route("/set-role", post(handler::set_role::<S, V, C>))
            .layer(middleware::from_fn_with_state(
                Arc::clone(&state),
                require_service_key::<S, V, C>,
            ))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Serves requests until the process is terminated.
    pub async fn run(self) -> Result<(), WardenError> {
        let router = self.router();
        match self.listener.local_addr() {
            Ok(addr) => tracing::info!(%addr, "Warden server running"),
            Err(_) => tracing::info!("Warden server running"),
        }

        axum::serve(self.listener, router)
            .await
            .map_err(WardenError::Serve)
    }
}

/// Rejects any request whose [`SERVICE_KEY_HEADER`] is missing or does
/// not equal the configured key. The rejection has an empty body.
async fn require_service_key<S, V, C>(
    State(state): State<Arc<ServerState<S, V, C>>>,
    request: Request,
    next: Next,
) -> Response
where
    S: CapabilityStore,
    V: CredentialVerifier,
    C: Codec,
{
    let authorized = !state.service_key.is_empty()
        && request
            .headers()
            .get(SERVICE_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|key| key == state.service_key);

    if authorized {
        return next.run(request).await;
    }

    tracing::error!(
        method = %request.method(),
        path = %request.uri().path(),
        "rejected request without a valid service key"
    );
    StatusCode::FORBIDDEN.into_response()
}
