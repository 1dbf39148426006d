//! Request handlers, one per route.
//!
//! Each handler decodes its body through the server's codec, does its
//! work against the registry and store, and answers with an
//! [`Envelope`] encoded by that same codec. Errors are returned as [`WardenError`] and rendered by
//! its `IntoResponse` impl. Password hashing runs on the blocking pool.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use warden_protocol::{
    AddRoleRequest, AddUserRequest, Codec, ConfigRoleRequest, Envelope,
    Logged, LoginRequest, LoginResponse, UpdateUserRoleRequest, User,
};
use warden_session::{CredentialVerifier, Session};
use warden_store::CapabilityStore;

use crate::server::ServerState;
use crate::{ADMIN_ROLE, AccessError, Gatekeeper, WardenError};

type Shared<S, V, C> = State<Arc<ServerState<S, V, C>>>;
type Reply = Result<Response, WardenError>;

/// Encodes `envelope` with the server's codec into a 200 response.
fn respond<C: Codec, T: Serialize>(
    codec: &C,
    envelope: Envelope<T>,
) -> Reply {
    let body = codec.encode(&envelope)?;
    Ok(([(header::CONTENT_TYPE, codec.content_type())], body).into_response())
}

#[derive(Debug, Serialize)]
pub(crate) struct Status {
    state: bool,
}

/// `GET /status`
pub(crate) async fn status() -> Json<Status> {
    Json(Status { state: true })
}

// ---------------------------------------------------------------------------
// Read-only listings
// ---------------------------------------------------------------------------

/// `GET /sessions` → live sessions keyed by email. Evicts expired ones.
pub(crate) async fn sessions<S, V, C>(
    State(state): Shared<S, V, C>,
) -> Reply
where
    S: CapabilityStore,
    V: CredentialVerifier,
    C: Codec,
{
    let sessions: HashMap<String, Session> = state.registry.list_active().await;
    respond(&state.codec, Envelope::data(sessions))
}

/// `GET /roles`
pub(crate) async fn roles<S, V, C>(State(state): Shared<S, V, C>) -> Reply
where
    S: CapabilityStore,
    V: CredentialVerifier,
    C: Codec,
{
    respond(&state.codec, Envelope::data(state.store.list_roles().await?))
}

/// `GET /roles/{email}` → the user's role name.
pub(crate) async fn user_role<S, V, C>(
    State(state): Shared<S, V, C>,
    Path(email): Path<String>,
) -> Reply
where
    S: CapabilityStore,
    V: CredentialVerifier,
    C: Codec,
{
    let user = state.store.find_user_by_email(&email).await?;
    respond(&state.codec, Envelope::data(user.role))
}

/// `GET /has-role/{role}/{email}`
pub(crate) async fn has_role<S, V, C>(
    State(state): Shared<S, V, C>,
    Path((role, email)): Path<(String, String)>,
) -> Reply
where
    S: CapabilityStore,
    V: CredentialVerifier,
    C: Codec,
{
    let user = state.store.find_user_by_email(&email).await?;
    respond(&state.codec, Envelope::data(user.role == role))
}

/// `GET /users` → every user, without password digests.
pub(crate) async fn users<S, V, C>(
    State(state): Shared<S, V, C>,
) -> Reply
where
    S: CapabilityStore,
    V: CredentialVerifier,
    C: Codec,
{
    respond(&state.codec, Envelope::data(state.store.list_users().await?))
}

// ---------------------------------------------------------------------------
// Accounts and sessions
// ---------------------------------------------------------------------------

/// `POST /login`
///
/// Unknown email and wrong password produce the same error. A repeated
/// login within the lifetime renews the session and returns the same code.
pub(crate) async fn login<S, V, C>(
    State(state): Shared<S, V, C>,
    body: Bytes,
) -> Reply
where
    S: CapabilityStore,
    V: CredentialVerifier,
    C: Codec,
{
    let LoginRequest { email, password } = state.codec.decode(&body)?;

    let user = match state.store.find_user_by_email(&email).await {
        Ok(user) => user,
        Err(e) if e.is_not_found() => {
            tracing::info!(%email, "login failed: unknown email");
            return Err(WardenError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    };

    let verifier = Arc::clone(&state);
    let digest = user.password.clone();
    let matches = tokio::task::spawn_blocking(move || {
        verifier.verifier.verify(&password, &digest)
    })
    .await??;

    if !matches {
        tracing::info!(%email, "login failed: wrong password");
        return Err(WardenError::InvalidCredentials);
    }

    let user = user.to_public();
    let session = state.registry.issue_or_renew(user.clone()).await;
    tracing::info!(%email, "login succeeded");

    respond(&state.codec, Envelope::data(LoginResponse { session, user }))
}

/// `POST /create-user`
pub(crate) async fn create_user<S, V, C>(
    State(state): Shared<S, V, C>,
    body: Bytes,
) -> Reply
where
    S: CapabilityStore,
    V: CredentialVerifier,
    C: Codec,
{
    let request: AddUserRequest = state.codec.decode(&body)?;
    request.validate()?;
    let AddUserRequest {
        name,
        email,
        password,
        role,
    } = request;

    let hasher = Arc::clone(&state);
    let digest =
        tokio::task::spawn_blocking(move || hasher.verifier.hash(&password))
            .await??;

    state
        .store
        .insert_user(User {
            name,
            email,
            password: digest,
            role,
        })
        .await?;

    respond(&state.codec, Envelope::<()>::ok())
}

/// `POST /validate-session`
///
/// Succeeds with an empty envelope only if `fromUser` has a live session
/// matching `sessionCode`. Does not renew the session.
pub(crate) async fn validate_session<S, V, C>(
    State(state): Shared<S, V, C>,
    body: Bytes,
) -> Reply
where
    S: CapabilityStore,
    V: CredentialVerifier,
    C: Codec,
{
    let logged: Logged = state.codec.decode(&body)?;

    if state
        .registry
        .validate(&logged.from_user, &logged.session_code)
        .await
    {
        respond(&state.codec, Envelope::<()>::ok())
    } else {
        Err(AccessError::Unauthenticated.into())
    }
}

// ---------------------------------------------------------------------------
// Privileged mutations (ADMIN only)
// ---------------------------------------------------------------------------

/// Checks that the caller named in `logged` is a logged-in admin.
async fn require_admin<S, V, C>(
    state: &ServerState<S, V, C>,
    logged: &Logged,
) -> Result<(), WardenError>
where
    S: CapabilityStore,
{
    Gatekeeper::new(&state.registry, &state.store)
        .check(&logged.from_user, &logged.session_code, ADMIN_ROLE)
        .await?;
    Ok(())
}

/// `POST /add-role` → creates a role with no capabilities.
pub(crate) async fn add_role<S, V, C>(
    State(state): Shared<S, V, C>,
    body: Bytes,
) -> Reply
where
    S: CapabilityStore,
    V: CredentialVerifier,
    C: Codec,
{
    let request: AddRoleRequest = state.codec.decode(&body)?;
    request.validate()?;
    require_admin(&state, &request.logged).await?;

    state.store.insert_role(&request.name).await?;
    tracing::info!(by = %request.logged.from_user, role = %request.name, "role added");

    respond(&state.codec, Envelope::<()>::ok())
}

/// `POST /config-role` → replaces a role's capability map.
pub(crate) async fn config_role<S, V, C>(
    State(state): Shared<S, V, C>,
    body: Bytes,
) -> Reply
where
    S: CapabilityStore,
    V: CredentialVerifier,
    C: Codec,
{
    let request: ConfigRoleRequest = state.codec.decode(&body)?;
    require_admin(&state, &request.logged).await?;

    state
        .store
        .update_role_config(&request.name, request.config)
        .await?;

    respond(&state.codec, Envelope::<()>::ok())
}

/// `POST /set-role` → assigns a role to a user.
///
/// The admin check applies to the caller (`fromUser`), not to the user
/// being changed.
pub(crate) async fn set_role<S, V, C>(
    State(state): Shared<S, V, C>,
    body: Bytes,
) -> Reply
where
    S: CapabilityStore,
    V: CredentialVerifier,
    C: Codec,
{
    let request: UpdateUserRoleRequest = state.codec.decode(&body)?;
    require_admin(&state, &request.logged).await?;

    state
        .store
        .update_user_role(&request.email, &request.role)
        .await?;
    tracing::info!(
        by = %request.logged.from_user,
        email = %request.email,
        role = %request.role,
        "user role set"
    );

    respond(&state.codec, Envelope::<()>::ok())
}
