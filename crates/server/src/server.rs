use axum::{
    Router, middleware,
    routing::{get, put},
};

use std::{net::SocketAddr, sync::Arc};

use crate::{
    accounts,
    auth::{self, IdentityVerifier},
    categories, tags, transactions, user,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl ServerState {
    pub fn new(engine: Engine, verifier: impl IdentityVerifier + 'static) -> Self {
        Self {
            engine: Arc::new(engine),
            verifier: Arc::new(verifier),
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/users/me", put(user::sync))
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/accounts/{id}",
            get(accounts::get)
                .put(accounts::update)
                .delete(accounts::delete),
        )
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::delete),
        )
        .route("/tags", get(tags::list).post(tags::create))
        .route("/tags/{id}", put(tags::update).delete(tags::delete))
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/summary", get(transactions::summary))
        .route(
            "/transactions/{id}",
            put(transactions::update).delete(transactions::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::auth))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn run(state: ServerState, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|err| {
        tracing::error!("failed to bind server listener on {addr}: {err}");
        err
    })?;
    run_with_listener(state, listener).await
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
