use axum::{
    Router,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{balances, expenses, groups, settlements};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/groups", post(groups::create))
        .route(
            "/groups/{group_id}",
            get(groups::get).delete(groups::delete),
        )
        .route("/groups/{group_id}/members", post(groups::add_member))
        .route(
            "/groups/{group_id}/expenses",
            post(expenses::create).get(expenses::list),
        )
        .route(
            "/groups/{group_id}/expenses/{expense_id}",
            axum::routing::patch(expenses::update).delete(expenses::delete),
        )
        .route("/groups/{group_id}/balances", get(balances::get))
        .route(
            "/groups/{group_id}/settlements/suggestions",
            get(settlements::suggestions),
        )
        .route(
            "/groups/{group_id}/settlements",
            post(settlements::record),
        )
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
