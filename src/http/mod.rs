//! JSON HTTP surface over the service layer.
//!
//! One `Connection` behind a mutex serves every request; store work runs on
//! the blocking pool, so mutations are applied one at a time.

mod envelope;
mod handlers;

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::Router;
use log::info;
use rusqlite::Connection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::error::Error;

pub use envelope::{status_of, ApiError, AuthUser, Envelope};

#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            store: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run `f` against the store on the blocking pool.
    pub async fn with_store<T, F>(&self, f: F) -> crate::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> crate::Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let conn = store
                .lock()
                .map_err(|_| Error::Internal("store lock poisoned".into()))?;
            f(&conn)
        })
        .await
        .map_err(|e| Error::Internal(format!("store task failed: {e}")))?
    }
}

pub fn router(state: AppState) -> Router {
    use handlers::*;

    Router::new()
        .route("/boards", get(list_boards).post(create_board))
        .route("/boards/reorder", post(reorder_boards))
        .route(
            "/boards/{id}",
            get(get_board).put(update_board).delete(delete_board),
        )
        .route("/boards/{id}/default", post(set_default_board))
        .route("/columns", post(create_column))
        .route("/columns/reorder", post(reorder_columns))
        .route("/columns/{id}", put(update_column).delete(delete_column))
        .route("/tasks", post(create_task))
        .route("/tasks/reorder", post(reorder_tasks))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/{id}/move", post(move_task))
        .route("/tasks/{id}/relocate", post(relocate_task))
        .route("/subtasks", get(list_subtasks).post(create_subtask))
        .route("/subtasks/reorder", post(reorder_subtasks))
        .route("/subtasks/{id}", put(update_subtask).delete(delete_subtask))
        .route("/subtasks/{id}/toggle", post(toggle_subtask))
        .with_state(state)
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(req).await;
    info!(
        "{method} {path} -> {} ({} ms)",
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

/// The API plus CORS, request logging and an optional static front end.
pub fn app(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let mut app = router(state);
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }
    app.layer(middleware::from_fn(log_request)).layer(cors)
}

pub async fn serve(conn: Connection, bind: &str, static_dir: Option<&Path>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(AppState::new(conn), static_dir))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .context("server error")?;
    Ok(())
}
