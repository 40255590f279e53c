//! Per-request database connection.
//!
//! [`attach_connection`] checks a connection out of the pool, applies the
//! session statements, and parks it in a [`ConnectionSlot`] on the request.
//! The handler takes it out of the slot through the [`DbConn`] extractor and
//! releases it when the handler finishes. A connection the handler never
//! claimed is released by the middleware before the response goes out. If the
//! request future is dropped early the slot goes with it, which releases the
//! connection as well.

use crate::database::PooledConnection;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use sqlx::AnyConnection;
use sqlx::Executor;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
pub struct ConnectionSlot(Arc<Mutex<Option<PooledConnection>>>);

impl ConnectionSlot {
    fn new(conn: PooledConnection) -> Self {
        Self(Arc::new(Mutex::new(Some(conn))))
    }

    fn take(&self) -> Option<PooledConnection> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

pub async fn attach_connection(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let pool = &state.pool;

    let mut conn = pool.acquire().await.map_err(ApiError::Connection)?;

    for statement in pool.session_statements() {
        if let Err(e) = conn.execute(statement.as_str()).await {
            pool.release(conn);
            return Err(ApiError::Session(e));
        }
    }

    let slot = ConnectionSlot::new(conn);
    request.extensions_mut().insert(slot.clone());

    let response = next.run(request).await;

    if let Some(conn) = slot.take() {
        pool.release(conn);
    }
    tracing::trace!(checked_out = pool.checked_out(), "request finished");

    Ok(response)
}

/// The request's connection, owned by the handler until it returns.
pub struct DbConn(PooledConnection);

impl DbConn {
    pub fn connection(&mut self) -> &mut AnyConnection {
        &mut self.0
    }
}

impl<S> FromRequestParts<S> for DbConn
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ConnectionSlot>()
            .and_then(ConnectionSlot::take)
            .map(DbConn)
            .ok_or(ApiError::MissingConnection)
    }
}
