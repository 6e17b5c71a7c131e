use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use innkeep_auth::{Access, AuthorizationGate, GateError};

use crate::app::errors::ApiError;

#[derive(Clone)]
pub struct GateState {
    pub gate: Arc<AuthorizationGate>,
}

/// Run the authorization gate before any handler.
///
/// On success the caller's identity (if any) is stored in the request
/// extensions for [`crate::context::Caller`].
pub async fn authorization_middleware(
    State(state): State<GateState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match state.gate.check(&req) {
        Ok(Access::Public) => {}
        Ok(Access::Authenticated(identity)) => {
            tracing::debug!(principal = identity.principal(), roles = %identity.roles(), "request authorized");
            req.extensions_mut().insert(identity);
        }
        // Wrong method on a served path: let the router answer 405.
        Err(GateError::MethodNotAllowed) => {}
        Err(err) => {
            tracing::debug!(
                method = %req.method(),
                path = req.uri().path(),
                outcome = ?err.outcome(),
                reason = %err,
                "request rejected"
            );
            return Err(err.into());
        }
    }

    Ok(next.run(req).await)
}

/// Monotonic count of handled requests, shared by all connections.
#[derive(Debug, Clone, Default)]
pub struct RequestCounter(Arc<AtomicU64>);

impl RequestCounter {
    /// Claim the next request number, starting at 1.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn handled(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

pub async fn request_log_middleware(
    State(counter): State<RequestCounter>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();

    let res = next.run(req).await;

    let count = counter.next();
    let status = res.status().as_u16();
    tracing::info!(
        request = count,
        %method,
        %uri,
        status,
        "Request {count} - {method} {uri} was handled with status code {status}"
    );

    res
}
