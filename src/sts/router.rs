use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware::{self, Next},
    response::Response,
    routing::post,
    Router,
};

use crate::sts::handler;
use crate::AppState;

/// Simple request logger middleware
async fn log_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    tracing::info!(">>> {} {}", method, uri);
    let res = next.run(req).await;
    tracing::info!("<<< {} {} -> {}", method, uri, res.status());
    res
}

/// Build the STS router. POST is answered on every path, like the operator's sidecar.
/// Bodies of any size are accepted since the web identity token is never inspected.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handler::assume_role_with_web_identity))
        .route("/*path", post(handler::assume_role_with_web_identity))
        .layer(middleware::from_fn(log_middleware))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}
