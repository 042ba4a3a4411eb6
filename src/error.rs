use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// RouteError
///
/// Every failure the route-authorization layer can surface. The store never
/// translates one kind into another; it either handles a case as a guarded
/// no-op or lets the error travel to the caller unchanged.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The route service could not be reached or the connection dropped mid-response.
    #[error("route service transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The route service answered, but with a non-success envelope code.
    #[error("route service rejected the request (code {code}): {message}")]
    Service { code: i32, message: String },

    /// The route service payload did not match the expected route schema.
    #[error("malformed route payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The router refused a route definition.
    #[error("invalid route '{name}': {reason}")]
    InvalidRoute { name: String, reason: String },

    /// A previous initialization pass never completed for this session.
    #[error("auth route initialization already in progress for this session")]
    InitInProgress,
}

/// Result type for route-authorization operations.
pub type RouteResult<T> = Result<T, RouteError>;

impl RouteError {
    /// Maps the error onto the HTTP status the route API reports for it.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RouteError::Transport(_) | RouteError::Service { .. } => StatusCode::BAD_GATEWAY,
            RouteError::InitInProgress => StatusCode::CONFLICT,
            RouteError::Decode(_) | RouteError::InvalidRoute { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::error!(error = %self, status = %status, "route request failed");
        let body = serde_json::json!({
            "code": status.as_u16(),
            "message": self.to_string(),
            "data": null,
        });
        (status, Json(body)).into_response()
    }
}
