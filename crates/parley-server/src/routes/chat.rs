use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use parley::agent::Reply;
use parley::models::ChatRequest;
use parley::relay::ByteStream;
use tracing::info;

/// Relays provider SSE bytes to the client as they are pulled
pub struct SseResponse {
    stream: ByteStream,
}

impl SseResponse {
    fn new(stream: ByteStream) -> Self {
        Self { stream }
    }
}

impl IntoResponse for SseResponse {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
                (header::CONNECTION, "keep-alive"),
            ],
            Body::from_stream(self.stream),
        )
            .into_response()
    }
}

async fn handler(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    // Parsed by hand so every malformed body is a 400, before any upstream call
    let request = ChatRequest::from_slice(&body)?;
    info!(
        messages = request.messages.len(),
        model = request.model.as_deref().unwrap_or("default"),
        "received chat request"
    );

    match state.agent.reply(&request).await? {
        Reply::Final(reply) => Ok(Json(reply).into_response()),
        Reply::Stream(stream) => Ok(SseResponse::new(stream).into_response()),
    }
}

async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(handler).fallback(method_not_allowed))
        .with_state(state)
}
