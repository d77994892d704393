//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of bytes of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// The method, URI and status are logged at the `info` level together with
/// the first [LOG_BODY_LENGTH_LIMIT] bytes of the body. Longer bodies are
/// logged in full at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body = match read_body(body).await {
        Ok(body) => body,
        Err(error) => {
            tracing::error!("could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    log_body(
        &format!("Received request: {} {}", parts.method, parts.uri),
        &body,
    );

    let response = next
        .run(Request::from_parts(parts, Body::from(body)))
        .await;

    let (parts, body) = response.into_parts();
    let body = match read_body(body).await {
        Ok(body) => body,
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_body(&format!("Sending response: {}", parts.status), &body);

    Response::from_parts(parts, Body::from(body))
}

async fn read_body(body: Body) -> Result<Bytes, axum::Error> {
    axum::body::to_bytes(body, usize::MAX).await
}

fn log_body(summary: &str, body: &[u8]) {
    let text = String::from_utf8_lossy(body);

    if text.len() > LOG_BODY_LENGTH_LIMIT {
        let mut cut = LOG_BODY_LENGTH_LIMIT;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        tracing::info!("{summary}\nbody: {}...", &text[..cut]);
        tracing::debug!("Full body: {text:?}");
    } else {
        tracing::info!("{summary}\nbody: {text:?}");
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, middleware, routing::post};
    use axum_test::TestServer;

    use super::logging_middleware;

    async fn echo(body: String) -> String {
        body
    }

    #[tokio::test]
    async fn passes_bodies_through_unchanged() {
        let app = Router::new()
            .route("/echo", post(echo))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");
        let body = "description=".to_owned() + &"a".repeat(200);

        let response = server.post("/echo").text(&body).await;

        response.assert_status_ok();
        response.assert_text(body);
    }
}
