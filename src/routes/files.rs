//! `GET /f/{file_id}` - stream a stored file back from the upstream store.

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::Response,
    routing::get,
    Router,
};
use tracing::info;

use crate::models::AppState;
use crate::storage::UpstreamError;
use crate::types::{AppError, AppResult};

/// Upstream headers copied onto the client response.
const MIRRORED_HEADERS: [header::HeaderName; 2] =
    [header::CONTENT_TYPE, header::CONTENT_DISPOSITION];

pub fn router() -> Router<AppState> {
    Router::new().route("/f/{file_id}", get(get_file))
}

async fn get_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> AppResult<Response> {
    info!(%file_id, "File retrieval request received");

    let upstream = state.upstream.fetch(&file_id).await.map_err(|e| match e {
        UpstreamError::Status(status) => AppError::UpstreamFileNotFound(status),
        other => AppError::RetrievalFailed(other.to_string()),
    })?;

    let status = upstream.status();
    let mirrored: Vec<_> = MIRRORED_HEADERS
        .into_iter()
        .filter_map(|name| {
            let value = upstream.headers().get(&name).cloned()?;
            Some((name, value))
        })
        .collect();

    // Chunks are forwarded as they arrive.
    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    response.headers_mut().extend(mirrored);

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::http::{Request, StatusCode};
    use futures::StreamExt;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio::time::timeout;
    use tower::ServiceExt;

    fn app(upstream_url: &str) -> Router {
        let config = Config::from_lookup(|key| match key {
            "UPSTREAM_BASE_URL" => Some(upstream_url.to_string()),
            _ => None,
        })
        .unwrap();
        router().with_state(AppState::new(config, reqwest::Client::new()))
    }

    fn get_request(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn test_streams_file_with_mirrored_headers() {
        let png: Vec<u8> = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/upload/f/XYZ")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_header("content-disposition", r#"inline; filename="pic.png""#)
            .with_header("x-upstream-internal", "secret")
            .with_body(png.clone())
            .expect(1)
            .create_async()
            .await;

        let response = app(&server.url()).oneshot(get_request("/f/XYZ")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            r#"inline; filename="pic.png""#
        );
        assert!(response.headers().get("x-upstream-internal").is_none());
        assert_eq!(body_bytes(response).await, png);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_absent_upstream_headers_stay_absent() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/upload/f/plain")
            .with_status(200)
            .with_body("raw")
            .create_async()
            .await;

        let response = app(&server.url()).oneshot(get_request("/f/plain")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
        assert_eq!(body_bytes(response).await, b"raw");
    }

    #[tokio::test]
    async fn test_missing_file_mirrors_upstream_status() {
        let mut server = mockito::Server::new_async().await;
        let _missing = server
            .mock("GET", "/upload/f/doesnotexist")
            .with_status(404)
            .with_body("upstream detail that must not leak")
            .create_async()
            .await;
        let _forbidden = server
            .mock("GET", "/upload/f/forbidden")
            .with_status(403)
            .create_async()
            .await;
        let app = app(&server.url());

        let response = app.clone().oneshot(get_request("/f/doesnotexist")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_bytes(response).await, b"File not found");

        let response = app.oneshot(get_request("/f/forbidden")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_bytes(response).await, b"File not found");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_server_error() {
        let response = app("http://127.0.0.1:1").oneshot(get_request("/f/XYZ")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_bytes(response).await, b"Internal Server Error");
    }

    #[tokio::test]
    async fn test_large_file_passes_through_intact() {
        let payload: Vec<u8> = (0..8 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/upload/f/big")
            .with_status(200)
            .with_header("content-type", "application/octet-stream")
            .with_body(payload.clone())
            .create_async()
            .await;

        let response = app(&server.url()).oneshot(get_request("/f/big")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let received = body_bytes(response).await;
        assert_eq!(received.len(), payload.len());
        assert!(received == payload);
    }

    #[tokio::test]
    async fn test_first_chunk_reaches_client_before_upstream_finishes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        // Upstream sends the headers and one chunk, then holds the body open.
        let upstream = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await.unwrap();
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\n\
                      content-type: application/octet-stream\r\n\
                      transfer-encoding: chunked\r\n\r\n\
                      5\r\nfirst\r\n",
                )
                .await
                .unwrap();
            socket.flush().await.unwrap();

            release_rx.await.unwrap();
            socket.write_all(b"6\r\nsecond\r\n0\r\n\r\n").await.unwrap();
            socket.flush().await.unwrap();
        });

        let response = timeout(
            Duration::from_secs(5),
            app(&format!("http://{addr}")).oneshot(get_request("/f/slow")),
        )
        .await
        .expect("response should not wait for the whole upstream body")
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let mut body = response.into_body().into_data_stream();
        let first = timeout(Duration::from_secs(5), body.next())
            .await
            .expect("first chunk should be forwarded while upstream is still open")
            .unwrap()
            .unwrap();
        assert_eq!(&first[..], b"first");

        release_tx.send(()).unwrap();
        let mut rest = Vec::new();
        while let Some(chunk) = body.next().await {
            rest.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(rest, b"second");
        upstream.await.unwrap();
    }
}
