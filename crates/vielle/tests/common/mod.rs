//! Fixture: a miniature music server with a browse listing and throttled
//! track serving (Range-capable), plus event helpers.

#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use tokio::{net::TcpListener, sync::broadcast};
use url::Url;
use vielle::events::Event;

#[derive(Clone)]
pub struct Track {
    pub body: Vec<u8>,
    /// Zero = serve in one piece; otherwise stream `chunk`-sized pieces
    /// with `delay` between them.
    pub chunk: usize,
    pub delay: Duration,
}

impl Track {
    pub fn instant(body: Vec<u8>) -> Self {
        Self {
            body,
            chunk: 0,
            delay: Duration::ZERO,
        }
    }

    pub fn throttled(body: Vec<u8>, chunk: usize, delay: Duration) -> Self {
        Self { body, chunk, delay }
    }
}

#[derive(Clone)]
struct ServerState {
    tracks: Arc<HashMap<String, Track>>,
    browse: Arc<serde_json::Value>,
}

async fn serve_track(
    State(state): State<ServerState>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(track) = state.tracks.get(&path) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let start = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("bytes="))
        .and_then(|v| v.strip_suffix('-'))
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0)
        .min(track.body.len());

    let status = if start > 0 {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };
    let data = track.body[start..].to_vec();

    if track.delay.is_zero() {
        return (status, data).into_response();
    }

    let chunk = track.chunk.max(1);
    let delay = track.delay;
    let stream = futures::stream::unfold((data, 0usize), move |(data, pos)| async move {
        if pos >= data.len() {
            return None;
        }
        tokio::time::sleep(delay).await;
        let end = (pos + chunk).min(data.len());
        let bytes = Bytes::copy_from_slice(&data[pos..end]);
        Some((Ok::<_, std::convert::Infallible>(bytes), (data, end)))
    });

    Response::builder()
        .status(status)
        .body(Body::from_stream(stream))
        .unwrap()
}

/// Spawn the fixture server. `tracks` maps item paths to their bodies;
/// `browse` is the JSON listing served at the collection root.
pub async fn serve_collection(
    tracks: HashMap<String, Track>,
    browse: serde_json::Value,
) -> Url {
    let state = ServerState {
        tracks: Arc::new(tracks),
        browse: Arc::new(browse),
    };

    let app = Router::new()
        .route(
            "/api/browse/",
            get(|State(state): State<ServerState>| async move {
                Json(state.browse.as_ref().clone())
            }),
        )
        .route("/api/serve/*path", get(serve_track))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Url::parse(&format!("http://{addr}/")).unwrap()
}

/// Deterministic pseudo-random track body.
pub fn track_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(37) % 239) as u8).collect()
}

/// Receive events until `pred` matches one, with a deadline.
pub async fn recv_until(
    rx: &mut broadcast::Receiver<Event>,
    pred: impl Fn(&Event) -> bool,
) -> Event {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match rx.recv().await {
                Ok(event) if pred(&event) => return event,
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => panic!("event bus closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}
