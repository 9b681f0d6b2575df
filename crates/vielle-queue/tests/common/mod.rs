//! Shared fixture: a local HTTP server serving one track with Range
//! support and an optional per-chunk delay to keep downloads in flight.

#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use bytes::Bytes;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use url::Url;
use vielle_events::Event;

#[derive(Clone)]
struct TrackFixture {
    body: Arc<Vec<u8>>,
    chunk: usize,
    delay: Duration,
}

async fn track(State(fixture): State<TrackFixture>, headers: HeaderMap) -> Response {
    let start = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("bytes="))
        .and_then(|v| v.strip_suffix('-'))
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0)
        .min(fixture.body.len());

    let status = if start > 0 {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };
    let data = fixture.body[start..].to_vec();

    if fixture.delay.is_zero() {
        return (status, data).into_response();
    }

    let chunk = fixture.chunk;
    let delay = fixture.delay;
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

/// Serve `body` at `<base>/track.mp3`, throttled when `delay` is non-zero.
pub async fn serve_track(body: Vec<u8>, chunk: usize, delay: Duration) -> Url {
    let app = Router::new()
        .route("/track.mp3", get(track))
        .with_state(TrackFixture {
            body: Arc::new(body),
            chunk,
            delay,
        });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Url::parse(&format!("http://{addr}/track.mp3")).unwrap()
}

/// Deterministic pseudo-random track body.
pub fn track_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(31) % 251) as u8).collect()
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
