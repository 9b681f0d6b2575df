//! Stream one track from a music server, logging download and playback
//! progress. The "backend" here just drains the source at full speed; a
//! real integration would hand the reader to a decoder.
//!
//! Usage:
//!   cargo run --example play_url -- http://music.local:5050/ "Artist/Album/01.mp3"

use std::time::Duration;

use tokio::sync::broadcast;
use vielle::{
    play::{AudioBackend, MediaSource, PlayError, PlayerSignal},
    prelude::*,
};

struct DrainBackend {
    signals: broadcast::Sender<PlayerSignal>,
    source: Option<Box<dyn MediaSource>>,
}

impl DrainBackend {
    fn new() -> Self {
        let (signals, _) = broadcast::channel(16);
        Self {
            signals,
            source: None,
        }
    }
}

impl AudioBackend for DrainBackend {
    fn set_data_source(&mut self, source: Box<dyn MediaSource>) -> Result<(), PlayError> {
        self.source = Some(source);
        Ok(())
    }

    fn prepare_async(&mut self) -> Result<(), PlayError> {
        let _ = self.signals.send(PlayerSignal::Prepared);
        Ok(())
    }

    fn start(&mut self) -> Result<(), PlayError> {
        let Some(mut source) = self.source.take() else {
            return Ok(());
        };
        let signals = self.signals.clone();
        std::thread::spawn(move || {
            use std::io::Read;
            let mut sink = [0u8; 8192];
            loop {
                match source.read(&mut sink) {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "source read failed");
                        let _ = signals.send(PlayerSignal::Error { code: -1 });
                        return;
                    }
                }
            }
            let _ = signals.send(PlayerSignal::Completed);
        });
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlayError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlayError> {
        Ok(())
    }

    fn seek_to(&mut self, _position: Duration) -> Result<(), PlayError> {
        Ok(())
    }

    fn position(&self) -> Duration {
        Duration::ZERO
    }

    fn duration(&self) -> Option<Duration> {
        None
    }

    fn reset(&mut self) {
        self.source = None;
    }

    fn signals(&self) -> broadcast::Receiver<PlayerSignal> {
        self.signals.subscribe()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,vielle=debug".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let server: url::Url = args
        .next()
        .ok_or("usage: play_url <server-url> <item-path>")?
        .parse()?;
    let path = args.next().ok_or("usage: play_url <server-url> <item-path>")?;

    let session = Session::new(SessionConfig::new(server), Box::new(DrainBackend::new())).await?;
    let mut events = session.events().subscribe();

    session.controller().play(&Item::from_path(path)).await?;

    loop {
        match events.recv().await? {
            Event::Fetch(FetchEvent::Progress { offset, total }) => {
                tracing::info!(offset, ?total, "downloading");
            }
            Event::Fetch(FetchEvent::Completed { total_bytes }) => {
                tracing::info!(total_bytes, "download complete");
            }
            Event::Player(PlayerEvent::Completed) => {
                tracing::info!("playback finished");
                break;
            }
            Event::Player(PlayerEvent::Error { code }) => {
                tracing::error!(code, "playback failed");
                break;
            }
            _ => {}
        }
    }

    session.close().await;
    Ok(())
}
