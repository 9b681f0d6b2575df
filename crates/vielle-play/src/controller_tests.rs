//! Controller tests over a scripted backend and a local source.
//! Remote end-to-end flows live in the facade crate's integration tests.

use std::{io::Read, sync::Arc, time::Duration};

use tempfile::TempDir;
use vielle_core::{Item, LocateError, MediaLocation, MediaLocator};
use vielle_events::EventBus;
use vielle_net::{HttpClient, NetOptions};
use vielle_queue::{DownloadQueue, LiveSource, QueueOptions};

use crate::{
    mock::{MockBackend, MockCall, MockHandle},
    PlaybackController, PlaybackState, PlayerSignal,
};

struct FixedLocator(MediaLocation);

impl MediaLocator for FixedLocator {
    fn locate(&self, _item: &Item) -> Result<MediaLocation, LocateError> {
        Ok(self.0.clone())
    }
}

struct Rig {
    controller: Arc<PlaybackController>,
    handle: MockHandle,
    live: LiveSource,
    _dir: TempDir,
}

async fn rig_with_local_track(data: &[u8]) -> Rig {
    let dir = TempDir::new().unwrap();
    let track = dir.path().join("track.mp3");
    std::fs::write(&track, data).unwrap();

    let events = EventBus::new(64);
    let live = LiveSource::new();
    let queue = Arc::new(
        DownloadQueue::new(
            QueueOptions::new(dir.path().join("scratch")),
            HttpClient::new(NetOptions::default()),
            events.clone(),
            live.clone(),
        )
        .await
        .unwrap(),
    );

    let (backend, handle) = MockBackend::new();
    let controller = PlaybackController::new(
        Box::new(backend),
        queue,
        Arc::new(FixedLocator(MediaLocation::Local(track))),
        live.clone(),
        events,
    );

    Rig {
        controller,
        handle,
        live,
        _dir: dir,
    }
}

async fn wait_state(controller: &PlaybackController, state: PlaybackState) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if controller.state() == state {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("player never reached {state:?}"));
}

#[tokio::test(flavor = "multi_thread")]
async fn local_play_prepares_and_auto_starts() {
    let rig = rig_with_local_track(b"local bytes").await;
    let item = Item::from_path("x.mp3");

    rig.controller.play(&item).await.unwrap();
    assert_eq!(rig.controller.state(), PlaybackState::Preparing);
    assert!(rig.live.is_any_live());
    assert_eq!(rig.controller.current_item(), Some(item));
    assert_eq!(
        rig.handle.calls(),
        vec![
            MockCall::Reset,
            MockCall::SetDataSource,
            MockCall::PrepareAsync
        ]
    );

    rig.handle.emit(PlayerSignal::Prepared);
    wait_state(&rig.controller, PlaybackState::Started).await;
    assert!(rig.controller.is_playing());
}

#[tokio::test(flavor = "multi_thread")]
async fn bound_source_serves_the_local_bytes() {
    let data: Vec<u8> = (0..40_000).map(|i| (i % 233) as u8).collect();
    let rig = rig_with_local_track(&data).await;

    rig.controller.play(&Item::from_path("x.mp3")).await.unwrap();

    let mut source = rig.handle.take_source().expect("source was bound");

    // byte_len and reads block on the buffer, so they run off the runtime.
    let expected_len = data.len() as u64;
    let read = tokio::task::spawn_blocking(move || {
        assert_eq!(source.byte_len(), Some(expected_len));
        let mut out = Vec::new();
        source.read_to_end(&mut out).unwrap();
        out
    })
    .await
    .unwrap();
    assert_eq!(read, data);
}

#[tokio::test(flavor = "multi_thread")]
async fn completion_releases_the_live_source() {
    let rig = rig_with_local_track(b"bytes").await;
    rig.controller.play(&Item::from_path("x.mp3")).await.unwrap();
    rig.handle.emit(PlayerSignal::Prepared);
    wait_state(&rig.controller, PlaybackState::Started).await;

    rig.handle.emit(PlayerSignal::Completed);
    wait_state(&rig.controller, PlaybackState::Completed).await;
    assert_eq!(rig.controller.progress(), 1.0);
    assert!(!rig.live.is_any_live());
}

#[tokio::test(flavor = "multi_thread")]
async fn backend_error_releases_the_live_source() {
    let rig = rig_with_local_track(b"bytes").await;
    rig.controller.play(&Item::from_path("x.mp3")).await.unwrap();

    rig.handle.emit(PlayerSignal::Error { code: 7 });
    wait_state(&rig.controller, PlaybackState::Error).await;
    assert!(!rig.live.is_any_live());
}

#[tokio::test(flavor = "multi_thread")]
async fn pause_issued_before_prepared_settles_paused() {
    let rig = rig_with_local_track(b"bytes").await;
    rig.controller.play(&Item::from_path("x.mp3")).await.unwrap();

    rig.controller.pause();
    assert!(!rig.controller.is_playing());

    rig.handle.emit(PlayerSignal::Prepared);
    wait_state(&rig.controller, PlaybackState::Prepared).await;

    rig.controller.resume();
    wait_state(&rig.controller, PlaybackState::Started).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn clear_resets_everything() {
    let rig = rig_with_local_track(b"bytes").await;
    rig.controller.play(&Item::from_path("x.mp3")).await.unwrap();
    rig.handle.emit(PlayerSignal::Prepared);
    wait_state(&rig.controller, PlaybackState::Started).await;

    rig.controller.clear();
    assert_eq!(rig.controller.state(), PlaybackState::Idle);
    assert!(rig.controller.current_item().is_none());
    assert!(!rig.live.is_any_live());
}
