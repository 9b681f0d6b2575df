use std::{path::PathBuf, sync::Arc};

use vielle_core::{Item, LocateError, MediaLocation, MediaLocator};

use crate::client::ServerApi;

/// On-disk mirror of (part of) the collection, laid out by item path.
#[derive(Clone, Debug)]
pub struct LocalIndex {
    root: PathBuf,
}

impl LocalIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Local audio file for `item`, if a complete copy exists.
    pub fn audio_path(&self, item: &Item) -> Option<PathBuf> {
        let path = self.root.join(item.path());
        path.is_file().then_some(path)
    }

    pub fn has_audio(&self, item: &Item) -> bool {
        self.audio_path(item).is_some()
    }
}

/// Local-first media resolution: a complete local copy wins, otherwise the
/// item streams from the server.
pub struct MediaRouter {
    local: Option<LocalIndex>,
    server: Arc<ServerApi>,
}

impl MediaRouter {
    pub fn new(local: Option<LocalIndex>, server: Arc<ServerApi>) -> Self {
        Self { local, server }
    }
}

impl MediaLocator for MediaRouter {
    fn locate(&self, item: &Item) -> Result<MediaLocation, LocateError> {
        if let Some(path) = self.local.as_ref().and_then(|l| l.audio_path(item)) {
            return Ok(MediaLocation::Local(path));
        }
        self.server
            .audio_url(item)
            .map(MediaLocation::Remote)
            .map_err(|e| LocateError::InvalidPath(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use url::Url;
    use vielle_net::{HttpClient, NetOptions};

    use super::*;

    fn server() -> Arc<ServerApi> {
        Arc::new(ServerApi::new(
            HttpClient::new(NetOptions::default()),
            Url::parse("http://music.local/").unwrap(),
        ))
    }

    #[test]
    fn local_copy_wins() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("Artist")).unwrap();
        std::fs::write(dir.path().join("Artist/x.mp3"), b"bytes").unwrap();

        let router = MediaRouter::new(Some(LocalIndex::new(dir.path())), server());
        let location = router.locate(&Item::from_path("Artist/x.mp3")).unwrap();
        assert_eq!(
            location,
            MediaLocation::Local(dir.path().join("Artist/x.mp3"))
        );
    }

    #[test]
    fn missing_local_copy_falls_back_to_server() {
        let dir = TempDir::new().unwrap();
        let router = MediaRouter::new(Some(LocalIndex::new(dir.path())), server());
        let location = router.locate(&Item::from_path("Artist/y.mp3")).unwrap();
        assert!(matches!(location, MediaLocation::Remote(url)
            if url.as_str() == "http://music.local/api/serve/Artist/y.mp3"));
    }

    #[test]
    fn no_local_library_always_remote() {
        let router = MediaRouter::new(None, server());
        let location = router.locate(&Item::from_path("z.mp3")).unwrap();
        assert!(matches!(location, MediaLocation::Remote(_)));
    }
}
