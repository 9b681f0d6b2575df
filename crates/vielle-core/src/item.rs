use serde::Deserialize;

/// A playable track in the collection.
///
/// Identity is the server `path`: two items with equal paths refer to the
/// same track regardless of metadata. Display metadata comes from server
/// listings and takes no part in equality.
#[derive(Clone, Debug, Deserialize)]
pub struct Item {
    pub path: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub artwork: Option<String>,
    /// Duration in seconds, when the server reports it.
    #[serde(default)]
    pub duration: Option<f32>,
}

impl Item {
    /// Create a bare item from its server path.
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: None,
            artist: None,
            album: None,
            artwork: None,
            duration: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether `other` refers to the same track.
    pub fn same_track(&self, other: &Item) -> bool {
        self.path == other.path
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.same_track(other)
    }
}

impl Eq for Item {}
