use serde::Deserialize;
use vielle_core::Item;

/// One row of a browse listing: a sub-directory or a playable song.
///
/// Externally tagged, matching the server's JSON
/// (`{"Directory": {...}}` / `{"Song": {...}}`).
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub enum BrowseEntry {
    Directory(Directory),
    Song(Item),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Directory {
    pub path: String,
}

impl BrowseEntry {
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Directory(d) => &d.path,
            Self::Song(s) => s.path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_parses_and_preserves_order() {
        let json = r#"[
            {"Directory": {"path": "Artist/Album"}},
            {"Song": {"path": "Artist/track01.mp3", "title": "One"}},
            {"Song": {"path": "Artist/track02.mp3"}}
        ]"#;
        let entries: Vec<BrowseEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].is_directory());
        assert_eq!(entries[0].path(), "Artist/Album");
        assert_eq!(entries[1].path(), "Artist/track01.mp3");
        assert!(!entries[2].is_directory());
    }
}
