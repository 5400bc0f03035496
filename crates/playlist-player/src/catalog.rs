use crate::error::Result;

/// One playlist entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackRef {
    url: String,
}

impl TrackRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Human label derived from the last path segment: extension dropped,
    /// `_` shown as a space and `-` shown as `/`.
    pub fn display_name(&self) -> String {
        let file = self.url.rsplit('/').next().unwrap_or_default();
        let stem = file.rfind('.').map_or(file, |dot| &file[..dot]);
        stem.replace('_', " ").replace('-', "/")
    }
}

/// Ordered, immutable list of tracks, addressed from 0.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackCatalog {
    tracks: Vec<TrackRef>,
}

impl TrackCatalog {
    pub fn new(urls: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tracks: urls.into_iter().map(TrackRef::new).collect(),
        }
    }

    /// Strict parse of a JSON list of URLs.
    pub fn parse(raw: &str) -> Result<Self> {
        let urls: Vec<String> = serde_json::from_str(raw)?;
        Ok(Self::new(urls))
    }

    /// Never fails: absent or malformed input gives an empty catalog.
    pub fn load(raw: Option<&str>) -> Self {
        match Self::parse(raw.unwrap_or("[]")) {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("Failed to parse playlist attribute: {e}");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrackRef> {
        self.tracks.get(index)
    }

    pub fn display_names(&self) -> Vec<String> {
        self.tracks.iter().map(TrackRef::display_name).collect()
    }
}

/// First `max` characters of `name`.
pub fn truncate_chars(name: &str, max: usize) -> &str {
    match name.char_indices().nth(max) {
        Some((end, _)) => &name[..end],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_strips_path_and_extension() {
        assert_eq!(TrackRef::new("a/b/My_Song-Remix.mp3").display_name(), "My Song/Remix");
        assert_eq!(TrackRef::new("t1.mp3").display_name(), "t1");
        assert_eq!(TrackRef::new("https://cdn.test/x/live.at.home.ogg").display_name(), "live.at.home");
    }

    #[test]
    fn display_name_without_extension_keeps_segment() {
        assert_eq!(TrackRef::new("/stream/radio_one").display_name(), "radio one");
        assert_eq!(TrackRef::new("dir/").display_name(), "");
    }

    #[test]
    fn load_valid_list() {
        let c = TrackCatalog::load(Some(r#"["t1.mp3", "t2.mp3"]"#));
        assert_eq!(c.len(), 2);
        assert_eq!(c.get(1).map(TrackRef::url), Some("t2.mp3"));
        assert_eq!(c.display_names(), vec!["t1", "t2"]);
    }

    #[test]
    fn load_fails_soft() {
        assert!(TrackCatalog::load(None).is_empty());
        assert!(TrackCatalog::load(Some("")).is_empty());
        assert!(TrackCatalog::load(Some("[")).is_empty());
        assert!(TrackCatalog::load(Some("[1, 2]")).is_empty());
        assert!(TrackCatalog::load(Some(r#"{"a": "b"}"#)).is_empty());
        assert!(TrackCatalog::load(Some("[]")).is_empty());
    }

    #[test]
    fn parse_reports_error() {
        assert!(TrackCatalog::parse("nope").is_err());
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate_chars("My Song/Remix extended", 13), "My Song/Remix");
        assert_eq!(truncate_chars("short", 13), "short");
        assert_eq!(truncate_chars("ééééé", 2), "éé");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
