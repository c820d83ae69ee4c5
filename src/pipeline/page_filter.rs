//! Cover-page detection.
//!
//! Aggregators (JSTOR, IOP, Taylor & Francis) prepend pages carrying
//! download notices, "you may also like" link farms and citation blurbs.
//! They are full of dates and URLs that would confuse the line heuristics,
//! so a page that carries any marker phrase is dropped whole.

/// Case-insensitive substring matcher over the skip-page marker phrases.
#[derive(Debug, Clone)]
pub struct PageFilter {
    /// `(original, lowercased)`
    markers: Vec<(String, String)>,
}

impl PageFilter {
    /// Empty markers are ignored: they would match every page.
    pub fn new<S: AsRef<str>>(markers: &[S]) -> Self {
        let markers = markers
            .iter()
            .map(|m| m.as_ref().trim())
            .filter(|m| !m.is_empty())
            .map(|m| (m.to_string(), m.to_lowercase()))
            .collect();
        Self { markers }
    }

    /// True when the page is a cover or citation page.
    pub fn is_skip_page(&self, page: &str) -> bool {
        self.matched_marker(page).is_some()
    }

    /// The first marker (in table order) found in the page.
    pub fn matched_marker(&self, page: &str) -> Option<&str> {
        if self.markers.is_empty() {
            return None;
        }
        let haystack = page.to_lowercase();
        self.markers
            .iter()
            .find(|(_, lower)| haystack.contains(lower.as_str()))
            .map(|(original, _)| original.as_str())
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
