//! Deduplicated record of main-frame navigations.

use std::collections::HashSet;

use crate::target::NavigationUrl;

/// Ordered, deduplicated list of URLs a browsing surface navigated to.
///
/// The first occurrence of a URL fixes its position. The empty page is never
/// recorded. Entries are only removed by [`clear`](Self::clear), which is
/// reserved for resetting the whole session.
#[derive(Clone, Debug, Default)]
pub struct NavigationLog {
    entries: Vec<NavigationUrl>,
    seen: HashSet<String>,
}

impl NavigationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a navigation. Returns true if the URL was appended.
    pub fn record(&mut self, url: &NavigationUrl) -> bool {
        if url.is_blank_page() || !self.seen.insert(url.as_str().to_string()) {
            return false;
        }
        self.entries.push(url.clone());
        true
    }

    /// Current entries, in first-seen order.
    pub fn snapshot(&self) -> Vec<NavigationUrl> {
        self.entries.clone()
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&NavigationUrl> {
        self.entries.get(index)
    }

    /// Returns true if `url` was recorded.
    pub fn contains(&self, url: &NavigationUrl) -> bool {
        self.seen.contains(url.as_str())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &NavigationUrl> {
        self.entries.iter()
    }

    /// Forget everything. Only for session reset.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.seen.clear();
    }
}
