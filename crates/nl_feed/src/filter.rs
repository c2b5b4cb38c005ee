use std::collections::HashSet;

use nl_core::urls::normalize;
use nl_extract::FeedEntry;

/// Server-recommended links, held in normalized form for membership tests.
#[derive(Debug, Clone, Default)]
pub struct RecommendedSet {
    links: HashSet<String>,
}

impl RecommendedSet {
    pub fn from_links<I, S>(links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            links: links.into_iter().map(|l| normalize(l.as_ref())).collect(),
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.links.contains(&normalize(url))
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    Hidden,
}

/// Per-entry visibility decisions for one homepage view, parallel to the
/// entry list they were computed from.
#[derive(Debug, Clone)]
pub struct FeedOutcome {
    pub decisions: Vec<Visibility>,
    pub shown: usize,
    pub total: usize,
}

/// Pure membership test over normalized URLs: recommended entries stay
/// visible, everything else is hidden.
pub fn filter_entries(entries: &[FeedEntry], recommended: &RecommendedSet) -> FeedOutcome {
    let decisions: Vec<Visibility> = entries
        .iter()
        .map(|entry| {
            if recommended.contains(&entry.url) {
                Visibility::Shown
            } else {
                Visibility::Hidden
            }
        })
        .collect();
    let shown = decisions.iter().filter(|d| **d == Visibility::Shown).count();
    FeedOutcome {
        shown,
        total: decisions.len(),
        decisions,
    }
}

/// Presentation side of the filter. Hiding an entry hides both the link and
/// its enclosing section; the underlying content is never removed.
pub trait FeedView {
    fn hide_entry(&mut self, index: usize);
    fn show_entry(&mut self, index: usize);
    /// Dismissible banner reporting how many articles are shown.
    fn show_banner(&mut self, shown: usize, total: usize);
    fn remove_banner(&mut self);
}

/// Applies the decisions and always installs the count banner.
pub fn apply_filter(outcome: &FeedOutcome, view: &mut dyn FeedView) {
    for (index, decision) in outcome.decisions.iter().enumerate() {
        if *decision == Visibility::Hidden {
            view.hide_entry(index);
        }
    }
    view.show_banner(outcome.shown, outcome.total);
}

/// The banner's "show all" override: unhides every hidden entry and removes
/// the banner. Persisted preferences are untouched.
pub fn show_all(outcome: &FeedOutcome, view: &mut dyn FeedView) {
    for (index, decision) in outcome.decisions.iter().enumerate() {
        if *decision == Visibility::Hidden {
            view.show_entry(index);
        }
    }
    view.remove_banner();
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::FeedView;

    /// Records view calls for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingView {
        pub hidden: Vec<usize>,
        pub shown: Vec<usize>,
        pub banner: Option<(usize, usize)>,
        pub banner_removed: bool,
    }

    impl FeedView for RecordingView {
        fn hide_entry(&mut self, index: usize) {
            self.hidden.push(index);
        }

        fn show_entry(&mut self, index: usize) {
            self.shown.push(index);
        }

        fn show_banner(&mut self, shown: usize, total: usize) {
            self.banner = Some((shown, total));
        }

        fn remove_banner(&mut self) {
            self.banner_removed = true;
        }
    }
}
