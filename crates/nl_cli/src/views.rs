use std::collections::HashSet;

use nl_core::{SummaryLevel, SummaryResult};
use nl_extract::{reading_time, FeedEntry};
use nl_feed::FeedView;
use nl_panel::SummaryView;

/// Renders the summary overlay states to the terminal.
pub struct TerminalSummaryView;

impl SummaryView for TerminalSummaryView {
    fn render_loading(&mut self, level: SummaryLevel) {
        println!("⏳ Generating {}...", level.label());
    }

    fn render_summary(&mut self, result: &SummaryResult) {
        println!("\n📝 AI Summary ({})", result.level.label());
        println!("{}\n", result.html);
    }

    fn render_error(&mut self, message: &str) {
        println!("⚠️  {} (type r to retry)", message);
    }

    fn clear(&mut self) {
        println!("📰 Summary dismissed, showing the full article.");
    }
}

/// Buffers feed visibility decisions and renders the surviving list once.
pub struct TerminalFeedView {
    entries: Vec<FeedEntry>,
    hidden: HashSet<usize>,
    banner: Option<(usize, usize)>,
}

impl TerminalFeedView {
    pub fn new(entries: &[FeedEntry]) -> Self {
        Self {
            entries: entries.to_vec(),
            hidden: HashSet::new(),
            banner: None,
        }
    }

    pub fn render(&self) {
        if let Some((shown, total)) = self.banner {
            println!(
                "🎯 Showing {} of {} articles matched to your profile (--show-all lifts the filter)",
                shown, total
            );
        }
        for (index, entry) in self.entries.iter().enumerate() {
            if self.hidden.contains(&index) {
                continue;
            }
            let minutes = reading_time(&entry.description);
            println!("📖 {:>2} min  {}", minutes, entry.title);
            println!("          {}", entry.url);
        }
    }
}

impl FeedView for TerminalFeedView {
    fn hide_entry(&mut self, index: usize) {
        self.hidden.insert(index);
    }

    fn show_entry(&mut self, index: usize) {
        self.hidden.remove(&index);
    }

    fn show_banner(&mut self, shown: usize, total: usize) {
        self.banner = Some((shown, total));
    }

    fn remove_banner(&mut self) {
        self.banner = None;
    }
}
