use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use nl_core::prefs::{PrefChange, PrefKey, PreferenceStore};
use nl_core::{ArticleSnapshot, SummaryLevel, SummaryResult};
use nl_extract::{classify, PageKind};
use nl_inference::{prompts, CompletionModel};

/// Presentation seam for the summary overlay. The original article content
/// is never removed; `clear` only takes the overlay down and reveals it.
pub trait SummaryView {
    fn render_loading(&mut self, level: SummaryLevel);
    fn render_summary(&mut self, result: &SummaryResult);
    /// Error box with a manual retry affordance.
    fn render_error(&mut self, message: &str);
    fn clear(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryState {
    Idle,
    Loading { level: SummaryLevel },
    Shown { level: SummaryLevel },
    Failed { level: SummaryLevel, message: String },
    /// "Read full article" was chosen; terminal for this page view.
    Dismissed,
}

/// Per-page-view summary state machine:
/// `Idle -> Loading -> {Shown, Failed}`, `Failed -retry-> Loading`,
/// `Shown -dismiss-> Dismissed`. Results are cached per level for the page's
/// lifetime; a level change discards the cache and re-enters `Loading`.
pub struct SummaryController {
    model: Arc<dyn CompletionModel>,
    article: ArticleSnapshot,
    state: SummaryState,
    cache: HashMap<SummaryLevel, SummaryResult>,
    // Monotonic request stamp; a superseded in-flight request is never
    // aborted, its result is simply discarded when it lands (last writer
    // wins).
    generation: u64,
}

impl SummaryController {
    pub fn new(model: Arc<dyn CompletionModel>, article: ArticleSnapshot) -> Self {
        Self {
            model,
            article,
            state: SummaryState::Idle,
            cache: HashMap::new(),
            generation: 0,
        }
    }

    pub fn state(&self) -> &SummaryState {
        &self.state
    }

    pub fn article(&self) -> &ArticleSnapshot {
        &self.article
    }

    fn eligible(&self) -> bool {
        classify(&self.article.source_url) == PageKind::Article
    }

    /// Entry point for a fresh page view: reads the configured level and
    /// runs. Level 0 (full article) and non-article pages short-circuit with
    /// no network call; an empty extracted body aborts silently.
    pub async fn start(&mut self, prefs: &dyn PreferenceStore, view: &mut dyn SummaryView) {
        let level = prefs
            .get(&[PrefKey::SummaryLevel])
            .await
            .ok()
            .and_then(|stored| stored.summary_level)
            .unwrap_or_default();
        self.run_at(level, view).await;
    }

    async fn run_at(&mut self, level: SummaryLevel, view: &mut dyn SummaryView) {
        if !self.eligible() || level == SummaryLevel::Full {
            self.state = SummaryState::Idle;
            return;
        }
        if !self.article.has_body() {
            // Usually "not really an article page"; silently do nothing.
            debug!("no article body extracted; skipping summary");
            self.state = SummaryState::Idle;
            return;
        }
        self.request(level, view).await;
    }

    async fn request(&mut self, level: SummaryLevel, view: &mut dyn SummaryView) {
        if let Some(cached) = self.cache.get(&level) {
            view.render_summary(cached);
            self.state = SummaryState::Shown { level };
            return;
        }

        let Some(request) = prompts::summary_request(&self.article, level) else {
            self.state = SummaryState::Idle;
            return;
        };

        self.generation += 1;
        let generation = self.generation;
        self.state = SummaryState::Loading { level };
        view.render_loading(level);

        match self.model.complete(&request).await {
            Ok(html) => {
                if generation != self.generation {
                    debug!("discarding superseded summary response");
                    return;
                }
                let result = SummaryResult { level, html };
                view.render_summary(&result);
                self.cache.insert(level, result);
                self.state = SummaryState::Shown { level };
            }
            Err(e) => {
                if generation != self.generation {
                    return;
                }
                let message = e.to_string();
                view.render_error(&message);
                self.state = SummaryState::Failed { level, message };
            }
        }
    }

    /// Manual retry from `Failed`; a no-op in any other state.
    pub async fn retry(&mut self, view: &mut dyn SummaryView) {
        if let SummaryState::Failed { level, .. } = self.state.clone() {
            self.request(level, view).await;
        }
    }

    /// "Read full article": removes the overlay and ends summarization for
    /// this page view.
    pub fn dismiss(&mut self, view: &mut dyn SummaryView) {
        if matches!(self.state, SummaryState::Shown { .. }) {
            view.clear();
            self.state = SummaryState::Dismissed;
        }
    }

    /// Live-subscription delivery: the persisted level changed while the
    /// page is open. Discards every cached result and re-runs at the new
    /// level (or clears down to `Idle` for level 0).
    pub async fn set_level(&mut self, level: SummaryLevel, view: &mut dyn SummaryView) {
        if matches!(self.state, SummaryState::Dismissed) || !self.eligible() {
            return;
        }
        self.cache.clear();
        if level == SummaryLevel::Full {
            view.clear();
            self.state = SummaryState::Idle;
            return;
        }
        self.run_at(level, view).await;
    }

    /// Drives the controller from a preference change feed until the feed
    /// closes. Only summary-level events re-run it.
    pub async fn follow(
        &mut self,
        mut events: broadcast::Receiver<PrefChange>,
        view: &mut dyn SummaryView,
    ) {
        loop {
            match events.recv().await {
                Ok(PrefChange::SummaryLevel(level)) => self.set_level(level, view).await,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("summary controller lagged {} preference events", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nl_core::prefs::PrefUpdate;
    use nl_core::Result;
    use nl_inference::CompletionRequest;
    use nl_prefs::MemoryPrefs;
    use std::sync::Mutex;

    /// Scripted model that records every request it sees.
    struct FakeModel {
        requests: Mutex<Vec<CompletionRequest>>,
        fail: bool,
    }

    impl FakeModel {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                fail: true,
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last_request(&self) -> CompletionRequest {
            self.requests.lock().unwrap().last().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionModel for FakeModel {
        fn name(&self) -> &str {
            "fake"
        }

        async fn complete_raw(&self, request: &CompletionRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(nl_core::Error::RemoteApi("scripted failure".to_string()));
            }
            Ok(format!("<p>summary at {} tokens</p>", request.max_tokens))
        }
    }

    #[derive(Default)]
    struct RecordingView {
        loading: Vec<SummaryLevel>,
        summaries: Vec<SummaryResult>,
        errors: Vec<String>,
        cleared: usize,
    }

    impl SummaryView for RecordingView {
        fn render_loading(&mut self, level: SummaryLevel) {
            self.loading.push(level);
        }

        fn render_summary(&mut self, result: &SummaryResult) {
            self.summaries.push(result.clone());
        }

        fn render_error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }

        fn clear(&mut self) {
            self.cleared += 1;
        }
    }

    fn article() -> ArticleSnapshot {
        ArticleSnapshot {
            title: "T".to_string(),
            body_text: vec!["word"; 250].join(" "),
            source_url: "https://thehackernews.com/2025/11/t.html".to_string(),
        }
    }

    async fn prefs_at(level: SummaryLevel) -> MemoryPrefs {
        let prefs = MemoryPrefs::new();
        prefs
            .set(PrefUpdate {
                summary_level: Some(level),
                ..Default::default()
            })
            .await
            .unwrap();
        prefs
    }

    #[tokio::test]
    async fn test_level_full_short_circuits_without_network() {
        let model = FakeModel::new();
        let mut controller = SummaryController::new(model.clone(), article());
        let mut view = RecordingView::default();

        controller.start(&prefs_at(SummaryLevel::Full).await, &mut view).await;
        assert_eq!(*controller.state(), SummaryState::Idle);
        assert_eq!(model.calls(), 0);
        assert!(view.loading.is_empty());
    }

    #[tokio::test]
    async fn test_non_article_page_is_a_noop() {
        let model = FakeModel::new();
        let snapshot = ArticleSnapshot {
            source_url: "https://thehackernews.com/search?q=x".to_string(),
            ..article()
        };
        let mut controller = SummaryController::new(model.clone(), snapshot);
        let mut view = RecordingView::default();

        controller.start(&prefs_at(SummaryLevel::Medium).await, &mut view).await;
        assert_eq!(*controller.state(), SummaryState::Idle);
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_body_aborts_silently() {
        let model = FakeModel::new();
        let snapshot = ArticleSnapshot {
            body_text: String::new(),
            ..article()
        };
        let mut controller = SummaryController::new(model.clone(), snapshot);
        let mut view = RecordingView::default();

        controller.start(&prefs_at(SummaryLevel::Medium).await, &mut view).await;
        assert_eq!(*controller.state(), SummaryState::Idle);
        assert_eq!(model.calls(), 0);
        assert!(view.errors.is_empty(), "empty body is not a user-visible error");
    }

    #[tokio::test]
    async fn test_medium_and_brief_token_limits() {
        let model = FakeModel::new();
        let mut controller = SummaryController::new(model.clone(), article());
        let mut view = RecordingView::default();

        controller.start(&prefs_at(SummaryLevel::Medium).await, &mut view).await;
        let request = model.last_request();
        assert_eq!(request.max_tokens, 500);
        assert!(request.messages[1].content.contains("150-200 words"));

        controller.set_level(SummaryLevel::Brief, &mut view).await;
        let request = model.last_request();
        assert_eq!(request.max_tokens, 250);
        assert!(request.messages[1].content.contains("50-75 words"));
    }

    #[tokio::test]
    async fn test_second_request_at_same_level_is_cached() {
        let model = FakeModel::new();
        let mut controller = SummaryController::new(model.clone(), article());
        let mut view = RecordingView::default();
        let prefs = prefs_at(SummaryLevel::Medium).await;

        controller.start(&prefs, &mut view).await;
        controller.start(&prefs, &mut view).await;

        assert_eq!(model.calls(), 1, "second view must come from the cache");
        assert_eq!(view.summaries.len(), 2);
        assert!(matches!(controller.state(), SummaryState::Shown { .. }));
    }

    #[tokio::test]
    async fn test_level_change_discards_cache_and_reloads() {
        let model = FakeModel::new();
        let mut controller = SummaryController::new(model.clone(), article());
        let mut view = RecordingView::default();

        controller.start(&prefs_at(SummaryLevel::Medium).await, &mut view).await;
        assert_eq!(model.calls(), 1);

        controller.set_level(SummaryLevel::Brief, &mut view).await;
        assert_eq!(model.calls(), 2);
        assert!(matches!(
            controller.state(),
            SummaryState::Shown { level: SummaryLevel::Brief }
        ));

        // The medium result was discarded, so going back costs a new call.
        controller.set_level(SummaryLevel::Medium, &mut view).await;
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test]
    async fn test_markdown_bold_in_model_output_is_rendered_as_html() {
        struct MarkdownModel;

        #[async_trait]
        impl CompletionModel for MarkdownModel {
            fn name(&self) -> &str {
                "markdown"
            }

            async fn complete_raw(&self, _request: &CompletionRequest) -> Result<String> {
                Ok("A **critical** flaw".to_string())
            }
        }

        let mut controller = SummaryController::new(Arc::new(MarkdownModel), article());
        let mut view = RecordingView::default();
        controller.start(&prefs_at(SummaryLevel::Medium).await, &mut view).await;
        assert_eq!(view.summaries[0].html, "A <strong>critical</strong> flaw");
    }

    #[tokio::test]
    async fn test_failure_renders_error_and_retry_reenters_loading() {
        let model = FakeModel::failing();
        let mut controller = SummaryController::new(model.clone(), article());
        let mut view = RecordingView::default();

        controller.start(&prefs_at(SummaryLevel::Medium).await, &mut view).await;
        assert!(matches!(controller.state(), SummaryState::Failed { .. }));
        assert_eq!(view.errors.len(), 1);

        controller.retry(&mut view).await;
        assert_eq!(model.calls(), 2);
        assert_eq!(view.loading.len(), 2);
    }

    #[tokio::test]
    async fn test_dismiss_clears_overlay_and_is_terminal() {
        let model = FakeModel::new();
        let mut controller = SummaryController::new(model.clone(), article());
        let mut view = RecordingView::default();

        controller.start(&prefs_at(SummaryLevel::Medium).await, &mut view).await;
        controller.dismiss(&mut view);
        assert_eq!(*controller.state(), SummaryState::Dismissed);
        assert_eq!(view.cleared, 1);

        // A level change after dismissal must not resurrect the overlay.
        controller.set_level(SummaryLevel::Brief, &mut view).await;
        assert_eq!(*controller.state(), SummaryState::Dismissed);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_level_change_to_full_clears_to_idle() {
        let model = FakeModel::new();
        let mut controller = SummaryController::new(model.clone(), article());
        let mut view = RecordingView::default();

        controller.start(&prefs_at(SummaryLevel::Medium).await, &mut view).await;
        controller.set_level(SummaryLevel::Full, &mut view).await;
        assert_eq!(*controller.state(), SummaryState::Idle);
        assert_eq!(view.cleared, 1);
    }

    #[tokio::test]
    async fn test_live_subscription_rerenders_on_pref_change() {
        let model = FakeModel::new();
        let mut controller = SummaryController::new(model.clone(), article());
        let mut view = RecordingView::default();
        let prefs = prefs_at(SummaryLevel::Medium).await;

        controller.start(&prefs, &mut view).await;
        let mut events = prefs.subscribe();
        prefs
            .set(PrefUpdate {
                summary_level: Some(SummaryLevel::Brief),
                ..Default::default()
            })
            .await
            .unwrap();

        // Deliver the single pending event the way `follow` would.
        match events.recv().await.unwrap() {
            PrefChange::SummaryLevel(level) => controller.set_level(level, &mut view).await,
            other => panic!("unexpected event {other:?}"),
        }
        assert!(matches!(
            controller.state(),
            SummaryState::Shown { level: SummaryLevel::Brief }
        ));
        assert_eq!(model.calls(), 2);
    }
}
