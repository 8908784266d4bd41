//! The content navigator: owns navigation state, the sidebar model, and the
//! history stack, and drives the fetch-and-swap load sequence against an
//! abstract [`ContentView`].
//!
//! The view seam carries exactly the operations the component performs on a
//! page: replace the content region's markup, toggle animation classes, set
//! the document title, inject the transition stylesheet, scroll an element
//! into view, and raise the placeholder quiz acknowledgement.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info};
use url::Url;

use crate::client::PageClient;
use crate::fragment::{self, InteractiveScan};
use crate::history::{History, HistoryEntry};
use crate::{NavError, Topic, history_url, resolve_url};

/// The DOM-shaped surface the navigator mutates.
pub trait ContentView {
    /// Replaces the content region's inner markup.
    fn set_content(&mut self, html: &str);
    fn add_class(&mut self, class: &str);
    fn remove_class(&mut self, class: &str);
    fn set_title(&mut self, title: &str);
    fn inject_stylesheet(&mut self, css: &str);
    fn scroll_to(&mut self, id: &str);
    fn alert(&mut self, message: &str);
}

/// Fixed delays between transition phases. The waits are unconditional; they
/// are not tied to any transition-end signal.
#[derive(Debug, Clone, Copy)]
pub struct TransitionTiming {
    pub slide_out: Duration,
    pub slide_in: Duration,
}

impl Default for TransitionTiming {
    fn default() -> Self {
        Self {
            slide_out: Duration::from_millis(150),
            slide_in: Duration::from_millis(50),
        }
    }
}

impl TransitionTiming {
    /// Zero delays, for tests and non-interactive front ends.
    pub fn immediate() -> Self {
        Self {
            slide_out: Duration::ZERO,
            slide_in: Duration::ZERO,
        }
    }
}

/// Transient navigation state, owned by the navigator and exposed so callers
/// can assert on it directly instead of through view side effects.
#[derive(Debug, Default)]
pub struct NavState {
    loading: bool,
    current_topic: Option<String>,
}

impl NavState {
    /// Whether a load sequence is in flight. At most one ever is.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn current_topic(&self) -> Option<&str> {
        self.current_topic.as_deref()
    }
}

/// One sidebar row. Rows without a topic are inert headings.
#[derive(Debug, Clone)]
pub struct SidebarEntry {
    pub label: String,
    pub topic: Option<String>,
    active: bool,
}

impl SidebarEntry {
    pub fn lesson(label: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            topic: Some(topic.into()),
            active: false,
        }
    }

    pub fn heading(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            topic: None,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// The sidebar's entry list and active-row bookkeeping.
#[derive(Debug, Default)]
pub struct Sidebar {
    entries: Vec<SidebarEntry>,
}

impl Sidebar {
    pub fn new(entries: Vec<SidebarEntry>) -> Self {
        Self { entries }
    }

    /// Builds the sidebar from a page's `.sidebar li` rows.
    pub fn from_document(html: &str) -> Self {
        Self {
            entries: fragment::sidebar_items(html)
                .into_iter()
                .map(|item| SidebarEntry {
                    label: item.label,
                    topic: item.topic,
                    active: false,
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[SidebarEntry] {
        &self.entries
    }

    pub fn active_index(&self) -> Option<usize> {
        self.entries.iter().position(|entry| entry.active)
    }

    fn activate(&mut self, index: usize) {
        for entry in &mut self.entries {
            entry.active = false;
        }
        if let Some(entry) = self.entries.get_mut(index) {
            entry.active = true;
        }
    }

    /// Marks the entry with the given topic id active. When no entry matches,
    /// the existing highlight is left alone.
    fn highlight_topic(&mut self, topic_id: &str) {
        let Some(index) = self
            .entries
            .iter()
            .position(|entry| entry.topic.as_deref() == Some(topic_id))
        else {
            return;
        };
        self.activate(index);
    }
}

/// How a load request ended. `Busy` means the request was ignored because a
/// load was already in flight; nothing was queued or cancelled.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded,
    Busy,
    Failed(NavError),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded)
    }
}

/// What a back/forward request did. `Restored` means the cursor moved to an
/// entry that carries no topic state, so only the page address changed.
#[derive(Debug)]
pub enum Replay {
    Loaded(LoadOutcome),
    Restored,
}

impl Replay {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Replay::Loaded(LoadOutcome::Loaded))
    }
}

/// Client-side navigator for a static curriculum site.
pub struct Navigator<V: ContentView> {
    view: V,
    client: PageClient,
    timing: TransitionTiming,
    state: NavState,
    sidebar: Sidebar,
    history: History,
    page_url: Url,
    interactive: InteractiveScan,
}

impl<V: ContentView> Navigator<V> {
    /// `page_url` is the absolute address of the page hosting the navigator;
    /// lesson URLs resolve relative to it and it tracks every history
    /// rewrite afterwards.
    pub fn new(view: V, page_url: Url, sidebar: Sidebar) -> Result<Self, NavError> {
        Ok(Self {
            view,
            client: PageClient::new()?,
            timing: TransitionTiming::default(),
            state: NavState::default(),
            sidebar,
            history: History::new(page_url.path()),
            page_url,
            interactive: InteractiveScan::default(),
        })
    }

    pub fn with_timing(mut self, timing: TransitionTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Startup pass: inject the transition stylesheet, scan the initial
    /// document for interactive elements, highlight the sidebar entry the
    /// current `/curriculum/<lang>/<leaf>` path names, and, when the query
    /// string carries `topic=<id>`, immediately load it. The query load runs
    /// in addition to the path highlight, not instead of it.
    pub async fn activate(&mut self, initial_html: &str) -> Option<LoadOutcome> {
        self.view.inject_stylesheet(&transition_stylesheet());
        self.interactive = InteractiveScan::of_document(initial_html);
        self.highlight_from_path();
        let topic = self
            .page_url
            .query_pairs()
            .find(|(key, _)| key == "topic")
            .map(|(_, value)| value.into_owned())?;
        Some(self.load(&topic).await)
    }

    fn highlight_from_path(&mut self) {
        let path = self.page_url.path().to_string();
        if !path.contains("/curriculum/") {
            return;
        }
        let parts: Vec<&str> = path.split('/').collect();
        let lang = parts
            .get(parts.len().saturating_sub(2))
            .copied()
            .unwrap_or_default();
        let leaf = match parts.last().copied().unwrap_or_default() {
            "" => "intro",
            leaf => leaf,
        };
        self.sidebar.highlight_topic(&format!("{lang}-{leaf}"));
    }

    /// Runs the full load sequence for a topic id. Ignored while another
    /// load is in flight; failures land in the error panel and the loading
    /// flag is cleared on every path out.
    pub async fn load(&mut self, topic_id: &str) -> LoadOutcome {
        if self.state.loading {
            return LoadOutcome::Busy;
        }
        self.state.loading = true;
        let outcome = match self.load_inner(topic_id).await {
            Ok(()) => LoadOutcome::Loaded,
            Err(err) => {
                error!(error = %err, topic = topic_id, "error loading content");
                self.view.set_content(&error_panel_markup());
                LoadOutcome::Failed(err)
            }
        };
        self.state.loading = false;
        outcome
    }

    async fn load_inner(&mut self, topic_id: &str) -> Result<(), NavError> {
        let topic = Topic::parse(topic_id)?;
        let relative = resolve_url(&topic, self.page_url.path());
        self.view.set_content(&loading_markup());
        let body = self.client.fetch_page(&self.page_url, &relative).await?;
        let page = fragment::extract_lesson(&body)?;
        if let Some(title) = &page.title {
            self.view.set_title(title);
        }
        self.run_transition(&page.content_html).await;
        // The pushed address comes from the relative fetch URL, so a
        // same-language load rewrites to `/<file>`; `..` segments normalize
        // away as a browser address bar would.
        self.page_url.set_path(&history_url(&relative));
        self.history.push(self.page_url.path(), topic.id());
        self.state.current_topic = Some(topic.id());
        info!(topic = %topic, url = %self.page_url.path(), "lesson loaded");
        Ok(())
    }

    async fn run_transition(&mut self, new_content: &str) {
        self.view.add_class("slide-out-left");
        sleep(self.timing.slide_out).await;
        self.view.set_content(new_content);
        self.view.remove_class("slide-out-left");
        self.view.add_class("slide-in-right");
        sleep(self.timing.slide_in).await;
        self.view.remove_class("slide-in-right");
        self.view.add_class("slide-active");
        self.interactive = InteractiveScan::of_fragment(new_content);
    }

    /// Click path: entries without a topic are inert; otherwise the clicked
    /// entry becomes the active one before the load runs.
    pub async fn click_entry(&mut self, index: usize) -> Option<LoadOutcome> {
        let topic = self.sidebar.entries.get(index)?.topic.clone()?;
        self.sidebar.activate(index);
        Some(self.load(&topic).await)
    }

    /// Back/forward replay. Restores the entry's URL, then re-runs the load
    /// sequence when the entry carries a topic. `None` only when the cursor
    /// cannot move. Unlike the click path, the sidebar's active highlight is
    /// deliberately not touched here.
    pub async fn back(&mut self) -> Option<Replay> {
        let entry = self.history.back()?.clone();
        self.replay(entry).await
    }

    pub async fn forward(&mut self) -> Option<Replay> {
        let entry = self.history.forward()?.clone();
        self.replay(entry).await
    }

    async fn replay(&mut self, entry: HistoryEntry) -> Option<Replay> {
        self.page_url.set_path(&entry.url);
        match entry.topic {
            Some(topic) => Some(Replay::Loaded(self.load(&topic).await)),
            None => Some(Replay::Restored),
        }
    }

    /// Intercepted quiz submission: never navigates, raises the placeholder
    /// acknowledgement once per call. Returns false for an unknown form.
    pub fn submit_quiz(&mut self, form_index: usize) -> bool {
        if form_index >= self.interactive.quiz_forms {
            return false;
        }
        self.view
            .alert("Quiz submitted! (Evaluation logic would go here)");
        true
    }

    /// Intercepted in-page anchor click: scrolls the target into view when
    /// it exists in the current content, otherwise does nothing.
    pub fn follow_anchor(&mut self, href: &str) -> bool {
        if !self.interactive.has_target(href) {
            return false;
        }
        let id = href.strip_prefix('#').unwrap_or(href);
        self.view.scroll_to(id);
        true
    }
}

/// Placeholder rendered into the content region while a fetch is in flight.
pub fn loading_markup() -> String {
    r#"<div class="loading">
    <div class="loading-spinner"></div>
    Loading lesson...
</div>"#
        .to_string()
}

/// Fixed panel shown for every load failure; recovery is the reload button.
pub fn error_panel_markup() -> String {
    r#"<div style="text-align: center; padding: 50px; color: #e74c3c;">
    <h3>Error Loading Content</h3>
    <p>Sorry, we couldn't load the lesson content. Please try again.</p>
    <button onclick="location.reload()" style="padding: 10px 20px; background: #3498db; color: white; border: none; border-radius: 5px; cursor: pointer;">
        Reload Page
    </button>
</div>"#
        .to_string()
}

/// The stylesheet the navigator injects at activation: the slide classes the
/// transition toggles plus the loading spinner. Page-lifetime scoped; this is
/// the only artifact the component creates.
pub fn transition_stylesheet() -> String {
    r#".content-area {
    position: relative;
    overflow: hidden;
}

#description {
    transition: transform 0.3s ease-in-out, opacity 0.3s ease-in-out;
}

.slide-in-right {
    transform: translateX(100%);
    opacity: 0;
}

.slide-in-left {
    transform: translateX(-100%);
    opacity: 0;
}

.slide-out-right {
    transform: translateX(-100%);
    opacity: 0;
}

.slide-out-left {
    transform: translateX(100%);
    opacity: 0;
}

.slide-active {
    transform: translateX(0);
    opacity: 1;
}

.loading {
    display: flex;
    justify-content: center;
    align-items: center;
    height: 200px;
    font-size: 1.2em;
    color: #666;
}

.loading-spinner {
    border: 3px solid #f3f3f3;
    border-top: 3px solid #3498db;
    border-radius: 50%;
    width: 30px;
    height: 30px;
    animation: spin 1s linear infinite;
    margin-right: 10px;
}

@keyframes spin {
    0% { transform: rotate(0deg); }
    100% { transform: rotate(360deg); }
}
"#
    .to_string()
}
