//! Element discovery
//!
//! The comment section streams in some time after the extension's script
//! runs, so a one-shot lookup at injection time usually misses. Discovery
//! polls with a bounded budget: attempt, sleep one interval, attempt
//! again, until the target exists or the budget is gone.
//!
//! One session, one callback invocation, always. Retries are timer
//! wakeups on the runtime, never threads, and a session cannot be
//! cancelled once issued. Sessions do not interact with each other.

use crate::CommentPage;
use dom::{Document, ElementRef, Selector};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry budget for one discovery session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total time budget. A zero budget reports absence without a single
    /// lookup.
    pub timeout: Duration,
    /// Delay between attempts.
    pub interval: Duration,
}

impl PollPolicy {
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(30_000),
            interval: Duration::from_millis(200),
        }
    }
}

/// Poll until `selector` matches or the budget runs out.
///
/// Attempts happen at strictly increasing times and the remaining budget
/// shrinks by one interval per sleep, so the total scheduled wait never
/// exceeds the timeout and an absent target costs `ceil(timeout /
/// interval)` lookups.
pub async fn wait_for(
    document: &Document,
    selector: &Selector,
    policy: PollPolicy,
) -> Option<ElementRef> {
    if policy.timeout.is_zero() {
        debug!(selector = %selector, "zero budget, reporting absence without looking");
        return None;
    }

    let mut remaining = policy.timeout;
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        if let Some(found) = document.query_selector(selector, None) {
            debug!(selector = %selector, attempts, "target present");
            return Some(found);
        }
        if remaining > policy.interval {
            sleep(policy.interval).await;
            remaining -= policy.interval;
        } else {
            warn!(selector = %selector, attempts, "budget exhausted, target never appeared");
            return None;
        }
    }
}

impl CommentPage {
    /// Await-style discovery of an arbitrary selector.
    pub async fn wait_for(&self, selector: &Selector, policy: PollPolicy) -> Option<ElementRef> {
        wait_for(self.document(), selector, policy).await
    }

    /// Await-style discovery of the comment container.
    pub async fn wait_for_comment_section(&self, policy: PollPolicy) -> Option<ElementRef> {
        wait_for(self.document(), &self.selectors().section, policy).await
    }

    /// Fire-and-forget discovery. Returns immediately; `on_ready` runs
    /// exactly once, with the element or with None once the budget is
    /// exhausted.
    pub fn discover<F>(&self, selector: Selector, policy: PollPolicy, on_ready: F)
    where
        F: FnOnce(Option<ElementRef>) + Send + 'static,
    {
        let document = self.document().clone();
        tokio::spawn(async move {
            let found = wait_for(&document, &selector, policy).await;
            on_ready(found);
        });
    }

    /// Fire-and-forget discovery of the comment container.
    pub fn discover_comment_section<F>(&self, policy: PollPolicy, on_ready: F)
    where
        F: FnOnce(Option<ElementRef>) + Send + 'static,
    {
        self.discover(self.selectors().section.clone(), policy, on_ready);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use crate::messages::StaticMessages;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn page() -> CommentPage {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        CommentPage::new(
            Document::new(),
            PageConfig::default(),
            Arc::new(StaticMessages::new()),
        )
        .unwrap()
    }

    fn sel(input: &str) -> Selector {
        Selector::parse(input).unwrap()
    }

    fn install_comment_section(document: &Document) -> ElementRef {
        let comments = document.create_element("ytd-comments");
        let contents = document.create_element("div");
        contents.set_attribute("id", "contents");
        comments.append_child(&contents);
        document.root().append_child(&comments);
        contents
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget_reports_absence_without_looking() {
        let page = page();
        // target is present, but a zero budget must not even look
        install_comment_section(page.document());

        let start = Instant::now();
        let found = page
            .wait_for_comment_section(PollPolicy::new(Duration::ZERO, ms(200)))
            .await;

        assert!(found.is_none());
        assert_eq!(start.elapsed(), ms(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_exhaustion_when_target_never_appears() {
        let page = page();

        let start = Instant::now();
        let found = page
            .wait_for(&sel("ytd-comments #contents"), PollPolicy::new(ms(1000), ms(200)))
            .await;

        assert!(found.is_none());
        // five attempts, four sleeps: total scheduled wait stays within
        // one interval of the budget
        assert_eq!(start.elapsed(), ms(800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_hit_returns_without_sleeping() {
        let page = page();
        let section = install_comment_section(page.document());

        let start = Instant::now();
        let found = page
            .wait_for_comment_section(PollPolicy::default())
            .await;

        assert_eq!(found, Some(section));
        assert_eq!(start.elapsed(), ms(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_discovers_subtree_inserted_mid_session() {
        let page = page();
        let host = page.document().clone();
        tokio::spawn(async move {
            tokio::time::sleep(ms(450)).await;
            install_comment_section(&host);
        });

        let start = Instant::now();
        let found = page
            .wait_for_comment_section(PollPolicy::new(ms(1000), ms(200)))
            .await
            .expect("section appears within budget");

        assert_eq!(found.attribute("id").as_deref(), Some("contents"));
        // attempts at 0/200/400 miss, the 600ms attempt lands
        assert_eq!(start.elapsed(), ms(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_fires_exactly_once_with_element() {
        let page = page();
        install_comment_section(page.document());

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let (tx, rx) = tokio::sync::oneshot::channel();

        page.discover_comment_section(PollPolicy::default(), move |found| {
            seen.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(found);
        });

        let found = rx.await.unwrap();
        assert!(found.is_some());

        // well past any conceivable retry; no second invocation
        tokio::time::sleep(ms(60_000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_fires_exactly_once_on_timeout() {
        let page = page();

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let (tx, rx) = tokio::sync::oneshot::channel();

        page.discover_comment_section(PollPolicy::new(ms(1000), ms(200)), move |found| {
            seen.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(found);
        });

        let found = rx.await.unwrap();
        assert!(found.is_none());

        tokio::time::sleep(ms(60_000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sessions_are_independent() {
        let page = page();
        install_comment_section(page.document());

        let (tx_hit, rx_hit) = tokio::sync::oneshot::channel();
        let (tx_miss, rx_miss) = tokio::sync::oneshot::channel();

        // one session finds its target, a second one times out; neither
        // cancels or disturbs the other
        page.discover_comment_section(PollPolicy::default(), move |found| {
            let _ = tx_hit.send(found.is_some());
        });
        page.discover(
            sel("#never-rendered"),
            PollPolicy::new(ms(600), ms(200)),
            move |found| {
                let _ = tx_miss.send(found.is_some());
            },
        );

        assert!(rx_hit.await.unwrap());
        assert!(!rx_miss.await.unwrap());
    }
}
