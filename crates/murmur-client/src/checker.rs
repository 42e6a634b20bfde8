//! Debounced, advisory content check for a message being composed.
//!
//! Edits are fed in with [`ModerationChecker::update`]. Once the draft has
//! been stable for the debounce interval, its evaluation prompt is sent to a
//! [`TextGenerator`] and the reply is classified. Only an `Inappropriate`
//! verdict disables the submit control, and the server does not enforce it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use murmur_types::genai::TextGenerator;
use murmur_types::moderation::{Verdict, evaluation_prompt};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

const CHECK_FAILED: &str = "Failed to check message content";
const UNRECOGNISED_REPLY: &str = "Moderation reply was not understood";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationReport {
    pub verdict: Verdict,
    /// A check for the current draft is scheduled or in flight.
    pub checking: bool,
    /// Set when the check could not reach a verdict.
    pub error: Option<String>,
}

impl ModerationReport {
    /// Nothing to check yet.
    pub fn waiting() -> Self {
        Self {
            verdict: Verdict::Unknown,
            checking: false,
            error: None,
        }
    }

    /// The draft changed and has not been checked yet.
    pub fn pending() -> Self {
        Self {
            checking: true,
            ..Self::waiting()
        }
    }

    /// `Unknown` never blocks: a failed or pending check leaves the
    /// decision to the sender.
    pub fn submit_enabled(&self) -> bool {
        self.verdict.allows_submit()
    }

    pub fn reason(&self) -> Option<&str> {
        match &self.verdict {
            Verdict::Inappropriate { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Run one check without debouncing.
pub async fn check_draft(generator: &dyn TextGenerator, draft: &str) -> ModerationReport {
    match generator.generate(&evaluation_prompt(draft)).await {
        Ok(reply) => {
            let verdict = Verdict::classify(&reply);
            let error = (verdict == Verdict::Unknown).then(|| UNRECOGNISED_REPLY.to_string());
            if error.is_some() {
                warn!("Unrecognised moderation reply ({} bytes)", reply.len());
            }
            ModerationReport {
                verdict,
                checking: false,
                error,
            }
        }
        Err(e) => {
            warn!("Moderation check failed: {}", e);
            ModerationReport {
                verdict: Verdict::Unknown,
                checking: false,
                error: Some(CHECK_FAILED.to_string()),
            }
        }
    }
}

pub struct ModerationChecker {
    drafts: watch::Sender<String>,
    reports: Arc<watch::Sender<ModerationReport>>,
    task: JoinHandle<()>,
}

impl ModerationChecker {
    /// Start the background checker. Must be called inside a tokio runtime.
    pub fn spawn(generator: Arc<dyn TextGenerator>, debounce: Duration) -> Self {
        let (drafts, draft_rx) = watch::channel(String::new());
        let reports = Arc::new(watch::Sender::new(ModerationReport::waiting()));
        let task = tokio::spawn(run(generator, debounce, draft_rx, reports.clone()));
        Self {
            drafts,
            reports,
            task,
        }
    }

    /// Replace the current draft and restart the debounce timer. The previous
    /// verdict is cleared at once.
    pub fn update(&self, draft: impl Into<String>) {
        let draft = draft.into();
        let report = if draft.trim().is_empty() {
            ModerationReport::waiting()
        } else {
            ModerationReport::pending()
        };
        // The draft is swapped while the report lock is held, so the task
        // cannot publish a verdict for the old draft after this returns.
        self.reports.send_modify(|current| {
            *current = report;
            self.drafts.send_replace(draft);
        });
    }

    pub fn report(&self) -> ModerationReport {
        self.reports.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ModerationReport> {
        self.reports.subscribe()
    }
}

impl Drop for ModerationChecker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    generator: Arc<dyn TextGenerator>,
    debounce: Duration,
    mut drafts: watch::Receiver<String>,
    reports: Arc<watch::Sender<ModerationReport>>,
) {
    loop {
        if drafts.changed().await.is_err() {
            return;
        }

        // Keep waiting while edits arrive faster than the debounce interval.
        loop {
            tokio::select! {
                changed = drafts.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                _ = tokio::time::sleep(debounce) => break,
            }
        }

        let draft = drafts.borrow_and_update().clone();
        if draft.trim().is_empty() {
            continue;
        }

        let report = check_draft(generator.as_ref(), &draft).await;

        // A newer draft arrived mid-check; its own check supersedes this one.
        let published = reports.send_if_modified(|current| {
            if drafts.has_changed().unwrap_or(false) {
                return false;
            }
            *current = report;
            true
        });
        if !published {
            debug!("Discarding verdict for stale draft");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::BoxFuture;
    use murmur_types::genai::GenAiError;
    use std::sync::Mutex;

    struct Canned {
        reply: Option<&'static str>,
        prompts: Mutex<Vec<String>>,
    }

    impl Canned {
        fn new(reply: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl TextGenerator for Canned {
        fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, GenAiError>> {
            Box::pin(async move {
                self.prompts.lock().unwrap().push(prompt.to_string());
                self.reply
                    .map(str::to_string)
                    .ok_or_else(|| GenAiError::Transport("offline".into()))
            })
        }
    }

    /// Flags any draft containing "rude".
    struct Keyword;

    impl TextGenerator for Keyword {
        fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, GenAiError>> {
            Box::pin(async move {
                Ok(if prompt.contains("rude") {
                    "INAPPROPRIATE: profanity".to_string()
                } else {
                    "APPROPRIATE".to_string()
                })
            })
        }
    }

    async fn settled(checker: &ModerationChecker) -> ModerationReport {
        let mut rx = checker.subscribe();
        let report = rx
            .wait_for(|r| !r.checking && (r.verdict != Verdict::Unknown || r.error.is_some()))
            .await
            .unwrap()
            .clone();
        report
    }

    #[tokio::test(start_paused = true)]
    async fn appropriate_reply_enables_submit() {
        let generator = Canned::new(Some("APPROPRIATE"));
        let checker = ModerationChecker::spawn(generator.clone(), DEFAULT_DEBOUNCE);
        assert_eq!(checker.report(), ModerationReport::waiting());

        checker.update("have a nice day");
        assert!(checker.report().checking);
        let report = settled(&checker).await;

        assert_eq!(report.verdict, Verdict::Appropriate);
        assert!(report.submit_enabled());
        assert_eq!(report.error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn inappropriate_reply_disables_submit_with_reason() {
        let generator = Canned::new(Some("INAPPROPRIATE: profanity"));
        let checker = ModerationChecker::spawn(generator, DEFAULT_DEBOUNCE);

        checker.update("some rude words");
        let report = settled(&checker).await;

        assert!(!report.submit_enabled());
        assert_eq!(report.reason(), Some("profanity"));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_unknown_and_surfaces_error() {
        let generator = Canned::new(None);
        let checker = ModerationChecker::spawn(generator, DEFAULT_DEBOUNCE);

        checker.update("hello");
        let report = settled(&checker).await;

        assert_eq!(report.verdict, Verdict::Unknown);
        assert_eq!(report.error.as_deref(), Some(CHECK_FAILED));
        assert!(report.submit_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn edit_clears_previous_verdict() {
        let checker = ModerationChecker::spawn(Arc::new(Keyword), DEFAULT_DEBOUNCE);

        checker.update("nice");
        assert_eq!(settled(&checker).await.verdict, Verdict::Appropriate);

        checker.update("rude words");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(checker.report(), ModerationReport::pending());

        let report = settled(&checker).await;
        assert_eq!(report.reason(), Some("profanity"));
        assert!(!report.submit_enabled());

        checker.update("");
        assert_eq!(checker.report(), ModerationReport::waiting());
    }

    #[tokio::test(start_paused = true)]
    async fn unparseable_reply_is_unknown() {
        let report = check_draft(Canned::new(Some("Looks fine to me")).as_ref(), "hello").await;
        assert_eq!(report.verdict, Verdict::Unknown);
        assert_eq!(report.error.as_deref(), Some(UNRECOGNISED_REPLY));
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_are_checked_once() {
        let generator = Canned::new(Some("APPROPRIATE"));
        let checker = ModerationChecker::spawn(generator.clone(), DEFAULT_DEBOUNCE);

        for draft in ["h", "he", "hel", "hello"] {
            checker.update(draft);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        settled(&checker).await;

        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("\"hello\""));
    }

    #[tokio::test(start_paused = true)]
    async fn blank_draft_is_never_sent() {
        let generator = Canned::new(Some("APPROPRIATE"));
        let checker = ModerationChecker::spawn(generator.clone(), DEFAULT_DEBOUNCE);

        checker.update("   ");
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(generator.calls().is_empty());
        assert_eq!(checker.report(), ModerationReport::waiting());
    }
}
