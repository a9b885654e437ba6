use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

use regex::Regex;
use tokio::{task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use super::{adapter::HostAdapter, embed::EmbeddedRoot};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

const BLOCK_INPUT_PREFIX: &str = "block-input-";

fn rendered_input_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^block-input-(.+)-([A-Za-z0-9_-]{9})$").expect("static pattern compiles")
    })
}

/// Id of the rendered input for `uid` inside `root`, if the host has drawn it.
pub fn locate_rendered_input_id(uid: &str, root: &dyn EmbeddedRoot) -> Option<String> {
    let suffix = format!("-{uid}");
    root.rendered_input_ids()
        .into_iter()
        .find(|id| id.starts_with(BLOCK_INPUT_PREFIX) && id.ends_with(&suffix))
}

/// The host window id encoded in a rendered input id
/// (`block-input-{window}-{9-char uid}`).
pub fn window_id_from_input_id(input_id: &str) -> Option<String> {
    rendered_input_pattern()
        .captures(input_id)
        .and_then(|captures| captures.get(1))
        .map(|window| window.as_str().to_string())
}

pub fn resolve_window_id(uid: &str, root: &dyn EmbeddedRoot) -> Option<String> {
    locate_rendered_input_id(uid, root).and_then(|id| window_id_from_input_id(&id))
}

impl HostAdapter {
    /// One focus attempt. `false` when the block is not rendered yet or the
    /// host refused.
    pub async fn focus_rendered(&self, uid: &str, root: &dyn EmbeddedRoot) -> bool {
        let Some(window_id) = resolve_window_id(uid, root) else {
            return false;
        };
        match self.api().focus_block(uid, &window_id).await {
            Ok(()) => true,
            Err(err) => {
                log_warn!("focus of {uid} in window {window_id} failed: {err}");
                false
            }
        }
    }

    /// Retries [`focus_rendered`](Self::focus_rendered) at each offset in
    /// `delays` (measured from now) until one attempt lands.
    pub fn focus_with_retries(
        &self,
        uid: &str,
        root: Arc<dyn EmbeddedRoot>,
        delays: &[Duration],
    ) -> FocusRetry {
        let token = CancellationToken::new();
        let token_clone = token.clone();
        let adapter = self.clone();
        let uid = uid.to_string();
        let delays = delays.to_vec();

        let handle = tokio::spawn(async move {
            let started = time::Instant::now();
            for (attempt, delay) in delays.into_iter().enumerate() {
                tokio::select! {
                    _ = token_clone.cancelled() => return false,
                    _ = time::sleep_until(started + delay) => {}
                }
                if adapter.focus_rendered(&uid, root.as_ref()).await {
                    log_debug!("focused {uid} on attempt {}", attempt + 1);
                    return true;
                }
            }
            log_debug!("gave up focusing {uid}");
            false
        });

        FocusRetry { token, handle }
    }
}

/// A running bounded-retry focus task.
pub struct FocusRetry {
    token: CancellationToken,
    handle: JoinHandle<bool>,
}

impl FocusRetry {
    /// Stops any attempts that have not run yet.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Whether some attempt succeeded.
    pub async fn outcome(self) -> bool {
        self.handle.await.unwrap_or(false)
    }
}

/// Focus helpers exposed for manual inspection while a session is active.
#[derive(Clone)]
pub struct FocusDebug {
    adapter: HostAdapter,
    delays: Vec<Duration>,
}

impl FocusDebug {
    pub fn new(adapter: HostAdapter, delays: Vec<Duration>) -> Self {
        Self { adapter, delays }
    }

    pub fn rendered_input_id(&self, uid: &str, root: &dyn EmbeddedRoot) -> Option<String> {
        locate_rendered_input_id(uid, root)
    }

    pub fn window_id(&self, uid: &str, root: &dyn EmbeddedRoot) -> Option<String> {
        resolve_window_id(uid, root)
    }

    pub async fn focus(&self, uid: &str, root: &dyn EmbeddedRoot) -> bool {
        self.adapter.focus_rendered(uid, root).await
    }

    pub fn focus_with_retries(&self, uid: &str, root: Arc<dyn EmbeddedRoot>) -> FocusRetry {
        self.adapter.focus_with_retries(uid, root, &self.delays)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_id_is_everything_between_prefix_and_uid() {
        assert_eq!(
            window_id_from_input_id("block-input-sticky-main-abcDEF12_"),
            Some("sticky-main".to_string())
        );
        assert_eq!(
            window_id_from_input_id("block-input-a-b-c-123456789"),
            Some("a-b-c".to_string())
        );
    }

    #[test]
    fn malformed_input_ids_resolve_to_nothing() {
        assert_eq!(window_id_from_input_id("block-input-short"), None);
        assert_eq!(window_id_from_input_id("block-input--abcdefghi"), None);
        assert_eq!(window_id_from_input_id("input-w-abcdefghi"), None);
        assert_eq!(window_id_from_input_id("block-input-w-abc.efghi"), None);
    }
}
