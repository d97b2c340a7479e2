use std::{collections::HashMap, path::Path, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::{
    domain::{ChatId, MessageRef},
    messaging::port::MessagingPort,
    Result,
};

#[derive(Debug)]
struct IntervalLimiter {
    interval: Duration,
    next: Instant,
}

impl IntervalLimiter {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now(),
        }
    }

    /// Reserve the next slot and return the wait duration required before
    /// executing.
    fn reserve(&mut self) -> Duration {
        let now = Instant::now();
        let start = if now >= self.next { now } else { self.next };
        self.next = start + self.interval;
        start.saturating_duration_since(now)
    }
}

/// MessagingPort decorator that spaces consecutive file uploads to one chat
/// by a fixed interval, to stay under the platform's rate limits when a
/// multi-page conversion produces many attachments.
///
/// Text sends pass through unpaced; only uploads are spaced.
pub struct PacedMessenger {
    inner: Arc<dyn MessagingPort>,
    upload_interval: Duration,
    per_chat: Mutex<HashMap<i64, Arc<Mutex<IntervalLimiter>>>>,
}

impl PacedMessenger {
    pub fn new(inner: Arc<dyn MessagingPort>, upload_interval: Duration) -> Self {
        Self {
            inner,
            upload_interval,
            per_chat: Mutex::new(HashMap::new()),
        }
    }

    async fn limiter_for_chat(&self, chat_id: i64) -> Arc<Mutex<IntervalLimiter>> {
        let mut map = self.per_chat.lock().await;
        map.entry(chat_id)
            .or_insert_with(|| Arc::new(Mutex::new(IntervalLimiter::new(self.upload_interval))))
            .clone()
    }

    async fn pace_upload(&self, chat_id: i64) {
        let wait = {
            let lim = self.limiter_for_chat(chat_id).await;
            let mut guard = lim.lock().await;
            guard.reserve()
        };
        if wait > Duration::from_millis(0) {
            sleep(wait).await;
        }
    }
}

#[async_trait::async_trait]
impl MessagingPort for PacedMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        self.inner.send_text(chat_id, text).await
    }

    async fn upload_document(
        &self,
        chat_id: ChatId,
        path: &Path,
        caption: Option<&str>,
    ) -> Result<()> {
        self.pace_upload(chat_id.0).await;
        self.inner.upload_document(chat_id, path, caption).await
    }
}
