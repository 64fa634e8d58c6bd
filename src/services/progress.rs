use crate::api::error::AppError;
use crate::models::ProgressEvent;
use crate::services::notifier::{ON_UPLOAD_EVENT, ProgressNotifier};
use crate::services::throttle::{Clock, Throttle};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::sync::Arc;

/// Progress bookkeeping shared by every file of one upload request.
#[derive(Debug, Clone)]
pub struct UploadSession {
    pub session_id: String,
    pub throttle: Throttle,
    pub last_notified_at_ms: Option<i64>,
}

impl UploadSession {
    pub fn new(session_id: impl Into<String>, throttle: Throttle) -> Self {
        Self {
            session_id: session_id.into(),
            throttle,
            last_notified_at_ms: None,
        }
    }
}

/// Per-file state of the byte counting stage.
///
/// One relay is built for every file part. It sits between the part source
/// and the file sink, forwards every chunk untouched and reports the running
/// byte count to the session's push channel whenever the throttle allows.
pub struct ProgressRelay {
    file_name: String,
    session_id: String,
    processed_already: u64,
    last_notified_at_ms: Option<i64>,
    throttle: Throttle,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn ProgressNotifier>,
}

impl ProgressRelay {
    pub fn new(
        file_name: impl Into<String>,
        session: &UploadSession,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn ProgressNotifier>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            session_id: session.session_id.clone(),
            processed_already: 0,
            last_notified_at_ms: session.last_notified_at_ms,
            throttle: session.throttle,
            clock,
            notifier,
        }
    }

    pub fn processed_already(&self) -> u64 {
        self.processed_already
    }

    pub fn last_notified_at_ms(&self) -> Option<i64> {
        self.last_notified_at_ms
    }

    fn record(&mut self, len: usize) {
        self.processed_already += len as u64;

        let now = self.clock.now_ms();
        if !self.throttle.can_fire(now, self.last_notified_at_ms) {
            return;
        }
        self.last_notified_at_ms = Some(now);

        let event = ProgressEvent {
            processed_already: self.processed_already,
            filename: self.file_name.clone(),
        };
        match serde_json::to_value(&event) {
            Ok(payload) => {
                self.notifier
                    .notify(&self.session_id, ON_UPLOAD_EVENT, payload);
                tracing::info!(
                    "File [{}] got {} bytes to {}",
                    self.file_name,
                    self.processed_already,
                    self.session_id
                );
            }
            Err(e) => tracing::warn!("Could not encode progress for {}: {}", self.file_name, e),
        }
    }

    /// Wraps `source`, yielding its chunks unchanged.
    ///
    /// A chunk is counted once the consumer asks for the next one, so the
    /// count never runs ahead of what downstream has accepted. The first
    /// error ends the stream after being forwarded.
    pub fn relay<'a, S>(
        &'a mut self,
        source: S,
    ) -> impl Stream<Item = Result<Bytes, AppError>> + Send + 'a
    where
        S: Stream<Item = Result<Bytes, AppError>> + Send + 'a,
    {
        async_stream::stream! {
            futures::pin_mut!(source);
            while let Some(item) = source.next().await {
                match item {
                    Ok(chunk) => {
                        let len = chunk.len();
                        yield Ok(chunk);
                        self.record(len);
                    }
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        }
    }
}
