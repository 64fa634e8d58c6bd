use crate::api::error::AppError;
use crate::services::notifier::ProgressNotifier;
use crate::services::progress::{ProgressRelay, UploadSession};
use crate::services::throttle::{Clock, SystemClock, Throttle};
use crate::utils::validation::validate_file_name;
use axum::extract::Multipart;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Outcome of streaming one file part to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct FileTransfer {
    pub field_name: String,
    pub file_name: String,
    pub destination_path: PathBuf,
    pub bytes_processed: u64,
}

/// Everything written while handling one multipart request.
#[derive(Debug, Default)]
pub struct UploadSummary {
    pub files: Vec<FileTransfer>,
}

/// Streams the files of a single upload request into the downloads folder.
///
/// A handler is built per request and owns that request's session state;
/// nothing in it is shared with other requests except the notifier.
pub struct UploadHandler {
    notifier: Arc<dyn ProgressNotifier>,
    downloads_folder: PathBuf,
    session: UploadSession,
    clock: Arc<dyn Clock>,
}

impl UploadHandler {
    pub fn new(
        notifier: Arc<dyn ProgressNotifier>,
        socket_id: impl Into<String>,
        downloads_folder: impl Into<PathBuf>,
        message_time_delay_ms: i64,
    ) -> Self {
        Self {
            notifier,
            downloads_folder: downloads_folder.into(),
            session: UploadSession::new(socket_id, Throttle::new(message_time_delay_ms)),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Pipes one file part through the progress relay into
    /// `{downloads_folder}/{file_name}`.
    ///
    /// Resolves once every chunk has been written and flushed. A failed
    /// transfer leaves whatever was already written in place.
    pub async fn on_file<S>(
        &mut self,
        field_name: &str,
        file: S,
        file_name: &str,
    ) -> Result<FileTransfer, AppError>
    where
        S: Stream<Item = Result<Bytes, AppError>> + Send,
    {
        let file_name = validate_file_name(file_name)?;
        let save_to = self.downloads_folder.join(file_name);

        let mut sink = tokio::fs::File::create(&save_to)
            .await
            .map_err(|e| AppError::storage_write(&save_to, e))?;

        let mut relay = ProgressRelay::new(
            file_name,
            &self.session,
            self.clock.clone(),
            self.notifier.clone(),
        );
        let outcome = Self::pipe(&mut relay, file, &mut sink, &save_to).await;
        self.session.last_notified_at_ms = relay.last_notified_at_ms();
        outcome?;

        tracing::info!("File [{}] finished", file_name);

        Ok(FileTransfer {
            field_name: field_name.to_string(),
            file_name: file_name.to_string(),
            destination_path: save_to,
            bytes_processed: relay.processed_already(),
        })
    }

    async fn pipe<S>(
        relay: &mut ProgressRelay,
        file: S,
        sink: &mut tokio::fs::File,
        save_to: &Path,
    ) -> Result<(), AppError>
    where
        S: Stream<Item = Result<Bytes, AppError>> + Send,
    {
        let chunks = relay.relay(file);
        futures::pin_mut!(chunks);

        while let Some(chunk) = chunks.try_next().await? {
            sink.write_all(&chunk)
                .await
                .map_err(|e| AppError::storage_write(save_to, e))?;
        }

        sink.flush()
            .await
            .map_err(|e| AppError::storage_write(save_to, e))
    }

    /// Walks every part of `multipart`, saving each file part in turn, and
    /// calls `on_finish` once the body is exhausted.
    ///
    /// Parts are handled strictly one after another. Fields without a file
    /// name are skipped. On error `on_finish` is never called.
    pub async fn register_events<F, R>(
        &mut self,
        mut multipart: Multipart,
        on_finish: F,
    ) -> Result<R, AppError>
    where
        F: FnOnce(UploadSummary) -> R,
    {
        let mut summary = UploadSummary::default();

        while let Some(field) = multipart.next_field().await? {
            let field_name = field.name().unwrap_or_default().to_string();
            let Some(file_name) = field.file_name().map(str::to_string) else {
                tracing::debug!("Skipping non-file field '{}'", field_name);
                continue;
            };

            let transfer = self
                .on_file(&field_name, field.map_err(AppError::from), &file_name)
                .await?;
            summary.files.push(transfer);
        }

        Ok(on_finish(summary))
    }
}
