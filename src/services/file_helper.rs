use crate::api::error::AppError;
use crate::models::FileRecord;
use crate::utils::format::pretty_bytes;
use chrono::{DateTime, SubsecRound, Utc};
use futures::future::try_join_all;
use std::path::{Path, PathBuf};

/// Reads the downloads folder back as listing records.
#[derive(Debug, Clone)]
pub struct FileHelper {
    owner: String,
}

impl FileHelper {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
        }
    }

    /// Lists `folder` (non recursive) in directory order.
    ///
    /// Any failure to read the folder or stat one of its entries fails the
    /// whole listing.
    pub async fn get_file_status(&self, folder: &Path) -> Result<Vec<FileRecord>, AppError> {
        let mut entries = tokio::fs::read_dir(folder)
            .await
            .map_err(|e| AppError::storage_read(folder, e))?;

        let mut paths: Vec<PathBuf> = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::storage_read(folder, e))?
        {
            paths.push(entry.path());
        }

        let statuses = try_join_all(paths.iter().map(|path| async move {
            tokio::fs::metadata(path)
                .await
                .map_err(|e| AppError::storage_read(path, e))
        }))
        .await?;

        paths
            .iter()
            .zip(statuses)
            .map(|(path, metadata)| -> Result<FileRecord, AppError> {
                // Creation time is not available on every filesystem.
                let timestamp = metadata
                    .created()
                    .or_else(|_| metadata.modified())
                    .map_err(|e| AppError::storage_read(path, e))?;

                Ok(FileRecord {
                    file: path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    size: pretty_bytes(metadata.len()),
                    last_modified: DateTime::<Utc>::from(timestamp).trunc_subsecs(3),
                    owner: self.owner.clone(),
                })
            })
            .collect()
    }
}
