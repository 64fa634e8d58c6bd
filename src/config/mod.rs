use std::env;
use std::path::PathBuf;

/// Runtime configuration for the upload server
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory uploads are written to and listed from (default: "./downloads")
    pub downloads_folder: PathBuf,

    /// Minimum gap between two progress notifications in ms (default: 200)
    pub message_time_delay_ms: i64,

    /// Owner reported for every listed file (default: $USER)
    pub owner: String,

    /// Maximum accepted request body in bytes (default: 1 GB)
    pub max_body_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            downloads_folder: PathBuf::from("./downloads"),
            message_time_delay_ms: 200,
            owner: env::var("USER").unwrap_or_else(|_| "unknown".to_string()),
            max_body_size: 1024 * 1024 * 1024, // 1 GB
        }
    }
}

impl UploadConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            downloads_folder: env::var("DOWNLOADS_FOLDER")
                .map(PathBuf::from)
                .unwrap_or(default.downloads_folder),

            message_time_delay_ms: env::var("MESSAGE_TIME_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &i64| *v >= 0)
                .unwrap_or(default.message_time_delay_ms),

            owner: env::var("OWNER").unwrap_or(default.owner),

            max_body_size: env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_body_size),
        }
    }

    /// Config rooted at an arbitrary folder, used by tests and local tooling
    pub fn development(downloads_folder: impl Into<PathBuf>) -> Self {
        Self {
            downloads_folder: downloads_folder.into(),
            message_time_delay_ms: 0,
            owner: "developer".to_string(),
            max_body_size: 64 * 1024 * 1024,
        }
    }
}
