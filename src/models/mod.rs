use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// One entry of the downloads folder listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub file: String,
    /// Human readable size, e.g. "5.5 kB"
    pub size: String,
    pub last_modified: DateTime<Utc>,
    pub owner: String,
}

/// Payload pushed to the client while a file is being written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub processed_already: u64,
    pub filename: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub result: String,
}

impl UploadResponse {
    pub fn success() -> Self {
        Self {
            result: "Files uploaded with success!".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadQuery {
    /// Push session that receives progress events
    #[serde(rename = "socketId")]
    pub socket_id: Option<String>,
}
