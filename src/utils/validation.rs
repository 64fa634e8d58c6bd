use crate::api::error::AppError;
use std::path::{Component, Path};

/// Accepts an uploaded file name only if it is a single plain path segment.
///
/// The name is otherwise kept verbatim (spaces, unicode, dots) since it
/// becomes the stored file's name.
pub fn validate_file_name(name: &str) -> Result<&str, AppError> {
    let mut components = Path::new(name).components();
    let single_segment = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );

    if !single_segment || name.contains(['/', '\\', '\0']) {
        tracing::warn!("Path traversal attempt detected: {:?}", name);
        return Err(AppError::InvalidFileName(name.to_string()));
    }

    Ok(name)
}
