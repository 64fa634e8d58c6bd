pub mod file_helper;
pub mod notifier;
pub mod progress;
pub mod throttle;
pub mod upload_handler;
