//! Read-only commands available to everyone.

#[cfg(feature = "youtube")]
pub mod latest_video;
pub mod ping;
pub mod server_info;
pub mod user_info;
