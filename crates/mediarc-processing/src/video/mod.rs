//! Video processing module
//!
//! Duration probing via `ffprobe` and single-frame extraction via `ffmpeg`.

pub mod frame;
pub mod probe;

pub use frame::FrameExtractor;
pub use probe::VideoProbe;

use anyhow::{anyhow, Result};

/// Validate that a configured binary path doesn't contain shell
/// metacharacters or dangerous sequences.
pub(crate) fn validate_binary_path(path: &str) -> Result<()> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(anyhow!("Path contains dangerous characters: {}", path));
    }

    if path.contains("..") {
        return Err(anyhow!("Path contains directory traversal: {}", path));
    }

    Ok(())
}
