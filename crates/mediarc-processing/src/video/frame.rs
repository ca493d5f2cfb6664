//! Single-frame extraction via ffmpeg.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use super::validate_binary_path;

pub struct FrameExtractor {
    ffmpeg_path: String,
    temp_dir: PathBuf,
}

impl FrameExtractor {
    pub fn new(ffmpeg_path: impl Into<String>, temp_dir: impl Into<PathBuf>) -> Result<Self> {
        let ffmpeg_path = ffmpeg_path.into();
        validate_binary_path(&ffmpeg_path)
            .context("Invalid ffmpeg_path: contains dangerous characters")?;

        Ok(Self {
            ffmpeg_path,
            temp_dir: temp_dir.into(),
        })
    }

    /// Extract the frame at `timestamp_seconds` from the video at
    /// `input_path` and return it as encoded JPEG bytes.
    ///
    /// The frame lands in a uniquely-named temp file that is removed when
    /// this call returns, on success and failure alike.
    #[tracing::instrument(skip(self), fields(
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "extract_frame"
    ))]
    pub async fn extract_frame(&self, input_path: &Path, timestamp_seconds: f64) -> Result<Vec<u8>> {
        let frame_file = tempfile::Builder::new()
            .prefix("mediarc-frame-")
            .suffix(".jpg")
            .tempfile_in(&self.temp_dir)
            .context("Failed to create frame temp file")?;

        let timestamp = timestamp_seconds.to_string();
        let output = Command::new(&self.ffmpeg_path)
            .arg("-ss")
            .arg(&timestamp)
            .arg("-i")
            .arg(input_path)
            .args(["-vframes", "1", "-q:v", "2", "-y"])
            .arg(frame_file.path())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to execute ffmpeg")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("FFmpeg frame extraction failed: {}", stderr));
        }

        let frame_data = tokio::fs::read(frame_file.path())
            .await
            .context("Failed to read extracted frame")?;

        if frame_data.is_empty() {
            return Err(anyhow!("FFmpeg produced an empty frame"));
        }

        Ok(frame_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_dangerous_path() {
        assert!(FrameExtractor::new("ffmpeg && ls", std::env::temp_dir()).is_err());
        assert!(FrameExtractor::new("ffmpeg", std::env::temp_dir()).is_ok());
    }
}
