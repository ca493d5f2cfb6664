//! Thumbnail generation for uploaded media.
//!
//! Produces a single representative JPEG still from a static image, an
//! animated GIF, or a video. GIFs use the frame at the 10% mark of the
//! animation; videos use the frame at 10% of the duration. The result is
//! scaled down to the configured target height (never up), converted to RGB,
//! and written as JPEG.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, GenericImageView, ImageFormat, ImageReader};
use tokio::fs;

use mediarc_core::AppError;

use crate::image::shrink_to_height;
use crate::video::{FrameExtractor, VideoProbe};

/// Content types decodable directly as a still image.
pub const STILL_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];
/// Video containers supported for frame extraction.
pub const VIDEO_TYPES: &[&str] = &["video/mp4", "video/webm"];

pub struct ThumbnailGenerator {
    target_height: u32,
    temp_dir: PathBuf,
    probe: VideoProbe,
    extractor: FrameExtractor,
}

impl ThumbnailGenerator {
    pub fn new(
        target_height: u32,
        temp_dir: impl Into<PathBuf>,
        ffmpeg_path: &str,
        ffprobe_path: &str,
    ) -> Result<Self, AppError> {
        let temp_dir = temp_dir.into();
        let probe = VideoProbe::new(ffprobe_path)?;
        let extractor = FrameExtractor::new(ffmpeg_path, &temp_dir)?;

        Ok(Self {
            target_height,
            temp_dir,
            probe,
            extractor,
        })
    }

    /// Whether `generate` can produce a thumbnail for this content type.
    pub fn supports(content_type: &str) -> bool {
        let normalized = content_type.to_lowercase();
        STILL_IMAGE_TYPES.contains(&normalized.as_str())
            || normalized == "image/gif"
            || VIDEO_TYPES.contains(&normalized.as_str())
    }

    /// Generate a thumbnail from `data` and write it to `destination`.
    ///
    /// Returns `Ok(false)` for content types this generator cannot handle —
    /// nothing is written and no error is raised. Returns `Ok(true)` once a
    /// JPEG has been written at `destination` (overwriting any existing
    /// file). A decode failure for a supported content type is an error: the
    /// declared type and the actual bytes disagree.
    pub async fn generate(
        &self,
        content_type: &str,
        data: Vec<u8>,
        destination: &Path,
    ) -> Result<bool, AppError> {
        let normalized = content_type.to_lowercase();

        let candidate = if STILL_IMAGE_TYPES.contains(&normalized.as_str()) {
            decode_on_blocking_pool(data, decode_still).await?
        } else if normalized == "image/gif" {
            decode_on_blocking_pool(data, decode_gif_frame).await?
        } else if VIDEO_TYPES.contains(&normalized.as_str()) {
            self.video_frame(data).await?
        } else {
            tracing::debug!(content_type = %content_type, "Content type not thumbnailable");
            return Ok(false);
        };

        let (source_width, source_height) = candidate.dimensions();

        let target_height = self.target_height;
        let jpeg = tokio::task::spawn_blocking(move || render_jpeg(candidate, target_height))
            .await
            .map_err(|e| AppError::Internal(format!("Thumbnail render task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to encode thumbnail: {}", e)))?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(destination, &jpeg).await?;

        tracing::info!(
            path = %destination.display(),
            content_type = %content_type,
            source_width,
            source_height,
            size_bytes = jpeg.len(),
            "Thumbnail written"
        );

        Ok(true)
    }

    /// Materialize the video bytes to a scoped temp file, probe its duration,
    /// and decode the frame at 10% of it.
    async fn video_frame(&self, data: Vec<u8>) -> Result<DynamicImage, AppError> {
        let video_file = tempfile::Builder::new()
            .prefix("mediarc-video-")
            .tempfile_in(&self.temp_dir)
            .map_err(|e| AppError::Internal(format!("Failed to create video temp file: {}", e)))?;

        fs::write(video_file.path(), &data).await?;

        let duration = self
            .probe
            .duration_seconds(video_file.path())
            .await
            .map_err(|e| AppError::MediaDecode(format!("Failed to probe video: {}", e)))?;

        let timestamp = duration / 10.0;

        let frame_jpeg = self
            .extractor
            .extract_frame(video_file.path(), timestamp)
            .await
            .map_err(|e| AppError::MediaDecode(format!("Failed to extract video frame: {}", e)))?;

        // video_file drops here; the temp file is removed on every exit path.
        decode_on_blocking_pool(frame_jpeg, decode_still).await
    }
}

/// Image decode is CPU-bound; run off the async pool to avoid blocking other
/// tasks.
async fn decode_on_blocking_pool(
    data: Vec<u8>,
    decode: fn(&[u8]) -> anyhow::Result<DynamicImage>,
) -> Result<DynamicImage, AppError> {
    tokio::task::spawn_blocking(move || decode(&data))
        .await
        .map_err(|e| AppError::Internal(format!("Decode task failed: {}", e)))?
        .map_err(|e| AppError::MediaDecode(e.to_string()))
}

fn decode_still(data: &[u8]) -> anyhow::Result<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    Ok(reader.decode()?)
}

/// Decode the animation and take the frame at `floor(frame_count / 10)` — a
/// more representative preview than the first frame.
fn decode_gif_frame(data: &[u8]) -> anyhow::Result<DynamicImage> {
    let decoder = GifDecoder::new(Cursor::new(data))?;
    let frames = decoder.into_frames().collect_frames()?;

    if frames.is_empty() {
        return Err(anyhow::anyhow!("GIF contains no frames"));
    }

    let index = frames.len() / 10;
    let frame = frames
        .into_iter()
        .nth(index)
        .expect("index is bounded by frame count");

    Ok(DynamicImage::ImageRgba8(frame.into_buffer()))
}

/// Shrink to the target height, drop any alpha channel, and encode as JPEG.
fn render_jpeg(candidate: DynamicImage, target_height: u32) -> anyhow::Result<Vec<u8>> {
    let resized = shrink_to_height(candidate, target_height);
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut buffer = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Frame, Rgba, RgbaImage};
    use tempfile::tempdir;

    fn generator(target_height: u32, temp_dir: &Path) -> ThumbnailGenerator {
        ThumbnailGenerator::new(target_height, temp_dir, "ffmpeg", "ffprobe").unwrap()
    }

    fn create_test_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn create_test_gif(frame_colors: &[[u8; 4]]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut buffer);
            let frames = frame_colors
                .iter()
                .map(|c| Frame::new(RgbaImage::from_pixel(8, 8, Rgba(*c))));
            encoder.encode_frames(frames).unwrap();
        }
        buffer
    }

    #[test]
    fn test_supports() {
        assert!(ThumbnailGenerator::supports("image/jpeg"));
        assert!(ThumbnailGenerator::supports("image/gif"));
        assert!(ThumbnailGenerator::supports("video/mp4"));
        assert!(ThumbnailGenerator::supports("VIDEO/WEBM"));
        assert!(!ThumbnailGenerator::supports("text/plain"));
        assert!(!ThumbnailGenerator::supports("application/pdf"));
    }

    #[tokio::test]
    async fn test_unsupported_type_returns_false_writes_nothing() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("thumbnail.jpg");
        let generator = generator(720, dir.path());

        let result = generator
            .generate("text/plain", b"just text".to_vec(), &dest)
            .await
            .unwrap();

        assert!(!result);
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_tall_image_is_scaled_to_target_height() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("thumbnail.jpg");
        let generator = generator(50, dir.path());

        let data = create_test_png(40, 100, [255, 0, 0, 255]);
        let written = generator.generate("image/png", data, &dest).await.unwrap();
        assert!(written);

        let thumb = image::open(&dest).unwrap();
        // width = round(50 * 40 / 100) = 20
        assert_eq!(thumb.dimensions(), (20, 50));
    }

    #[tokio::test]
    async fn test_small_image_is_never_upscaled() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("thumbnail.jpg");
        let generator = generator(720, dir.path());

        let data = create_test_png(64, 48, [0, 255, 0, 255]);
        generator.generate("image/png", data, &dest).await.unwrap();

        let thumb = image::open(&dest).unwrap();
        assert_eq!(thumb.dimensions(), (64, 48));
    }

    #[tokio::test]
    async fn test_output_is_rgb_jpeg() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("thumbnail.jpg");
        let generator = generator(720, dir.path());

        // Alpha channel in, three channels out.
        let data = create_test_png(16, 16, [0, 0, 255, 128]);
        generator.generate("image/png", data, &dest).await.unwrap();

        let bytes = tokio::fs::read(&dest).await.unwrap();
        let format = image::guess_format(&bytes).unwrap();
        assert_eq!(format, ImageFormat::Jpeg);

        let thumb = image::open(&dest).unwrap();
        assert_eq!(thumb.color().channel_count(), 3);
    }

    #[tokio::test]
    async fn test_generation_is_deterministic() {
        let dir = tempdir().unwrap();
        let dest_a = dir.path().join("a.jpg");
        let dest_b = dir.path().join("b.jpg");
        let generator = generator(50, dir.path());

        let data = create_test_png(40, 100, [200, 100, 50, 255]);
        generator
            .generate("image/png", data.clone(), &dest_a)
            .await
            .unwrap();
        generator.generate("image/png", data, &dest_b).await.unwrap();

        let a = tokio::fs::read(&dest_a).await.unwrap();
        let b = tokio::fs::read(&dest_b).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_gif_uses_frame_at_ten_percent() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("thumbnail.jpg");
        let generator = generator(720, dir.path());

        // 12 frames: frame 0 red, frame 1 (= 12 / 10) blue, rest red.
        let mut colors = vec![[255u8, 0, 0, 255]; 12];
        colors[1] = [0, 0, 255, 255];
        let data = create_test_gif(&colors);

        let written = generator.generate("image/gif", data, &dest).await.unwrap();
        assert!(written);

        let thumb = image::open(&dest).unwrap().to_rgb8();
        let pixel = thumb.get_pixel(4, 4);
        // JPEG is lossy; the selected frame is solidly blue, not red.
        assert!(pixel[2] > 150, "expected blue channel, got {:?}", pixel);
        assert!(pixel[0] < 100, "expected low red channel, got {:?}", pixel);
    }

    #[tokio::test]
    async fn test_short_gif_falls_back_to_first_frame() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("thumbnail.jpg");
        let generator = generator(720, dir.path());

        // 3 frames: 3 / 10 == 0, so the first (green) frame is used.
        let colors = [[0u8, 255, 0, 255], [255, 0, 0, 255], [255, 0, 0, 255]];
        let data = create_test_gif(&colors);

        generator.generate("image/gif", data, &dest).await.unwrap();

        let thumb = image::open(&dest).unwrap().to_rgb8();
        let pixel = thumb.get_pixel(4, 4);
        assert!(pixel[1] > 150, "expected green channel, got {:?}", pixel);
    }

    #[tokio::test]
    async fn test_decode_failure_for_supported_type_is_error() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("thumbnail.jpg");
        let generator = generator(720, dir.path());

        let err = generator
            .generate("image/png", b"not an image".to_vec(), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MediaDecode(_)));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_overwrites_existing_destination() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("thumbnail.jpg");
        tokio::fs::write(&dest, b"stale").await.unwrap();
        let generator = generator(720, dir.path());

        let data = create_test_png(16, 16, [10, 20, 30, 255]);
        generator.generate("image/png", data, &dest).await.unwrap();

        let bytes = tokio::fs::read(&dest).await.unwrap();
        assert_ne!(bytes, b"stale");
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[tokio::test]
    async fn test_creates_destination_parent_directories() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("uploads/77/thumbnail.jpg");
        let generator = generator(720, dir.path());

        let data = create_test_png(16, 16, [1, 2, 3, 255]);
        let written = generator.generate("image/png", data, &dest).await.unwrap();

        assert!(written);
        assert!(dest.exists());
    }
}
