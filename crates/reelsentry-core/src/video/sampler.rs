//! Frame Sampling Module
//!
//! Decodes a video with FFmpeg into a raw RGB pipe and yields every Nth frame
//! as an in-memory image. The sequence is lazy, finite, and non-restartable.
//! Frame indices are 1-based decode order, not timestamps. A short read
//! mid-stream ends the sequence instead of raising: partial results are
//! preferred over aborting the modality.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use image::RgbImage;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while opening a video source
#[derive(Error, Debug)]
pub enum SamplerError {
    /// The container cannot be opened at all
    #[error("Source unreadable: {0}")]
    SourceUnreadable(String),

    /// FFprobe output could not be parsed
    #[error("FFprobe error: {0}")]
    ProbeError(String),

    /// IO error during process setup
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for sampling operations
pub type SamplerResult<T> = Result<T, SamplerError>;

// =============================================================================
// Stream Probing
// =============================================================================

/// Dimensions of the decoded video stream
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameDimensions {
    pub width: u32,
    pub height: u32,
}

impl FrameDimensions {
    /// Byte length of one rgb24 frame
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// Probes the first video stream's dimensions with FFprobe.
pub fn probe_dimensions(input: &Path, ffprobe_path: Option<&str>) -> SamplerResult<FrameDimensions> {
    if !input.exists() {
        return Err(SamplerError::SourceUnreadable(format!(
            "Input file does not exist: {}",
            input.display()
        )));
    }

    let ffprobe = ffprobe_path.unwrap_or("ffprobe");
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_streams",
            "-select_streams",
            "v:0",
            &input.to_string_lossy(),
        ])
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SamplerError::SourceUnreadable(format!(
            "FFprobe failed: {}",
            stderr
        )));
    }

    parse_probe_dimensions(&String::from_utf8_lossy(&output.stdout))
}

/// Parses FFprobe JSON output into stream dimensions.
fn parse_probe_dimensions(json_str: &str) -> SamplerResult<FrameDimensions> {
    let json: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| SamplerError::ProbeError(format!("Failed to parse FFprobe output: {}", e)))?;

    let stream = json
        .get("streams")
        .and_then(|s| s.as_array())
        .and_then(|s| s.first())
        .ok_or_else(|| SamplerError::SourceUnreadable("No video stream found".to_string()))?;

    let width = stream.get("width").and_then(|w| w.as_u64()).unwrap_or(0) as u32;
    let height = stream.get("height").and_then(|h| h.as_u64()).unwrap_or(0) as u32;

    if width == 0 || height == 0 {
        return Err(SamplerError::ProbeError(
            "Missing stream dimensions".to_string(),
        ));
    }

    Ok(FrameDimensions { width, height })
}

// =============================================================================
// Frame Stream
// =============================================================================

/// Iterator over `(frame_index, image)` pairs for every Nth decoded frame.
///
/// Generic over the byte source so the framing logic is testable without a
/// decoder process. Any read that cannot fill a whole frame ends the stream.
#[derive(Debug)]
pub struct FrameStream<R: Read> {
    reader: R,
    dims: FrameDimensions,
    stride: u32,
    frame_index: u64,
    done: bool,
}

impl<R: Read> FrameStream<R> {
    /// Creates a stream over rgb24 frames of the given dimensions, yielding
    /// every `stride`-th frame (stride is clamped to at least 1).
    pub fn new(reader: R, dims: FrameDimensions, stride: u32) -> Self {
        Self {
            reader,
            dims,
            stride: stride.max(1),
            frame_index: 0,
            done: false,
        }
    }

    /// Dimensions of the decoded frames.
    pub fn dimensions(&self) -> FrameDimensions {
        self.dims
    }

    /// Fills `buf` with exactly one frame. Returns false on end-of-stream or
    /// any read error; mid-stream decode failure truncates gracefully.
    fn read_frame(&mut self, buf: &mut [u8]) -> bool {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => return false,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => return false,
            }
        }
        true
    }
}

impl<R: Read> Iterator for FrameStream<R> {
    type Item = (u64, RgbImage);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut buf = vec![0u8; self.dims.frame_len()];
        loop {
            if !self.read_frame(&mut buf) {
                self.done = true;
                return None;
            }
            self.frame_index += 1;
            if self.frame_index % u64::from(self.stride) != 0 {
                continue;
            }
            match RgbImage::from_raw(self.dims.width, self.dims.height, buf) {
                Some(image) => return Some((self.frame_index, image)),
                None => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}

// =============================================================================
// Frame Sampler
// =============================================================================

/// Stride sampler over a video file, backed by an FFmpeg child process.
///
/// Opening probes the container first; only a container that cannot be opened
/// at all is an error. The decoder process is reaped on drop whether the
/// stream was exhausted or abandoned early.
#[derive(Debug)]
pub struct FrameSampler {
    child: Child,
    stream: FrameStream<std::process::ChildStdout>,
}

impl FrameSampler {
    /// Opens the source and starts decoding to an rgb24 pipe.
    pub fn open(
        input: &Path,
        stride: u32,
        ffmpeg_path: Option<&str>,
        ffprobe_path: Option<&str>,
    ) -> SamplerResult<Self> {
        let dims = probe_dimensions(input, ffprobe_path)?;

        let ffmpeg = ffmpeg_path.unwrap_or("ffmpeg");
        let mut child = Command::new(ffmpeg)
            .args([
                "-v",
                "error",
                "-i",
                &input.to_string_lossy(),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                SamplerError::SourceUnreadable(format!("Failed to start FFmpeg: {}", e))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SamplerError::SourceUnreadable("FFmpeg stdout unavailable".to_string()))?;

        Ok(Self {
            child,
            stream: FrameStream::new(stdout, dims, stride),
        })
    }

    /// Dimensions of the decoded frames.
    pub fn dimensions(&self) -> FrameDimensions {
        self.stream.dimensions()
    }
}

impl Iterator for FrameSampler {
    type Item = (u64, RgbImage);

    fn next(&mut self) -> Option<Self::Item> {
        self.stream.next()
    }
}

impl Drop for FrameSampler {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const DIMS: FrameDimensions = FrameDimensions {
        width: 2,
        height: 2,
    };

    /// Builds a raw rgb24 byte stream of `frames` frames where every byte of
    /// frame k (1-based) has value k.
    fn raw_frames(frames: usize) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(frames * DIMS.frame_len());
        for k in 1..=frames {
            bytes.extend(std::iter::repeat(k as u8).take(DIMS.frame_len()));
        }
        bytes
    }

    #[test]
    fn test_parse_probe_dimensions() {
        let json = r#"{"streams": [{"codec_type": "video", "width": 1920, "height": 1080}]}"#;
        let dims = parse_probe_dimensions(json).unwrap();
        assert_eq!(
            dims,
            FrameDimensions {
                width: 1920,
                height: 1080
            }
        );
        assert_eq!(dims.frame_len(), 1920 * 1080 * 3);
    }

    #[test]
    fn test_parse_probe_no_video_stream() {
        let err = parse_probe_dimensions(r#"{"streams": []}"#).unwrap_err();
        assert!(matches!(err, SamplerError::SourceUnreadable(_)));
    }

    #[test]
    fn test_parse_probe_missing_dimensions() {
        let json = r#"{"streams": [{"codec_type": "video"}]}"#;
        let err = parse_probe_dimensions(json).unwrap_err();
        assert!(matches!(err, SamplerError::ProbeError(_)));
    }

    #[test]
    fn test_parse_probe_malformed_json() {
        let err = parse_probe_dimensions("not json").unwrap_err();
        assert!(matches!(err, SamplerError::ProbeError(_)));
    }

    #[test]
    fn test_probe_dimensions_input_not_found() {
        let err = probe_dimensions(Path::new("/nonexistent/video.mp4"), None).unwrap_err();
        assert!(matches!(err, SamplerError::SourceUnreadable(_)));
    }

    #[test]
    fn test_stream_yields_every_nth_frame() {
        // 65 decodable frames at stride 30 → exactly floor(65/30) = 2 samples
        let stream = FrameStream::new(Cursor::new(raw_frames(65)), DIMS, 30);
        let indices: Vec<u64> = stream.map(|(idx, _)| idx).collect();
        assert_eq!(indices, vec![30, 60]);
    }

    #[test]
    fn test_stream_exact_multiple() {
        let stream = FrameStream::new(Cursor::new(raw_frames(90)), DIMS, 30);
        let indices: Vec<u64> = stream.map(|(idx, _)| idx).collect();
        assert_eq!(indices, vec![30, 60, 90]);
    }

    #[test]
    fn test_stream_shorter_than_stride() {
        let stream = FrameStream::new(Cursor::new(raw_frames(29)), DIMS, 30);
        assert_eq!(stream.count(), 0);
    }

    #[test]
    fn test_stream_empty_source() {
        let stream = FrameStream::new(Cursor::new(Vec::new()), DIMS, 30);
        assert_eq!(stream.count(), 0);
    }

    #[test]
    fn test_stream_truncated_frame_ends_gracefully() {
        // 2 whole frames plus half a frame of trailing bytes
        let mut bytes = raw_frames(2);
        bytes.extend(std::iter::repeat(9u8).take(DIMS.frame_len() / 2));

        let stream = FrameStream::new(Cursor::new(bytes), DIMS, 1);
        let indices: Vec<u64> = stream.map(|(idx, _)| idx).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_stream_preserves_pixel_data() {
        let stream = FrameStream::new(Cursor::new(raw_frames(4)), DIMS, 2);
        let frames: Vec<(u64, RgbImage)> = stream.collect();
        assert_eq!(frames.len(), 2);

        // frame 2 was filled with byte value 2, frame 4 with value 4
        assert_eq!(frames[0].0, 2);
        assert_eq!(frames[0].1.get_pixel(0, 0).0, [2, 2, 2]);
        assert_eq!(frames[1].0, 4);
        assert_eq!(frames[1].1.get_pixel(1, 1).0, [4, 4, 4]);
    }

    #[test]
    fn test_stream_is_not_restartable() {
        let mut stream = FrameStream::new(Cursor::new(raw_frames(30)), DIMS, 30);
        assert!(stream.next().is_some());
        assert!(stream.next().is_none());
        // exhausted stays exhausted
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_stream_stride_zero_clamps_to_one() {
        let stream = FrameStream::new(Cursor::new(raw_frames(3)), DIMS, 0);
        assert_eq!(stream.count(), 3);
    }

    #[test]
    fn test_sampler_open_input_not_found() {
        let err = FrameSampler::open(Path::new("/nonexistent/video.mp4"), 30, None, None)
            .unwrap_err();
        assert!(matches!(err, SamplerError::SourceUnreadable(_)));
    }
}
