//! FFmpeg-backed encoder and media source.
//!
//! The encoder streams raw RGBA frames into an `ffmpeg` child process over
//! stdin. The media source decodes single frames on demand with `-ss`.

use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use async_trait::async_trait;

use crate::error::{ExportError, ExportResult};
use crate::export::{EncoderConfig, ExportMedia, VideoEncoder};
use crate::frame::Frame;

/// Whether `binary` resolves on `PATH`.
pub fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Both `ffmpeg` and `ffprobe` are installed.
pub fn ffmpeg_available() -> bool {
    command_exists("ffmpeg") && command_exists("ffprobe")
}

/// Stream facts read with `ffprobe`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbedMedia {
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
}

/// Probe the first video stream's size and the container duration.
pub fn probe_media(path: &Path) -> Option<ProbedMedia> {
    let (width, height) = probe_video_dimensions(path)?;
    let duration_secs = probe_duration(path)?;
    Some(ProbedMedia {
        width,
        height,
        duration_secs,
    })
}

pub fn probe_video_dimensions(path: &Path) -> Option<(u32, u32)> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "csv=p=0:s=x",
        ])
        .arg(path)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let raw = String::from_utf8(output.stdout).ok()?;
    let line = raw.lines().next()?.trim();
    let (w, h) = line.split_once('x')?;
    let width = w.parse::<u32>().ok()?;
    let height = h.parse::<u32>().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

pub fn probe_duration(path: &Path) -> Option<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "csv=p=0",
        ])
        .arg(path)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let raw = String::from_utf8(output.stdout).ok()?;
    let duration = raw.lines().next()?.trim().parse::<f64>().ok()?;
    (duration.is_finite() && duration > 0.0).then_some(duration)
}

/// ffmpeg arguments for encoding raw RGBA from stdin to H.264 MP4.
pub fn encoder_args(config: &EncoderConfig) -> Vec<String> {
    let mut args: Vec<String> = [
        "-y",
        "-hide_banner",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    args.extend([
        "-s".to_string(),
        format!("{}x{}", config.width, config.height),
        "-r".to_string(),
        config.fps.to_string(),
        "-i".to_string(),
        "-".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "medium".to_string(),
        "-crf".to_string(),
        "20".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
    ]);
    if config.keyframe_interval > 0 {
        args.extend([
            "-g".to_string(),
            config.keyframe_interval.to_string(),
            "-force_key_frames".to_string(),
            format!("expr:eq(mod(n,{}),0)", config.keyframe_interval),
        ]);
    }
    args.extend([
        "-movflags".to_string(),
        "+faststart".to_string(),
        config.output_path.display().to_string(),
    ]);
    args
}

/// H.264 encoder fed through an `ffmpeg` child process.
#[derive(Default)]
pub struct FfmpegEncoder {
    running: Option<RunningEncoder>,
    frames: u64,
}

struct RunningEncoder {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_task: Option<JoinHandle<String>>,
    config: EncoderConfig,
}

impl FfmpegEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn running(&mut self) -> ExportResult<&mut RunningEncoder> {
        self.running
            .as_mut()
            .ok_or_else(|| ExportError::Encoder("encoder used before configure".to_string()))
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn configure(&mut self, config: &EncoderConfig) -> ExportResult<()> {
        if self.running.is_some() {
            return Err(ExportError::EncoderConfig(
                "encoder is already configured".to_string(),
            ));
        }
        let args = encoder_args(config);
        tracing::debug!(args = ?args, "Running ffmpeg");

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExportError::EncoderConfig(format!("Failed to start ffmpeg: {e}")))?;

        tracing::info!(
            pid = child.id(),
            width = config.width,
            height = config.height,
            fps = config.fps,
            "ffmpeg encoder started"
        );

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ExportError::EncoderConfig("Failed to capture ffmpeg stdin".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExportError::EncoderConfig("Failed to capture ffmpeg stderr".into()))?;

        // Drain stderr concurrently to avoid ffmpeg blocking on a full stderr pipe.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        self.running = Some(RunningEncoder {
            child,
            stdin: Some(stdin),
            stderr_task: Some(stderr_task),
            config: config.clone(),
        });
        self.frames = 0;
        Ok(())
    }

    fn encode(
        &mut self,
        frame: &Frame,
        timestamp_us: u64,
        _duration_us: u64,
        keyframe: bool,
    ) -> ExportResult<()> {
        let running = self.running()?;
        if frame.width() != running.config.width || frame.height() != running.config.height {
            return Err(ExportError::Encoder(format!(
                "frame is {}x{}, encoder expects {}x{}",
                frame.width(),
                frame.height(),
                running.config.width,
                running.config.height
            )));
        }
        let stdin = running
            .stdin
            .as_mut()
            .ok_or_else(|| ExportError::Encoder("encoder input already closed".to_string()))?;
        stdin
            .write_all(frame.as_bytes())
            .map_err(|e| ExportError::Encoder(format!("Failed writing frame to ffmpeg: {e}")))?;
        tracing::trace!(timestamp_us, keyframe, "Encoded frame");
        self.frames += 1;
        Ok(())
    }

    fn flush(&mut self) -> ExportResult<()> {
        let running = self.running()?;
        if let Some(mut stdin) = running.stdin.take() {
            stdin
                .flush()
                .map_err(|e| ExportError::Encoder(format!("Failed flushing ffmpeg input: {e}")))?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> ExportResult<PathBuf> {
        let frames = self.frames;
        let mut running = self
            .running
            .take()
            .ok_or_else(|| ExportError::Encoder("encoder used before configure".to_string()))?;
        drop(running.stdin.take());

        let status = running
            .child
            .wait()
            .map_err(|e| ExportError::Encoder(format!("Failed to wait on ffmpeg: {e}")))?;
        let stderr_output = running
            .stderr_task
            .take()
            .map(|task| {
                task.join()
                    .unwrap_or_else(|_| "<failed to join stderr reader>".to_string())
            })
            .unwrap_or_default();

        if !status.success() {
            return Err(ExportError::Encoder(format!(
                "ffmpeg export failed (status {}): {}",
                status,
                stderr_output.trim()
            )));
        }
        tracing::info!(frames, output = %running.config.output_path.display(), "ffmpeg encoder finished");
        Ok(running.config.output_path)
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        if let Some(mut running) = self.running.take() {
            drop(running.stdin.take());
            if let Err(e) = running.child.kill() {
                tracing::debug!(error = %e, "ffmpeg encoder already exited");
            }
            let _ = running.child.wait();
        }
    }
}

/// A media file decoded one frame at a time.
#[derive(Debug, Clone)]
pub struct FfmpegMediaSource {
    path: PathBuf,
    duration_secs: f64,
    position: f64,
    playing: bool,
}

impl FfmpegMediaSource {
    pub fn open(path: impl Into<PathBuf>) -> ExportResult<Self> {
        let path = path.into();
        let duration_secs = probe_duration(&path).ok_or_else(|| {
            ExportError::Media(format!("could not probe duration of {}", path.display()))
        })?;
        Ok(Self::with_duration(path, duration_secs))
    }

    pub fn with_duration(path: impl Into<PathBuf>, duration_secs: f64) -> Self {
        Self {
            path: path.into(),
            duration_secs,
            position: 0.0,
            playing: false,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}

#[async_trait]
impl ExportMedia for FfmpegMediaSource {
    fn position(&self) -> f64 {
        self.position
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    async fn seek(&mut self, time: f64) -> ExportResult<()> {
        self.position = time.clamp(0.0, self.duration_secs);
        Ok(())
    }

    async fn grab_frame(&mut self, width: u32, height: u32) -> ExportResult<Frame> {
        let output = tokio::process::Command::new("ffmpeg")
            .args(["-v", "error", "-ss"])
            .arg(format!("{:.6}", self.position))
            .arg("-i")
            .arg(&self.path)
            .args(["-frames:v", "1", "-f", "rawvideo", "-pix_fmt", "rgba", "-s"])
            .arg(format!("{width}x{height}"))
            .arg("-")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ExportError::Media(format!("Failed to start ffmpeg decoder: {e}")))?;

        if !output.status.success() {
            return Err(ExportError::Media(format!(
                "ffmpeg decode at {:.3}s failed: {}",
                self.position,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Frame::from_rgba(width, height, output.stdout).ok_or_else(|| {
            ExportError::Media(format!(
                "decoder returned a short frame at {:.3}s",
                self.position
            ))
        })
    }

    async fn play(&mut self) -> ExportResult<()> {
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_args_request_keyframe_cadence() {
        let args = encoder_args(&EncoderConfig {
            output_path: PathBuf::from("/tmp/out.mp4"),
            width: 1280,
            height: 720,
            fps: 30,
            keyframe_interval: 30,
        });
        let joined = args.join(" ");
        assert!(joined.contains("-f rawvideo -pix_fmt rgba -s 1280x720 -r 30 -i -"));
        assert!(joined.contains("-g 30"));
        assert!(joined.contains("expr:eq(mod(n,30),0)"));
        assert!(joined.contains("-pix_fmt yuv420p"));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/out.mp4"));
    }

    #[test]
    fn test_encoder_rejects_frames_before_configure() {
        let mut encoder = FfmpegEncoder::new();
        let frame = Frame::new(2, 2);
        assert!(matches!(
            encoder.encode(&frame, 0, 33_333, true),
            Err(ExportError::Encoder(_))
        ));
    }

    #[tokio::test]
    async fn test_media_seek_clamps_to_duration() {
        let mut media = FfmpegMediaSource::with_duration("/tmp/missing.mp4", 4.0);
        media.seek(10.0).await.unwrap();
        assert_eq!(media.position(), 4.0);
        media.seek(-1.0).await.unwrap();
        assert_eq!(media.position(), 0.0);
    }

    #[test]
    fn test_command_exists_for_shell() {
        assert!(command_exists("sh"));
        assert!(!command_exists("definitely-not-a-real-binary-xyz"));
    }
}
