use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("failed to start transcoder: {0}")]
    Spawn(std::io::Error),
    #[error("transcoder exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("transcoder produced no output file")]
    MissingOutput,
    #[error("transcoder timed out after {0:?}")]
    TimedOut(Duration),
}

/// Video compression capability. Success means the output file exists.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError>;
}

/// Runs an external `ffmpeg` with a fixed profile: at most 1080 lines tall,
/// CRF 18, AAC 192k audio, `+faststart` for streaming.
pub struct FfmpegTranscoder {
    bin: PathBuf,
    timeout: Duration,
}

impl FfmpegTranscoder {
    pub fn new(bin: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.bin);
        command
            .arg("-i")
            .arg(input)
            .args(["-vf", "scale=-2:'min(ih,1080)'"])
            .args(["-crf", "18", "-preset", "medium"])
            .args(["-c:a", "aac", "-b:a", "192k"])
            .args(["-movflags", "+faststart"])
            .arg("-y")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        info!(input = %input.display(), output = %output.display(), "Transcoding video");

        let child = self
            .command(input, output)
            .spawn()
            .map_err(TranscodeError::Spawn)?;

        // Dropping the future on timeout kills the child.
        let result = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(TranscodeError::Spawn)?,
            Err(_) => {
                warn!(input = %input.display(), "Transcoder timed out");
                return Err(TranscodeError::TimedOut(self.timeout));
            }
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let tail: String = stderr
                .lines()
                .rev()
                .take(5)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect::<Vec<_>>()
                .join("\n");
            return Err(TranscodeError::Failed {
                status: result.status.to_string(),
                stderr: tail,
            });
        }

        if !tokio::fs::try_exists(output).await.unwrap_or(false) {
            return Err(TranscodeError::MissingOutput);
        }

        Ok(())
    }
}
