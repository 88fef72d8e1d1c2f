//! Converter invocation.
//!
//! # Design
//! - One invocation per request; no retries.
//! - The child is spawned with `kill_on_drop`, so both the timeout path and a
//!   dropped request future terminate it.
//! - Only stderr is kept for diagnostics; stdout is drained and discarded.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{ConvertError, ConvertResult};

/// Seam over the external Markdown to Word converter.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Convert the Markdown document at `input` into a Word document at `output`.
    async fn convert(&self, input: &Path, output: &Path) -> ConvertResult<()>;
}

/// Converter that shells out to `pandoc` (or a compatible command line).
///
/// The command line is
/// `<program> [leading args] <input> -o <output> --from=markdown --to=docx`.
#[derive(Debug, Clone)]
pub struct PandocConverter {
    program: PathBuf,
    leading_args: Vec<String>,
    timeout: Duration,
}

impl PandocConverter {
    /// Build a converter for `program` bounded by `timeout`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            timeout,
        }
    }

    /// Arguments inserted before the input path.
    #[must_use]
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Program this converter launches.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .arg(input)
            .arg("-o")
            .arg(output)
            .arg("--from=markdown")
            .arg("--to=docx")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl Converter for PandocConverter {
    async fn convert(&self, input: &Path, output: &Path) -> ConvertResult<()> {
        let child = self
            .command(input, output)
            .spawn()
            .map_err(|source| ConvertError::Launch {
                program: self.program.clone(),
                source,
            })?;
        let started = Instant::now();

        let result = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(result)) => result,
            Ok(Err(source)) => {
                return Err(ConvertError::io("converter.wait", &self.program, source));
            }
            Err(_) => {
                warn!(
                    program = %self.program.display(),
                    timeout_ms = self.timeout.as_millis(),
                    "converter exceeded time budget; process killed"
                );
                return Err(ConvertError::Timeout {
                    program: self.program.clone(),
                    timeout: self.timeout,
                });
            }
        };

        if result.status.success() {
            debug!(
                program = %self.program.display(),
                elapsed_ms = started.elapsed().as_millis(),
                "converter finished"
            );
            return Ok(());
        }

        Err(ConvertError::Failed {
            program: self.program.clone(),
            code: result.status.code(),
            stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
        })
    }
}
