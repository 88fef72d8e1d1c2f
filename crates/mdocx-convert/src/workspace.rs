//! Scoped temporary files for a single conversion.
//!
//! Each workspace is a uniquely named directory holding `input.md` and
//! `output.docx`. Dropping the workspace deletes the directory and both files.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::error::{ConvertError, ConvertResult};

const INPUT_FILE: &str = "input.md";
const OUTPUT_FILE: &str = "output.docx";
const DIR_PREFIX: &str = "mdocx-";

/// Temporary directory owning the artifacts of one conversion.
#[derive(Debug)]
pub struct ConversionWorkspace {
    dir: TempDir,
    input: PathBuf,
    output: PathBuf,
}

impl ConversionWorkspace {
    /// Allocate a fresh workspace under `root`, or the system temp directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Io`] if the directory cannot be created.
    pub fn create(root: Option<&Path>) -> ConvertResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(DIR_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|source| {
            ConvertError::io(
                "workspace.create",
                root.map_or_else(std::env::temp_dir, Path::to_path_buf),
                source,
            )
        })?;
        let input = dir.path().join(INPUT_FILE);
        let output = dir.path().join(OUTPUT_FILE);
        debug!(path = %dir.path().display(), "conversion workspace created");
        Ok(Self { dir, input, output })
    }

    /// Directory containing the conversion artifacts.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Path the uploaded Markdown is written to.
    #[must_use]
    pub fn input_path(&self) -> &Path {
        &self.input
    }

    /// Path the converter writes the Word document to.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Write the uploaded bytes verbatim to the input path.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Io`] if the file cannot be written.
    pub async fn write_input(&self, bytes: &[u8]) -> ConvertResult<()> {
        tokio::fs::write(&self.input, bytes)
            .await
            .map_err(|source| ConvertError::io("workspace.write_input", &self.input, source))
    }
}
