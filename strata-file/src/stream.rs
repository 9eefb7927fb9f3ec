use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;
use strata_error::{ResultExt, StrataResult, strata_bail};

/// One buffered output file of a column, closed exactly once.
#[derive(Debug)]
pub(crate) struct OutputStream {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl OutputStream {
    /// Create or truncate the file at `path`.
    pub(crate) fn create(path: PathBuf, buffer_capacity: usize) -> StrataResult<Self> {
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        debug!("created {}", path.display());
        Ok(Self {
            writer: Some(BufWriter::with_capacity(buffer_capacity, file)),
            path,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn write_all(&mut self, bytes: &[u8]) -> StrataResult<()> {
        let Some(writer) = self.writer.as_mut() else {
            strata_bail!("cannot write to {} after it was closed", self.path.display());
        };
        writer
            .write_all(bytes)
            .with_context(|| format!("writing {}", self.path.display()))
    }

    /// Flush and close the file. Closing again does nothing.
    pub(crate) fn close(&mut self) -> StrataResult<()> {
        match self.writer.take() {
            Some(mut writer) => writer
                .flush()
                .with_context(|| format!("flushing {}", self.path.display())),
            None => Ok(()),
        }
    }
}
