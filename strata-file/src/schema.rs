use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;
use strata_dtype::Schema;
use strata_error::{ResultExt, StrataResult};

use crate::SCHEMA_FILE;

/// Persist the ordered columns of the table rooted at `root`.
pub fn write_schema(root: &Path, schema: &Schema) -> StrataResult<()> {
    let path = root.join(SCHEMA_FILE);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, schema)?;
    writer.flush()?;
    debug!("wrote schema of {} columns to {}", schema.len(), path.display());
    Ok(())
}

/// Restore the ordered columns of the table rooted at `root`.
pub fn read_schema(root: &Path) -> StrataResult<Schema> {
    let path = root.join(SCHEMA_FILE);
    let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("decoding {}", path.display()))
}
