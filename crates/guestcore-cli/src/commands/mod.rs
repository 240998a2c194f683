//! CLI command implementations.

pub mod audio;
pub mod extract;
pub mod frames;
pub mod list;
pub mod lzss_check;
pub mod megatexture;
pub mod xmi;

use std::path::Path;

use anyhow::{bail, Context, Result};
use guestcore_media::container;
use guestcore_media::index::{read_index, IndexRecord};
use guestcore_media::subfile::{parse_subfile, SubFile};

/// Load a container slice for a named record and parse it as a sub-file.
fn load_subfile(index_path: &Path, name: &str) -> Result<SubFile> {
    let record = find_record(index_path, name)?;
    let container_path = container::container_path(index_path);
    let bytes = container::slice(&container_path, &record)
        .with_context(|| format!("reading {}", container_path.display()))?;
    Ok(parse_subfile(&record.name, &bytes)?)
}

/// Find a record by name, case-insensitively, with or without extension.
fn find_record(index_path: &Path, name: &str) -> Result<IndexRecord> {
    let records = read_index(index_path)
        .with_context(|| format!("reading {}", index_path.display()))?;
    let matches = |record: &IndexRecord| {
        record.name.eq_ignore_ascii_case(name)
            || record
                .name
                .rsplit_once('.')
                .is_some_and(|(stem, _)| stem.eq_ignore_ascii_case(name))
    };
    match records.into_iter().find(matches) {
        Some(record) => Ok(record),
        None => bail!("no record named {name:?} in {}", index_path.display()),
    }
}
