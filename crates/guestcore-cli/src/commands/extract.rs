//! Extract command: write every container record to its own file.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use guestcore_media::container;
use guestcore_media::index::read_index;

pub fn run(index_path: &Path, out_dir: &Path) -> Result<ExitCode> {
    let records = read_index(index_path)
        .with_context(|| format!("reading {}", index_path.display()))?;
    let container_path = container::container_path(index_path);
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    for record in &records {
        let bytes = container::slice(&container_path, record)
            .with_context(|| format!("reading {}", container_path.display()))?;
        let out_path = out_dir.join(&record.name);
        fs::write(&out_path, &bytes)
            .with_context(|| format!("writing {}", out_path.display()))?;
        println!("{} {} ({} bytes)", "wrote".green(), out_path.display(), bytes.len());
    }

    println!("{} {} records extracted", "done".green().bold(), records.len());
    Ok(ExitCode::SUCCESS)
}
