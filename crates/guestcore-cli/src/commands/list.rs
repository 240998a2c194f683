//! List command: show the records of an index/container pair.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use guestcore_media::container;
use guestcore_media::index::read_index;

pub fn run(index_path: &Path) -> Result<ExitCode> {
    let records = read_index(index_path)
        .with_context(|| format!("reading {}", index_path.display()))?;
    let container_path = container::container_path(index_path);

    println!(
        "{} {} ({} records, container {})",
        "index".cyan().bold(),
        index_path.display(),
        records.len(),
        container_path.display()
    );
    println!("{:<14} {:>10} {:>10}", "name".bold(), "offset".bold(), "length".bold());
    for record in &records {
        println!("{:<14} {:>10} {:>10}", record.name, record.offset, record.length);
    }

    Ok(ExitCode::SUCCESS)
}
