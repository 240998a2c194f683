//! Lzss-check command: round-trip a sub-file's compressed chunks.
//!
//! For every compressed chunk, decompress the stored bytes, recompress
//! them with our own encoder, decompress again, and require both
//! decompressions to match. This validates the codec pair against shipped
//! data without requiring bit-identical compressed streams.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use guestcore_media::lzss;

use super::load_subfile;

pub fn run(index_path: &Path, name: &str) -> Result<ExitCode> {
    let sub = load_subfile(index_path, name)?;

    let mut checked = 0u32;
    let mut failed = 0u32;
    for (i, chunk) in sub.chunks.iter().enumerate() {
        if !chunk.is_compressed() {
            continue;
        }
        checked += 1;

        let original = lzss::decompress(&chunk.payload, chunk.params)?;
        let repacked = lzss::compress(&original, chunk.params);
        let roundtrip = lzss::decompress(&repacked, chunk.params)?;

        if roundtrip == original {
            println!(
                "{} chunk {i} (type 0x{:02x}): {} -> {} -> {} bytes",
                "ok".green(),
                chunk.kind,
                chunk.payload.len(),
                original.len(),
                repacked.len()
            );
        } else {
            failed += 1;
            println!("{} chunk {i} (type 0x{:02x}): round-trip mismatch", "FAIL".red().bold(), chunk.kind);
        }
    }

    if checked == 0 {
        println!("{} carries no compressed chunks", sub.name);
        return Ok(ExitCode::SUCCESS);
    }
    if failed > 0 {
        eprintln!("{}: {failed}/{checked} chunks failed", "error".red());
        return Ok(ExitCode::from(1));
    }
    println!("{} {checked} chunks round-tripped", "done".green().bold());
    Ok(ExitCode::SUCCESS)
}
