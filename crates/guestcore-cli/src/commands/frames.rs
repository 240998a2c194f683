//! Frames command: decode a sub-file's animation into PNG frames.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use guestcore_media::bitmap::DecodeSession;
use guestcore_media::png::write_frame;

use super::load_subfile;

pub fn run(index_path: &Path, name: &str, out_dir: &Path, raw: bool) -> Result<ExitCode> {
    let sub = load_subfile(index_path, name)?;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    if raw {
        for (i, chunk) in sub.chunks.iter().enumerate() {
            let payload = chunk.decoded_payload()?;
            let out_path = out_dir.join(format!("{}_{i:04}_{:02x}.bin", sub.name, chunk.kind));
            fs::write(&out_path, &payload)
                .with_context(|| format!("writing {}", out_path.display()))?;
        }
        println!("{} {} raw chunks dumped", "done".green().bold(), sub.chunks.len());
        return Ok(ExitCode::SUCCESS);
    }

    if !sub.has_images() {
        eprintln!("{}: {} carries no image chunks", "error".red(), sub.name);
        return Ok(ExitCode::from(1));
    }

    let mut session = DecodeSession::new();
    let mut frame_index = 0u32;
    for chunk in &sub.chunks {
        if let Some(decoded) = session.decode_chunk(chunk)? {
            let out_path = out_dir.join(format!("{}_{frame_index:04}.png", sub.name));
            write_frame(&out_path, decoded.frame)
                .with_context(|| format!("writing {}", out_path.display()))?;
            frame_index += 1;
        }
    }

    println!("{} {} frames written to {}", "done".green().bold(), frame_index, out_dir.display());
    Ok(ExitCode::SUCCESS)
}
