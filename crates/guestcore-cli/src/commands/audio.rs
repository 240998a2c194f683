//! Audio command: assemble a sub-file's PCM chunks into a WAV file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use guestcore_media::audio::{assemble_pcm, write_wav};

use super::load_subfile;

pub fn run(index_path: &Path, name: &str, out: Option<&Path>) -> Result<ExitCode> {
    let sub = load_subfile(index_path, name)?;
    let pcm = assemble_pcm(&sub)?;
    if pcm.is_empty() {
        eprintln!("{}: {} carries no audio chunks", "error".red(), sub.name);
        return Ok(ExitCode::from(1));
    }

    let out_path = match out {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(format!("{}.wav", sub.name)),
    };
    write_wav(&out_path, &pcm)
        .with_context(|| format!("writing {}", out_path.display()))?;

    println!(
        "{} {} ({} samples, 22050 Hz mono)",
        "wrote".green().bold(),
        out_path.display(),
        pcm.len()
    );
    Ok(ExitCode::SUCCESS)
}
