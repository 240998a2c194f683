//! Xmi command: convert an XMI song file to a Standard MIDI file.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use guestcore_media::xmi::convert_xmi;

pub fn run(input: &Path, out: Option<&Path>) -> Result<ExitCode> {
    let xmi = fs::read(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let smf = convert_xmi(&xmi)
        .with_context(|| format!("converting {}", input.display()))?;

    let out_path = match out {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(input).with_extension("mid"),
    };
    fs::write(&out_path, &smf)
        .with_context(|| format!("writing {}", out_path.display()))?;

    println!("{} {} ({} bytes)", "wrote".green().bold(), out_path.display(), smf.len());
    Ok(ExitCode::SUCCESS)
}
