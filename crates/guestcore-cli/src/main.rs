//! guestcore CLI - asset extraction and megatexture tooling.
//!
//! Thin command-line wrappers over the `guestcore-media` and
//! `guestcore-raycast` crates: list and extract index/container pairs,
//! decode animation frames and audio, convert XMI songs, and build or
//! inspect megatexture tile archives.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

/// guestcore - game asset extraction and megatexture tools
#[derive(Parser)]
#[command(name = "guestcore")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the records of an index file and its paired container
    List {
        /// Path to the index (.RL) file
        index: PathBuf,
    },

    /// Extract every record of an index/container pair to files
    Extract {
        /// Path to the index (.RL) file
        index: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Decode a sub-file's animation frames to PNG
    Frames {
        /// Path to the index (.RL) file
        index: PathBuf,

        /// Record name (with or without extension)
        name: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Dump decompressed chunk payloads instead of decoding frames
        #[arg(long)]
        raw: bool,
    },

    /// Assemble a sub-file's PCM audio into a WAV file
    Audio {
        /// Path to the index (.RL) file
        index: PathBuf,

        /// Record name (with or without extension)
        name: String,

        /// Output WAV path (default: <name>.wav)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Convert an XMI song file to a Standard MIDI (format 0) file
    Xmi {
        /// Path to the XMI file
        input: PathBuf,

        /// Output MIDI path (default: input with .mid extension)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Round-trip a sub-file's compressed chunks through the LZSS codec
    LzssCheck {
        /// Path to the index (.RL) file
        index: PathBuf,

        /// Record name (with or without extension)
        name: String,
    },

    /// Megatexture analysis, generation, and archive tools
    Megatexture {
        #[command(subcommand)]
        command: MegatextureCommands,
    },
}

#[derive(Subcommand)]
enum MegatextureCommands {
    /// Report the exposed-edge layout of a map
    Analyze {
        /// Path to the raw byte-grid map file
        map: PathBuf,

        /// Map width in cells
        #[arg(short, long)]
        width: u32,
    },

    /// Generate strip tiles as PNG files
    Generate {
        /// Path to the raw byte-grid map file
        map: PathBuf,

        /// Map width in cells
        #[arg(short, long)]
        width: u32,

        /// Output directory for tile PNGs
        #[arg(short, long, default_value = "tiles")]
        out_dir: PathBuf,

        /// Generation seed (default: 12345)
        #[arg(short, long)]
        seed: Option<u32>,
    },

    /// Generate tiles and pack them into an MTX archive
    Pack {
        /// Path to the raw byte-grid map file
        map: PathBuf,

        /// Map width in cells
        #[arg(short, long)]
        width: u32,

        /// Output archive path
        #[arg(short, long, default_value = "megatexture.mtx")]
        out: PathBuf,

        /// Generation seed (default: 12345)
        #[arg(short, long)]
        seed: Option<u32>,
    },

    /// Unpack an MTX archive back to tile PNGs
    Unpack {
        /// Path to the MTX archive
        archive: PathBuf,

        /// Output directory for tile PNGs
        #[arg(short, long, default_value = "tiles")]
        out_dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List { index } => commands::list::run(&index),
        Commands::Extract { index, out_dir } => commands::extract::run(&index, &out_dir),
        Commands::Frames {
            index,
            name,
            out_dir,
            raw,
        } => commands::frames::run(&index, &name, &out_dir, raw),
        Commands::Audio { index, name, out } => {
            commands::audio::run(&index, &name, out.as_deref())
        }
        Commands::Xmi { input, out } => commands::xmi::run(&input, out.as_deref()),
        Commands::LzssCheck { index, name } => commands::lzss_check::run(&index, &name),
        Commands::Megatexture { command } => match command {
            MegatextureCommands::Analyze { map, width } => {
                commands::megatexture::analyze(&map, width)
            }
            MegatextureCommands::Generate {
                map,
                width,
                out_dir,
                seed,
            } => commands::megatexture::generate(&map, width, &out_dir, seed),
            MegatextureCommands::Pack {
                map,
                width,
                out,
                seed,
            } => commands::megatexture::pack_archive(&map, width, &out, seed),
            MegatextureCommands::Unpack { archive, out_dir } => {
                commands::megatexture::unpack_archive(&archive, &out_dir)
            }
        },
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {e:#}", colored::Colorize::red("error"));
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list() {
        let cli = Cli::try_parse_from(["guestcore", "list", "MEDIA.RL"]).unwrap();
        assert!(matches!(cli.command, Commands::List { .. }));
    }

    #[test]
    fn parses_frames_with_raw_flag() {
        let cli = Cli::try_parse_from([
            "guestcore", "frames", "MEDIA.RL", "SCENE", "--out-dir", "frames", "--raw",
        ])
        .unwrap();
        match cli.command {
            Commands::Frames { name, raw, .. } => {
                assert_eq!(name, "SCENE");
                assert!(raw);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn parses_megatexture_pack() {
        let cli = Cli::try_parse_from([
            "guestcore",
            "megatexture",
            "pack",
            "map.bin",
            "--width",
            "32",
            "--seed",
            "7",
        ])
        .unwrap();
        match cli.command {
            Commands::Megatexture {
                command: MegatextureCommands::Pack { width, seed, .. },
            } => {
                assert_eq!(width, 32);
                assert_eq!(seed, Some(7));
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn rejects_missing_width() {
        assert!(Cli::try_parse_from(["guestcore", "megatexture", "analyze", "map.bin"]).is_err());
    }
}
