//! Megatexture commands: analyze, generate, pack, unpack.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use guestcore_raycast::archive::{pack, unpack, ArchiveMeta};
use guestcore_raycast::edges::analyze_map;
use guestcore_raycast::map::Map;
use guestcore_raycast::mortar::MortarParams;
use guestcore_raycast::tiles::{render_tile, tile_count, TILE_SIZE};

/// Load a headerless byte-grid map file. The host fixes the width; the
/// height is the remaining byte count.
fn load_map(path: &Path, width: u32) -> Result<Map> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    if width == 0 || bytes.len() % width as usize != 0 {
        bail!(
            "{}: {} bytes do not divide into rows of width {width}",
            path.display(),
            bytes.len()
        );
    }
    let height = (bytes.len() / width as usize) as u32;
    Ok(Map::new(width, height, bytes)?)
}

fn params_with_seed(seed: Option<u32>) -> MortarParams {
    MortarParams {
        seed: seed.unwrap_or(MortarParams::default().seed),
        ..MortarParams::default()
    }
}

/// Deterministic RGBA PNG writer for tile output.
fn write_rgba_png(path: &Path, data: &[u8], width: u32, height: u32) -> Result<()> {
    let file = fs::File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);
    encoder.set_filter(png::FilterType::NoFilter);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(data)?;
    Ok(())
}

pub fn analyze(map_path: &Path, width: u32) -> Result<ExitCode> {
    let map = load_map(map_path, width)?;
    let layout = analyze_map(&map)?;

    println!(
        "{} {}x{} map: {} exposed edges, strip {}x1024 px, {} tiles",
        "layout".cyan().bold(),
        map.width(),
        map.height(),
        layout.edges().len(),
        layout.strip_width(),
        tile_count(layout.strip_width())
    );
    for edge in layout.edges() {
        println!(
            "  cell ({:>3}, {:>3}) {:?}: columns {}..{}",
            edge.cell_x,
            edge.cell_y,
            edge.side,
            edge.x_offset,
            edge.x_offset + edge.width
        );
    }
    Ok(ExitCode::SUCCESS)
}

pub fn generate(map_path: &Path, width: u32, out_dir: &Path, seed: Option<u32>) -> Result<ExitCode> {
    let map = load_map(map_path, width)?;
    let layout = analyze_map(&map)?;
    if layout.strip_width() == 0 {
        eprintln!("{}: map has no exposed edges", "error".red());
        return Ok(ExitCode::from(1));
    }

    let params = params_with_seed(seed);
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let total = tile_count(layout.strip_width());
    for k in 0..total {
        let tile = render_tile(k, &params);
        let out_path = out_dir.join(format!("tile_{k:05}.png"));
        write_rgba_png(&out_path, &tile, TILE_SIZE, TILE_SIZE)
            .with_context(|| format!("writing {}", out_path.display()))?;
        println!("{} {}", "wrote".green(), out_path.display());
    }

    println!("{} {total} tiles written to {}", "done".green().bold(), out_dir.display());
    Ok(ExitCode::SUCCESS)
}

pub fn pack_archive(map_path: &Path, width: u32, out: &Path, seed: Option<u32>) -> Result<ExitCode> {
    let map = load_map(map_path, width)?;
    let layout = analyze_map(&map)?;
    if layout.strip_width() == 0 {
        eprintln!("{}: map has no exposed edges", "error".red());
        return Ok(ExitCode::from(1));
    }

    let params = params_with_seed(seed);
    let meta = ArchiveMeta {
        tile_width: TILE_SIZE,
        tile_height: TILE_SIZE,
        mortar_rgb: params.mortar_rgb(),
        seed: params.seed,
    };

    let file = fs::File::create(out)
        .with_context(|| format!("creating {}", out.display()))?;
    let mut writer = BufWriter::new(file);
    let total = tile_count(layout.strip_width());
    pack(&mut writer, &meta, total, |k| render_tile(k, &params))?;
    writer.flush()?;

    println!("{} {} ({total} tiles, seed {})", "wrote".green().bold(), out.display(), params.seed);
    Ok(ExitCode::SUCCESS)
}

pub fn unpack_archive(archive_path: &Path, out_dir: &Path) -> Result<ExitCode> {
    let mut file = fs::File::open(archive_path)
        .with_context(|| format!("opening {}", archive_path.display()))?;
    let archive = unpack(&mut file)?;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let meta = *archive.meta();
    for k in 0..archive.tile_count() {
        let Some(tile) = archive.tile(k) else { break };
        let out_path = out_dir.join(format!("tile_{k:05}.png"));
        write_rgba_png(&out_path, tile, meta.tile_width, meta.tile_height)
            .with_context(|| format!("writing {}", out_path.display()))?;
        println!("{} {}", "wrote".green(), out_path.display());
    }

    println!(
        "{} {} tiles decoded (seed {})",
        "done".green().bold(),
        archive.tile_count(),
        meta.seed
    );
    Ok(ExitCode::SUCCESS)
}
