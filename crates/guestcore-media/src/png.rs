//! Deterministic PNG export of decoded frames.
//!
//! Fixed compression settings keep the output byte-identical for the same
//! frame, so exported animations can be compared by hash.

use std::io::Write;
use std::path::Path;

use png::{BitDepth, ColorType, Compression, Encoder, FilterType};

use crate::bitmap::Frame;
use crate::error::MediaResult;

/// Write a decoded frame as an 8-bit RGB PNG file.
pub fn write_frame(path: &Path, frame: &Frame) -> MediaResult<()> {
    let file = std::fs::File::create(path)?;
    write_frame_to(std::io::BufWriter::new(file), frame)
}

/// Write a decoded frame as an 8-bit RGB PNG to any writer.
pub fn write_frame_to<W: Write>(writer: W, frame: &Frame) -> MediaResult<()> {
    let mut encoder = Encoder::new(writer, frame.width(), frame.height());
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_compression(Compression::Default);
    encoder.set_filter(FilterType::NoFilter);

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(frame.data())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Rgb;

    #[test]
    fn export_is_deterministic() {
        let mut frame = Frame::new(8, 8);
        for y in 0..8 {
            for x in 0..8 {
                frame.put_pixel(
                    x,
                    y,
                    Rgb {
                        r: (x * 32) as u8,
                        g: (y * 32) as u8,
                        b: 128,
                    },
                );
            }
        }

        let mut first = Vec::new();
        let mut second = Vec::new();
        write_frame_to(&mut first, &frame).unwrap();
        write_frame_to(&mut second, &frame).unwrap();

        assert_eq!(&first[0..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(first, second);
    }
}
