//! PCM audio assembly.
//!
//! Audio arrives as 0x80 chunks of raw 8-bit unsigned mono PCM at 22 050 Hz.
//! Assembly is pure concatenation in chunk order; no resampling or scaling.

use std::io::{Seek, Write};
use std::path::Path;

use crate::error::MediaResult;
use crate::subfile::{SubFile, CHUNK_AUDIO};

/// Sample rate of all sub-file audio.
pub const SAMPLE_RATE: u32 = 22_050;

/// Concatenate the payloads of every audio chunk, in file order.
///
/// Returns an empty buffer when the sub-file carries no audio. Compressed
/// audio chunks are decompressed first.
pub fn assemble_pcm(subfile: &SubFile) -> MediaResult<Vec<u8>> {
    let mut pcm = Vec::new();
    for chunk in &subfile.chunks {
        if chunk.kind == CHUNK_AUDIO {
            pcm.extend(chunk.decoded_payload()?);
        }
    }
    Ok(pcm)
}

fn wav_spec() -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 8,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Write assembled PCM as a canonical RIFF/WAVE file.
pub fn write_wav(path: &Path, pcm: &[u8]) -> MediaResult<()> {
    let mut writer = hound::WavWriter::create(path, wav_spec())?;
    write_samples(&mut writer, pcm)
}

/// Write assembled PCM as WAV to any seekable writer.
pub fn write_wav_to<W: Write + Seek>(writer: W, pcm: &[u8]) -> MediaResult<()> {
    let mut writer = hound::WavWriter::new(writer, wav_spec())?;
    write_samples(&mut writer, pcm)
}

fn write_samples<W: Write + Seek>(writer: &mut hound::WavWriter<W>, pcm: &[u8]) -> MediaResult<()> {
    // hound stores 8-bit PCM as unsigned bytes; samples are given as the
    // signed equivalent of the raw unsigned data.
    for &sample in pcm {
        writer.write_sample(i8::from_le_bytes([sample.wrapping_sub(128)]))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lzss::LzssParams;
    use crate::subfile::Chunk;
    use std::io::Cursor;

    fn audio_chunk(payload: &[u8]) -> Chunk {
        Chunk {
            kind: CHUNK_AUDIO,
            reserved: 0,
            params: LzssParams::new(0, 0),
            payload: payload.to_vec(),
        }
    }

    fn subfile(chunks: Vec<Chunk>) -> SubFile {
        SubFile {
            name: "A".into(),
            identifier: 0,
            reserved: [0; 6],
            chunks,
        }
    }

    #[test]
    fn concatenates_audio_chunks_in_order() {
        let sub = subfile(vec![
            audio_chunk(&[1, 2]),
            Chunk {
                kind: 0x42,
                reserved: 0,
                params: LzssParams::new(0, 0),
                payload: vec![99],
            },
            audio_chunk(&[3, 4, 5]),
        ]);
        assert_eq!(assemble_pcm(&sub).unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn no_audio_yields_empty_buffer() {
        let sub = subfile(vec![]);
        assert!(assemble_pcm(&sub).unwrap().is_empty());
    }

    #[test]
    fn wav_header_is_canonical() {
        let pcm = [128u8, 130, 126, 128];
        let mut cursor = Cursor::new(Vec::new());
        write_wav_to(&mut cursor, &pcm).unwrap();
        let bytes = cursor.into_inner();

        // 44-byte RIFF header followed by the raw data chunk.
        assert_eq!(bytes.len(), 44 + pcm.len());
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32::from_le_bytes(bytes[24..28].try_into().unwrap()), SAMPLE_RATE);
        // Block align 1, bits per sample 8.
        assert_eq!(u16::from_le_bytes(bytes[32..34].try_into().unwrap()), 1);
        assert_eq!(u16::from_le_bytes(bytes[34..36].try_into().unwrap()), 8);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(&bytes[44..], &pcm);
    }
}
